use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::model::{AdminRole, AuthenticatedUser};

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub sub: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// Highest recognised back-office role
    pub primary_role: Option<AdminRole>,
    /// Name shown on comment replies written by this user
    pub reply_display_name: String,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        let primary_role = user.primary_role();
        let reply_display_name = user.reply_display_name();
        Self {
            sub: user.sub,
            name: user.name,
            roles: user.roles,
            primary_role,
            reply_display_name,
        }
    }
}
