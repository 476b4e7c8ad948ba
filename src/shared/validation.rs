use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase letters/digits separated by single hyphens
    /// - Valid: "tay-cam-choi-game", "ps5", "a-b-c"
    /// - Invalid: "-pad", "pad-", "pad--x", "Pad", "pad_x"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[\p{Ll}\p{N}]+(?:-[\p{Ll}\p{N}]+)*$").unwrap();

    /// Loose phone number check: digits with optional leading "+", 8-15 digits
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{8,15}$").unwrap();

    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^\p{L}\p{N}\s-]+").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s_-]+").unwrap();
}

/// Fold Vietnamese diacritics onto their base ASCII letter
fn fold_diacritic(ch: char) -> char {
    match ch {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// Turn a display name into a URL slug ("Tay cầm PS5" -> "tay-cam-ps5")
pub fn slugify(input: &str) -> String {
    let folded: String = input.to_lowercase().chars().map(fold_diacritic).collect();
    let cleaned = NON_SLUG_CHARS.replace_all(&folded, " ");
    let dashed = SEPARATORS.replace_all(cleaned.trim(), "-");
    dashed.trim_matches('-').to_string()
}

/// Use the submitted slug when present, otherwise derive one from `name`.
/// `None` when neither yields a usable slug.
pub fn slug_or_generate(explicit: Option<&str>, name: &str) -> Option<String> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => slugify(name),
    };
    (!slug.is_empty()).then_some(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("tay-cam-choi-game"));
        assert!(SLUG_REGEX.is_match("ps5"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-pad")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("pad-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("pad--x")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Pad")); // uppercase
        assert!(!SLUG_REGEX.is_match("pad_x")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_slugify_folds_vietnamese() {
        assert_eq!(slugify("Tay cầm chơi game"), "tay-cam-choi-game");
        assert_eq!(slugify("Đồng hồ thông minh"), "dong-ho-thong-minh");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  Game Pad -- PRO!! "), "game-pad-pro");
        assert_eq!(slugify("Sony_PS5 (2024)"), "sony-ps5-2024");
        assert!(SLUG_REGEX.is_match(&slugify("Chuột không dây Logitech")));
    }

    #[test]
    fn test_slug_or_generate() {
        assert_eq!(slug_or_generate(Some("ps5"), "Ignored"), Some("ps5".to_string()));
        assert_eq!(
            slug_or_generate(Some("  "), "Máy chơi game"),
            Some("may-choi-game".to_string())
        );
        assert_eq!(slug_or_generate(None, "!!!"), None);
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("0901234567"));
        assert!(PHONE_REGEX.is_match("+84901234567"));
        assert!(!PHONE_REGEX.is_match("09-01"));
    }
}
