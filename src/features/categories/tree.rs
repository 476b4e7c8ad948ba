//! Category hierarchy walks.
//!
//! Categories arrive as a flat list with parent references that the schema
//! does not keep acyclic. The walk below orders them roots-first,
//! depth-first pre-order, emits every category exactly once and always
//! terminates: it runs on an explicit stack with a visited set, and nodes
//! only reachable through a parent cycle are re-rooted at the cycle member
//! with the smallest sort key.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use minijinja::{context, Environment};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

/// Prefix repeated once per depth level in option labels
pub const DEPTH_PREFIX: &str = "--";

const OPTIONS_TEMPLATE_NAME: &str = "category_options.html";
const OPTIONS_TEMPLATE: &str = r#"{% for option in options %}<option value="{{ option.id }}"{% if option.selected %} selected{% endif %}>{{ option.label }}</option>
{% endfor %}"#;

static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// One `<option>` entry of a category picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategoryOption {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    /// Name prefixed with one `--` per depth level
    pub label: String,
    pub depth: usize,
    pub selected: bool,
}

/// Ordered picker entries plus the categories found on parent cycles
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CategoryOptionTree {
    pub entries: Vec<CategoryOption>,
    /// Categories whose parent chain loops back on itself
    pub cycles: Vec<Uuid>,
}

/// Pre-order visit: (index into the input slice, depth)
#[derive(Debug, Default)]
pub(crate) struct TreeWalk {
    pub order: Vec<(usize, usize)>,
    pub cycles: Vec<Uuid>,
}

fn sort_key(a: &Category, b: &Category) -> Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Walk the hierarchy roots-first, depth-first pre-order
pub(crate) fn walk(categories: &[Category]) -> TreeWalk {
    // First occurrence of each id wins
    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(categories.len());
    for (i, category) in categories.iter().enumerate() {
        index.entry(category.id).or_insert(i);
    }
    let mut nodes: Vec<usize> = index.values().copied().collect();
    nodes.sort_by(|&a, &b| sort_key(&categories[a], &categories[b]));

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for &i in &nodes {
        match categories[i].parent_id.and_then(|p| index.get(&p).copied()) {
            Some(parent) => children.entry(parent).or_default().push(i),
            // Root, or orphan whose parent is not in the set
            None => roots.push(i),
        }
    }

    let mut result = TreeWalk::default();
    let mut visited: HashSet<usize> = HashSet::with_capacity(nodes.len());

    for &root in &roots {
        visit_subtree(root, &children, &mut visited, &mut result.order);
    }

    // Whatever is left hangs off a parent cycle
    for &start in &nodes {
        if visited.contains(&start) {
            continue;
        }

        let members = cycle_through(start, categories, &index);
        let entry = members
            .iter()
            .copied()
            .filter(|i| !visited.contains(i))
            .min_by(|&a, &b| sort_key(&categories[a], &categories[b]))
            .unwrap_or(start);

        let ids: Vec<Uuid> = members.iter().map(|&i| categories[i].id).collect();
        tracing::warn!(
            "Category hierarchy contains a parent cycle through {:?}; rendering '{}' at root level",
            ids,
            categories[entry].name
        );
        for id in ids {
            if !result.cycles.contains(&id) {
                result.cycles.push(id);
            }
        }

        visit_subtree(entry, &children, &mut visited, &mut result.order);
    }

    result
}

fn visit_subtree(
    root: usize,
    children: &HashMap<usize, Vec<usize>>,
    visited: &mut HashSet<usize>,
    order: &mut Vec<(usize, usize)>,
) {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        order.push((node, depth));
        if let Some(kids) = children.get(&node) {
            // Reverse so the first child is popped first
            for &child in kids.iter().rev() {
                if !visited.contains(&child) {
                    stack.push((child, depth + 1));
                }
            }
        }
    }
}

/// Follow parent links from `start` until a node repeats; return the loop
fn cycle_through(start: usize, categories: &[Category], index: &HashMap<Uuid, usize>) -> Vec<usize> {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;

    loop {
        if let Some(&pos) = seen.get(&current) {
            return path[pos..].to_vec();
        }
        seen.insert(current, path.len());
        path.push(current);

        match categories[current].parent_id.and_then(|p| index.get(&p).copied()) {
            Some(parent) => current = parent,
            // Reached a root: not a cycle member after all
            None => return vec![start],
        }
    }
}

/// Build picker entries from the active categories, marking `selected` when it matches an id.
///
/// Inactive categories are left out; their active children are rendered at root level.
pub fn build_category_options(categories: &[Category], selected: Option<Uuid>) -> CategoryOptionTree {
    let categories: Vec<Category> = categories.iter().filter(|c| c.is_active).cloned().collect();
    let walk = walk(&categories);

    let entries = walk
        .order
        .iter()
        .map(|&(i, depth)| {
            let category = &categories[i];
            CategoryOption {
                id: category.id,
                parent_id: category.parent_id,
                name: category.name.clone(),
                label: format!("{}{}", DEPTH_PREFIX.repeat(depth), category.name),
                depth,
                selected: selected == Some(category.id),
            }
        })
        .collect();

    CategoryOptionTree {
        entries,
        cycles: walk.cycles,
    }
}

fn template_env() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(|| {
        let mut env = Environment::new();
        if let Err(e) = env.add_template(OPTIONS_TEMPLATE_NAME, OPTIONS_TEMPLATE) {
            tracing::error!("Failed to compile category options template: {}", e);
        }
        env
    })
}

impl CategoryOptionTree {
    /// Render `<option>` lines for server-side forms (labels are HTML-escaped)
    pub fn render_html(&self) -> Result<String> {
        let template = template_env()
            .get_template(OPTIONS_TEMPLATE_NAME)
            .map_err(|e| AppError::Internal(format!("Category options template missing: {}", e)))?;

        template
            .render(context! { options => &self.entries })
            .map_err(|e| AppError::Internal(format!("Failed to render category options: {}", e)))
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent: Option<Uuid>, order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            parent_id: parent,
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            display_order: order,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn names(tree: &CategoryOptionTree) -> Vec<&str> {
        tree.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_selected_child_follows_its_parent() {
        let a = category("A", None, 0);
        let b = category("B", Some(a.id), 0);
        let c = category("C", None, 1);
        let selected = b.id;

        let tree = build_category_options(&[c, b, a], Some(selected));

        assert_eq!(names(&tree), vec!["A", "B", "C"]);
        let marked: Vec<&str> = tree
            .entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(marked, vec!["B"]);
        assert_eq!(tree.entries[1].label, "--B");
        assert_eq!(tree.entries[1].depth, 1);
        assert!(!tree.has_cycles());
    }

    #[test]
    fn test_every_category_emitted_once_and_after_parent() {
        let root = category("Gaming", None, 0);
        let pads = category("Pads", Some(root.id), 1);
        let wireless = category("Wireless", Some(pads.id), 0);
        let wired = category("Wired", Some(pads.id), 1);
        let audio = category("Audio", None, 2);
        let headsets = category("Headsets", Some(audio.id), 0);
        let input = vec![
            headsets.clone(),
            wired.clone(),
            audio.clone(),
            wireless.clone(),
            pads.clone(),
            root.clone(),
        ];

        let tree = build_category_options(&input, None);

        assert_eq!(tree.entries.len(), input.len());
        let ids: HashSet<Uuid> = tree.entries.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), input.len());

        let position = |id: Uuid| tree.entries.iter().position(|e| e.id == id).unwrap();
        for entry in &tree.entries {
            if let Some(parent) = entry.parent_id {
                assert!(position(parent) < position(entry.id));
            }
        }
        assert_eq!(
            names(&tree),
            vec!["Gaming", "Pads", "Wireless", "Wired", "Audio", "Headsets"]
        );
        assert_eq!(tree.entries[2].label, "----Wireless");
    }

    #[test]
    fn test_orphan_rendered_at_root_level() {
        let a = category("A", None, 0);
        let orphan = category("Orphan", Some(Uuid::new_v4()), 1);

        let tree = build_category_options(&[orphan, a], None);

        assert_eq!(names(&tree), vec!["A", "Orphan"]);
        assert_eq!(tree.entries[1].depth, 0);
        assert!(!tree.has_cycles());
    }

    #[test]
    fn test_inactive_category_hidden_and_child_promoted() {
        let mut hidden = category("Hidden", None, 0);
        hidden.is_active = false;
        let child = category("Child", Some(hidden.id), 0);
        let visible = category("Visible", None, 1);

        let tree = build_category_options(&[hidden.clone(), child.clone(), visible], Some(hidden.id));

        assert_eq!(names(&tree), vec!["Child", "Visible"]);
        assert!(tree.entries.iter().all(|e| e.id != hidden.id && !e.selected));
        assert_eq!(tree.entries[0].depth, 0);
        assert_eq!(tree.entries[0].label, "Child");
        assert!(!tree.render_html().unwrap().contains(&hidden.id.to_string()));
    }

    #[test]
    fn test_cycle_terminates_and_is_flagged() {
        let mut x = category("X", None, 0);
        let mut y = category("Y", None, 1);
        let z_id = Uuid::new_v4();
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        // Z hangs below the cycle
        let mut z = category("Z", Some(y.id), 0);
        z.id = z_id;
        let root = category("Root", None, 5);

        let tree = build_category_options(&[x.clone(), y.clone(), z, root], None);

        assert_eq!(tree.entries.len(), 4);
        assert!(tree.has_cycles());
        assert!(tree.cycles.contains(&x.id));
        assert!(tree.cycles.contains(&y.id));
        assert!(!tree.cycles.contains(&z_id));
        assert_eq!(names(&tree), vec!["Root", "X", "Y", "Z"]);
        assert_eq!(tree.entries[1].depth, 0);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut loner = category("Loner", None, 0);
        loner.parent_id = Some(loner.id);

        let tree = build_category_options(&[loner.clone()], None);

        assert_eq!(tree.entries.len(), 1);
        assert_eq!(tree.cycles, vec![loner.id]);
    }

    #[test]
    fn test_duplicate_ids_emitted_once() {
        let a = category("A", None, 0);
        let tree = build_category_options(&[a.clone(), a], None);
        assert_eq!(tree.entries.len(), 1);
    }

    #[test]
    fn test_render_html_escapes_and_marks_selection() {
        let a = category("Tools & <Parts>", None, 0);
        let tree = build_category_options(&[a.clone()], Some(a.id));

        let html = tree.render_html().unwrap();

        assert!(html.contains(&format!("<option value=\"{}\" selected>", a.id)));
        assert!(html.contains("Tools &amp; &lt;Parts&gt;"));
    }
}
