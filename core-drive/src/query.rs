//! Drive query strings.

use bridge_traits::storage::FOLDER_MIME_TYPE;

/// Listing order: folders first, then by name.
pub const LIST_ORDER: &str = "folder,name";

/// Order for folder-only listings.
pub const FOLDER_ORDER: &str = "name";

/// Escape a value for use inside a single-quoted query literal.
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Non-trashed direct children of `folder_id`.
pub fn children_of(folder_id: &str) -> String {
    format!("'{}' in parents and trashed = false", escape_literal(folder_id))
}

/// Non-trashed direct sub-folders of `folder_id`.
pub fn folder_children_of(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{}' and trashed = false",
        escape_literal(folder_id),
        FOLDER_MIME_TYPE
    )
}

/// Objects whose name contains `text`, optionally restricted to one folder.
pub fn name_contains(text: &str, folder_id: Option<&str>) -> String {
    let mut query = format!(
        "name contains '{}' and trashed = false",
        escape_literal(text)
    );
    if let Some(folder_id) = folder_id {
        query.push_str(&format!(" and '{}' in parents", escape_literal(folder_id)));
    }
    query
}

/// Objects named exactly `name` directly inside `parent_id`.
pub fn exact_name_in(name: &str, parent_id: &str) -> String {
    format!(
        "name = '{}' and '{}' in parents and trashed = false",
        escape_literal(name),
        escape_literal(parent_id)
    )
}
