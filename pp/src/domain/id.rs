//! Identifier generation
//!
//! All IDs use the format `{prefix}_{8-char-hex}`.
//! Example: `task_a3f91c02`.

use uuid::Uuid;

/// Generate a unique ID with the given prefix
///
/// The suffix is the first 8 hex chars of a v4 UUID, which is plenty of
/// entropy for uniqueness within a single plan or action list.
pub fn generate_id(prefix: &str) -> String {
    let uuid = Uuid::new_v4();
    format!("{}_{}", prefix, &uuid.simple().to_string()[..8])
}
