//! Entity identifier generation.

use uuid::Uuid;

/// Generate a fresh entity identifier.
///
/// Uses UUIDv7 (time-ordered), so ids generated by one process sort by
/// creation. Prefer passing ids explicitly in tests for determinism.
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
