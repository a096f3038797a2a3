//! Helpers shared by the write commands of every service.

use serde::{Deserialize, Deserializer};

use domains::ValidationErrors;

/// PUT replaces every writable field, PATCH only the ones present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Partial,
}

impl WriteMode {
    /// Records "required" for a missing field when replacing.
    pub fn require<T>(self, errors: &mut ValidationErrors, field: &str, value: &Option<T>) {
        if self == WriteMode::Replace && value.is_none() {
            errors.add(field, "This field is required.");
        }
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default, deserialize_with = ...)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Unwraps a field that accepts no `null`, recording an error for an
/// explicit one.
pub fn not_null<T>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Option<T>>,
) -> Option<T> {
    match value {
        Some(None) => {
            errors.add(field, "This field may not be null.");
            None
        }
        value => value.flatten(),
    }
}
