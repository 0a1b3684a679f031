/// API route handlers
///
/// One module per resource. All handlers return `ApiResult<T>` and rely
/// on the auth layer in `app.rs` for the `AuthContext` extension.
pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

/// Parses a truthy query-parameter value.
///
/// `1` and `true` (case insensitive) count as truthy; anything else,
/// including an absent parameter, is falsy.
pub(crate) fn truthy_param(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_param() {
        assert!(truthy_param(Some("1")));
        assert!(truthy_param(Some("true")));
        assert!(truthy_param(Some("TRUE")));
        assert!(!truthy_param(Some("0")));
        assert!(!truthy_param(Some("false")));
        assert!(!truthy_param(Some("")));
        assert!(!truthy_param(None));
    }
}
