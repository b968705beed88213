/// Get environment variable with SWITCHBOARD_ prefix, falling back to unprefixed version
///
/// This helper function checks for `SWITCHBOARD_{key}` first, then falls back to `{key}`
/// for compatibility with standard environment variable naming.
///
/// # Examples
///
/// ```rust,ignore
/// use switchboard::utils::get_env_with_prefix;
///
/// // Checks SWITCHBOARD_SWITCHER_POSITION first, then SWITCHER_POSITION
/// let position = get_env_with_prefix("SWITCHER_POSITION");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("SWITCHBOARD_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_with_prefix() {
        // Test with SWITCHBOARD_ prefix
        unsafe {
            std::env::set_var("SWITCHBOARD_ENV_TEST_VAR", "prefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_TEST_VAR"), Some("prefixed_value".to_string()));
        unsafe {
            std::env::remove_var("SWITCHBOARD_ENV_TEST_VAR");
        }

        // Test with unprefixed fallback
        unsafe {
            std::env::set_var("ENV_FALLBACK_VAR", "unprefixed_value");
        }
        assert_eq!(get_env_with_prefix("ENV_FALLBACK_VAR"), Some("unprefixed_value".to_string()));
        unsafe {
            std::env::remove_var("ENV_FALLBACK_VAR");
        }

        // Test non-existent variable
        assert_eq!(get_env_with_prefix("ENV_NON_EXISTENT_VAR"), None);
    }
}
