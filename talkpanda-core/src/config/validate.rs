//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.backend.base_url.trim().is_empty() {
        errors.push("backend.base_url must not be empty".to_string());
    }
    if config.backend.timeout_secs == 0 {
        errors.push("backend.timeout_secs must be > 0".to_string());
    }
    if config.backend.history_page_size == 0 {
        errors.push("backend.history_page_size must be > 0".to_string());
    }

    if config.ai.base_url.trim().is_empty() {
        errors.push("ai.base_url must not be empty".to_string());
    }
    if config.ai.timeout_secs == 0 {
        errors.push("ai.timeout_secs must be > 0".to_string());
    }

    for (field, value, allowed) in [
        ("speech.accent", &config.speech.accent, &["us", "uk", "au"][..]),
        ("speech.gender", &config.speech.gender, &["male", "female"][..]),
    ] {
        if !allowed.contains(&value.as_str()) {
            errors.push(format!("{} must be one of {:?}, got {:?}", field, allowed, value));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_defaults() {
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let mut config = Config::default();
        config.ai.base_url = "  ".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ai.base_url"));
    }

    #[test]
    fn test_validate_rejects_unknown_accent() {
        let mut config = Config::default();
        config.speech.accent = "fr".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("speech.accent"));
    }

    #[test]
    fn test_validate_aggregates_errors() {
        let mut config = Config::default();
        config.backend.base_url = String::new();
        config.backend.timeout_secs = 0;

        let err = validate_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("backend.base_url"));
        assert!(message.contains("backend.timeout_secs"));
    }
}
