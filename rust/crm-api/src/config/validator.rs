//! Startup configuration validation.
//!
//! Misconfiguration surfaces here, before the server binds, rather than as
//! per-request failures later.

use super::error::{ConfigResult, ConfigurationError};
use super::AppConfig;

/// Validates the merged configuration before startup.
#[derive(Debug)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the entire application configuration.
    ///
    /// Returns `Ok(())` if valid, or a `ConfigurationError` with all issues.
    pub fn validate(config: &AppConfig) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_gateway(config) {
            errors.push(e);
        }
        if let Err(e) = Self::validate_assistant(config) {
            errors.push(e);
        }
        if let Err(e) = Self::validate_server(config) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ConfigurationError::multiple(errors))
        }
    }

    fn validate_gateway(config: &AppConfig) -> ConfigResult<()> {
        if config.gateway.jwt_secret.trim().is_empty() {
            return Err(ConfigurationError::missing_required(
                "JWT secret",
                "Authenticating API requests",
                "JWT_SECRET (or CRM__GATEWAY__JWT_SECRET)",
            ));
        }
        Ok(())
    }

    fn validate_assistant(config: &AppConfig) -> ConfigResult<()> {
        if !config.assistant.enabled {
            return Ok(());
        }
        match &config.assistant.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigurationError::missing_required(
                "OpenAI API key",
                "Content generation (assistant endpoints)",
                "OPENAI_API_KEY, or set CRM__ASSISTANT__ENABLED=false to disable the assistant",
            )),
        }
    }

    fn validate_server(config: &AppConfig) -> ConfigResult<()> {
        if config.server.timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "server.timeout_secs is 0",
                "Set CRM__SERVER__TIMEOUT_SECS to a positive number of seconds",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.gateway.jwt_secret = "test-secret".to_string();
        config.assistant.api_key = Some("sk-test".to_string());
        config
    }

    #[test]
    fn valid_config_passes() {
        assert!(ConfigValidator::validate(&valid_config()).is_ok());
    }

    #[test]
    fn missing_jwt_secret_fails() {
        let mut config = valid_config();
        config.gateway.jwt_secret = String::new();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn missing_openai_key_fails_unless_assistant_disabled() {
        let mut config = valid_config();
        config.assistant.api_key = None;
        assert!(ConfigValidator::validate(&config).is_err());

        config.assistant.enabled = false;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn multiple_problems_are_reported_together() {
        let mut config = AppConfig::default();
        config.assistant.api_key = None;
        config.server.timeout_secs = 0;
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(err.count(), 3);
    }
}
