use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - api_key is set when auth method is "api_key"
/// - Storage URLs and bucket names are non-empty
/// - Payments secret key is set and fee percent is within 0..=100
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Auth validation
    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is \"api_key\"".to_string(),
        ));
    }

    // Storage validation
    if config.storage.signer_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.signer_url cannot be empty".to_string(),
        ));
    }
    if config.storage.public_bucket.is_empty() || config.storage.private_bucket.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage bucket names cannot be empty".to_string(),
        ));
    }
    if config.storage.public_base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.public_base_url cannot be empty".to_string(),
        ));
    }

    // Payments validation
    if config.payments.secret_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "payments.secret_key cannot be empty".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&config.payments.application_fee_percent) {
        return Err(ConfigError::ValidationError(
            "payments.application_fee_percent must be between 0 and 100".to_string(),
        ));
    }

    Ok(())
}
