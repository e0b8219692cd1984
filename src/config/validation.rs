//! Configuration validation.
//!
//! Serde handles syntax; this checks values that would otherwise fail late
//! (an empty deploy program, a zero attempt budget). Every problem is
//! reported, not just the first.

use std::fmt;

use crate::config::schema::EntrypointConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully merged configuration.
pub fn validate_config(config: &EntrypointConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let deployment = &config.deployment;
    for (field, value) in [
        ("deployment.program", &deployment.program),
        ("deployment.archive_path", &deployment.archive_path),
        ("deployment.context_root", &deployment.context_root),
        ("deployment.name", &deployment.name),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if config.profile.uses_oauth() && config.files.oauth_properties.as_os_str().is_empty() {
        errors.push(ValidationError::new("files.oauth_properties", "must not be empty"));
    }
    if config.profile.uses_database_file()
        && config.files.database_properties.as_os_str().is_empty()
    {
        errors.push(ValidationError::new(
            "files.database_properties",
            "must not be empty",
        ));
    }

    if config.readiness.max_attempts == 0 {
        errors.push(ValidationError::new(
            "readiness.max_attempts",
            "must be at least 1",
        ));
    }
    if config.readiness.connect_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "readiness.connect_timeout_ms",
            "must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
