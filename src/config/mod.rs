use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub validation: ValidationConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub password_min_length: usize,
    pub password_max_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub enable_audit_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Validation overrides
        if let Ok(v) = env::var("VALIDATION_PASSWORD_MIN_LENGTH") {
            self.validation.password_min_length = v.parse().unwrap_or(self.validation.password_min_length);
        }
        if let Ok(v) = env::var("VALIDATION_PASSWORD_MAX_LENGTH") {
            self.validation.password_max_length = v.parse().unwrap_or(self.validation.password_max_length);
        }

        // API overrides
        if let Some(v) = env::var("API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        // A max below the min would reject every password
        if self.validation.password_max_length < self.validation.password_min_length {
            tracing::warn!(
                "VALIDATION_PASSWORD_MAX_LENGTH {} is below the minimum {}, using the minimum",
                self.validation.password_max_length,
                self.validation.password_min_length
            );
            self.validation.password_max_length = self.validation.password_min_length;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            validation: ValidationConfig {
                password_min_length: 8,
                password_max_length: 128,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                enable_audit_logging: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            validation: ValidationConfig {
                password_min_length: 10,
                password_max_length: 128,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024, // 256KB
            },
            security: SecurityConfig {
                enable_cors: true,
                enable_audit_logging: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            validation: ValidationConfig {
                password_min_length: 12,
                password_max_length: 128,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 64 * 1024, // 64KB
            },
            security: SecurityConfig {
                enable_cors: false,
                enable_audit_logging: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.validation.password_min_length, 8);
        assert!(config.api.enable_request_logging);
        assert!(!config.security.enable_audit_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.validation.password_min_length > AppConfig::development().validation.password_min_length);
        assert!(config.security.enable_audit_logging);
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn test_presets_have_sane_password_bounds() {
        for config in [AppConfig::development(), AppConfig::staging(), AppConfig::production()] {
            assert!(config.validation.password_min_length <= config.validation.password_max_length);
        }
    }
}
