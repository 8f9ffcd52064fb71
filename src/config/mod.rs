use chrono::{FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub agent: AgentConfig,
    pub reasoning: ReasoningConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Trailing window reduced into a summary
    pub window_days: u32,
    /// Offset of the reference timezone used for the login dedup calendar day
    pub reference_utc_offset_minutes: i32,
    /// YAML fixtures for the in-memory record store (used when no DATABASE_URL)
    pub fixtures_path: Option<String>,
}

impl AgentConfig {
    /// Reference timezone; out-of-range offsets fall back to UTC
    pub fn reference_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reference_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    pub api_base: String,
    pub api_version: String,
    pub model: String,
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing, default)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
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
        // Server overrides
        if let Some(v) = env::var("FINSIGHT_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Agent overrides
        if let Ok(v) = env::var("AGENT_WINDOW_DAYS") {
            self.agent.window_days = v.parse().unwrap_or(self.agent.window_days);
        }
        if let Ok(v) = env::var("AGENT_TZ_OFFSET_MINUTES") {
            self.agent.reference_utc_offset_minutes =
                v.parse().unwrap_or(self.agent.reference_utc_offset_minutes);
        }
        if let Ok(v) = env::var("AGENT_FIXTURES") {
            self.agent.fixtures_path = Some(v).filter(|p| !p.trim().is_empty());
        }
        self.agent.window_days = self.agent.window_days.max(1);

        // Reasoning backend overrides
        if let Ok(v) = env::var("ANTHROPIC_API_KEY") {
            self.reasoning.api_key = v;
        }
        if let Ok(v) = env::var("ANTHROPIC_MODEL") {
            self.reasoning.model = v;
        }
        if let Ok(v) = env::var("ANTHROPIC_API_BASE") {
            self.reasoning.api_base = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("REASONING_TIMEOUT_SECS") {
            self.reasoning.timeout_secs = v.parse().unwrap_or(self.reasoning.timeout_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|u| !u.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    fn reasoning_defaults(timeout_secs: u64) -> ReasoningConfig {
        ReasoningConfig {
            api_base: "https://api.anthropic.com/v1".to_string(),
            api_version: "2023-06-01".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: String::new(),
            timeout_secs,
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                enable_request_logging: true,
            },
            agent: AgentConfig {
                window_days: 30,
                reference_utc_offset_minutes: 0,
                fixtures_path: None,
            },
            reasoning: Self::reasoning_defaults(120),
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                cors_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:5174".to_string(),
                    "http://localhost:5175".to_string(),
                ],
                // Development only; staging and production require JWT_SECRET
                jwt_secret: "finsight-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                enable_request_logging: true,
            },
            agent: AgentConfig {
                window_days: 30,
                reference_utc_offset_minutes: 0,
                fixtures_path: None,
            },
            reasoning: Self::reasoning_defaults(60),
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                enable_request_logging: false,
            },
            agent: AgentConfig {
                window_days: 30,
                reference_utc_offset_minutes: 0,
                fixtures_path: None,
            },
            reasoning: Self::reasoning_defaults(30),
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
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

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.agent.window_days, 30);
        assert_eq!(config.agent.reference_utc_offset_minutes, 0);
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.server.enable_request_logging);
        assert_eq!(config.reasoning.timeout_secs, 30);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = AppConfig::development();
        config.reasoning.api_key = "sk-test".to_string();
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("sk-test"));
        assert!(!rendered.contains("finsight-development-secret"));
    }

    #[test]
    fn reference_offset_follows_minutes() {
        let mut config = AppConfig::development();
        config.agent.reference_utc_offset_minutes = -300;
        assert_eq!(config.agent.reference_offset().local_minus_utc(), -5 * 3600);

        config.agent.reference_utc_offset_minutes = 100_000;
        assert_eq!(config.agent.reference_offset().local_minus_utc(), 0);
    }
}
