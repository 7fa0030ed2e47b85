use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub dashboard: DashboardConfig,
    pub postgrest: PostgrestConfig,
    pub deployment: DeploymentConfig,
    pub entri: EntriConfig,
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
    /// Scheme assumed when no `X-Forwarded-Proto` header is present
    pub default_scheme: String,
    /// Take the public host from `X-Forwarded-Host`; only set behind a proxy that overwrites it
    pub trust_forwarded_host: bool,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret for service-to-service calls (`TRPC_SERVER_API_TOKEN`)
    pub service_secret: String,
    /// HMAC secret signing the session cookies
    pub auth_secret: String,
    pub session_cookie: String,
    pub builder_session_cookie: String,
    /// Target false-positive rate of the builder-login bloom filter
    pub bloom_false_positive_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub project_templates: Vec<String>,
    pub publisher_host: String,
    pub image_base_url: String,
    pub login_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgrestConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub deployment_api_url: String,
    pub domain_api_url: String,
    pub github_ref: Option<String>,
    pub github_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriConfig {
    pub api_url: String,
    pub application_id: String,
    pub secret: String,
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
        if let Some(port) = env::var("STUDIO_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_DEFAULT_SCHEME") {
            self.server.default_scheme = v;
        }
        if let Ok(v) = env::var("SERVER_TRUST_FORWARDED_HOST") {
            self.server.trust_forwarded_host = v.parse().unwrap_or(self.server.trust_forwarded_host);
        }
        if let Ok(v) = env::var("SERVER_ENABLE_CORS") {
            self.server.enable_cors = v.parse().unwrap_or(self.server.enable_cors);
        }

        // Security overrides
        if let Ok(v) = env::var("TRPC_SERVER_API_TOKEN") {
            self.security.service_secret = v;
        }
        if let Ok(v) = env::var("AUTH_SECRET") {
            self.security.auth_secret = v;
        }
        if let Ok(v) = env::var("BLOOM_FALSE_POSITIVE_RATE") {
            self.security.bloom_false_positive_rate = v
                .parse()
                .ok()
                .filter(|rate: &f64| *rate > 0.0 && *rate < 1.0)
                .unwrap_or(self.security.bloom_false_positive_rate);
        }

        // Dashboard overrides
        if let Ok(v) = env::var("PROJECT_TEMPLATES") {
            self.dashboard.project_templates = parse_list(&v);
        }
        if let Ok(v) = env::var("PUBLISHER_HOST") {
            self.dashboard.publisher_host = v;
        }
        if let Ok(v) = env::var("IMAGE_BASE_URL") {
            self.dashboard.image_base_url = v;
        }

        // Upstream services
        if let Ok(v) = env::var("POSTGREST_URL") {
            self.postgrest.url = v;
        }
        if let Ok(v) = env::var("POSTGREST_API_KEY") {
            self.postgrest.api_key = v;
        }
        if let Ok(v) = env::var("DEPLOYMENT_API_URL") {
            self.deployment.deployment_api_url = v;
        }
        if let Ok(v) = env::var("DOMAIN_API_URL") {
            self.deployment.domain_api_url = v;
        }
        if let Ok(v) = env::var("GITHUB_REF_NAME") {
            self.deployment.github_ref = Some(v);
        }
        if let Ok(v) = env::var("GITHUB_SHA") {
            self.deployment.github_sha = Some(v);
        }
        if let Ok(v) = env::var("ENTRI_API_URL") {
            self.entri.api_url = v;
        }
        if let Ok(v) = env::var("ENTRI_APPLICATION_ID") {
            self.entri.application_id = v;
        }
        if let Ok(v) = env::var("ENTRI_SECRET") {
            self.entri.secret = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                default_scheme: "http".to_string(),
                trust_forwarded_host: false,
                enable_cors: true,
            },
            security: SecurityConfig {
                service_secret: String::new(),
                auth_secret: "development-auth-secret".to_string(),
                session_cookie: "_session".to_string(),
                builder_session_cookie: "_builder_session".to_string(),
                bloom_false_positive_rate: 0.01,
            },
            dashboard: DashboardConfig {
                project_templates: Vec::new(),
                publisher_host: "wstd.work".to_string(),
                image_base_url: "/cgi/image/".to_string(),
                login_path: "/login".to_string(),
            },
            postgrest: PostgrestConfig {
                url: "http://localhost:3001".to_string(),
                api_key: String::new(),
            },
            deployment: DeploymentConfig {
                deployment_api_url: "http://localhost:3002/trpc".to_string(),
                domain_api_url: "http://localhost:3002/trpc".to_string(),
                github_ref: None,
                github_sha: None,
            },
            entri: EntriConfig {
                api_url: "https://api.goentri.com".to_string(),
                application_id: String::new(),
                secret: String::new(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.default_scheme = "https".to_string();
        config.server.enable_cors = false;
        config.security.auth_secret = String::new();
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.security.bloom_false_positive_rate = 0.001;
        config
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
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
        assert!(!config.server.trust_forwarded_host);
        assert_eq!(config.server.default_scheme, "http");
        assert!(config.security.service_secret.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.server.default_scheme, "https");
        assert!(config.security.auth_secret.is_empty());
        assert!(config.security.bloom_false_positive_rate < 0.01);
    }

    #[test]
    fn parses_template_list() {
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
