/// Configuration management for Posts Service
///
/// Values come from environment variables. `main` loads a `.env` file first
/// when one is present.
use db_pool::env_utils::{parse_env_flag, parse_env_with_default};
use serde::{Deserialize, Serialize};

/// Default number of posts on one listing page.
pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;
/// Default lifetime of a cached index page.
pub const DEFAULT_INDEX_CACHE_TTL_SECS: u64 = 20;
/// Default login entry point for anonymous users.
pub const DEFAULT_LOGIN_URL: &str = "/auth/login/";

const DEV_JWT_SECRET: &str = "yatube-development-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub posts: PostsConfig,
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which `Store` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// Page cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub index_ttl_secs: u64,
}

/// Listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsConfig {
    pub per_page: i64,
}

/// Identity configuration. Tokens are issued by the external login service.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub login_url: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("login_url", &self.login_url)
            .finish()
    }
}

/// Request-time settings shared with handlers through `AppState`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub posts_per_page: i64,
    pub login_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_POSTS_PER_PAGE,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if production => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if production && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => return Err(format!("Unknown STORE_BACKEND '{}'", other)),
        };

        let per_page = parse_env_with_default("POSTS_PER_PAGE", DEFAULT_POSTS_PER_PAGE);
        if per_page < 1 {
            return Err(format!("POSTS_PER_PAGE must be at least 1, got {}", per_page));
        }

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if production => return Err("JWT_SECRET must be set in production".to_string()),
            _ => DEV_JWT_SECRET.to_string(),
        };

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("POSTS_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("POSTS_SERVICE_PORT", 8000),
            },
            cors: CorsConfig { allowed_origins },
            database: DatabaseConfig {
                backend,
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/yatube".to_string()),
                max_connections: parse_env_with_default("DATABASE_MAX_CONNECTIONS", 10),
                run_migrations: parse_env_flag("RUN_MIGRATIONS", false),
            },
            cache: CacheConfig {
                index_ttl_secs: parse_env_with_default(
                    "INDEX_CACHE_TTL_SECS",
                    DEFAULT_INDEX_CACHE_TTL_SECS,
                ),
            },
            posts: PostsConfig { per_page },
            auth: AuthConfig {
                jwt_secret,
                login_url: std::env::var("LOGIN_URL")
                    .unwrap_or_else(|_| DEFAULT_LOGIN_URL.to_string()),
            },
        })
    }

    pub fn uses_development_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }

    pub fn settings(&self) -> Settings {
        Settings {
            posts_per_page: self.posts.per_page,
            login_url: self.auth.login_url.clone(),
        }
    }
}
