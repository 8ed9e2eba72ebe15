use once_cell::sync::Lazy;
use std::env;

/// Application configuration, resolved once from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub default_timezone: String,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub token_expire_days: i64,
}

/// S3-compatible object storage settings (AWS S3 / Cloudflare R2 / Backblaze B2).
///
/// Credentials and bucket are optional here; their absence is reported at the
/// point of use, not at startup.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub public_base_url: Option<String>,
    pub presign_expires_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", "8000").parse().unwrap_or(8000),
            database_url: env_or("DATABASE_URL", "sqlite://jobflow_dev.db"),
            cors_origins: parse_cors_origins(&env_or("CORS_ORIGINS", "*")),
            default_timezone: env_or("DEFAULT_TIMEZONE", "America/New_York"),
            security: SecurityConfig {
                jwt_secret: env_or("SECRET_KEY", "CHANGE_ME_TO_A_LONG_RANDOM_SECRET"),
                jwt_algorithm: env_or("JWT_ALGORITHM", "HS256"),
                token_expire_days: env_or("ACCESS_TOKEN_EXPIRE_DAYS", "30").parse().unwrap_or(30),
            },
            storage: StorageConfig {
                access_key_id: env_opt("S3_ACCESS_KEY_ID"),
                secret_access_key: env_opt("S3_SECRET_ACCESS_KEY"),
                bucket: env_opt("S3_BUCKET"),
                region: env_or("S3_REGION", "us-east-1"),
                endpoint_url: env_opt("S3_ENDPOINT_URL"),
                public_base_url: env_opt("S3_PUBLIC_BASE_URL"),
                presign_expires_secs: env_or("S3_PRESIGN_EXPIRES_SECONDS", "900").parse().unwrap_or(900),
            },
        }
    }
}

/// Read an env var, falling back to `default` when unset or blank.
fn env_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_cors_origins(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw == "*" {
        return vec!["*".to_string()];
    }
    raw.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
