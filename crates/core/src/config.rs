use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Secret used when `CRON_SECRET` is not configured. Only fit for local development.
pub const DEV_CRON_SECRET: &str = "local-dev-secret-token";

/// Default Expo push gateway endpoint.
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub cron: CronConfig,
    pub storage: StorageConfig,
    pub postgres: PostgresConfig,
    pub push: PushConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `USQUEST_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("USQUEST_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            cron: CronConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            postgres: PostgresConfig::from_env_profiled(p),
            push: PushConfig::from_env_profiled(p),
            catalog: CatalogConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:   {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  cron:     daily={}, weekly={}",
            self.cron.daily_schedule.as_deref().unwrap_or("(external)"),
            self.cron.weekly_schedule.as_deref().unwrap_or("(external)")
        );
        tracing::info!("  storage:  backend={}", self.storage.backend.as_str());
        tracing::info!("  postgres: host={}, db={}", self.postgres.host, self.postgres.database);
        tracing::info!("  push:     endpoint={}, timeout={}s", self.push.endpoint, self.push.timeout_secs);
        tracing::info!(
            "  catalog:  {}",
            self.catalog
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(builtin)".to_string())
        );
        if self.cron.uses_dev_secret() {
            tracing::warn!("CRON_SECRET not set — using the development secret");
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Cron trigger ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronConfig {
    /// Shared secret expected in the `x-cron-token` header.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Optional in-process schedule for the daily cycle (5 or 6 field cron).
    pub daily_schedule: Option<String>,
    /// Optional in-process schedule for the weekly cycle.
    pub weekly_schedule: Option<String>,
}

impl CronConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            secret: profiled_env_or(p, "CRON_SECRET", DEV_CRON_SECRET),
            daily_schedule: profiled_env_opt(p, "DAILY_CRON"),
            weekly_schedule: profiled_env_opt(p, "WEEKLY_CRON"),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_CRON_SECRET
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Postgres,
    Memory,
}

impl StorageBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackendKind::Postgres => "postgres",
            StorageBackendKind::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        let backend = match profiled_env_or(p, "STORAGE_BACKEND", "postgres")
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendKind::Memory,
            "postgres" => StorageBackendKind::Postgres,
            other => {
                tracing::warn!("unknown STORAGE_BACKEND '{}' — falling back to postgres", other);
                StorageBackendKind::Postgres
            }
        };
        Self { backend }
    }
}

// ── PostgreSQL ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Full connection URL; takes precedence over the discrete fields.
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl PostgresConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_opt(p, "DATABASE_URL"),
            host: profiled_env_or(p, "PG_HOST", "localhost"),
            port: profiled_env_u16(p, "PG_PORT", 5432),
            database: profiled_env_or(p, "PG_DATABASE", "usquest"),
            username: profiled_env_opt(p, "PG_USERNAME"),
            password: profiled_env_opt(p, "PG_PASSWORD"),
            ssl_mode: profiled_env_or(p, "PG_SSL_MODE", "prefer"),
            max_connections: profiled_env_u32(p, "PG_MAX_CONNECTIONS", 10),
            connect_timeout_secs: profiled_env_u64(p, "PG_CONNECT_TIMEOUT_SECS", 5),
        }
    }

    /// Connection URL, or `None` when neither `DATABASE_URL` nor `PG_USERNAME` is set.
    pub fn database_url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        let user = self.username.as_deref()?;
        let pass = self.password.as_deref().unwrap_or("");
        Some(format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            user, pass, self.host, self.port, self.database, self.ssl_mode
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() || self.username.is_some()
    }
}

// ── Push gateway ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub endpoint: String,
    /// Optional bearer token for gateways with enhanced security enabled.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Upper bound on one batch submission.
    pub timeout_secs: u64,
    pub title_template: String,
    pub body_template: String,
}

impl PushConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            endpoint: profiled_env_or(p, "PUSH_ENDPOINT", DEFAULT_PUSH_ENDPOINT),
            access_token: profiled_env_opt(p, "PUSH_ACCESS_TOKEN"),
            timeout_secs: profiled_env_u64(p, "PUSH_TIMEOUT_SECS", 10),
            title_template: profiled_env_or(
                p,
                "PUSH_TITLE_TEMPLATE",
                "New {{ frequency }} quest: {{ title }}",
            ),
            body_template: profiled_env_or(p, "PUSH_BODY_TEMPLATE", "{{ description }}"),
        }
    }
}

// ── Quest catalog ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// YAML catalog file; the builtin catalog is used when unset.
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            path: profiled_env_opt(p, "QUEST_CATALOG_PATH").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_prefix_wins_over_plain_key() {
        std::env::set_var("USQ_TEST_PORT", "9000");
        std::env::set_var("STAGING_USQ_TEST_PORT", "9100");
        assert_eq!(profiled_env_u16("STAGING", "USQ_TEST_PORT", 1), 9100);
        assert_eq!(profiled_env_u16("", "USQ_TEST_PORT", 1), 9000);
        assert_eq!(profiled_env_u16("OTHER", "USQ_TEST_PORT", 1), 9000);
        std::env::remove_var("USQ_TEST_PORT");
        std::env::remove_var("STAGING_USQ_TEST_PORT");
    }

    #[test]
    fn database_url_from_parts() {
        let pg = PostgresConfig {
            url: None,
            host: "db".into(),
            port: 5433,
            database: "quests".into(),
            username: Some("app".into()),
            password: Some("pw".into()),
            ssl_mode: "disable".into(),
            max_connections: 4,
            connect_timeout_secs: 5,
        };
        assert_eq!(
            pg.database_url().as_deref(),
            Some("postgres://app:pw@db:5433/quests?sslmode=disable")
        );
        assert!(pg.is_configured());
    }

    #[test]
    fn database_url_requires_credentials() {
        let pg = PostgresConfig {
            url: None,
            host: "localhost".into(),
            port: 5432,
            database: "usquest".into(),
            username: None,
            password: None,
            ssl_mode: "prefer".into(),
            max_connections: 10,
            connect_timeout_secs: 5,
        };
        assert!(pg.database_url().is_none());
        assert!(!pg.is_configured());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let cron = CronConfig {
            secret: "hunter2".into(),
            daily_schedule: Some("0 8 * * *".into()),
            weekly_schedule: None,
        };
        let json = serde_json::to_string(&cron).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!cron.uses_dev_secret());
    }
}
