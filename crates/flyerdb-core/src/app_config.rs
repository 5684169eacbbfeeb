use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub render_url: String,
    pub render_token: Option<String>,
    pub flyer_index_url: String,
    pub image_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub pages_per_store: usize,
    pub download_timeout_secs: u64,
    pub render_timeout_secs: u64,
    pub ai_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("stores_path", &self.stores_path)
            .field("database_url", &"[redacted]")
            .field("openai_api_key", &"[redacted]")
            .field("openai_base_url", &self.openai_base_url)
            .field("render_url", &self.render_url)
            .field(
                "render_token",
                &self.render_token.as_ref().map(|_| "[redacted]"),
            )
            .field("flyer_index_url", &self.flyer_index_url)
            .field("image_dir", &self.image_dir)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("pages_per_store", &self.pages_per_store)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("ai_timeout_secs", &self.ai_timeout_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
