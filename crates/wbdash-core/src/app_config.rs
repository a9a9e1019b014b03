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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub static_dir: PathBuf,
    /// Marketplace API token, sent verbatim in the `Authorization` header.
    pub wb_token: String,
    pub auth_password: Option<String>,
    pub session_secret: Option<String>,
    pub refresh_minutes: u64,
    pub suppliers_base_url: String,
    pub statistics_base_url: String,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self.env, Environment::Development)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("static_dir", &self.static_dir)
            .field("wb_token", &"[redacted]")
            .field(
                "auth_password",
                &self.auth_password.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("refresh_minutes", &self.refresh_minutes)
            .field("suppliers_base_url", &self.suppliers_base_url)
            .field("statistics_base_url", &self.statistics_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
