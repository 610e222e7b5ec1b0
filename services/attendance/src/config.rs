use std::path::PathBuf;

/// Attendance service configuration loaded from environment variables.
///
/// Every variable is optional. Without remote credentials the service runs on
/// the local key/value store.
#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    /// Remote relational endpoint. Env var: `ROLLCALL_REMOTE_URL`.
    pub remote_url: Option<String>,
    /// Access key for the remote endpoint. Env var: `ROLLCALL_REMOTE_KEY`.
    pub remote_key: Option<String>,
    /// Directory backing the local store (default `.rollcall`). Env var: `ROLLCALL_DATA_DIR`.
    pub data_dir: PathBuf,
    /// TCP port for the HTTP server (default 3000). Env var: `ROLLCALL_PORT`.
    pub port: u16,
}

/// Remote endpoint and key, present only when both are configured.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub url: String,
    pub key: String,
}

impl AttendanceConfig {
    pub fn from_env() -> Self {
        Self {
            remote_url: non_empty_var("ROLLCALL_REMOTE_URL"),
            remote_key: non_empty_var("ROLLCALL_REMOTE_KEY"),
            data_dir: non_empty_var("ROLLCALL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".rollcall")),
            port: std::env::var("ROLLCALL_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    pub fn remote(&self) -> Option<RemoteSettings> {
        match (&self.remote_url, &self.remote_key) {
            (Some(url), Some(key)) => Some(RemoteSettings {
                url: url.clone(),
                key: key.clone(),
            }),
            _ => None,
        }
    }
}

impl RemoteSettings {
    /// Connection string with the access key applied as the password.
    ///
    /// URLs without an authority (e.g. `sqlite::memory:`) and URLs that
    /// already carry a password are returned unchanged.
    pub fn connection_url(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(mut parsed) if parsed.has_host() && parsed.password().is_none() => {
                match parsed.set_password(Some(&self.key)) {
                    Ok(()) => parsed.to_string(),
                    Err(()) => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
