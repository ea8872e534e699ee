use tether_core::{Result, TetherError};
use tether_store::UserConfig;

pub const API_URL_ENV: &str = "TETHER_API_URL";
pub const API_TOKEN_ENV: &str = "TETHER_API_TOKEN";

/// Address and bearer credential of the remote session service.
#[derive(Clone)]
pub struct RemoteConfig {
    pub api_url: String,
    pub api_token: String,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl RemoteConfig {
    /// Env vars win over `api_url` / `api_token` in the user config.
    /// Either one missing is `ConfigMissing`.
    pub fn resolve(user: &UserConfig) -> Result<Self> {
        Self::resolve_with(user, |key| std::env::var(key).ok())
    }

    fn resolve_with(user: &UserConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |env_key: &str, cfg_key: &str| {
            env(env_key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| user.get_str(cfg_key))
                .map(|v| v.trim().to_string())
        };
        let api_url = pick(API_URL_ENV, "api_url").ok_or_else(|| {
            TetherError::ConfigMissing(format!("set {API_URL_ENV} or `tether config set api_url`"))
        })?;
        let api_token = pick(API_TOKEN_ENV, "api_token").ok_or_else(|| {
            TetherError::ConfigMissing(format!(
                "set {API_TOKEN_ENV} or `tether config set api_token`"
            ))
        })?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
