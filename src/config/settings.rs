use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RelayError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub coze: CozeConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CozeConfig {
    pub api_key: String,
    pub bot_id: String,
    pub base_url: String,
    pub upload_path: String,
    pub chat_path: String,
    /// 客户端未携带 user 时使用的会话用户
    pub default_user_id: String,
}

impl Default for CozeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            bot_id: String::new(),
            base_url: "https://api.coze.cn".to_string(),
            upload_path: "/v1/files/upload".to_string(),
            chat_path: "/v3/chat".to_string(),
            default_user_id: "user_123".to_string(),
        }
    }
}

impl CozeConfig {
    pub fn upload_url(&self) -> String {
        join_url(&self.base_url, &self.upload_path)
    }

    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 前端静态页面目录；None 时不挂载静态文件
    pub static_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: Some("..".to_string()),
        }
    }
}

impl Settings {
    /// `.env` -> 可选的 TOML 配置文件 -> 环境变量覆盖
    pub fn load() -> Result<Self, RelayError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(RelayError::Config(format!("failed to read .env: {}", e)));
        }

        let mut settings = match Self::find_config_file() {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Settings::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;

        if settings.coze.api_key.trim().is_empty() {
            tracing::warn!("COZE_API_KEY is empty; upstream calls will fail authentication");
        }

        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, RelayError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| RelayError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("COZE_API_KEY") {
            self.coze.api_key = v;
        }
        if let Some(v) = non_empty("COZE_BOT_ID") {
            self.coze.bot_id = v;
        }
        if let Some(v) = non_empty("COZE_BASE_URL") {
            self.coze.base_url = v;
        }
        if let Some(v) = non_empty("HOST") {
            self.server.host = v;
        }
        if let Some(v) = non_empty("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .map_err(|_| RelayError::Config(format!("invalid PORT: {}", v)))?;
        }
        if let Some(v) = non_empty("STATIC_DIR") {
            self.server.static_dir = Some(v);
        }
        Ok(())
    }

    fn find_config_file() -> Option<&'static str> {
        ["custom-config.toml", "config.toml"]
            .into_iter()
            .find(|name| Path::new(name).exists())
    }
}
