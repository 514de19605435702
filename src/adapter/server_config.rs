use crate::adapter::database_config::{parse_env, ConfigError};
use std::env;

/// HTTPサーバー設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// 環境変数から設定を読み取る
    /// 未設定の場合は 0.0.0.0:3000
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env::<u16>("SERVER_PORT", 3000)?;
        Ok(Self { host, port })
    }

    /// バインドするアドレス
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
