use std::env;
use std::time::Duration;

/// データベース接続設定を管理する構造体
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// 設定エラー
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// 数値の環境変数を読み取る（未設定ならデフォルト値）
pub(crate) fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(format!("Invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    /// 環境変数から設定を読み取る
    /// 環境変数が設定されていない場合はデフォルト値を使用
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = parse_env::<u16>("DATABASE_PORT", 3306)?;
        let database = env::var("DATABASE_NAME").unwrap_or_else(|_| "greentrails_db".to_string());
        let username = env::var("DATABASE_USER").unwrap_or_else(|_| "greentrails".to_string());
        let password =
            env::var("DATABASE_PASSWORD").unwrap_or_else(|_| "greentrails_password".to_string());
        let max_connections = parse_env::<u32>("DATABASE_MAX_CONNECTIONS", 10)?;
        let acquire_timeout =
            Duration::from_secs(parse_env::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?);

        Ok(Self {
            host,
            port,
            database,
            username,
            password,
            max_connections,
            acquire_timeout,
        })
    }

    /// MySQL接続文字列を生成
    pub fn connection_string(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}
