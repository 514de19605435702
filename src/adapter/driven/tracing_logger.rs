use crate::domain::port::{LogLevel, Logger};
use std::collections::HashMap;
use uuid::Uuid;

/// tracingに転送するロガー
/// 出力先と書式はtracing-subscriberの設定に従う
#[derive(Debug, Clone, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// 新しいロガーを作成
    pub fn new() -> Self {
        Self
    }

    fn emit(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        let correlation_id = correlation_id.map(|id| id.to_string()).unwrap_or_default();
        let context = format_context(context);

        match level {
            LogLevel::Debug => {
                tracing::debug!(component, %correlation_id, context = %context, "{}", message)
            }
            LogLevel::Info => {
                tracing::info!(component, %correlation_id, context = %context, "{}", message)
            }
            LogLevel::Warning => {
                tracing::warn!(component, %correlation_id, context = %context, "{}", message)
            }
            LogLevel::Error => {
                tracing::error!(component, %correlation_id, context = %context, "{}", message)
            }
        }
    }
}

/// 追加コンテキストをキー順に `key=value` で連結する
fn format_context(context: Option<HashMap<String, String>>) -> String {
    let Some(context) = context else {
        return String::new();
    };

    let mut pairs: Vec<_> = context.into_iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Logger for TracingLogger {
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.emit(LogLevel::Debug, component, message, correlation_id, context);
    }

    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.emit(LogLevel::Info, component, message, correlation_id, context);
    }

    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.emit(LogLevel::Warning, component, message, correlation_id, context);
    }

    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        self.emit(LogLevel::Error, component, message, correlation_id, context);
    }
}
