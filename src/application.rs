// アプリケーション層
// ユースケースごとのサービスと、その失敗を表すエラー型

pub mod error;
pub mod service;

pub use error::ApplicationError;
