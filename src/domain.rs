// ドメイン層
// モデル、エラー、出力ポート、ドメインサービス

pub mod error;
pub mod model;
pub mod port;
pub mod service;
