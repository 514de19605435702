// MySQLの行からドメインの値へ変換する共通処理

use crate::adapter::database_error::DatabaseError;
use crate::domain::error::DomainError;
use crate::domain::model::Money;
use crate::domain::port::RepositoryError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::Row;

/// 列の値を取得する
pub(super) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get::<T, _>(name)
        .map_err(|e| DatabaseError::DecodeError(format!("列 {} の取得に失敗しました: {}", name, e)))
        .map_err(RepositoryError::from)
}

/// UUID文字列の列から識別子を復元する
pub(super) fn identifier<T>(
    row: &MySqlRow,
    name: &str,
    parse: fn(&str) -> Result<T, uuid::Error>,
) -> Result<T, RepositoryError> {
    let raw: String = column(row, name)?;
    parse(&raw)
        .map_err(|e| DatabaseError::DecodeError(format!("{} の解析に失敗しました: {}", name, e)))
        .map_err(RepositoryError::from)
}

/// 金額と通貨の列から金額を復元する
pub(super) fn money(
    row: &MySqlRow,
    amount_column: &str,
    currency_column: &str,
) -> Result<Money, RepositoryError> {
    let amount: i64 = column(row, amount_column)?;
    let currency: String = column(row, currency_column)?;
    Money::new(amount, currency)
        .map_err(|e| DatabaseError::DecodeError(format!("金額の構築に失敗しました: {}", e)))
        .map_err(RepositoryError::from)
}

/// DATETIME列（UTCで保存）から日時を復元する
pub(super) fn utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

/// ドメインの解析エラーを取得失敗に変換する
pub(super) fn decode_failure(what: &str) -> impl Fn(DomainError) -> RepositoryError + '_ {
    move |e| {
        RepositoryError::from(DatabaseError::DecodeError(format!(
            "{}の解析に失敗しました: {}",
            what, e
        )))
    }
}

/// sqlxのエラーをクエリ失敗に変換する
pub(super) fn query_failure(action: &str) -> impl Fn(sqlx::Error) -> RepositoryError + '_ {
    move |e| {
        RepositoryError::from(DatabaseError::QueryError(format!(
            "{}に失敗しました: {}",
            action, e
        )))
    }
}
