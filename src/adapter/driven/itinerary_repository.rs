use crate::adapter::driven::row_decode::{column, decode_failure, identifier, money, query_failure};
use crate::domain::model::{Itinerary, ItineraryId, ItineraryStatus, UserId};
use crate::domain::port::{ItineraryRepository, RepositoryError};
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool};

const SELECT_ITINERARY: &str = r#"
    SELECT id, visitor_id, total_amount, total_currency, status
    FROM itineraries
"#;

/// MySQL旅程リポジトリ
pub struct MySqlItineraryRepository {
    pool: Pool<MySql>,
}

impl MySqlItineraryRepository {
    /// 新しいMySQL旅程リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_itinerary(row: &MySqlRow) -> Result<Itinerary, RepositoryError> {
        let id = identifier(row, "id", ItineraryId::from_string)?;
        let visitor = identifier(row, "visitor_id", UserId::from_string)?;
        let total = money(row, "total_amount", "total_currency")?;
        let status = ItineraryStatus::from_string(&column::<String>(row, "status")?)
            .map_err(decode_failure("旅程ステータス"))?;

        Ok(Itinerary::reconstruct(id, visitor, total, status))
    }
}

#[async_trait]
impl ItineraryRepository for MySqlItineraryRepository {
    async fn save(&self, itinerary: &Itinerary) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO itineraries (id, visitor_id, total_amount, total_currency, status)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                total_amount = VALUES(total_amount),
                total_currency = VALUES(total_currency),
                status = VALUES(status)
            "#,
        )
        .bind(itinerary.id().to_string())
        .bind(itinerary.visitor().to_string())
        .bind(itinerary.total().amount())
        .bind(itinerary.total().currency())
        .bind(itinerary.status().to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failure("旅程の保存"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: ItineraryId) -> Result<Option<Itinerary>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ITINERARY))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failure("旅程の取得"))?;

        row.as_ref().map(Self::build_itinerary).transpose()
    }

    async fn find_by_visitor(&self, visitor: UserId) -> Result<Vec<Itinerary>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE visitor_id = ? ORDER BY created_at DESC",
            SELECT_ITINERARY
        ))
        .bind(visitor.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failure("訪問者の旅程の取得"))?;

        rows.iter().map(Self::build_itinerary).collect()
    }

    async fn delete(&self, id: ItineraryId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM itineraries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failure("旅程の削除"))?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        // 自動コミットのため保留中の書き込みはない
        Ok(())
    }

    fn next_identity(&self) -> ItineraryId {
        ItineraryId::new()
    }
}
