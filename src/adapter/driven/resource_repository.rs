use crate::adapter::driven::row_decode::{column, decode_failure, identifier, money, query_failure};
use crate::domain::model::{
    Activity, ActivityCategory, ActivityId, ActivitySlot, Room, RoomId, RoomStay, UserId,
};
use crate::domain::port::{RepositoryError, ResourceRepository, RoomCatalog};
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool};

const SELECT_ROOM: &str = r#"
    SELECT id, accommodation_id, manager_id, room_type,
           unit_price_amount, unit_price_currency, availability, guests_per_room
    FROM rooms
"#;

const SELECT_ACTIVITY: &str = r#"
    SELECT id, manager_id, name, category,
           unit_price_amount, unit_price_currency, availability
    FROM activities
"#;

/// MySQL客室タイプリポジトリ
pub struct MySqlRoomRepository {
    pool: Pool<MySql>,
}

impl MySqlRoomRepository {
    /// 新しいMySQL客室タイプリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_room(row: &MySqlRow) -> Result<Room, RepositoryError> {
        let accommodation = column::<Option<String>>(row, "accommodation_id")?
            .map(|raw| ActivityId::from_string(&raw))
            .transpose()
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("宿泊施設IDの解析に失敗しました: {}", e))
            })?;

        Ok(Room::new(
            identifier(row, "id", RoomId::from_string)?,
            accommodation,
            identifier(row, "manager_id", UserId::from_string)?,
            column(row, "room_type")?,
            money(row, "unit_price_amount", "unit_price_currency")?,
            column(row, "availability")?,
            column(row, "guests_per_room")?,
        ))
    }
}

#[async_trait]
impl ResourceRepository<RoomStay> for MySqlRoomRepository {
    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ROOM))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failure("客室の取得"))?;

        row.as_ref().map(Self::build_room).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(&format!("{} ORDER BY room_type", SELECT_ROOM))
            .fetch_all(&self.pool)
            .await
            .map_err(query_failure("客室一覧の取得"))?;

        rows.iter().map(Self::build_room).collect()
    }
}

#[async_trait]
impl RoomCatalog for MySqlRoomRepository {
    async fn find_by_accommodation(
        &self,
        accommodation: ActivityId,
    ) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(&format!("{} WHERE accommodation_id = ?", SELECT_ROOM))
            .bind(accommodation.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_failure("宿泊施設の客室の取得"))?;

        rows.iter().map(Self::build_room).collect()
    }
}

/// MySQLアクティビティリポジトリ
/// 宿泊施設と体験アクティビティの両方を扱う
pub struct MySqlActivityRepository {
    pool: Pool<MySql>,
}

impl MySqlActivityRepository {
    /// 新しいMySQLアクティビティリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_activity(row: &MySqlRow) -> Result<Activity, RepositoryError> {
        let category = ActivityCategory::from_string(&column::<String>(row, "category")?)
            .map_err(decode_failure("アクティビティ分類"))?;

        Ok(Activity::new(
            identifier(row, "id", ActivityId::from_string)?,
            identifier(row, "manager_id", UserId::from_string)?,
            column(row, "name")?,
            category,
            money(row, "unit_price_amount", "unit_price_currency")?,
            column(row, "availability")?,
        ))
    }
}

#[async_trait]
impl ResourceRepository<ActivitySlot> for MySqlActivityRepository {
    async fn find_by_id(&self, id: ActivityId) -> Result<Option<Activity>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ACTIVITY))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failure("アクティビティの取得"))?;

        row.as_ref().map(Self::build_activity).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Activity>, RepositoryError> {
        let rows = sqlx::query(&format!("{} ORDER BY name", SELECT_ACTIVITY))
            .fetch_all(&self.pool)
            .await
            .map_err(query_failure("アクティビティ一覧の取得"))?;

        rows.iter().map(Self::build_activity).collect()
    }
}
