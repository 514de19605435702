use crate::adapter::driven::row_decode::{
    column, decode_failure, identifier, money, query_failure, utc,
};
use crate::domain::model::{
    AccommodationBooking, ActivityBooking, ActivityId, ActivitySlot, BookingId, BookingStatus,
    BookingTerms, ItineraryId, Party, PaymentStatus, RoomId, RoomStay, StayPeriod,
};
use crate::domain::port::{AccommodationOccupancy, BookingRepository, RepositoryError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Pool};

const SELECT_ACCOMMODATION_BOOKING: &str = r#"
    SELECT id, room_id, itinerary_id, start_at, end_at, adults, children, rooms,
           price_amount, price_currency, status, payment_status
    FROM accommodation_bookings
"#;

const SELECT_ACTIVITY_BOOKING: &str = r#"
    SELECT id, activity_id, itinerary_id, start_at, end_at, adults, children,
           price_amount, price_currency, status, payment_status
    FROM activity_bookings
"#;

// 予約に共通する列（ステータス・人数・期間）を復元
fn decode_statuses(row: &MySqlRow) -> Result<(BookingStatus, PaymentStatus), RepositoryError> {
    let status = BookingStatus::from_string(&column::<String>(row, "status")?)
        .map_err(decode_failure("予約ステータス"))?;
    let payment_status = PaymentStatus::from_string(&column::<String>(row, "payment_status")?)
        .map_err(decode_failure("支払いステータス"))?;
    Ok((status, payment_status))
}

fn decode_terms(row: &MySqlRow, rooms: Option<u32>) -> Result<BookingTerms, RepositoryError> {
    let start = utc(column::<NaiveDateTime>(row, "start_at")?);
    let end = column::<Option<NaiveDateTime>>(row, "end_at")?.map(utc);
    let period = StayPeriod::new(start, end).map_err(decode_failure("予約期間"))?;
    let party = Party::new(column(row, "adults")?, Some(column(row, "children")?))
        .map_err(decode_failure("人数"))?;
    Ok(BookingTerms::new(period, party, rooms))
}

/// MySQL宿泊予約リポジトリ
pub struct MySqlAccommodationBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlAccommodationBookingRepository {
    /// 新しいMySQL宿泊予約リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_booking(row: &MySqlRow) -> Result<AccommodationBooking, RepositoryError> {
        let (status, payment_status) = decode_statuses(row)?;
        Ok(AccommodationBooking::reconstruct(
            identifier(row, "id", BookingId::from_string)?,
            identifier(row, "room_id", RoomId::from_string)?,
            identifier(row, "itinerary_id", ItineraryId::from_string)?,
            decode_terms(row, Some(column(row, "rooms")?))?,
            money(row, "price_amount", "price_currency")?,
            status,
            payment_status,
        ))
    }

    async fn fetch_where(
        &self,
        condition: &str,
        value: String,
        action: &str,
    ) -> Result<Vec<AccommodationBooking>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE {} ORDER BY start_at",
            SELECT_ACCOMMODATION_BOOKING, condition
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failure(action))?;

        rows.iter().map(Self::build_booking).collect()
    }
}

#[async_trait]
impl BookingRepository<RoomStay> for MySqlAccommodationBookingRepository {
    async fn save(&self, booking: &AccommodationBooking) -> Result<(), RepositoryError> {
        let terms = booking.terms();
        sqlx::query(
            r#"
            INSERT INTO accommodation_bookings
                (id, room_id, itinerary_id, start_at, end_at, adults, children, rooms,
                 price_amount, price_currency, status, payment_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                start_at = VALUES(start_at),
                end_at = VALUES(end_at),
                adults = VALUES(adults),
                children = VALUES(children),
                rooms = VALUES(rooms),
                price_amount = VALUES(price_amount),
                price_currency = VALUES(price_currency),
                status = VALUES(status),
                payment_status = VALUES(payment_status)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.resource_id().to_string())
        .bind(booking.itinerary_id().to_string())
        .bind(terms.period().start().naive_utc())
        .bind(terms.period().end().map(|end| end.naive_utc()))
        .bind(terms.party().adults())
        .bind(terms.party().children())
        .bind(booking.quantity())
        .bind(booking.price().amount())
        .bind(booking.price().currency())
        .bind(booking.status().to_string())
        .bind(booking.payment_status().to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failure("宿泊予約の保存"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<AccommodationBooking>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ACCOMMODATION_BOOKING))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failure("宿泊予約の取得"))?;

        row.as_ref().map(Self::build_booking).transpose()
    }

    async fn find_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<Vec<AccommodationBooking>, RepositoryError> {
        self.fetch_where("itinerary_id = ?", itinerary_id.to_string(), "旅程の宿泊予約の取得")
            .await
    }

    async fn find_by_resource(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<AccommodationBooking>, RepositoryError> {
        self.fetch_where("room_id = ?", room_id.to_string(), "客室の宿泊予約の取得")
            .await
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<AccommodationBooking>, RepositoryError> {
        self.fetch_where("status = ?", status.to_string(), "ステータス別の宿泊予約の取得")
            .await
    }

    async fn delete(&self, id: BookingId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM accommodation_bookings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failure("宿泊予約の削除"))?;
        Ok(())
    }

    async fn delete_all_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM accommodation_bookings WHERE itinerary_id = ?")
            .bind(itinerary_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failure("旅程の宿泊予約の一括削除"))?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        // 自動コミットのため保留中の書き込みはない
        Ok(())
    }

    async fn occupied_units(
        &self,
        room_id: RoomId,
        period: &StayPeriod,
        excluding: Option<BookingId>,
    ) -> Result<u32, RepositoryError> {
        let end = period.end().unwrap_or(period.start());
        let excluded = excluding.map(|id| id.to_string());

        // 半開区間 [start, end) が重なる予約の部屋数
        let occupied: i64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(rooms), 0) AS SIGNED)
            FROM accommodation_bookings
            WHERE room_id = ?
              AND start_at < ?
              AND end_at > ?
              AND (? IS NULL OR id <> ?)
            "#,
        )
        .bind(room_id.to_string())
        .bind(end.naive_utc())
        .bind(period.start().naive_utc())
        .bind(excluded.clone())
        .bind(excluded)
        .fetch_one(&self.pool)
        .await
        .map_err(query_failure("客室の占有部屋数の集計"))?;

        Ok(u32::try_from(occupied).unwrap_or(0))
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

#[async_trait]
impl AccommodationOccupancy for MySqlAccommodationBookingRepository {
    async fn occupied_rooms(
        &self,
        accommodation: ActivityId,
        period: &StayPeriod,
    ) -> Result<u32, RepositoryError> {
        let end = period.end().unwrap_or(period.start());

        // 施設内の全客室を一度に集計
        let occupied: i64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(b.rooms), 0) AS SIGNED)
            FROM accommodation_bookings b
            JOIN rooms r ON r.id = b.room_id
            WHERE r.accommodation_id = ?
              AND b.start_at < ?
              AND b.end_at > ?
            "#,
        )
        .bind(accommodation.to_string())
        .bind(end.naive_utc())
        .bind(period.start().naive_utc())
        .fetch_one(&self.pool)
        .await
        .map_err(query_failure("宿泊施設の占有部屋数の集計"))?;

        Ok(u32::try_from(occupied).unwrap_or(0))
    }
}

/// MySQLアクティビティ予約リポジトリ
pub struct MySqlActivityBookingRepository {
    pool: Pool<MySql>,
}

impl MySqlActivityBookingRepository {
    /// 新しいMySQLアクティビティ予約リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_booking(row: &MySqlRow) -> Result<ActivityBooking, RepositoryError> {
        let (status, payment_status) = decode_statuses(row)?;
        Ok(ActivityBooking::reconstruct(
            identifier(row, "id", BookingId::from_string)?,
            identifier(row, "activity_id", ActivityId::from_string)?,
            identifier(row, "itinerary_id", ItineraryId::from_string)?,
            decode_terms(row, None)?,
            money(row, "price_amount", "price_currency")?,
            status,
            payment_status,
        ))
    }

    async fn fetch_where(
        &self,
        condition: &str,
        value: String,
        action: &str,
    ) -> Result<Vec<ActivityBooking>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE {} ORDER BY start_at",
            SELECT_ACTIVITY_BOOKING, condition
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failure(action))?;

        rows.iter().map(Self::build_booking).collect()
    }
}

#[async_trait]
impl BookingRepository<ActivitySlot> for MySqlActivityBookingRepository {
    async fn save(&self, booking: &ActivityBooking) -> Result<(), RepositoryError> {
        let terms = booking.terms();
        sqlx::query(
            r#"
            INSERT INTO activity_bookings
                (id, activity_id, itinerary_id, start_at, end_at, adults, children,
                 price_amount, price_currency, status, payment_status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                start_at = VALUES(start_at),
                end_at = VALUES(end_at),
                adults = VALUES(adults),
                children = VALUES(children),
                price_amount = VALUES(price_amount),
                price_currency = VALUES(price_currency),
                status = VALUES(status),
                payment_status = VALUES(payment_status)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.resource_id().to_string())
        .bind(booking.itinerary_id().to_string())
        .bind(terms.period().start().naive_utc())
        .bind(terms.period().end().map(|end| end.naive_utc()))
        .bind(terms.party().adults())
        .bind(terms.party().children())
        .bind(booking.price().amount())
        .bind(booking.price().currency())
        .bind(booking.status().to_string())
        .bind(booking.payment_status().to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failure("アクティビティ予約の保存"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<ActivityBooking>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_ACTIVITY_BOOKING))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failure("アクティビティ予約の取得"))?;

        row.as_ref().map(Self::build_booking).transpose()
    }

    async fn find_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<Vec<ActivityBooking>, RepositoryError> {
        self.fetch_where(
            "itinerary_id = ?",
            itinerary_id.to_string(),
            "旅程のアクティビティ予約の取得",
        )
        .await
    }

    async fn find_by_resource(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<ActivityBooking>, RepositoryError> {
        self.fetch_where(
            "activity_id = ?",
            activity_id.to_string(),
            "アクティビティの予約の取得",
        )
        .await
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<ActivityBooking>, RepositoryError> {
        self.fetch_where(
            "status = ?",
            status.to_string(),
            "ステータス別のアクティビティ予約の取得",
        )
        .await
    }

    async fn delete(&self, id: BookingId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM activity_bookings WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failure("アクティビティ予約の削除"))?;
        Ok(())
    }

    async fn delete_all_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM activity_bookings WHERE itinerary_id = ?")
            .bind(itinerary_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failure("旅程のアクティビティ予約の一括削除"))?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn occupied_units(
        &self,
        activity_id: ActivityId,
        period: &StayPeriod,
        excluding: Option<BookingId>,
    ) -> Result<u32, RepositoryError> {
        let excluded = excluding.map(|id| id.to_string());

        // 開始日（UTC）が同じ予約の参加人数
        let occupied: i64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(adults + children), 0) AS SIGNED)
            FROM activity_bookings
            WHERE activity_id = ?
              AND DATE(start_at) = DATE(?)
              AND (? IS NULL OR id <> ?)
            "#,
        )
        .bind(activity_id.to_string())
        .bind(period.start().naive_utc())
        .bind(excluded.clone())
        .bind(excluded)
        .fetch_one(&self.pool)
        .await
        .map_err(query_failure("アクティビティの参加人数の集計"))?;

        Ok(u32::try_from(occupied).unwrap_or(0))
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}
