use crate::domain::error::DomainError;
use crate::domain::model::{
    Activity, BookableResource, BookingId, BookingKind, StayPeriod,
};
use crate::domain::port::{AccommodationOccupancy, BookingRepository, RoomCatalog};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 空き状況計算（客室タイプ・体験アクティビティ単位）
/// 読み取り専用の集計のみを行う。書き込み直前に再度呼び出すこと
pub struct AvailabilityCalculator<K: BookingKind> {
    booking_repository: Arc<dyn BookingRepository<K>>,
}

impl<K: BookingKind> Clone for AvailabilityCalculator<K> {
    fn clone(&self) -> Self {
        Self {
            booking_repository: self.booking_repository.clone(),
        }
    }
}

impl<K: BookingKind> AvailabilityCalculator<K> {
    /// 新しい空き状況計算を作成
    ///
    /// # Arguments
    /// * `booking_repository` - 占有数量の集計元となる予約リポジトリ
    pub fn new(booking_repository: Arc<dyn BookingRepository<K>>) -> Self {
        Self { booking_repository }
    }

    /// 残りの容量を計算する
    /// 結果は負になりうる（呼び出し側は0以下を満室として扱う）
    ///
    /// # Arguments
    /// * `resource` - 客室タイプまたは体験アクティビティ
    /// * `start` - 照会開始日時
    /// * `end` - 照会終了日時
    ///
    /// # Returns
    /// * `Ok(i64)` - 総容量 − 占有数量
    /// * `Err(DomainError)` - 種別不正、期間不正、集計失敗
    pub async fn remaining_capacity(
        &self,
        resource: &K::Resource,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<i64, DomainError> {
        K::ensure_bookable(resource)?;
        let period = StayPeriod::new(start, end)?;
        self.remaining_capacity_excluding(resource, &period, None)
            .await
    }

    /// 指定した予約を除外して残りの容量を計算する
    /// 未確定の予約を確定する際、その予約自身を占有に数えないために使う
    pub async fn remaining_capacity_excluding(
        &self,
        resource: &K::Resource,
        period: &StayPeriod,
        excluding: Option<BookingId>,
    ) -> Result<i64, DomainError> {
        let occupied = self
            .booking_repository
            .occupied_units(resource.id(), period, excluding)
            .await
            .map_err(|e| DomainError::Persistence(format!("占有数量の集計に失敗: {}", e)))?;

        Ok(i64::from(resource.capacity()) - i64::from(occupied))
    }
}

/// 空き状況計算（宿泊施設単位）
/// 施設内の全客室タイプの部屋数合計から、施設全体の占有部屋数を差し引く
pub struct AccommodationAvailability {
    room_catalog: Arc<dyn RoomCatalog>,
    occupancy: Arc<dyn AccommodationOccupancy>,
}

impl AccommodationAvailability {
    /// 新しい宿泊施設の空き状況計算を作成
    ///
    /// # Arguments
    /// * `room_catalog` - 客室カタログ
    /// * `occupancy` - 宿泊施設単位の占有集計
    pub fn new(
        room_catalog: Arc<dyn RoomCatalog>,
        occupancy: Arc<dyn AccommodationOccupancy>,
    ) -> Self {
        Self {
            room_catalog,
            occupancy,
        }
    }

    /// 宿泊施設の残り部屋数を計算する
    ///
    /// # Arguments
    /// * `accommodation` - 宿泊施設として登録されたアクティビティ
    /// * `start` - 照会開始日時
    /// * `end` - 照会終了日時
    ///
    /// # Returns
    /// * `Ok(i64)` - 部屋数合計 − 占有部屋数
    /// * `Err(DomainError)` - 体験アクティビティが渡された、期間不正、集計失敗
    pub async fn remaining_capacity(
        &self,
        accommodation: &Activity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, DomainError> {
        if !accommodation.is_accommodation() {
            return Err(DomainError::InvalidResourceKind(format!(
                "アクティビティは宿泊施設ではありません: {}",
                accommodation.id()
            )));
        }
        let period = StayPeriod::new(start, Some(end))?;

        let rooms = self
            .room_catalog
            .find_by_accommodation(accommodation.id())
            .await
            .map_err(|e| DomainError::Persistence(format!("客室の取得に失敗: {}", e)))?;
        let total: i64 = rooms.iter().map(|room| i64::from(room.capacity())).sum();

        // 客室ごとではなく施設全体を一度に集計
        let occupied = self
            .occupancy
            .occupied_rooms(accommodation.id(), &period)
            .await
            .map_err(|e| DomainError::Persistence(format!("占有部屋数の集計に失敗: {}", e)))?;

        Ok(total - i64::from(occupied))
    }
}
