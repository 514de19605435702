use crate::application::ApplicationError;
use crate::domain::model::{ActivityId, ActivitySlot, RoomId, RoomStay};
use crate::domain::port::{
    AccommodationOccupancy, BookingRepository, ResourceRepository, RoomCatalog,
};
use crate::domain::service::{AccommodationAvailability, AvailabilityCalculator};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 空き状況クエリサービス
/// 客室タイプ・宿泊施設・体験アクティビティの残り容量を提供する
pub struct AvailabilityQueryService {
    rooms: Arc<dyn ResourceRepository<RoomStay>>,
    activities: Arc<dyn ResourceRepository<ActivitySlot>>,
    room_availability: AvailabilityCalculator<RoomStay>,
    activity_availability: AvailabilityCalculator<ActivitySlot>,
    accommodation_availability: AccommodationAvailability,
}

impl AvailabilityQueryService {
    /// 新しい空き状況クエリサービスを作成
    ///
    /// # Arguments
    /// * `rooms` - 客室タイプリポジトリ
    /// * `room_catalog` - 宿泊施設ごとの客室カタログ
    /// * `activities` - アクティビティリポジトリ
    /// * `accommodation_bookings` - 宿泊予約リポジトリ
    /// * `activity_bookings` - アクティビティ予約リポジトリ
    /// * `occupancy` - 宿泊施設単位の占有集計
    pub fn new(
        rooms: Arc<dyn ResourceRepository<RoomStay>>,
        room_catalog: Arc<dyn RoomCatalog>,
        activities: Arc<dyn ResourceRepository<ActivitySlot>>,
        accommodation_bookings: Arc<dyn BookingRepository<RoomStay>>,
        activity_bookings: Arc<dyn BookingRepository<ActivitySlot>>,
        occupancy: Arc<dyn AccommodationOccupancy>,
    ) -> Self {
        Self {
            rooms,
            activities,
            room_availability: AvailabilityCalculator::new(accommodation_bookings),
            activity_availability: AvailabilityCalculator::new(activity_bookings),
            accommodation_availability: AccommodationAvailability::new(room_catalog, occupancy),
        }
    }

    /// 客室タイプの残り部屋数
    pub async fn room(
        &self,
        room_id: RoomId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, ApplicationError> {
        let room = self
            .rooms
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("客室が見つかりません: {}", room_id)))?;
        Ok(self
            .room_availability
            .remaining_capacity(&room, start, Some(end))
            .await?)
    }

    /// 宿泊施設全体の残り部屋数
    pub async fn accommodation(
        &self,
        accommodation_id: ActivityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64, ApplicationError> {
        let accommodation = self
            .activities
            .find_by_id(accommodation_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "宿泊施設が見つかりません: {}",
                    accommodation_id
                ))
            })?;
        Ok(self
            .accommodation_availability
            .remaining_capacity(&accommodation, start, end)
            .await?)
    }

    /// 体験アクティビティの指定日の残り参加枠
    pub async fn activity(
        &self,
        activity_id: ActivityId,
        date: DateTime<Utc>,
    ) -> Result<i64, ApplicationError> {
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!(
                    "アクティビティが見つかりません: {}",
                    activity_id
                ))
            })?;
        Ok(self
            .activity_availability
            .remaining_capacity(&activity, date, None)
            .await?)
    }
}
