use crate::application::service::access::ensure_owner_or_admin;
use crate::application::ApplicationError;
use crate::domain::model::{
    BookableResource, Booking, BookingId, BookingKind, BookingStatus, Caller, ItineraryId,
};
use crate::domain::port::{BookingRepository, ItineraryRepository, ResourceRepository};
use std::sync::Arc;

/// 予約クエリサービス
/// 読み取り専用の予約操作を提供する
pub struct BookingQueryService<K: BookingKind> {
    booking_repository: Arc<dyn BookingRepository<K>>,
    resource_repository: Arc<dyn ResourceRepository<K>>,
    itinerary_repository: Arc<dyn ItineraryRepository>,
}

impl<K: BookingKind> BookingQueryService<K> {
    /// 新しい予約クエリサービスを作成
    pub fn new(
        booking_repository: Arc<dyn BookingRepository<K>>,
        resource_repository: Arc<dyn ResourceRepository<K>>,
        itinerary_repository: Arc<dyn ItineraryRepository>,
    ) -> Self {
        Self {
            booking_repository,
            resource_repository,
            itinerary_repository,
        }
    }

    /// 予約IDで予約を取得
    /// 旅程の所有者または管理者のみ
    ///
    /// # Returns
    /// * `Ok(Booking)` - 予約が見つかった
    /// * `Err(ApplicationError)` - 見つからない、権限がない、取得失敗
    pub async fn find_by_id(
        &self,
        caller: &Caller,
        id: BookingId,
    ) -> Result<Booking<K>, ApplicationError> {
        let booking = self
            .booking_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("予約が見つかりません: {}", id)))?;
        self.ensure_itinerary_access(caller, booking.itinerary_id())
            .await?;
        Ok(booking)
    }

    /// 旅程に含まれる予約を取得
    /// 旅程の所有者または管理者のみ
    pub async fn list_by_itinerary(
        &self,
        caller: &Caller,
        itinerary_id: ItineraryId,
    ) -> Result<Vec<Booking<K>>, ApplicationError> {
        self.ensure_itinerary_access(caller, itinerary_id).await?;
        self.booking_repository
            .find_by_itinerary(itinerary_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 指定されたステータスの予約を取得
    /// 管理者のみ
    pub async fn list_by_status(
        &self,
        caller: &Caller,
        status: BookingStatus,
    ) -> Result<Vec<Booking<K>>, ApplicationError> {
        if !caller.is_administrator() {
            return Err(ApplicationError::Forbidden(
                "ステータス別の一覧は管理者のみ参照できます".to_string(),
            ));
        }
        self.booking_repository
            .find_by_status(status)
            .await
            .map_err(ApplicationError::from)
    }

    /// 予約対象に入っている予約を取得
    /// 予約対象の管理者または管理者ロールのみ
    pub async fn list_for_resource(
        &self,
        caller: &Caller,
        resource_id: K::ResourceId,
    ) -> Result<Vec<Booking<K>>, ApplicationError> {
        let resource = self
            .resource_repository
            .find_by_id(resource_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約対象が見つかりません: {}", resource_id))
            })?;
        if resource.manager() != caller.user_id() && !caller.is_administrator() {
            return Err(ApplicationError::Forbidden(format!(
                "予約対象の管理者ではありません: {}",
                resource_id
            )));
        }
        self.booking_repository
            .find_by_resource(resource_id)
            .await
            .map_err(ApplicationError::from)
    }

    async fn ensure_itinerary_access(
        &self,
        caller: &Caller,
        itinerary_id: ItineraryId,
    ) -> Result<(), ApplicationError> {
        let itinerary = self
            .itinerary_repository
            .find_by_id(itinerary_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("旅程が見つかりません: {}", itinerary_id))
            })?;
        ensure_owner_or_admin(caller, &itinerary)
    }
}
