use crate::domain::error::DomainError;
use crate::domain::model::{
    ActivitySlot, BookingKind, Itinerary, ItineraryId, Money, RoomStay,
};
use crate::domain::port::{BookingRepository, ItineraryRepository};
use crate::domain::service::KeyedLock;
use std::sync::Arc;

/// 旅程合計の照合結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalCheck {
    /// 旅程に保存されている累積値
    pub stored: Money,
    /// 合計対象の予約から再計算した値
    pub computed: Money,
}

impl TotalCheck {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.computed
    }
}

/// 旅程合計の集約
/// 予約の作成・確定・削除に合わせて合計を加減算する。全予約からの再計算は行わない
pub struct ItineraryAggregator {
    itinerary_repository: Arc<dyn ItineraryRepository>,
    accommodation_bookings: Arc<dyn BookingRepository<RoomStay>>,
    activity_bookings: Arc<dyn BookingRepository<ActivitySlot>>,
    locks: KeyedLock,
}

impl ItineraryAggregator {
    /// 新しい旅程合計の集約を作成
    ///
    /// # Arguments
    /// * `itinerary_repository` - 旅程リポジトリ
    /// * `accommodation_bookings` - 宿泊予約リポジトリ（削除の連鎖と照合に使用）
    /// * `activity_bookings` - アクティビティ予約リポジトリ（削除の連鎖と照合に使用）
    pub fn new(
        itinerary_repository: Arc<dyn ItineraryRepository>,
        accommodation_bookings: Arc<dyn BookingRepository<RoomStay>>,
        activity_bookings: Arc<dyn BookingRepository<ActivitySlot>>,
    ) -> Self {
        Self {
            itinerary_repository,
            accommodation_bookings,
            activity_bookings,
            locks: KeyedLock::new(),
        }
    }

    /// 旅程の合計に加算して保存する
    ///
    /// # Arguments
    /// * `itinerary_id` - 旅程ID
    /// * `amount` - 加算する金額
    ///
    /// # Returns
    /// * `Ok(Itinerary)` - 更新後の旅程
    /// * `Err(DomainError)` - 旅程が存在しない、保存失敗
    pub async fn add(
        &self,
        itinerary_id: ItineraryId,
        amount: Money,
    ) -> Result<Itinerary, DomainError> {
        self.adjust(itinerary_id, |itinerary| itinerary.add_to_total(amount))
            .await
    }

    /// 旅程の合計から減算して保存する
    ///
    /// # Arguments
    /// * `itinerary_id` - 旅程ID
    /// * `amount` - 減算する金額
    ///
    /// # Returns
    /// * `Ok(Itinerary)` - 更新後の旅程
    /// * `Err(DomainError)` - 旅程が存在しない、保存失敗
    pub async fn subtract(
        &self,
        itinerary_id: ItineraryId,
        amount: Money,
    ) -> Result<Itinerary, DomainError> {
        self.adjust(itinerary_id, |itinerary| itinerary.subtract_from_total(amount))
            .await
    }

    // 旅程ごとに読み込み・更新・保存を直列化
    async fn adjust<F>(&self, itinerary_id: ItineraryId, apply: F) -> Result<Itinerary, DomainError>
    where
        F: FnOnce(&mut Itinerary) -> Result<(), DomainError> + Send,
    {
        let _guard = self.locks.acquire(&itinerary_id.to_string()).await;

        let mut itinerary = self
            .itinerary_repository
            .find_by_id(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程の取得に失敗: {}", e)))?
            .ok_or_else(|| {
                DomainError::NotFound(format!("旅程が見つかりません: {}", itinerary_id))
            })?;

        apply(&mut itinerary)?;

        self.itinerary_repository
            .save(&itinerary)
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程の保存に失敗: {}", e)))?;

        Ok(itinerary)
    }

    /// 旅程を削除する
    /// 宿泊予約・アクティビティ予約を一括削除してから旅程を削除し、
    /// 旅程が存在しなくなったことを確認する
    ///
    /// # Returns
    /// * `Ok(true)` - 削除された
    /// * `Ok(false)` - 削除後も旅程が残っている
    /// * `Err(DomainError)` - 削除処理の失敗
    pub async fn delete_cascade(&self, itinerary_id: ItineraryId) -> Result<bool, DomainError> {
        let _guard = self.locks.acquire(&itinerary_id.to_string()).await;

        Self::delete_bookings(self.accommodation_bookings.as_ref(), itinerary_id).await?;
        Self::delete_bookings(self.activity_bookings.as_ref(), itinerary_id).await?;

        self.itinerary_repository
            .delete(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程の削除に失敗: {}", e)))?;
        self.itinerary_repository
            .flush()
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程削除の反映に失敗: {}", e)))?;

        let remaining = self
            .itinerary_repository
            .find_by_id(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程の取得に失敗: {}", e)))?;

        Ok(remaining.is_none())
    }

    async fn delete_bookings<K: BookingKind>(
        repository: &dyn BookingRepository<K>,
        itinerary_id: ItineraryId,
    ) -> Result<(), DomainError> {
        repository
            .delete_all_by_itinerary(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("{}予約の一括削除に失敗: {}", K::NAME, e)))?;
        repository
            .flush()
            .await
            .map_err(|e| DomainError::Persistence(format!("{}予約削除の反映に失敗: {}", K::NAME, e)))
    }

    /// 保存されている合計と、合計対象の予約から再計算した値を比較する
    /// 保存値は書き換えない
    ///
    /// # Returns
    /// * `Ok(Some(TotalCheck))` - 照合結果
    /// * `Ok(None)` - 旅程が存在しない
    pub async fn check_total(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<Option<TotalCheck>, DomainError> {
        let itinerary = match self
            .itinerary_repository
            .find_by_id(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("旅程の取得に失敗: {}", e)))?
        {
            Some(itinerary) => itinerary,
            None => return Ok(None),
        };

        let stays = Self::counted_sum(self.accommodation_bookings.as_ref(), itinerary_id).await?;
        let activities = Self::counted_sum(self.activity_bookings.as_ref(), itinerary_id).await?;

        Ok(Some(TotalCheck {
            stored: itinerary.total(),
            computed: stays.add(&activities)?,
        }))
    }

    async fn counted_sum<K: BookingKind>(
        repository: &dyn BookingRepository<K>,
        itinerary_id: ItineraryId,
    ) -> Result<Money, DomainError> {
        let bookings = repository
            .find_by_itinerary(itinerary_id)
            .await
            .map_err(|e| DomainError::Persistence(format!("{}予約の取得に失敗: {}", K::NAME, e)))?;

        bookings
            .iter()
            .filter(|booking| booking.counts_toward_total())
            .try_fold(Money::zero(), |sum, booking| sum.add(&booking.price()))
    }
}
