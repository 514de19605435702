use crate::application::service::access::ensure_owner;
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    BookableResource, Booking, BookingDraft, BookingId, BookingKind, BookingTerms, Caller,
    Itinerary, ItineraryId, Money,
};
use crate::domain::port::{BookingRepository, ItineraryRepository, Logger, ResourceRepository};
use crate::domain::service::{AvailabilityCalculator, ItineraryAggregator, KeyedLock, PricingEngine};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const COMPONENT: &str = "BookingLifecycleManager";

/// 予約作成リクエスト
#[derive(Debug, Clone)]
pub struct BookingRequest<K: BookingKind> {
    pub itinerary_id: ItineraryId,
    pub resource_id: K::ResourceId,
    pub draft: BookingDraft,
}

/// 予約ライフサイクル管理
/// 宿泊予約とアクティビティ予約で共通の作成・確定・削除を行う
///
/// 空き状況の確認から予約の保存、旅程合計の更新までは予約対象ごとのロック内で実行する
pub struct BookingLifecycleManager<K: BookingKind> {
    booking_repository: Arc<dyn BookingRepository<K>>,
    resource_repository: Arc<dyn ResourceRepository<K>>,
    itinerary_repository: Arc<dyn ItineraryRepository>,
    availability: AvailabilityCalculator<K>,
    aggregator: Arc<ItineraryAggregator>,
    resource_locks: KeyedLock,
    logger: Arc<dyn Logger>,
}

impl<K: BookingKind> BookingLifecycleManager<K> {
    /// 新しい予約ライフサイクル管理を作成
    ///
    /// # Arguments
    /// * `booking_repository` - 予約リポジトリ
    /// * `resource_repository` - 予約対象リポジトリ
    /// * `itinerary_repository` - 旅程リポジトリ
    /// * `aggregator` - 旅程合計の集約（宿泊・アクティビティで共有）
    /// * `logger` - ロガー
    pub fn new(
        booking_repository: Arc<dyn BookingRepository<K>>,
        resource_repository: Arc<dyn ResourceRepository<K>>,
        itinerary_repository: Arc<dyn ItineraryRepository>,
        aggregator: Arc<ItineraryAggregator>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            availability: AvailabilityCalculator::new(booking_repository.clone()),
            booking_repository,
            resource_repository,
            itinerary_repository,
            aggregator,
            resource_locks: KeyedLock::new(),
            logger,
        }
    }

    /// 予約を作成する
    /// 作成された予約のステータスはCreatedで、価格は旅程の合計に加算される
    ///
    /// # Arguments
    /// * `caller` - 呼び出し元（旅程の所有者である必要がある）
    /// * `request` - 旅程ID、予約対象ID、予約条件
    ///
    /// # Returns
    /// * `Ok(Booking)` - 作成された予約
    /// * `Err(ApplicationError)` - 旅程・予約対象が存在しない、権限がない、検証失敗、空きがない
    pub async fn create(
        &self,
        caller: &Caller,
        request: BookingRequest<K>,
    ) -> Result<Booking<K>, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        self.logger.info(
            COMPONENT,
            "予約の作成を開始",
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("itinerary_id", request.itinerary_id.to_string()),
                ("resource_id", request.resource_id.to_string()),
            ])),
        );

        let itinerary = self.load_itinerary(request.itinerary_id).await?;
        ensure_owner(caller, &itinerary)?;
        let resource = self.load_resource(request.resource_id).await?;
        K::ensure_bookable(&resource)?;
        let terms = Self::validate_terms(&resource, &request.draft)?;

        let _guard = self.resource_locks.acquire(&lock_key::<K>(resource.id())).await;

        let price = self.price_if_available(&resource, &terms, None).await?;
        let booking = Booking::create(
            self.booking_repository.next_identity(),
            resource.id(),
            itinerary.id(),
            terms,
            price,
        );
        self.booking_repository.save(&booking).await?;
        if let Err(error) = self.add_to_itinerary(&booking, correlation_id).await {
            self.restore(&booking, None, correlation_id).await;
            return Err(error);
        }

        self.logger.info(
            COMPONENT,
            "予約を作成しました",
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("booking_id", booking.id().to_string()),
                ("price_cents", booking.price().amount().to_string()),
            ])),
        );
        Ok(booking)
    }

    /// 未確定の予約を確定する
    /// 新しい予約条件で再検証し、価格を再計算して旅程の合計に加算する
    ///
    /// # Arguments
    /// * `caller` - 呼び出し元（旅程の所有者である必要がある）
    /// * `booking_id` - 確定する予約ID
    /// * `draft` - 確定時の予約条件
    ///
    /// # Returns
    /// * `Ok(Booking)` - 確定された予約
    /// * `Err(ApplicationError)` - 予約が未確定でない場合はNotModifiable
    pub async fn confirm(
        &self,
        caller: &Caller,
        booking_id: BookingId,
        draft: BookingDraft,
    ) -> Result<Booking<K>, ApplicationError> {
        let correlation_id = Uuid::new_v4();
        self.logger.info(
            COMPONENT,
            "予約の確定を開始",
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("booking_id", booking_id.to_string()),
            ])),
        );

        let booking = self.load_booking(booking_id).await?;
        let itinerary = self.load_itinerary(booking.itinerary_id()).await?;
        ensure_owner(caller, &itinerary)?;
        // 他の条件より先にステータスを確認
        booking.ensure_confirmable()?;

        let resource = self.load_resource(booking.resource_id()).await?;
        K::ensure_bookable(&resource)?;
        let terms = Self::validate_terms(&resource, &draft)?;

        let _guard = self.resource_locks.acquire(&lock_key::<K>(resource.id())).await;

        // ロック取得までに他の確定・削除が行われていないか再確認
        let mut booking = self.load_booking(booking_id).await?;
        booking.ensure_confirmable()?;

        let price = self
            .price_if_available(&resource, &terms, Some(booking.id()))
            .await?;
        let previous = booking.clone();
        booking.confirm(terms, price)?;
        self.booking_repository.save(&booking).await?;
        if let Err(error) = self.add_to_itinerary(&booking, correlation_id).await {
            self.restore(&booking, Some(&previous), correlation_id).await;
            return Err(error);
        }

        self.logger.info(
            COMPONENT,
            "予約を確定しました",
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("booking_id", booking.id().to_string()),
                ("price_cents", booking.price().amount().to_string()),
            ])),
        );
        Ok(booking)
    }

    /// 予約を削除する
    /// 削除後に予約が存在しないことを確認し、合計対象だった場合は価格を旅程の合計から減算する
    ///
    /// # Arguments
    /// * `caller` - 呼び出し元（旅程の所有者である必要がある）
    /// * `booking_id` - 削除する予約ID
    ///
    /// # Returns
    /// * `Ok(true)` - 削除された
    /// * `Ok(false)` - 削除処理後も予約が残っている
    /// * `Err(ApplicationError)` - 予約が存在しない、権限がない
    pub async fn delete(
        &self,
        caller: &Caller,
        booking_id: BookingId,
    ) -> Result<bool, ApplicationError> {
        let correlation_id = Uuid::new_v4();

        let booking = self.load_booking(booking_id).await?;
        let itinerary = self.load_itinerary(booking.itinerary_id()).await?;
        ensure_owner(caller, &itinerary)?;

        let _guard = self
            .resource_locks
            .acquire(&lock_key::<K>(booking.resource_id()))
            .await;

        // 同時に削除された場合は二重に減算しない
        let booking = self.load_booking(booking_id).await?;

        self.booking_repository.delete(booking.id()).await?;
        self.booking_repository.flush().await?;
        let deleted = self
            .booking_repository
            .find_by_id(booking.id())
            .await?
            .is_none();

        if !deleted {
            self.logger.warn(
                COMPONENT,
                "削除後も予約が残っています",
                Some(correlation_id),
                Some(context(&[
                    ("kind", K::NAME.to_string()),
                    ("booking_id", booking.id().to_string()),
                ])),
            );
            return Ok(false);
        }

        if booking.counts_toward_total() {
            if let Err(e) = self
                .aggregator
                .subtract(booking.itinerary_id(), booking.price())
                .await
            {
                let error = self.log_total_failure(&booking, correlation_id, e);
                self.restore(&booking, Some(&booking), correlation_id).await;
                return Err(error);
            }
        }

        self.logger.info(
            COMPONENT,
            "予約を削除しました",
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("booking_id", booking.id().to_string()),
            ])),
        );
        Ok(true)
    }

    async fn load_itinerary(&self, id: ItineraryId) -> Result<Itinerary, ApplicationError> {
        self.itinerary_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("旅程が見つかりません: {}", id)))
    }

    async fn load_resource(&self, id: K::ResourceId) -> Result<K::Resource, ApplicationError> {
        self.resource_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約対象が見つかりません: {}", id))
            })
    }

    async fn load_booking(&self, id: BookingId) -> Result<Booking<K>, ApplicationError> {
        self.booking_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("予約が見つかりません: {}", id)))
    }

    // 種別固有の条件、日付の順序、定員を検証
    fn validate_terms(
        resource: &K::Resource,
        draft: &BookingDraft,
    ) -> Result<BookingTerms, DomainError> {
        let terms = BookingTerms::from_draft(draft)?;
        K::validate_terms(&terms)?;
        K::check_occupancy(resource, &terms)?;
        Ok(terms)
    }

    // 空きを再確認してから価格を計算
    async fn price_if_available(
        &self,
        resource: &K::Resource,
        terms: &BookingTerms,
        excluding: Option<BookingId>,
    ) -> Result<Money, ApplicationError> {
        let requested = K::quantity(terms);
        let remaining = self
            .availability
            .remaining_capacity_excluding(resource, &terms.period(), excluding)
            .await?;
        if remaining < i64::from(requested) {
            return Err(DomainError::ResourceUnavailable {
                requested,
                remaining,
            }
            .into());
        }

        Ok(PricingEngine::compute_price(
            resource.unit_price(),
            requested,
            terms.period().start(),
            terms.period().end(),
        ))
    }

    async fn add_to_itinerary(
        &self,
        booking: &Booking<K>,
        correlation_id: Uuid,
    ) -> Result<(), ApplicationError> {
        self.aggregator
            .add(booking.itinerary_id(), booking.price())
            .await
            .map_err(|e| self.log_total_failure(booking, correlation_id, e))?;
        Ok(())
    }

    // 合計を更新できなかった場合、予約を更新前の状態に戻す
    // previousがNoneなら新規作成だったので削除する
    async fn restore(
        &self,
        booking: &Booking<K>,
        previous: Option<&Booking<K>>,
        correlation_id: Uuid,
    ) {
        let result = match previous {
            Some(previous) => self.booking_repository.save(previous).await,
            None => self.booking_repository.delete(booking.id()).await,
        };
        if let Err(e) = result {
            self.logger.error(
                COMPONENT,
                &format!("予約の巻き戻しに失敗しました: {}", e),
                Some(correlation_id),
                Some(context(&[
                    ("kind", K::NAME.to_string()),
                    ("booking_id", booking.id().to_string()),
                ])),
            );
        }
    }

    // 予約は保存済みで合計だけ更新できなかった場合
    fn log_total_failure(
        &self,
        booking: &Booking<K>,
        correlation_id: Uuid,
        error: DomainError,
    ) -> ApplicationError {
        self.logger.error(
            COMPONENT,
            &format!("旅程合計の更新に失敗しました: {}", error),
            Some(correlation_id),
            Some(context(&[
                ("kind", K::NAME.to_string()),
                ("booking_id", booking.id().to_string()),
                ("itinerary_id", booking.itinerary_id().to_string()),
            ])),
        );
        ApplicationError::from(error)
    }
}

fn lock_key<K: BookingKind>(resource_id: K::ResourceId) -> String {
    format!("{}:{}", K::NAME, resource_id)
}

pub(crate) fn context(pairs: &[(&str, String)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
