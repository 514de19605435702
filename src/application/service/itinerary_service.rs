use crate::application::service::access::{ensure_owner, ensure_owner_or_admin, ensure_role};
use crate::application::service::booking_lifecycle::context;
use crate::application::ApplicationError;
use crate::domain::model::{Caller, Itinerary, ItineraryId, Role};
use crate::domain::port::{ItineraryPlanner, ItineraryRepository, Logger};
use crate::domain::service::{ItineraryAggregator, TotalCheck};
use std::sync::Arc;
use uuid::Uuid;

const COMPONENT: &str = "ItineraryService";

/// 旅程アプリケーションサービス
pub struct ItineraryService {
    itinerary_repository: Arc<dyn ItineraryRepository>,
    aggregator: Arc<ItineraryAggregator>,
    planner: Arc<dyn ItineraryPlanner>,
    logger: Arc<dyn Logger>,
}

impl ItineraryService {
    /// 新しい旅程アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `itinerary_repository` - 旅程リポジトリ
    /// * `aggregator` - 旅程合計の集約
    /// * `planner` - 旅程の自動作成
    /// * `logger` - ロガー
    pub fn new(
        itinerary_repository: Arc<dyn ItineraryRepository>,
        aggregator: Arc<ItineraryAggregator>,
        planner: Arc<dyn ItineraryPlanner>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            itinerary_repository,
            aggregator,
            planner,
            logger,
        }
    }

    /// 空の旅程を作成
    /// 訪問者のみ
    pub async fn create(&self, caller: &Caller) -> Result<Itinerary, ApplicationError> {
        ensure_role(caller, Role::Visitor)?;
        let itinerary = Itinerary::new(
            self.itinerary_repository.next_identity(),
            caller.user_id(),
        );
        self.itinerary_repository.save(&itinerary).await?;
        Ok(itinerary)
    }

    /// 旅程IDで旅程を取得
    /// 所有者または管理者のみ
    pub async fn find(
        &self,
        caller: &Caller,
        id: ItineraryId,
    ) -> Result<Itinerary, ApplicationError> {
        let itinerary = self.load(id).await?;
        ensure_owner_or_admin(caller, &itinerary)?;
        Ok(itinerary)
    }

    /// 呼び出し元の旅程をすべて取得
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Itinerary>, ApplicationError> {
        self.itinerary_repository
            .find_by_visitor(caller.user_id())
            .await
            .map_err(ApplicationError::from)
    }

    /// 旅程を自動作成
    /// 作成される予約はすべて未確定で、旅程の合計には加算されない
    pub async fn plan(&self, caller: &Caller) -> Result<Itinerary, ApplicationError> {
        ensure_role(caller, Role::Visitor)?;
        let correlation_id = Uuid::new_v4();

        let itinerary = self.planner.plan(caller.user_id()).await?;

        self.logger.info(
            COMPONENT,
            "旅程を自動作成しました",
            Some(correlation_id),
            Some(context(&[
                ("itinerary_id", itinerary.id().to_string()),
                ("visitor", caller.user_id().to_string()),
            ])),
        );
        Ok(itinerary)
    }

    /// 旅程と含まれる予約をすべて削除
    /// 所有者のみ
    ///
    /// # Returns
    /// * `Ok(true)` - 削除された
    /// * `Ok(false)` - 削除処理後も旅程が残っている
    /// * `Err(ApplicationError)` - 旅程が存在しない、権限がない
    pub async fn delete(&self, caller: &Caller, id: ItineraryId) -> Result<bool, ApplicationError> {
        let itinerary = self.load(id).await?;
        ensure_owner(caller, &itinerary)?;
        let correlation_id = Uuid::new_v4();

        let deleted = self.aggregator.delete_cascade(id).await?;

        if deleted {
            self.logger.info(
                COMPONENT,
                "旅程を削除しました",
                Some(correlation_id),
                Some(context(&[("itinerary_id", id.to_string())])),
            );
        } else {
            self.logger.warn(
                COMPONENT,
                "削除後も旅程が残っています",
                Some(correlation_id),
                Some(context(&[("itinerary_id", id.to_string())])),
            );
        }
        Ok(deleted)
    }

    /// 保存されている合計と予約から再計算した合計を照合する
    /// 不一致の場合は警告を記録するが、合計は書き換えない
    pub async fn check_total(
        &self,
        caller: &Caller,
        id: ItineraryId,
    ) -> Result<TotalCheck, ApplicationError> {
        let itinerary = self.load(id).await?;
        ensure_owner_or_admin(caller, &itinerary)?;

        let check = self
            .aggregator
            .check_total(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("旅程が見つかりません: {}", id)))?;

        if !check.is_consistent() {
            self.logger.warn(
                COMPONENT,
                "旅程の合計が予約の合計と一致しません",
                Some(Uuid::new_v4()),
                Some(context(&[
                    ("itinerary_id", id.to_string()),
                    ("stored_cents", check.stored.amount().to_string()),
                    ("computed_cents", check.computed.amount().to_string()),
                ])),
            );
        }
        Ok(check)
    }

    async fn load(&self, id: ItineraryId) -> Result<Itinerary, ApplicationError> {
        self.itinerary_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("旅程が見つかりません: {}", id)))
    }
}
