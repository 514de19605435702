// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::error::DomainError;
use crate::domain::model::{
    ActivityId, Booking, BookingId, BookingKind, BookingStatus, Itinerary, ItineraryId, Room,
    StayPeriod, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 旅程リポジトリトレイト
/// 旅程集約の永続化を抽象化する
#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    /// 旅程を保存する（存在すれば更新）
    ///
    /// # Arguments
    /// * `itinerary` - 保存する旅程
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, itinerary: &Itinerary) -> Result<(), RepositoryError>;

    /// 旅程IDで旅程を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Itinerary))` - 旅程が見つかった
    /// * `Ok(None)` - 旅程が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, id: ItineraryId) -> Result<Option<Itinerary>, RepositoryError>;

    /// 訪問者の旅程をすべて取得する
    async fn find_by_visitor(&self, visitor: UserId) -> Result<Vec<Itinerary>, RepositoryError>;

    /// 旅程を削除する
    async fn delete(&self, id: ItineraryId) -> Result<(), RepositoryError>;

    /// 保留中の書き込みを反映する
    async fn flush(&self) -> Result<(), RepositoryError>;

    /// 新しい一意の旅程IDを生成する
    fn next_identity(&self) -> ItineraryId;
}

/// 予約対象リポジトリトレイト
/// 客室タイプ・アクティビティの参照を抽象化する
#[async_trait]
pub trait ResourceRepository<K: BookingKind>: Send + Sync {
    /// IDで予約対象を検索する
    ///
    /// # Arguments
    /// * `id` - 客室タイプIDまたはアクティビティID
    ///
    /// # Returns
    /// * `Ok(Some(resource))` - 見つかった
    /// * `Ok(None)` - 見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, id: K::ResourceId)
        -> Result<Option<K::Resource>, RepositoryError>;

    /// すべての予約対象を取得する
    async fn find_all(&self) -> Result<Vec<K::Resource>, RepositoryError>;
}

/// 客室カタログ
/// 宿泊施設単位の空き状況計算に使う
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    /// 宿泊施設に属する客室タイプをすべて取得する
    ///
    /// # Arguments
    /// * `accommodation` - 宿泊施設のアクティビティID
    async fn find_by_accommodation(
        &self,
        accommodation: ActivityId,
    ) -> Result<Vec<Room>, RepositoryError>;
}

/// 予約リポジトリトレイト
/// 予約集約の永続化と、空き状況計算用の集計クエリを抽象化する
#[async_trait]
pub trait BookingRepository<K: BookingKind>: Send + Sync {
    /// 予約を保存する（存在すれば更新）
    ///
    /// # Arguments
    /// * `booking` - 保存する予約
    ///
    /// # Returns
    /// * `Ok(())` - 保存成功
    /// * `Err(RepositoryError)` - 保存失敗
    async fn save(&self, booking: &Booking<K>) -> Result<(), RepositoryError>;

    /// 予約IDで予約を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Booking))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(RepositoryError)` - 検索失敗
    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking<K>>, RepositoryError>;

    /// 旅程に含まれる予約をすべて取得する
    async fn find_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<Vec<Booking<K>>, RepositoryError>;

    /// 予約対象の予約をすべて取得する
    async fn find_by_resource(
        &self,
        resource_id: K::ResourceId,
    ) -> Result<Vec<Booking<K>>, RepositoryError>;

    /// 指定されたステータスの予約を取得する
    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking<K>>, RepositoryError>;

    /// 予約を削除する
    /// 削除の成否は呼び出し側が `find_by_id` で確認する
    async fn delete(&self, id: BookingId) -> Result<(), RepositoryError>;

    /// 旅程に含まれる予約を一括削除する
    async fn delete_all_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<(), RepositoryError>;

    /// 保留中の書き込みを反映する
    async fn flush(&self) -> Result<(), RepositoryError>;

    /// 予約対象について照会期間に占有されている数量を集計する
    /// 宿泊は期間が重なる予約の部屋数、アクティビティは同じ日の予約の人数
    ///
    /// # Arguments
    /// * `resource_id` - 予約対象ID
    /// * `period` - 照会期間
    /// * `excluding` - 集計から除外する予約（確定時の自分自身）
    ///
    /// # Returns
    /// * `Ok(u32)` - 占有数量
    /// * `Err(RepositoryError)` - 集計失敗
    async fn occupied_units(
        &self,
        resource_id: K::ResourceId,
        period: &StayPeriod,
        excluding: Option<BookingId>,
    ) -> Result<u32, RepositoryError>;

    /// 新しい一意の予約IDを生成する
    fn next_identity(&self) -> BookingId;
}

/// 宿泊施設単位の占有集計
/// 施設内の全客室について、期間が重なる宿泊予約の部屋数を一度に集計する
#[async_trait]
pub trait AccommodationOccupancy: Send + Sync {
    async fn occupied_rooms(
        &self,
        accommodation: ActivityId,
        period: &StayPeriod,
    ) -> Result<u32, RepositoryError>;
}

/// 旅程の自動作成
#[async_trait]
pub trait ItineraryPlanner: Send + Sync {
    /// 訪問者のために旅程と未確定の予約を作成する
    ///
    /// # Arguments
    /// * `visitor` - 旅程の所有者
    ///
    /// # Returns
    /// * `Ok(Itinerary)` - 作成された旅程
    /// * `Err(DomainError)` - 作成失敗
    async fn plan(&self, visitor: UserId) -> Result<Itinerary, DomainError>;
}
