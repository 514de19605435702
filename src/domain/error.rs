/// ドメイン層のエラー型
/// 予約・料金・空き状況に関するビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な入力（例: 大人も子供も0人の予約）
    InvalidInput(String),
    /// 終了日時が開始日時より前
    InvalidDateRange,
    /// 人数が1単位あたりの定員 × 部屋数を超えている
    CapacityExceeded { requested: u32, capacity: u32 },
    /// 残りの空きが要求数に足りない
    ResourceUnavailable { requested: u32, remaining: i64 },
    /// 未確定状態以外の予約を確定しようとした
    NotModifiable(String),
    /// 予約対象の種別が不正（例: 宿泊施設を体験アクティビティとして予約）
    InvalidResourceKind(String),
    /// 無効な数量（例: 部屋数0）
    InvalidQuantity,
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値（永続化された列挙値の解析失敗など）
    InvalidValue(String),
    /// 更新対象が存在しない
    NotFound(String),
    /// 永続化の失敗
    Persistence(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::InvalidDateRange => {
                write!(f, "Invalid date range: end precedes start")
            }
            DomainError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "Capacity exceeded: {} guests requested, capacity is {}",
                requested, capacity
            ),
            DomainError::ResourceUnavailable {
                requested,
                remaining,
            } => write!(
                f,
                "Resource unavailable: {} requested, {} remaining",
                requested, remaining
            ),
            DomainError::NotModifiable(msg) => write!(f, "Booking not modifiable: {}", msg),
            DomainError::InvalidResourceKind(msg) => write!(f, "Invalid resource kind: {}", msg),
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Persistence(msg) => write!(f, "Persistence failure: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
