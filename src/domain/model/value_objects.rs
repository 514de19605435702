use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// UUIDをラップした識別子型を定義する
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// 新しい一意の識別子を生成
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// UUIDから作成
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// 文字列から作成
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                let uuid = Uuid::parse_str(s)?;
                Ok(Self(uuid))
            }

            /// 内部のUUIDを取得
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

uuid_identifier!(
    /// 利用者（訪問者・事業者・管理者）の一意識別子
    UserId
);
uuid_identifier!(
    /// 旅程の一意識別子
    ItineraryId
);
uuid_identifier!(
    /// 予約（宿泊・アクティビティ共通）の一意識別子
    BookingId
);
uuid_identifier!(
    /// 客室タイプの一意識別子
    RoomId
);
uuid_identifier!(
    /// アクティビティ（宿泊施設または体験）の一意識別子
    ActivityId
);

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// ユーロ
    #[allow(clippy::upper_case_acronyms)]
    EUR,
}

/// 金額を表す値オブジェクト
/// 金額はセント単位の整数で保持する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額（セント）と通貨コードから作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "EUR" => Currency::EUR,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// ユーロの金額をセント単位で作成
    pub fn eur(cents: i64) -> Self {
        Self {
            amount: cents,
            currency: Currency::EUR,
        }
    }

    /// 0ユーロ
    pub fn zero() -> Self {
        Self::eur(0)
    }

    /// 金額（セント）を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// ユーロ単位の金額を取得（JSON表現用）
    pub fn major_units(&self) -> f64 {
        self.amount as f64 / 100.0
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::EUR => "EUR".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を減算（結果が負になることも許容する）
    pub fn subtract(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 予約する人数（大人・子供）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    adults: u32,
    children: u32,
}

impl Party {
    /// 新しい人数を作成
    /// 子供の人数が省略された場合は0人とする
    /// 合計1人以上で、u32の範囲に収まる必要がある
    pub fn new(adults: u32, children: Option<u32>) -> Result<Self, DomainError> {
        let children = children.unwrap_or(0);
        match adults.checked_add(children) {
            Some(0) => Err(DomainError::InvalidInput(
                "大人と子供の合計は1人以上である必要があります".to_string(),
            )),
            Some(_) => Ok(Self { adults, children }),
            None => Err(DomainError::InvalidInput(format!(
                "人数が多すぎます: 大人{}人、子供{}人",
                adults, children
            ))),
        }
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    /// 合計人数
    pub fn total(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

/// 予約期間
/// 宿泊は開始・終了の両方、アクティビティは開始のみでもよい
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayPeriod {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl StayPeriod {
    /// 新しい予約期間を作成
    /// 終了日時が開始日時より前の場合はエラー
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self, DomainError> {
        if let Some(end) = end {
            if end < start {
                return Err(DomainError::InvalidDateRange);
            }
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// 半開区間 [start, end) 同士が重なるか
    /// 終了日時がない場合は開始時刻の一点として扱う
    pub fn overlaps(&self, other: &StayPeriod) -> bool {
        let self_end = self.end.unwrap_or(self.start);
        let other_end = other.end.unwrap_or(other.start);
        self.start < other_end && self_end > other.start
    }

    /// 開始日（UTC）が同じか
    pub fn same_day(&self, other: &StayPeriod) -> bool {
        self.start.date_naive() == other.start.date_naive()
    }
}

/// 予約条件（期間・人数・部屋数）
/// 部屋数は宿泊予約のみで使用する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingTerms {
    period: StayPeriod,
    party: Party,
    rooms: Option<u32>,
}

impl BookingTerms {
    /// 新しい予約条件を作成
    pub fn new(period: StayPeriod, party: Party, rooms: Option<u32>) -> Self {
        Self {
            period,
            party,
            rooms,
        }
    }

    /// 呼び出し元の入力から予約条件を組み立てる
    pub fn from_draft(draft: &BookingDraft) -> Result<Self, DomainError> {
        let period = StayPeriod::new(draft.start, draft.end)?;
        let party = Party::new(draft.adults, draft.children)?;
        Ok(Self::new(period, party, draft.rooms))
    }

    pub fn period(&self) -> StayPeriod {
        self.period
    }

    pub fn party(&self) -> Party {
        self.party
    }

    pub fn rooms(&self) -> Option<u32> {
        self.rooms
    }
}

/// 未検証の予約入力
/// 作成・確定の両方で受け取り、サービス内で検証する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub adults: u32,
    pub children: Option<u32>,
    pub rooms: Option<u32>,
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    /// 未確定（自動作成された旅程の予約）
    Unconfirmed,
    /// 作成済み（確定）
    Created,
    /// 完了
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Unconfirmed => "NON_CONFERMATA",
            BookingStatus::Created => "CREATA",
            BookingStatus::Completed => "COMPLETATA",
        };
        write!(f, "{}", status_str)
    }
}

impl BookingStatus {
    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "NON_CONFERMATA" => Ok(BookingStatus::Unconfirmed),
            "CREATA" => Ok(BookingStatus::Created),
            "COMPLETATA" => Ok(BookingStatus::Completed),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

/// 支払いのステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// 支払い処理中
    InProgress,
    /// 支払い済み
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            PaymentStatus::InProgress => "IN_CORSO",
            PaymentStatus::Paid => "COMPLETATO",
        };
        write!(f, "{}", status_str)
    }
}

impl PaymentStatus {
    /// 文字列からPaymentStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "IN_CORSO" => Ok(PaymentStatus::InProgress),
            "COMPLETATO" => Ok(PaymentStatus::Paid),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な支払いステータス: {}",
                s
            ))),
        }
    }
}

/// 旅程のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItineraryStatus {
    /// 計画中
    Planned,
    /// 実施中
    InProgress,
    /// 完了
    Completed,
}

impl fmt::Display for ItineraryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            ItineraryStatus::Planned => "PIANIFICATO",
            ItineraryStatus::InProgress => "IN_CORSO",
            ItineraryStatus::Completed => "COMPLETATO",
        };
        write!(f, "{}", status_str)
    }
}

impl ItineraryStatus {
    /// 文字列からItineraryStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "PIANIFICATO" => Ok(ItineraryStatus::Planned),
            "IN_CORSO" => Ok(ItineraryStatus::InProgress),
            "COMPLETATO" => Ok(ItineraryStatus::Completed),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な旅程ステータス: {}",
                s
            ))),
        }
    }
}

/// 利用者のロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// 訪問者
    Visitor,
    /// アクティビティ事業者
    ActivityManager,
    /// 管理者
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role_str = match self {
            Role::Visitor => "VISITATORE",
            Role::ActivityManager => "GESTORE_ATTIVITA",
            Role::Administrator => "AMMINISTRATORE",
        };
        write!(f, "{}", role_str)
    }
}

impl Role {
    /// 文字列からRoleを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "VISITATORE" => Ok(Role::Visitor),
            "GESTORE_ATTIVITA" => Ok(Role::ActivityManager),
            "AMMINISTRATORE" => Ok(Role::Administrator),
            _ => Err(DomainError::InvalidValue(format!("無効なロール: {}", s))),
        }
    }
}

/// 操作の呼び出し元
/// すべての操作に明示的に渡す
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// 訪問者として作成
    pub fn visitor(user_id: UserId) -> Self {
        Self::new(user_id, Role::Visitor)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}
