use crate::domain::error::DomainError;
use crate::domain::model::{ActivityId, Money, RoomId, UserId};
use std::fmt;

/// 予約対象の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// 宿泊施設の客室タイプ
    Room,
    /// 宿泊施設（客室の親）
    Accommodation,
    /// 体験アクティビティ
    TouristActivity,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind_str = match self {
            ResourceKind::Room => "Room",
            ResourceKind::Accommodation => "Accommodation",
            ResourceKind::TouristActivity => "TouristActivity",
        };
        write!(f, "{}", kind_str)
    }
}

/// 予約可能なリソース
/// 容量・単価・管理者を公開する
pub trait BookableResource {
    type Id: Copy;

    fn id(&self) -> Self::Id;

    fn kind(&self) -> ResourceKind;

    /// 設定された総数（客室なら部屋数、体験なら参加枠）
    fn capacity(&self) -> u32;

    fn unit_price(&self) -> Money;

    fn manager(&self) -> UserId;
}

/// アクティビティの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    /// 宿泊施設
    Accommodation,
    /// 体験アクティビティ
    Tourist,
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category_str = match self {
            ActivityCategory::Accommodation => "ALLOGGIO",
            ActivityCategory::Tourist => "TURISTICA",
        };
        write!(f, "{}", category_str)
    }
}

impl ActivityCategory {
    /// 文字列からActivityCategoryを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "ALLOGGIO" => Ok(ActivityCategory::Accommodation),
            "TURISTICA" => Ok(ActivityCategory::Tourist),
            _ => Err(DomainError::InvalidValue(format!(
                "無効なアクティビティ分類: {}",
                s
            ))),
        }
    }
}

/// アクティビティ
/// 宿泊施設または体験アクティビティ
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    id: ActivityId,
    manager: UserId,
    name: String,
    category: ActivityCategory,
    unit_price: Money,
    availability: u32,
}

impl Activity {
    /// 新しいアクティビティを作成
    /// データベースからの再構築にも使用する
    pub fn new(
        id: ActivityId,
        manager: UserId,
        name: String,
        category: ActivityCategory,
        unit_price: Money,
        availability: u32,
    ) -> Self {
        Self {
            id,
            manager,
            name,
            category,
            unit_price,
            availability,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ActivityCategory {
        self.category
    }

    pub fn is_accommodation(&self) -> bool {
        self.category == ActivityCategory::Accommodation
    }
}

impl BookableResource for Activity {
    type Id = ActivityId;

    fn id(&self) -> ActivityId {
        self.id
    }

    fn kind(&self) -> ResourceKind {
        match self.category {
            ActivityCategory::Accommodation => ResourceKind::Accommodation,
            ActivityCategory::Tourist => ResourceKind::TouristActivity,
        }
    }

    fn capacity(&self) -> u32 {
        self.availability
    }

    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn manager(&self) -> UserId {
        self.manager
    }
}

/// 客室タイプ
/// `availability` はこのタイプの部屋数、`guests_per_room` は1部屋あたりの定員
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    accommodation: Option<ActivityId>,
    manager: UserId,
    room_type: String,
    unit_price: Money,
    availability: u32,
    guests_per_room: u32,
}

impl Room {
    /// 新しい客室タイプを作成
    pub fn new(
        id: RoomId,
        accommodation: Option<ActivityId>,
        manager: UserId,
        room_type: String,
        unit_price: Money,
        availability: u32,
        guests_per_room: u32,
    ) -> Self {
        Self {
            id,
            accommodation,
            manager,
            room_type,
            unit_price,
            availability,
            guests_per_room,
        }
    }

    /// 所属する宿泊施設
    pub fn accommodation(&self) -> Option<ActivityId> {
        self.accommodation
    }

    pub fn room_type(&self) -> &str {
        &self.room_type
    }

    pub fn guests_per_room(&self) -> u32 {
        self.guests_per_room
    }
}

impl BookableResource for Room {
    type Id = RoomId;

    fn id(&self) -> RoomId {
        self.id
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Room
    }

    fn capacity(&self) -> u32 {
        self.availability
    }

    fn unit_price(&self) -> Money {
        self.unit_price
    }

    fn manager(&self) -> UserId {
        self.manager
    }
}
