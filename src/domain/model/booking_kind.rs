use crate::domain::error::DomainError;
use crate::domain::model::{
    Activity, ActivityId, BookableResource, BookingTerms, ResourceKind, Room, RoomId, StayPeriod,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// 予約の種別
/// 宿泊予約とアクティビティ予約で異なる容量・数量の意味を切り替える
pub trait BookingKind:
    fmt::Debug + Clone + Copy + PartialEq + Eq + Send + Sync + 'static
{
    /// 予約対象の識別子
    type ResourceId: Copy
        + Eq
        + Hash
        + fmt::Debug
        + fmt::Display
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// 予約対象
    type Resource: BookableResource<Id = Self::ResourceId>
        + Clone
        + fmt::Debug
        + Send
        + Sync
        + 'static;

    /// ログ・ロックキーに使う名前
    const NAME: &'static str;

    /// リソースがこの種別で予約可能か検証する
    fn ensure_bookable(resource: &Self::Resource) -> Result<(), DomainError>;

    /// 種別固有の予約条件を検証する
    fn validate_terms(terms: &BookingTerms) -> Result<(), DomainError>;

    /// 人数が定員内か検証する
    fn check_occupancy(resource: &Self::Resource, terms: &BookingTerms)
        -> Result<(), DomainError>;

    /// 予約が消費する容量（空き状況の比較と料金の数量に使う）
    fn quantity(terms: &BookingTerms) -> u32;

    /// 既存予約の期間が照会期間の占有にカウントされるか
    fn occupies(booked: &StayPeriod, requested: &StayPeriod) -> bool;
}

/// 宿泊予約（客室タイプを部屋数単位で予約）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStay;

impl BookingKind for RoomStay {
    type ResourceId = RoomId;
    type Resource = Room;

    const NAME: &'static str = "room";

    fn ensure_bookable(room: &Room) -> Result<(), DomainError> {
        if room.accommodation().is_none() {
            return Err(DomainError::InvalidResourceKind(format!(
                "客室に宿泊施設が紐付いていません: {}",
                room.id()
            )));
        }
        Ok(())
    }

    fn validate_terms(terms: &BookingTerms) -> Result<(), DomainError> {
        let period = terms.period();
        match period.end() {
            None => {
                return Err(DomainError::InvalidInput(
                    "宿泊予約には終了日時が必要です".to_string(),
                ))
            }
            // 長さ0の宿泊は半開区間で何も占有しない
            Some(end) if end == period.start() => return Err(DomainError::InvalidDateRange),
            Some(_) => {}
        }
        match terms.rooms() {
            Some(rooms) if rooms >= 1 => Ok(()),
            _ => Err(DomainError::InvalidQuantity),
        }
    }

    fn check_occupancy(room: &Room, terms: &BookingTerms) -> Result<(), DomainError> {
        let capacity = room
            .guests_per_room()
            .checked_mul(terms.rooms().unwrap_or(0))
            .ok_or(DomainError::InvalidQuantity)?;
        let requested = terms.party().total();
        // 定員ちょうどは許容
        if requested > capacity {
            return Err(DomainError::CapacityExceeded {
                requested,
                capacity,
            });
        }
        Ok(())
    }

    fn quantity(terms: &BookingTerms) -> u32 {
        terms.rooms().unwrap_or(0)
    }

    fn occupies(booked: &StayPeriod, requested: &StayPeriod) -> bool {
        booked.overlaps(requested)
    }
}

/// アクティビティ予約（参加人数単位で体験アクティビティを予約）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySlot;

impl BookingKind for ActivitySlot {
    type ResourceId = ActivityId;
    type Resource = Activity;

    const NAME: &'static str = "activity";

    fn ensure_bookable(activity: &Activity) -> Result<(), DomainError> {
        if activity.kind() != ResourceKind::TouristActivity {
            return Err(DomainError::InvalidResourceKind(format!(
                "宿泊施設はアクティビティとして予約できません: {}",
                activity.id()
            )));
        }
        Ok(())
    }

    fn validate_terms(terms: &BookingTerms) -> Result<(), DomainError> {
        if terms.rooms().is_some() {
            return Err(DomainError::InvalidInput(
                "アクティビティ予約に部屋数は指定できません".to_string(),
            ));
        }
        Ok(())
    }

    fn check_occupancy(activity: &Activity, terms: &BookingTerms) -> Result<(), DomainError> {
        let requested = terms.party().total();
        if requested > activity.capacity() {
            return Err(DomainError::CapacityExceeded {
                requested,
                capacity: activity.capacity(),
            });
        }
        Ok(())
    }

    fn quantity(terms: &BookingTerms) -> u32 {
        terms.party().total()
    }

    fn occupies(booked: &StayPeriod, requested: &StayPeriod) -> bool {
        booked.same_day(requested)
    }
}
