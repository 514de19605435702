use crate::domain::error::DomainError;
use crate::domain::model::{
    ActivitySlot, BookingId, BookingKind, BookingStatus, BookingTerms, ItineraryId, Money,
    PaymentStatus, RoomStay,
};

/// 予約集約
/// 宿泊予約とアクティビティ予約は種別パラメータ `K` で区別する
#[derive(Debug, Clone, PartialEq)]
pub struct Booking<K: BookingKind> {
    id: BookingId,
    resource_id: K::ResourceId,
    itinerary_id: ItineraryId,
    terms: BookingTerms,
    price: Money,
    status: BookingStatus,
    payment_status: PaymentStatus,
}

/// 宿泊予約
pub type AccommodationBooking = Booking<RoomStay>;

/// アクティビティ予約
pub type ActivityBooking = Booking<ActivitySlot>;

impl<K: BookingKind> Booking<K> {
    /// 利用者が直接作成する予約
    /// 初期ステータスはCreated
    pub fn create(
        id: BookingId,
        resource_id: K::ResourceId,
        itinerary_id: ItineraryId,
        terms: BookingTerms,
        price: Money,
    ) -> Self {
        Self {
            id,
            resource_id,
            itinerary_id,
            terms,
            price,
            status: BookingStatus::Created,
            payment_status: PaymentStatus::InProgress,
        }
    }

    /// 旅程の自動作成で生成される予約
    /// 初期ステータスはUnconfirmed
    pub fn unconfirmed(
        id: BookingId,
        resource_id: K::ResourceId,
        itinerary_id: ItineraryId,
        terms: BookingTerms,
        price: Money,
    ) -> Self {
        Self {
            status: BookingStatus::Unconfirmed,
            ..Self::create(id, resource_id, itinerary_id, terms, price)
        }
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        id: BookingId,
        resource_id: K::ResourceId,
        itinerary_id: ItineraryId,
        terms: BookingTerms,
        price: Money,
        status: BookingStatus,
        payment_status: PaymentStatus,
    ) -> Self {
        Self {
            id,
            resource_id,
            itinerary_id,
            terms,
            price,
            status,
            payment_status,
        }
    }

    pub fn id(&self) -> BookingId {
        self.id
    }

    pub fn resource_id(&self) -> K::ResourceId {
        self.resource_id
    }

    pub fn itinerary_id(&self) -> ItineraryId {
        self.itinerary_id
    }

    pub fn terms(&self) -> &BookingTerms {
        &self.terms
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// 消費する容量（部屋数または人数）
    pub fn quantity(&self) -> u32 {
        K::quantity(&self.terms)
    }

    /// 旅程の合計金額に含まれるか
    /// 未確定の予約は合計に加算されていない
    pub fn counts_toward_total(&self) -> bool {
        self.status != BookingStatus::Unconfirmed
    }

    /// ステータスが確定可能か検証する
    pub fn ensure_confirmable(&self) -> Result<(), DomainError> {
        if self.status != BookingStatus::Unconfirmed {
            return Err(DomainError::NotModifiable(format!(
                "確定できるのは未確定の予約のみです（現在: {}）",
                self.status
            )));
        }
        Ok(())
    }

    /// 未確定の予約を新しい条件で確定する
    /// 事前条件:
    /// - ステータスがUnconfirmed
    pub fn confirm(&mut self, terms: BookingTerms, price: Money) -> Result<(), DomainError> {
        self.ensure_confirmable()?;
        self.terms = terms;
        self.price = price;
        self.status = BookingStatus::Created;
        Ok(())
    }

    /// 予約を完了にする
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != BookingStatus::Created {
            return Err(DomainError::NotModifiable(
                "完了にできるのは作成済みの予約のみです".to_string(),
            ));
        }
        self.status = BookingStatus::Completed;
        Ok(())
    }
}
