use crate::domain::model::{Booking, BookingKind, Itinerary};
use crate::domain::service::TotalCheck;
use serde::Serialize;

/// 予約用のレスポンスDTO
/// 金額はユーロ単位の `price` とセント単位の `price_cents` の両方を返す
#[derive(Serialize)]
pub struct BookingResponse {
    pub booking_id: String,
    pub resource_id: String,
    pub itinerary_id: String,
    pub start: String,
    pub end: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub rooms: Option<u32>,
    pub price: f64,
    pub price_cents: i64,
    pub currency: String,
    pub status: String,
    pub payment_status: String,
}

/// 旅程用のレスポンスDTO
#[derive(Serialize)]
pub struct ItineraryResponse {
    pub itinerary_id: String,
    pub visitor_id: String,
    pub total: f64,
    pub total_cents: i64,
    pub currency: String,
    pub status: String,
}

/// 旅程合計の検証結果
#[derive(Serialize)]
pub struct TotalCheckResponse {
    pub itinerary_id: String,
    pub stored_cents: i64,
    pub computed_cents: i64,
    pub consistent: bool,
}

/// 空き状況のレスポンスDTO
#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub resource_id: String,
    pub remaining: i64,
}

/// 削除結果のレスポンスDTO
#[derive(Serialize)]
pub struct DeletionResponse {
    pub deleted: bool,
}

impl BookingResponse {
    /// ドメインオブジェクトからBookingResponseを作成
    pub fn from_booking<K: BookingKind>(booking: &Booking<K>) -> Self {
        let terms = booking.terms();
        let period = terms.period();
        let party = terms.party();
        let price = booking.price();
        Self {
            booking_id: booking.id().to_string(),
            resource_id: booking.resource_id().to_string(),
            itinerary_id: booking.itinerary_id().to_string(),
            start: period.start().to_rfc3339(),
            end: period.end().map(|end| end.to_rfc3339()),
            adults: party.adults(),
            children: party.children(),
            rooms: terms.rooms(),
            price: price.major_units(),
            price_cents: price.amount(),
            currency: price.currency(),
            status: booking.status().to_string(),
            payment_status: booking.payment_status().to_string(),
        }
    }
}

impl ItineraryResponse {
    /// ドメインオブジェクトからItineraryResponseを作成
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        let total = itinerary.total();
        Self {
            itinerary_id: itinerary.id().to_string(),
            visitor_id: itinerary.visitor().to_string(),
            total: total.major_units(),
            total_cents: total.amount(),
            currency: total.currency(),
            status: itinerary.status().to_string(),
        }
    }
}

impl TotalCheckResponse {
    pub fn from_check(itinerary_id: String, check: &TotalCheck) -> Self {
        Self {
            itinerary_id,
            stored_cents: check.stored.amount(),
            computed_cents: check.computed.amount(),
            consistent: check.is_consistent(),
        }
    }
}
