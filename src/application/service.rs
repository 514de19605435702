// アプリケーションサービス
// ユースケースの調整と呼び出し元の権限確認を行う

mod access;
mod availability_query_service;
mod booking_lifecycle;
mod booking_query_service;
mod itinerary_service;

pub use availability_query_service::AvailabilityQueryService;
pub use booking_lifecycle::{BookingLifecycleManager, BookingRequest};
pub use booking_query_service::BookingQueryService;
pub use itinerary_service::ItineraryService;
