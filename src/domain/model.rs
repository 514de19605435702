// ドメインモデル（エンティティと値オブジェクト）

mod booking;
mod booking_kind;
mod itinerary;
mod resource;
mod value_objects;

pub use value_objects::{
    ActivityId, BookingId, ItineraryId, RoomId, UserId,
    Currency, Money,
    BookingDraft, BookingTerms, Party, StayPeriod,
    BookingStatus, ItineraryStatus, PaymentStatus,
    Caller, Role,
};

pub use booking::{AccommodationBooking, ActivityBooking, Booking};
pub use booking_kind::{ActivitySlot, BookingKind, RoomStay};
pub use itinerary::Itinerary;
pub use resource::{Activity, ActivityCategory, BookableResource, ResourceKind, Room};
