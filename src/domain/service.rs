// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

mod availability;
mod itinerary_aggregator;
mod keyed_lock;
mod pricing;

pub use availability::{AccommodationAvailability, AvailabilityCalculator};
pub use itinerary_aggregator::{ItineraryAggregator, TotalCheck};
pub use keyed_lock::KeyedLock;
pub use pricing::PricingEngine;
