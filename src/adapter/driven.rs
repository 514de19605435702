// 駆動される側アダプター（リポジトリ実装など）

mod booking_repository;
mod itinerary_planner;
mod itinerary_repository;
mod resource_repository;
mod row_decode;
mod tracing_logger;

pub use booking_repository::{MySqlAccommodationBookingRepository, MySqlActivityBookingRepository};
pub use itinerary_planner::RandomItineraryPlanner;
pub use itinerary_repository::MySqlItineraryRepository;
pub use resource_repository::{MySqlActivityRepository, MySqlRoomRepository};
pub use tracing_logger::TracingLogger;
