use crate::domain::error::DomainError;
use crate::domain::model::{
    AccommodationBooking, Activity, ActivityBooking, ActivitySlot, BookableResource, BookingTerms,
    Itinerary, Party, Room, RoomStay, StayPeriod, UserId,
};
use crate::domain::port::{
    BookingRepository, ItineraryPlanner, ItineraryRepository, RepositoryError, ResourceRepository,
};
use crate::domain::service::PricingEngine;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// 自動作成で追加するアクティビティ予約の数
const PLANNED_ACTIVITIES: usize = 3;

/// 乱択による旅程プランナー
/// 体験アクティビティ3件と客室1件を未確定の予約として追加する
pub struct RandomItineraryPlanner {
    itinerary_repository: Arc<dyn ItineraryRepository>,
    room_repository: Arc<dyn ResourceRepository<RoomStay>>,
    activity_repository: Arc<dyn ResourceRepository<ActivitySlot>>,
    accommodation_bookings: Arc<dyn BookingRepository<RoomStay>>,
    activity_bookings: Arc<dyn BookingRepository<ActivitySlot>>,
}

impl RandomItineraryPlanner {
    /// 新しいプランナーを作成
    pub fn new(
        itinerary_repository: Arc<dyn ItineraryRepository>,
        room_repository: Arc<dyn ResourceRepository<RoomStay>>,
        activity_repository: Arc<dyn ResourceRepository<ActivitySlot>>,
        accommodation_bookings: Arc<dyn BookingRepository<RoomStay>>,
        activity_bookings: Arc<dyn BookingRepository<ActivitySlot>>,
    ) -> Self {
        Self {
            itinerary_repository,
            room_repository,
            activity_repository,
            accommodation_bookings,
            activity_bookings,
        }
    }

    /// 体験アクティビティと宿泊施設に属する客室から候補を選ぶ
    fn pick(activities: Vec<Activity>, rooms: Vec<Room>) -> (Vec<Activity>, Option<Room>) {
        let mut rng = rand::thread_rng();

        let tourist: Vec<Activity> = activities
            .into_iter()
            .filter(|activity| !activity.is_accommodation())
            .collect();
        let chosen_activities = tourist
            .choose_multiple(&mut rng, PLANNED_ACTIVITIES)
            .cloned()
            .collect();

        let bookable_rooms: Vec<Room> = rooms
            .into_iter()
            .filter(|room| room.accommodation().is_some())
            .collect();
        let chosen_room = bookable_rooms.choose(&mut rng).cloned();

        (chosen_activities, chosen_room)
    }
}

fn persistence(e: RepositoryError) -> DomainError {
    DomainError::Persistence(e.to_string())
}

#[async_trait]
impl ItineraryPlanner for RandomItineraryPlanner {
    async fn plan(&self, visitor: UserId) -> Result<Itinerary, DomainError> {
        let itinerary = Itinerary::new(self.itinerary_repository.next_identity(), visitor);
        self.itinerary_repository
            .save(&itinerary)
            .await
            .map_err(persistence)?;

        let activities = self.activity_repository.find_all().await.map_err(persistence)?;
        let rooms = self.room_repository.find_all().await.map_err(persistence)?;
        let (chosen_activities, chosen_room) = Self::pick(activities, rooms);

        let start = Utc::now() + Duration::hours(1);
        let single_adult = Party::new(1, Some(0))?;

        for activity in chosen_activities {
            let terms = BookingTerms::new(StayPeriod::new(start, None)?, single_adult, None);
            let price = PricingEngine::compute_price(activity.unit_price(), 1, start, None);
            let booking = ActivityBooking::unconfirmed(
                self.activity_bookings.next_identity(),
                activity.id(),
                itinerary.id(),
                terms,
                price,
            );
            self.activity_bookings
                .save(&booking)
                .await
                .map_err(persistence)?;
        }

        if let Some(room) = chosen_room {
            let end = Utc::now() + Duration::days(1);
            let terms = BookingTerms::new(StayPeriod::new(start, Some(end))?, single_adult, Some(1));
            let price = PricingEngine::compute_price(room.unit_price(), 1, start, Some(end));
            let booking = AccommodationBooking::unconfirmed(
                self.accommodation_bookings.next_identity(),
                room.id(),
                itinerary.id(),
                terms,
                price,
            );
            self.accommodation_bookings
                .save(&booking)
                .await
                .map_err(persistence)?;
        }

        Ok(itinerary)
    }
}
