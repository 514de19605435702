// 統合テスト共通のインメモリ実装とフィクスチャ
#![allow(dead_code)]

use greentrails_booking::adapter::driven::{RandomItineraryPlanner, TracingLogger};
use greentrails_booking::application::service::{
    AvailabilityQueryService, BookingLifecycleManager, BookingQueryService, ItineraryService,
};
use greentrails_booking::domain::model::{
    Activity, ActivityCategory, ActivityId, ActivitySlot, BookableResource, Booking, BookingDraft,
    BookingId, BookingKind, BookingStatus, Caller, Itinerary, ItineraryId, Money, Room, RoomId,
    RoomStay, StayPeriod, UserId,
};
use greentrails_booking::domain::port::{
    AccommodationOccupancy, BookingRepository, ItineraryRepository, Logger, RepositoryError,
    ResourceRepository, RoomCatalog,
};
use greentrails_booking::domain::service::ItineraryAggregator;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

// テスト用のインメモリ旅程リポジトリ
#[derive(Default)]
pub struct InMemoryItineraryRepository {
    itineraries: Arc<Mutex<HashMap<ItineraryId, Itinerary>>>,
    fail_saves: AtomicBool,
    ignore_deletes: AtomicBool,
}

impl InMemoryItineraryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の保存をすべて失敗させる
    pub fn fail_saves(&self, enabled: bool) {
        self.fail_saves.store(enabled, Ordering::SeqCst);
    }

    /// 以降の削除を何もせず成功扱いにする
    pub fn ignore_deletes(&self, enabled: bool) {
        self.ignore_deletes.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItineraryRepository for InMemoryItineraryRepository {
    async fn save(&self, itinerary: &Itinerary) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::OperationFailed("旅程の保存に失敗".to_string()));
        }
        let mut itineraries = self.itineraries.lock().await;
        itineraries.insert(itinerary.id(), itinerary.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ItineraryId) -> Result<Option<Itinerary>, RepositoryError> {
        let itineraries = self.itineraries.lock().await;
        Ok(itineraries.get(&id).cloned())
    }

    async fn find_by_visitor(&self, visitor: UserId) -> Result<Vec<Itinerary>, RepositoryError> {
        let itineraries = self.itineraries.lock().await;
        Ok(itineraries
            .values()
            .filter(|itinerary| itinerary.visitor() == visitor)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: ItineraryId) -> Result<(), RepositoryError> {
        if self.ignore_deletes.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut itineraries = self.itineraries.lock().await;
        itineraries.remove(&id);
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn next_identity(&self) -> ItineraryId {
        ItineraryId::new()
    }
}

// テスト用のインメモリ予約対象リポジトリ
pub struct InMemoryResourceRepository<K: BookingKind> {
    resources: Arc<Mutex<HashMap<K::ResourceId, K::Resource>>>,
}

impl<K: BookingKind> Default for InMemoryResourceRepository<K> {
    fn default() -> Self {
        Self {
            resources: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: BookingKind> InMemoryResourceRepository<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, resource: K::Resource) {
        let mut resources = self.resources.lock().await;
        resources.insert(resource.id(), resource);
    }
}

#[async_trait]
impl<K: BookingKind> ResourceRepository<K> for InMemoryResourceRepository<K> {
    async fn find_by_id(
        &self,
        id: K::ResourceId,
    ) -> Result<Option<K::Resource>, RepositoryError> {
        let resources = self.resources.lock().await;
        Ok(resources.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<K::Resource>, RepositoryError> {
        let resources = self.resources.lock().await;
        Ok(resources.values().cloned().collect())
    }
}

#[async_trait]
impl RoomCatalog for InMemoryResourceRepository<RoomStay> {
    async fn find_by_accommodation(
        &self,
        accommodation: ActivityId,
    ) -> Result<Vec<Room>, RepositoryError> {
        let resources = self.resources.lock().await;
        Ok(resources
            .values()
            .filter(|room| room.accommodation() == Some(accommodation))
            .cloned()
            .collect())
    }
}

// テスト用のインメモリ予約リポジトリ
pub struct InMemoryBookingRepository<K: BookingKind> {
    bookings: Arc<Mutex<HashMap<BookingId, Booking<K>>>>,
    ignore_deletes: AtomicBool,
}

impl<K: BookingKind> Default for InMemoryBookingRepository<K> {
    fn default() -> Self {
        Self {
            bookings: Arc::new(Mutex::new(HashMap::new())),
            ignore_deletes: AtomicBool::new(false),
        }
    }
}

impl<K: BookingKind> InMemoryBookingRepository<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bookings.lock().await.len()
    }

    /// 以降の削除を何もせず成功扱いにする
    pub fn ignore_deletes(&self, enabled: bool) {
        self.ignore_deletes.store(enabled, Ordering::SeqCst);
    }
}

#[async_trait]
impl<K: BookingKind> BookingRepository<K> for InMemoryBookingRepository<K> {
    async fn save(&self, booking: &Booking<K>) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking<K>>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn find_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<Vec<Booking<K>>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.itinerary_id() == itinerary_id)
            .cloned()
            .collect())
    }

    async fn find_by_resource(
        &self,
        resource_id: K::ResourceId,
    ) -> Result<Vec<Booking<K>>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.resource_id() == resource_id)
            .cloned()
            .collect())
    }

    async fn find_by_status(
        &self,
        status: BookingStatus,
    ) -> Result<Vec<Booking<K>>, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.status() == status)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: BookingId) -> Result<(), RepositoryError> {
        if self.ignore_deletes.load(Ordering::SeqCst) {
            return Ok(());
        }
        let mut bookings = self.bookings.lock().await;
        bookings.remove(&id);
        Ok(())
    }

    async fn delete_all_by_itinerary(
        &self,
        itinerary_id: ItineraryId,
    ) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.lock().await;
        bookings.retain(|_, booking| booking.itinerary_id() != itinerary_id);
        Ok(())
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn occupied_units(
        &self,
        resource_id: K::ResourceId,
        period: &StayPeriod,
        excluding: Option<BookingId>,
    ) -> Result<u32, RepositoryError> {
        let bookings = self.bookings.lock().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.resource_id() == resource_id)
            .filter(|booking| Some(booking.id()) != excluding)
            .filter(|booking| K::occupies(&booking.terms().period(), period))
            .map(|booking| booking.quantity())
            .sum())
    }

    fn next_identity(&self) -> BookingId {
        BookingId::new()
    }
}

// 宿泊施設全体の占有部屋数（客室カタログと宿泊予約を突き合わせる）
pub struct InMemoryAccommodationOccupancy {
    rooms: Arc<InMemoryResourceRepository<RoomStay>>,
    bookings: Arc<InMemoryBookingRepository<RoomStay>>,
}

#[async_trait]
impl AccommodationOccupancy for InMemoryAccommodationOccupancy {
    async fn occupied_rooms(
        &self,
        accommodation: ActivityId,
        period: &StayPeriod,
    ) -> Result<u32, RepositoryError> {
        let mut occupied = 0;
        for room in self.rooms.find_by_accommodation(accommodation).await? {
            occupied += self.bookings.occupied_units(room.id(), period, None).await?;
        }
        Ok(occupied)
    }
}

/// すべてのサービスをインメモリ実装で組み立てたテスト環境
pub struct TestContext {
    pub itineraries: Arc<InMemoryItineraryRepository>,
    pub rooms: Arc<InMemoryResourceRepository<RoomStay>>,
    pub activities: Arc<InMemoryResourceRepository<ActivitySlot>>,
    pub accommodation_bookings: Arc<InMemoryBookingRepository<RoomStay>>,
    pub activity_bookings: Arc<InMemoryBookingRepository<ActivitySlot>>,
    pub aggregator: Arc<ItineraryAggregator>,
    pub accommodation_lifecycle: Arc<BookingLifecycleManager<RoomStay>>,
    pub activity_lifecycle: Arc<BookingLifecycleManager<ActivitySlot>>,
    pub accommodation_queries: Arc<BookingQueryService<RoomStay>>,
    pub activity_queries: Arc<BookingQueryService<ActivitySlot>>,
    pub availability: Arc<AvailabilityQueryService>,
    pub itinerary_service: Arc<ItineraryService>,
}

impl TestContext {
    pub fn new() -> Self {
        let itineraries = Arc::new(InMemoryItineraryRepository::new());
        let rooms = Arc::new(InMemoryResourceRepository::<RoomStay>::new());
        let activities = Arc::new(InMemoryResourceRepository::<ActivitySlot>::new());
        let accommodation_bookings = Arc::new(InMemoryBookingRepository::<RoomStay>::new());
        let activity_bookings = Arc::new(InMemoryBookingRepository::<ActivitySlot>::new());
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());

        let aggregator = Arc::new(ItineraryAggregator::new(
            itineraries.clone(),
            accommodation_bookings.clone(),
            activity_bookings.clone(),
        ));

        let occupancy = Arc::new(InMemoryAccommodationOccupancy {
            rooms: rooms.clone(),
            bookings: accommodation_bookings.clone(),
        });

        let planner = Arc::new(RandomItineraryPlanner::new(
            itineraries.clone(),
            rooms.clone(),
            activities.clone(),
            accommodation_bookings.clone(),
            activity_bookings.clone(),
        ));

        Self {
            accommodation_lifecycle: Arc::new(BookingLifecycleManager::new(
                accommodation_bookings.clone(),
                rooms.clone(),
                itineraries.clone(),
                aggregator.clone(),
                logger.clone(),
            )),
            activity_lifecycle: Arc::new(BookingLifecycleManager::new(
                activity_bookings.clone(),
                activities.clone(),
                itineraries.clone(),
                aggregator.clone(),
                logger.clone(),
            )),
            accommodation_queries: Arc::new(BookingQueryService::new(
                accommodation_bookings.clone(),
                rooms.clone(),
                itineraries.clone(),
            )),
            activity_queries: Arc::new(BookingQueryService::new(
                activity_bookings.clone(),
                activities.clone(),
                itineraries.clone(),
            )),
            availability: Arc::new(AvailabilityQueryService::new(
                rooms.clone(),
                rooms.clone(),
                activities.clone(),
                accommodation_bookings.clone(),
                activity_bookings.clone(),
                occupancy,
            )),
            itinerary_service: Arc::new(ItineraryService::new(
                itineraries.clone(),
                aggregator.clone(),
                planner,
                logger,
            )),
            itineraries,
            rooms,
            activities,
            accommodation_bookings,
            activity_bookings,
            aggregator,
        }
    }

    /// 訪問者と空の旅程を作成する
    pub async fn visitor_with_itinerary(&self) -> (Caller, ItineraryId) {
        let caller = Caller::visitor(UserId::new());
        let itinerary = self
            .itinerary_service
            .create(&caller)
            .await
            .expect("旅程の作成に失敗");
        (caller, itinerary.id())
    }

    /// 宿泊施設とそれに属する客室タイプを登録する
    pub async fn add_room(&self, availability: u32, guests_per_room: u32, price_cents: i64) -> Room {
        self.add_room_in(Some(ActivityId::new()), availability, guests_per_room, price_cents)
            .await
    }

    pub async fn add_room_in(
        &self,
        accommodation: Option<ActivityId>,
        availability: u32,
        guests_per_room: u32,
        price_cents: i64,
    ) -> Room {
        let room = Room::new(
            RoomId::new(),
            accommodation,
            UserId::new(),
            "doppia".to_string(),
            Money::eur(price_cents),
            availability,
            guests_per_room,
        );
        self.rooms.insert(room.clone()).await;
        room
    }

    pub async fn add_activity(
        &self,
        category: ActivityCategory,
        availability: u32,
        price_cents: i64,
    ) -> Activity {
        let activity = Activity::new(
            ActivityId::new(),
            UserId::new(),
            "escursione sul Vesuvio".to_string(),
            category,
            Money::eur(price_cents),
            availability,
        );
        self.activities.insert(activity.clone()).await;
        activity
    }

    pub async fn itinerary_total(&self, id: ItineraryId) -> i64 {
        self.itineraries
            .find_by_id(id)
            .await
            .expect("旅程の取得に失敗")
            .expect("旅程が存在しない")
            .total()
            .amount()
    }
}

/// 2024年6月の指定日時（UTC）
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

pub fn stay_draft(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    adults: u32,
    children: Option<u32>,
    rooms: u32,
) -> BookingDraft {
    BookingDraft {
        start,
        end: Some(end),
        adults,
        children,
        rooms: Some(rooms),
    }
}

pub fn activity_draft(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    adults: u32,
    children: Option<u32>,
) -> BookingDraft {
    BookingDraft {
        start,
        end,
        adults,
        children,
        rooms: None,
    }
}
