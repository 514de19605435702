use greentrails_booking::adapter::driven::{
    MySqlAccommodationBookingRepository, MySqlActivityBookingRepository, MySqlActivityRepository,
    MySqlItineraryRepository, MySqlRoomRepository, RandomItineraryPlanner, TracingLogger,
};
use greentrails_booking::adapter::driver::{create_router, AppState, BookingState};
use greentrails_booking::adapter::{DatabaseConfig, DatabaseMigration, ServerConfig};
use greentrails_booking::application::service::{
    AvailabilityQueryService, BookingLifecycleManager, BookingQueryService, ItineraryService,
};
use greentrails_booking::domain::model::{ActivitySlot, RoomStay};
use greentrails_booking::domain::port::{
    BookingRepository, ItineraryRepository, Logger, ResourceRepository,
};
use greentrails_booking::domain::service::ItineraryAggregator;

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("GreenTrails 予約サービスを起動します");

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    tracing::info!(host = %config.host, port = config.port, "データベース設定を読み込みました");

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.connection_string())
        .await?;
    tracing::info!("データベース接続プールを作成しました");

    // マイグレーションを実行
    DatabaseMigration::new(pool.clone()).run().await?;

    // MySQLリポジトリを作成
    let itinerary_repository = Arc::new(MySqlItineraryRepository::new(pool.clone()));
    let room_repository = Arc::new(MySqlRoomRepository::new(pool.clone()));
    let activity_repository = Arc::new(MySqlActivityRepository::new(pool.clone()));
    let accommodation_booking_repository =
        Arc::new(MySqlAccommodationBookingRepository::new(pool.clone()));
    let activity_booking_repository = Arc::new(MySqlActivityBookingRepository::new(pool.clone()));

    let itineraries: Arc<dyn ItineraryRepository> = itinerary_repository;
    let rooms: Arc<dyn ResourceRepository<RoomStay>> = room_repository.clone();
    let activities: Arc<dyn ResourceRepository<ActivitySlot>> = activity_repository;
    let accommodation_bookings: Arc<dyn BookingRepository<RoomStay>> =
        accommodation_booking_repository.clone();
    let activity_bookings: Arc<dyn BookingRepository<ActivitySlot>> = activity_booking_repository;
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());

    // 旅程合計の集約（予約の作成・確定・削除で共有する）
    let aggregator = Arc::new(ItineraryAggregator::new(
        itineraries.clone(),
        accommodation_bookings.clone(),
        activity_bookings.clone(),
    ));

    let planner = Arc::new(RandomItineraryPlanner::new(
        itineraries.clone(),
        rooms.clone(),
        activities.clone(),
        accommodation_bookings.clone(),
        activity_bookings.clone(),
    ));

    // アプリケーションサービスを作成
    let app_state = AppState {
        itinerary_service: Arc::new(ItineraryService::new(
            itineraries.clone(),
            aggregator.clone(),
            planner,
            logger.clone(),
        )),
        availability_service: Arc::new(AvailabilityQueryService::new(
            rooms.clone(),
            room_repository,
            activities.clone(),
            accommodation_bookings.clone(),
            activity_bookings.clone(),
            accommodation_booking_repository,
        )),
    };

    let accommodation_state = BookingState {
        lifecycle: Arc::new(BookingLifecycleManager::new(
            accommodation_bookings.clone(),
            rooms.clone(),
            itineraries.clone(),
            aggregator.clone(),
            logger.clone(),
        )),
        queries: Arc::new(BookingQueryService::new(
            accommodation_bookings,
            rooms,
            itineraries.clone(),
        )),
    };

    let activity_state = BookingState {
        lifecycle: Arc::new(BookingLifecycleManager::new(
            activity_bookings.clone(),
            activities.clone(),
            itineraries.clone(),
            aggregator,
            logger,
        )),
        queries: Arc::new(BookingQueryService::new(
            activity_bookings,
            activities,
            itineraries,
        )),
    };

    // REST APIルーターを作成
    let app = create_router(app_state, accommodation_state, activity_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    // サーバーを起動
    let server_config = ServerConfig::from_env()?;
    let listener = tokio::net::TcpListener::bind(server_config.bind_address()).await?;
    tracing::info!(address = %server_config.bind_address(), "REST APIサーバーが起動しました");

    axum::serve(listener, app).await?;

    Ok(())
}
