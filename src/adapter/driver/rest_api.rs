use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driver::request_dto::{
    BookingListQueryParams, ConfirmBookingRequest, CreateBookingRequest, DateQueryParams,
    PeriodQueryParams,
};
use crate::adapter::driver::response_dto::{
    AvailabilityResponse, BookingResponse, DeletionResponse, ItineraryResponse, TotalCheckResponse,
};
use crate::application::service::{
    AvailabilityQueryService, BookingLifecycleManager, BookingQueryService, BookingRequest,
    ItineraryService,
};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    ActivityId, ActivitySlot, BookingId, BookingKind, BookingStatus, Caller, ItineraryId, Role,
    RoomId, RoomStay, UserId,
};

/// 呼び出し元の利用者IDを運ぶヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";
/// 呼び出し元のロールを運ぶヘッダー（省略時は訪問者）
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: error.into(),
            code: code.to_string(),
        }),
    )
}

/// 旅程と空き状況のサービスを含む状態
#[derive(Clone)]
pub struct AppState {
    pub itinerary_service: Arc<ItineraryService>,
    pub availability_service: Arc<AvailabilityQueryService>,
}

/// 予約種別ごとのサービスを含む状態
pub struct BookingState<K: BookingKind> {
    pub lifecycle: Arc<BookingLifecycleManager<K>>,
    pub queries: Arc<BookingQueryService<K>>,
}

impl<K: BookingKind> Clone for BookingState<K> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
            queries: Arc::clone(&self.queries),
        }
    }
}

/// ヘッダーから取り出した呼び出し元
/// 認証自体は前段のゲートウェイで済んでいるものとする
pub struct AuthenticatedCaller(pub Caller);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedCaller {
    type Rejection = (StatusCode, Json<ApiError>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER)
            .and_then(|raw| UserId::from_string(&raw).ok())
            .ok_or_else(|| {
                api_error(
                    StatusCode::UNAUTHORIZED,
                    "利用者IDが指定されていないか不正です",
                    "UNAUTHENTICATED",
                )
            })?;

        let role = match header(USER_ROLE_HEADER) {
            Some(raw) => Role::from_string(&raw)
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string(), "INVALID_ROLE"))?,
            None => Role::Visitor,
        };

        Ok(Self(Caller::new(user_id, role)))
    }
}

// REST APIルーターを作成
pub fn create_router(
    state: AppState,
    accommodation_bookings: BookingState<RoomStay>,
    activity_bookings: BookingState<ActivitySlot>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/itineraries", post(create_itinerary).get(list_itineraries))
        .route("/itineraries/plan", post(plan_itinerary))
        .route(
            "/itineraries/:itinerary_id",
            get(get_itinerary).delete(delete_itinerary),
        )
        .route(
            "/itineraries/:itinerary_id/total-check",
            get(check_itinerary_total),
        )
        .route("/rooms/:room_id/availability", get(room_availability))
        .route(
            "/accommodations/:activity_id/availability",
            get(accommodation_availability),
        )
        .route(
            "/activities/:activity_id/availability",
            get(activity_availability),
        )
        .with_state(state)
        .nest(
            "/accommodation-bookings",
            booking_routes(accommodation_bookings),
        )
        .nest("/activity-bookings", booking_routes(activity_bookings))
}

/// 予約種別ごとのルーター
/// 宿泊予約とアクティビティ予約で同じハンドラーを共有する
fn booking_routes<K: BookingKind>(state: BookingState<K>) -> Router {
    Router::new()
        .route("/", post(create_booking::<K>).get(list_bookings::<K>))
        .route(
            "/:booking_id",
            get(get_booking::<K>).delete(delete_booking::<K>),
        )
        .route("/:booking_id/confirm", post(confirm_booking::<K>))
        .with_state(state)
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "greentrails-booking",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// 旅程作成エンドポイント
async fn create_itinerary(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> ApiResult<(StatusCode, Json<ItineraryResponse>)> {
    let itinerary = state
        .itinerary_service
        .create(&caller)
        .await
        .map_err(map_application_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ItineraryResponse::from_itinerary(&itinerary)),
    ))
}

// 旅程一覧取得エンドポイント
async fn list_itineraries(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> ApiResult<Json<Vec<ItineraryResponse>>> {
    let itineraries = state
        .itinerary_service
        .list(&caller)
        .await
        .map_err(map_application_error)?;
    Ok(Json(
        itineraries
            .iter()
            .map(ItineraryResponse::from_itinerary)
            .collect(),
    ))
}

// 旅程の自動作成エンドポイント
async fn plan_itinerary(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> ApiResult<(StatusCode, Json<ItineraryResponse>)> {
    let itinerary = state
        .itinerary_service
        .plan(&caller)
        .await
        .map_err(map_application_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ItineraryResponse::from_itinerary(&itinerary)),
    ))
}

// 旅程詳細取得エンドポイント
async fn get_itinerary(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(itinerary_id): Path<Uuid>,
) -> ApiResult<Json<ItineraryResponse>> {
    let itinerary = state
        .itinerary_service
        .find(&caller, ItineraryId::from_uuid(itinerary_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(ItineraryResponse::from_itinerary(&itinerary)))
}

// 旅程削除エンドポイント（予約も合わせて削除）
async fn delete_itinerary(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(itinerary_id): Path<Uuid>,
) -> ApiResult<Json<DeletionResponse>> {
    let deleted = state
        .itinerary_service
        .delete(&caller, ItineraryId::from_uuid(itinerary_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(DeletionResponse { deleted }))
}

// 旅程合計の検証エンドポイント
async fn check_itinerary_total(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(itinerary_id): Path<Uuid>,
) -> ApiResult<Json<TotalCheckResponse>> {
    let check = state
        .itinerary_service
        .check_total(&caller, ItineraryId::from_uuid(itinerary_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(TotalCheckResponse::from_check(
        itinerary_id.to_string(),
        &check,
    )))
}

// 客室の空き状況エンドポイント
async fn room_availability(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    query: Result<Query<PeriodQueryParams>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let Query(params) = query.map_err(invalid_query)?;
    let remaining = state
        .availability_service
        .room(RoomId::from_uuid(room_id), params.start, params.end)
        .await
        .map_err(map_application_error)?;
    Ok(Json(AvailabilityResponse {
        resource_id: room_id.to_string(),
        remaining,
    }))
}

// 宿泊施設全体の空き状況エンドポイント
async fn accommodation_availability(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    query: Result<Query<PeriodQueryParams>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let Query(params) = query.map_err(invalid_query)?;
    let remaining = state
        .availability_service
        .accommodation(ActivityId::from_uuid(activity_id), params.start, params.end)
        .await
        .map_err(map_application_error)?;
    Ok(Json(AvailabilityResponse {
        resource_id: activity_id.to_string(),
        remaining,
    }))
}

// 体験アクティビティの空き状況エンドポイント
async fn activity_availability(
    State(state): State<AppState>,
    Path(activity_id): Path<Uuid>,
    query: Result<Query<DateQueryParams>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let Query(params) = query.map_err(invalid_query)?;
    let remaining = state
        .availability_service
        .activity(ActivityId::from_uuid(activity_id), params.date)
        .await
        .map_err(map_application_error)?;
    Ok(Json(AvailabilityResponse {
        resource_id: activity_id.to_string(),
        remaining,
    }))
}

// 予約作成エンドポイント
async fn create_booking<K: BookingKind>(
    State(state): State<BookingState<K>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<CreateBookingRequest<K::ResourceId>>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let request = BookingRequest {
        itinerary_id: ItineraryId::from_uuid(request.itinerary_id),
        resource_id: request.resource_id,
        draft: request.draft,
    };
    let booking = state
        .lifecycle
        .create(&caller, request)
        .await
        .map_err(map_application_error)?;
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse::from_booking(&booking)),
    ))
}

// 予約一覧取得エンドポイント
async fn list_bookings<K: BookingKind>(
    State(state): State<BookingState<K>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    query: Result<
        Query<BookingListQueryParams<K::ResourceId>>,
        axum::extract::rejection::QueryRejection,
    >,
) -> ApiResult<Json<Vec<BookingResponse>>> {
    let Query(params) = query.map_err(invalid_query)?;

    let bookings = if let Some(itinerary_id) = params.itinerary_id {
        state
            .queries
            .list_by_itinerary(&caller, ItineraryId::from_uuid(itinerary_id))
            .await
    } else if let Some(resource_id) = params.resource_id {
        state.queries.list_for_resource(&caller, resource_id).await
    } else if let Some(status_str) = params.status {
        let status = BookingStatus::from_string(&status_str).map_err(|_| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("無効なステータス値: {}", status_str),
                "INVALID_STATUS",
            )
        })?;
        state.queries.list_by_status(&caller, status).await
    } else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "itinerary_id、resource_id、statusのいずれかを指定してください",
            "MISSING_FILTER",
        ));
    }
    .map_err(map_application_error)?;

    Ok(Json(
        bookings.iter().map(BookingResponse::from_booking).collect(),
    ))
}

// 予約詳細取得エンドポイント
async fn get_booking<K: BookingKind>(
    State(state): State<BookingState<K>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .queries
        .find_by_id(&caller, BookingId::from_uuid(booking_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

// 予約確定エンドポイント
async fn confirm_booking<K: BookingKind>(
    State(state): State<BookingState<K>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<ConfirmBookingRequest>,
) -> ApiResult<Json<BookingResponse>> {
    let booking = state
        .lifecycle
        .confirm(&caller, BookingId::from_uuid(booking_id), request)
        .await
        .map_err(map_application_error)?;
    Ok(Json(BookingResponse::from_booking(&booking)))
}

// 予約削除エンドポイント
async fn delete_booking<K: BookingKind>(
    State(state): State<BookingState<K>>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<Json<DeletionResponse>> {
    let deleted = state
        .lifecycle
        .delete(&caller, BookingId::from_uuid(booking_id))
        .await
        .map_err(map_application_error)?;
    Ok(Json(DeletionResponse { deleted }))
}

fn invalid_query(_: axum::extract::rejection::QueryRejection) -> (StatusCode, Json<ApiError>) {
    api_error(
        StatusCode::BAD_REQUEST,
        "無効なクエリパラメータです",
        "INVALID_PARAMETER",
    )
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            repo_err.to_string(),
            "REPOSITORY_ERROR",
        ),
        ApplicationError::NotFound(msg) => api_error(StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
        ApplicationError::Forbidden(msg) => api_error(StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    let message = domain_err.to_string();
    match domain_err {
        DomainError::InvalidInput(_) => {
            api_error(StatusCode::BAD_REQUEST, message, "INVALID_INPUT")
        }
        DomainError::InvalidDateRange => {
            api_error(StatusCode::BAD_REQUEST, message, "INVALID_DATE_RANGE")
        }
        DomainError::CapacityExceeded { .. } => {
            api_error(StatusCode::BAD_REQUEST, message, "CAPACITY_EXCEEDED")
        }
        DomainError::ResourceUnavailable { .. } => {
            api_error(StatusCode::BAD_REQUEST, message, "RESOURCE_UNAVAILABLE")
        }
        DomainError::NotModifiable(_) => {
            api_error(StatusCode::BAD_REQUEST, message, "NOT_MODIFIABLE")
        }
        DomainError::InvalidQuantity => {
            api_error(StatusCode::BAD_REQUEST, message, "INVALID_QUANTITY")
        }
        DomainError::CurrencyMismatch => {
            api_error(StatusCode::BAD_REQUEST, message, "CURRENCY_MISMATCH")
        }
        DomainError::InvalidValue(_) => {
            api_error(StatusCode::BAD_REQUEST, message, "INVALID_VALUE")
        }
        DomainError::NotFound(_) => api_error(StatusCode::NOT_FOUND, message, "NOT_FOUND"),
        DomainError::InvalidResourceKind(_) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INVALID_RESOURCE_KIND",
        ),
        DomainError::Persistence(_) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "PERSISTENCE_FAILURE",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::port::RepositoryError;

    #[test]
    fn test_map_application_error_not_found() {
        let app_error = ApplicationError::NotFound("旅程が見つかりません".to_string());
        let (status, Json(api_error)) = map_application_error(app_error);

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code, "NOT_FOUND");
        assert_eq!(api_error.error, "旅程が見つかりません");
    }

    #[test]
    fn test_map_application_error_forbidden() {
        let (status, Json(api_error)) =
            map_application_error(ApplicationError::Forbidden("他人の旅程です".to_string()));

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(api_error.code, "FORBIDDEN");
    }

    #[test]
    fn test_map_application_error_repository() {
        let (status, Json(api_error)) = map_application_error(ApplicationError::RepositoryError(
            RepositoryError::OperationFailed("接続断".to_string()),
        ));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.code, "REPOSITORY_ERROR");
    }

    #[test]
    fn test_map_domain_error_validation_is_bad_request() {
        let errors = vec![
            DomainError::InvalidInput("0人".to_string()),
            DomainError::InvalidDateRange,
            DomainError::CapacityExceeded {
                requested: 5,
                capacity: 4,
            },
            DomainError::ResourceUnavailable {
                requested: 3,
                remaining: 1,
            },
            DomainError::NotModifiable("確定済み".to_string()),
            DomainError::InvalidQuantity,
        ];

        for error in errors {
            let (status, _) = map_domain_error(error);
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_map_domain_error_invalid_resource_kind_is_server_error() {
        let (status, Json(api_error)) =
            map_domain_error(DomainError::InvalidResourceKind("宿泊施設".to_string()));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.code, "INVALID_RESOURCE_KIND");
    }

    #[test]
    fn test_map_domain_error_not_found() {
        let (status, Json(api_error)) =
            map_domain_error(DomainError::NotFound("旅程が見つかりません".to_string()));

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code, "NOT_FOUND");
    }

    #[test]
    fn test_api_error_structure() {
        let api_error = ApiError {
            error: "テストエラー".to_string(),
            code: "TEST_ERROR".to_string(),
        };

        let json = serde_json::to_string(&api_error).unwrap();
        let deserialized: ApiError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.error, "テストエラー");
        assert_eq!(deserialized.code, "TEST_ERROR");
    }
}
