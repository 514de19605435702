use crate::domain::model::BookingDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 予約作成用のリクエストDTO
/// `resource_id` は宿泊予約では客室ID、アクティビティ予約ではアクティビティID
#[derive(Serialize, Deserialize)]
pub struct CreateBookingRequest<R> {
    pub itinerary_id: Uuid,
    pub resource_id: R,
    #[serde(flatten)]
    pub draft: BookingDraft,
}

/// 予約確定用のリクエストDTO
/// 確定時に期間・人数・部屋数を改めて受け取る
pub type ConfirmBookingRequest = BookingDraft;

/// 予約一覧取得用のクエリパラメータ
/// いずれか1つを指定する（旅程 > 予約対象 > ステータスの順に優先）
#[derive(Deserialize)]
pub struct BookingListQueryParams<R> {
    pub itinerary_id: Option<Uuid>,
    pub resource_id: Option<R>,
    pub status: Option<String>,
}

/// 期間指定の空き状況照会パラメータ
#[derive(Deserialize)]
pub struct PeriodQueryParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 日付指定の空き状況照会パラメータ
#[derive(Deserialize)]
pub struct DateQueryParams {
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RoomId;

    #[test]
    fn test_create_booking_request_flattens_draft() {
        let room_id = RoomId::new();
        let json = serde_json::json!({
            "itinerary_id": Uuid::new_v4(),
            "resource_id": room_id,
            "start": "2024-06-01T14:00:00Z",
            "end": "2024-06-03T10:00:00Z",
            "adults": 2,
            "children": 1,
            "rooms": 1
        });

        let request: CreateBookingRequest<RoomId> = serde_json::from_value(json).unwrap();

        assert_eq!(request.resource_id, room_id);
        assert_eq!(request.draft.adults, 2);
        assert_eq!(request.draft.children, Some(1));
        assert_eq!(request.draft.rooms, Some(1));
        assert!(request.draft.end.is_some());
    }

    #[test]
    fn test_create_booking_request_optional_fields() {
        let json = serde_json::json!({
            "itinerary_id": Uuid::new_v4(),
            "resource_id": Uuid::new_v4(),
            "start": "2024-06-01T09:00:00Z",
            "adults": 3
        });

        let request: CreateBookingRequest<Uuid> = serde_json::from_value(json).unwrap();

        assert_eq!(request.draft.end, None);
        assert_eq!(request.draft.children, None);
        assert_eq!(request.draft.rooms, None);
    }

    #[test]
    fn test_create_booking_request_rejects_invalid_date() {
        let json = serde_json::json!({
            "itinerary_id": Uuid::new_v4(),
            "resource_id": Uuid::new_v4(),
            "start": "domani",
            "adults": 1
        });

        let result: Result<CreateBookingRequest<Uuid>, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }
}
