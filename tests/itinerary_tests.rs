mod common;

use common::{activity_draft, at, stay_draft, TestContext};
use greentrails_booking::application::service::BookingRequest;
use greentrails_booking::application::ApplicationError;
use greentrails_booking::domain::error::DomainError;
use greentrails_booking::domain::model::{
    ActivityCategory, BookableResource, BookingStatus, Caller, Itinerary, ItineraryId,
    ItineraryStatus, Money, Role, UserId,
};
use greentrails_booking::domain::port::{BookingRepository, ItineraryRepository};
use std::sync::Arc;

#[tokio::test]
async fn test_only_visitors_create_itineraries() {
    let ctx = TestContext::new();
    let visitor = Caller::visitor(UserId::new());

    let itinerary = ctx.itinerary_service.create(&visitor).await.unwrap();
    assert_eq!(itinerary.total(), Money::zero());
    assert_eq!(itinerary.status(), ItineraryStatus::Planned);
    assert_eq!(itinerary.visitor(), visitor.user_id());

    let manager = Caller::new(UserId::new(), Role::ActivityManager);
    let result = ctx.itinerary_service.create(&manager).await;
    assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
}

#[tokio::test]
async fn test_itinerary_visibility() {
    let ctx = TestContext::new();
    let (owner, itinerary_id) = ctx.visitor_with_itinerary().await;
    let (other, _) = ctx.visitor_with_itinerary().await;
    let admin = Caller::new(UserId::new(), Role::Administrator);

    assert!(ctx.itinerary_service.find(&owner, itinerary_id).await.is_ok());
    assert!(ctx.itinerary_service.find(&admin, itinerary_id).await.is_ok());
    assert!(matches!(
        ctx.itinerary_service.find(&other, itinerary_id).await,
        Err(ApplicationError::Forbidden(_))
    ));

    let mine = ctx.itinerary_service.list(&owner).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id(), itinerary_id);
}

#[tokio::test]
async fn test_plan_creates_unconfirmed_bookings() {
    let ctx = TestContext::new();
    for _ in 0..5 {
        ctx.add_activity(ActivityCategory::Tourist, 20, 3000).await;
    }
    ctx.add_activity(ActivityCategory::Accommodation, 0, 0).await;
    let room = ctx.add_room(4, 2, 9000).await;
    ctx.add_room_in(None, 4, 2, 9000).await;
    let visitor = Caller::visitor(UserId::new());

    let itinerary = ctx.itinerary_service.plan(&visitor).await.unwrap();

    assert_eq!(itinerary.visitor(), visitor.user_id());
    assert_eq!(ctx.itinerary_total(itinerary.id()).await, 0);

    let activities = ctx
        .activity_bookings
        .find_by_itinerary(itinerary.id())
        .await
        .unwrap();
    assert_eq!(activities.len(), 3);
    assert!(activities
        .iter()
        .all(|b| b.status() == BookingStatus::Unconfirmed && b.price() == Money::eur(3000)));

    let stays = ctx
        .accommodation_bookings
        .find_by_itinerary(itinerary.id())
        .await
        .unwrap();
    assert_eq!(stays.len(), 1);
    assert_eq!(stays[0].resource_id(), room.id());
    assert_eq!(stays[0].quantity(), 1);
    assert_eq!(stays[0].status(), BookingStatus::Unconfirmed);
}

#[tokio::test]
async fn test_plan_requires_visitor_role() {
    let ctx = TestContext::new();
    let admin = Caller::new(UserId::new(), Role::Administrator);

    let result = ctx.itinerary_service.plan(&admin).await;

    assert!(matches!(result, Err(ApplicationError::Forbidden(_))));
}

#[tokio::test]
async fn test_confirming_planned_booking_adds_to_total() {
    let ctx = TestContext::new();
    let activity = ctx.add_activity(ActivityCategory::Tourist, 20, 3000).await;
    let visitor = Caller::visitor(UserId::new());
    let itinerary = ctx.itinerary_service.plan(&visitor).await.unwrap();
    let planned = ctx
        .activity_bookings
        .find_by_resource(activity.id())
        .await
        .unwrap()
        .pop()
        .unwrap();

    let confirmed = ctx
        .activity_lifecycle
        .confirm(&visitor, planned.id(), activity_draft(at(20, 10), None, 2, Some(2)))
        .await
        .unwrap();

    assert_eq!(confirmed.price(), Money::eur(12000));
    assert_eq!(ctx.itinerary_total(itinerary.id()).await, 12000);
}

#[tokio::test]
async fn test_delete_itinerary_cascades_to_bookings() {
    let ctx = TestContext::new();
    let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;
    let (_, other_itinerary) = ctx.visitor_with_itinerary().await;
    let room = ctx.add_room(5, 2, 10000).await;
    let activity = ctx.add_activity(ActivityCategory::Tourist, 10, 2000).await;

    ctx.accommodation_lifecycle
        .create(
            &caller,
            BookingRequest {
                itinerary_id,
                resource_id: room.id(),
                draft: stay_draft(at(1, 14), at(2, 10), 2, None, 1),
            },
        )
        .await
        .unwrap();
    ctx.activity_lifecycle
        .create(
            &caller,
            BookingRequest {
                itinerary_id,
                resource_id: activity.id(),
                draft: activity_draft(at(1, 9), None, 1, None),
            },
        )
        .await
        .unwrap();

    let intruder = Caller::visitor(UserId::new());
    assert!(matches!(
        ctx.itinerary_service.delete(&intruder, itinerary_id).await,
        Err(ApplicationError::Forbidden(_))
    ));

    let deleted = ctx
        .itinerary_service
        .delete(&caller, itinerary_id)
        .await
        .unwrap();

    assert!(deleted);
    assert!(ctx.itineraries.find_by_id(itinerary_id).await.unwrap().is_none());
    assert_eq!(ctx.accommodation_bookings.len().await, 0);
    assert_eq!(ctx.activity_bookings.len().await, 0);
    assert!(ctx.itineraries.find_by_id(other_itinerary).await.unwrap().is_some());

    let again = ctx.itinerary_service.delete(&caller, itinerary_id).await;
    assert!(matches!(again, Err(ApplicationError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_itinerary_reports_false_when_it_survives() {
    let ctx = TestContext::new();
    let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;

    ctx.itineraries.ignore_deletes(true);
    let deleted = ctx
        .itinerary_service
        .delete(&caller, itinerary_id)
        .await
        .unwrap();

    assert!(!deleted);
    assert!(ctx.itineraries.find_by_id(itinerary_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_total_update_on_missing_itinerary_is_not_found() {
    let ctx = TestContext::new();

    let result = ctx.aggregator.add(ItineraryId::new(), Money::eur(1000)).await;

    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_total_check_reports_drift_without_rewriting() {
    let ctx = TestContext::new();
    let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;
    let activity = ctx.add_activity(ActivityCategory::Tourist, 10, 2000).await;
    ctx.activity_lifecycle
        .create(
            &caller,
            BookingRequest {
                itinerary_id,
                resource_id: activity.id(),
                draft: activity_draft(at(1, 9), None, 2, None),
            },
        )
        .await
        .unwrap();

    let check = ctx
        .itinerary_service
        .check_total(&caller, itinerary_id)
        .await
        .unwrap();
    assert!(check.is_consistent());
    assert_eq!(check.computed, Money::eur(4000));

    // 合計値だけを書き換えてずれを作る
    let drifted = Itinerary::reconstruct(
        itinerary_id,
        caller.user_id(),
        Money::eur(9999),
        ItineraryStatus::Planned,
    );
    ctx.itineraries.save(&drifted).await.unwrap();

    let check = ctx
        .itinerary_service
        .check_total(&caller, itinerary_id)
        .await
        .unwrap();
    assert!(!check.is_consistent());
    assert_eq!(check.stored, Money::eur(9999));
    assert_eq!(check.computed, Money::eur(4000));
    assert_eq!(ctx.itinerary_total(itinerary_id).await, 9999);
}

#[tokio::test]
async fn test_total_check_ignores_unconfirmed_bookings() {
    let ctx = TestContext::new();
    ctx.add_activity(ActivityCategory::Tourist, 20, 3000).await;
    ctx.add_room(4, 2, 9000).await;
    let visitor = Caller::visitor(UserId::new());
    let itinerary = ctx.itinerary_service.plan(&visitor).await.unwrap();

    let check = ctx
        .itinerary_service
        .check_total(&visitor, itinerary.id())
        .await
        .unwrap();

    assert!(check.is_consistent());
    assert_eq!(check.computed, Money::zero());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_keep_itinerary_total_exact() {
    let ctx = TestContext::new();
    let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let activity = ctx
            .add_activity(ActivityCategory::Tourist, 10, 1000 * (i + 1))
            .await;
        let lifecycle = Arc::clone(&ctx.activity_lifecycle);
        handles.push(tokio::spawn(async move {
            lifecycle
                .create(
                    &caller,
                    BookingRequest {
                        itinerary_id,
                        resource_id: activity.id(),
                        draft: activity_draft(at(1, 9), None, 1, None),
                    },
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 1000 + 2000 + ... + 10000
    assert_eq!(ctx.itinerary_total(itinerary_id).await, 55000);
    let check = ctx
        .itinerary_service
        .check_total(&caller, itinerary_id)
        .await
        .unwrap();
    assert!(check.is_consistent());
}
