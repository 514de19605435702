mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{activity_draft, at, stay_draft, TestContext};
use greentrails_booking::application::service::BookingRequest;
use greentrails_booking::domain::model::{ActivityCategory, BookableResource, Money, StayPeriod};
use greentrails_booking::domain::service::PricingEngine;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// 料金計算のプロパティベーステスト
proptest! {
    /// 期間が同じなら料金は数量に比例する
    #[test]
    fn test_price_is_linear_in_quantity(
        unit_cents in 1i64..100_000,
        quantity in 1u32..50,
        minutes in 0i64..(60 * 24 * 30),
    ) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let end = start + Duration::minutes(minutes);
        let unit = Money::eur(unit_cents);

        let single = PricingEngine::compute_price(unit, quantity, start, Some(end));
        let double = PricingEngine::compute_price(unit, quantity * 2, start, Some(end));

        prop_assert_eq!(double, single.multiply(2));
    }

    /// 24時間以内は倍率1、それを超えると24時間単位で切り上げた日数
    #[test]
    fn test_duration_multiplier_rounds_up_to_days(
        days in 1u32..30,
        extra_minutes in 1i64..(60 * 24),
    ) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let exact = start + Duration::days(i64::from(days));
        let over = exact + Duration::minutes(extra_minutes);

        prop_assert_eq!(PricingEngine::duration_multiplier(start, exact), days);
        prop_assert_eq!(PricingEngine::duration_multiplier(start, over), days + 1);
    }

    /// 48時間の料金は24時間以内の料金のちょうど2倍
    #[test]
    fn test_two_day_price_is_double(
        unit_cents in 1i64..100_000,
        quantity in 1u32..10,
        short_hours in 0i64..=24,
    ) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let unit = Money::eur(unit_cents);

        let short = PricingEngine::compute_price(unit, quantity, start, Some(start + Duration::hours(short_hours)));
        let two_days = PricingEngine::compute_price(unit, quantity, start, Some(start + Duration::hours(48)));

        prop_assert_eq!(two_days, short.multiply(2));
    }

    /// 期間の重なり判定は対称
    #[test]
    fn test_overlap_is_symmetric(
        a_start in 0i64..500,
        a_len in 0i64..100,
        b_start in 0i64..500,
        b_len in 0i64..100,
    ) {
        let origin = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let a = StayPeriod::new(
            origin + Duration::hours(a_start),
            Some(origin + Duration::hours(a_start + a_len)),
        ).unwrap();
        let b = StayPeriod::new(
            origin + Duration::hours(b_start),
            Some(origin + Duration::hours(b_start + b_len)),
        ).unwrap();

        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }
}

// 空き状況と旅程合計のプロパティベーステスト
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// 予約がなければ残りは常に総容量
    #[test]
    fn test_empty_room_has_full_capacity(
        availability in 1u32..50,
        start_day in 1u32..20,
        nights in 1u32..10,
    ) {
        let remaining = runtime().block_on(async {
            let ctx = TestContext::new();
            let room = ctx.add_room(availability, 2, 10000).await;
            ctx.availability
                .room(room.id(), at(start_day, 14), at(start_day + nights, 10))
                .await
                .unwrap()
        });

        prop_assert_eq!(remaining, i64::from(availability));
    }

    /// どの順で予約しても、どの日の占有部屋数も容量を超えない
    #[test]
    fn test_room_capacity_is_never_exceeded(
        availability in 1u32..6,
        requests in prop::collection::vec((1u32..10, 1u32..4, 1u32..4), 1..12),
    ) {
        let daily_remaining = runtime().block_on(async {
            let ctx = TestContext::new();
            let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;
            let room = ctx.add_room(availability, 4, 10000).await;

            for (day, nights, rooms) in requests {
                // 容量不足での失敗は想定内
                let _ = ctx
                    .accommodation_lifecycle
                    .create(
                        &caller,
                        BookingRequest {
                            itinerary_id,
                            resource_id: room.id(),
                            draft: stay_draft(at(day, 14), at(day + nights, 10), rooms, None, rooms),
                        },
                    )
                    .await;
            }

            let mut remaining = Vec::new();
            for day in 1..14 {
                remaining.push(
                    ctx.availability
                        .room(room.id(), at(day, 12), at(day, 13))
                        .await
                        .unwrap(),
                );
            }
            remaining
        });

        for remaining in daily_remaining {
            prop_assert!(remaining >= 0);
            prop_assert!(remaining <= i64::from(availability));
        }
    }

    /// 作成で加算、削除で減算した結果は残っている予約の価格の合計と一致する
    #[test]
    fn test_itinerary_total_tracks_live_bookings(
        participants in prop::collection::vec((1u32..4, any::<bool>()), 1..10),
    ) {
        let (total, expected) = runtime().block_on(async {
            let ctx = TestContext::new();
            let (caller, itinerary_id) = ctx.visitor_with_itinerary().await;
            let activity = ctx.add_activity(ActivityCategory::Tourist, 1000, 1500).await;

            let mut expected = 0;
            for (adults, keep) in participants {
                let booking = ctx
                    .activity_lifecycle
                    .create(
                        &caller,
                        BookingRequest {
                            itinerary_id,
                            resource_id: activity.id(),
                            draft: activity_draft(at(1, 9), None, adults, None),
                        },
                    )
                    .await
                    .unwrap();

                if keep {
                    expected += booking.price().amount();
                } else {
                    ctx.activity_lifecycle.delete(&caller, booking.id()).await.unwrap();
                }
            }

            (ctx.itinerary_total(itinerary_id).await, expected)
        });

        prop_assert_eq!(total, expected);
    }
}
