use crate::domain::model::Money;
use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
const HOURS_PER_DAY: i64 = 24;

/// 料金計算エンジン
/// 副作用のない決定的な計算のみを行う
pub struct PricingEngine;

impl PricingEngine {
    /// 予約料金を計算する
    /// 料金 = 単価 × 数量 × 期間倍率
    ///
    /// # Arguments
    /// * `unit_price` - 単価
    /// * `quantity` - 宿泊は部屋数、アクティビティは大人+子供の人数
    /// * `start` - 開始日時
    /// * `end` - 終了日時（省略時は倍率1）
    ///
    /// # Returns
    /// * 計算された料金
    pub fn compute_price(
        unit_price: Money,
        quantity: u32,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Money {
        let base = unit_price.multiply(quantity);
        match end {
            Some(end) => base.multiply(Self::duration_multiplier(start, end)),
            None => base,
        }
    }

    /// 期間倍率を計算する
    /// 時間数を切り上げ、24時間を超える場合は24時間単位で切り上げた日数
    pub fn duration_multiplier(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
        let millis = (end - start).num_milliseconds().max(0);
        let hours = (millis + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
        if hours > HOURS_PER_DAY {
            let days = (hours + HOURS_PER_DAY - 1) / HOURS_PER_DAY;
            u32::try_from(days).unwrap_or(u32::MAX)
        } else {
            1
        }
    }
}
