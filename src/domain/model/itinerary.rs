use crate::domain::error::DomainError;
use crate::domain::model::{ItineraryId, ItineraryStatus, Money, UserId};

/// 旅程集約
/// 訪問者1人に属し、含まれる予約の合計金額を累積値として保持する
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    id: ItineraryId,
    visitor: UserId,
    total: Money,
    status: ItineraryStatus,
}

impl Itinerary {
    /// 新しい旅程を作成
    /// 合計は0、ステータスはPlanned
    pub fn new(id: ItineraryId, visitor: UserId) -> Self {
        Self {
            id,
            visitor,
            total: Money::zero(),
            status: ItineraryStatus::Planned,
        }
    }

    /// データベースから取得したデータで旅程を再構築
    pub fn reconstruct(
        id: ItineraryId,
        visitor: UserId,
        total: Money,
        status: ItineraryStatus,
    ) -> Self {
        Self {
            id,
            visitor,
            total,
            status,
        }
    }

    pub fn id(&self) -> ItineraryId {
        self.id
    }

    pub fn visitor(&self) -> UserId {
        self.visitor
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> ItineraryStatus {
        self.status
    }

    /// 指定した利用者の旅程か
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.visitor == user_id
    }

    /// 合計に加算
    pub fn add_to_total(&mut self, amount: Money) -> Result<(), DomainError> {
        self.total = self.total.add(&amount)?;
        Ok(())
    }

    /// 合計から減算
    pub fn subtract_from_total(&mut self, amount: Money) -> Result<(), DomainError> {
        self.total = self.total.subtract(&amount)?;
        Ok(())
    }
}
