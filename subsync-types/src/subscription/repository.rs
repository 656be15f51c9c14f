use crate::subscription::{CancelTarget, Subscription};
use async_trait::async_trait;
use typesafe_repository::async_ops::{Add, Get, List};
use typesafe_repository::Repository;

/// Stores a new active subscription under an id no stored record carries.
///
/// Issuing the id and inserting the record happen as one step.
#[async_trait]
pub trait AddNext: Repository<Subscription> {
    async fn add_next(&self) -> Result<Subscription, Self::Error>;
}

/// Finds the first record matching `target` and cancels it as one step.
#[async_trait]
pub trait CancelMatching: Repository<Subscription> {
    async fn cancel_matching(
        &self,
        target: &CancelTarget,
    ) -> Result<Option<Subscription>, Self::Error>;
}

pub trait SubscriptionRepository:
    Repository<Subscription, Error = anyhow::Error>
    + Get<Subscription>
    + List<Subscription>
    + Add<Subscription>
    + AddNext
    + CancelMatching
    + Send
    + Sync
{
}
