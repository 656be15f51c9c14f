use crate::subscription::repository::{AddNext as _, CancelMatching as _, SubscriptionRepository};
use crate::subscription::{CancelTarget, Subscription};
use actix::prelude::*;
use std::sync::Arc;
use typesafe_repository::async_ops::{Get as _, List as _};
use typesafe_repository::IdentityOf;

/// Sole authority over subscription existence and status.
///
/// Each repository call holds the repository's own lock for the duration of
/// the read or mutation; ids are issued under that lock.
pub struct SubscriptionService {
    repository: Arc<dyn SubscriptionRepository>,
}

impl Actor for SubscriptionService {
    type Context = Context<Self>;
}

impl SubscriptionService {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }
}

#[derive(Message)]
#[rtype(result = "Result<Option<Subscription>, anyhow::Error>")]
pub struct Get(pub IdentityOf<Subscription>);

#[derive(Message)]
#[rtype(result = "Result<Vec<Subscription>, anyhow::Error>")]
pub struct List;

#[derive(Message)]
#[rtype(result = "Result<Subscription, anyhow::Error>")]
pub struct Create;

#[derive(Message)]
#[rtype(result = "Result<Option<Subscription>, anyhow::Error>")]
pub struct Cancel(pub CancelTarget);

impl Handler<Get> for SubscriptionService {
    type Result = ResponseActFuture<Self, Result<Option<Subscription>, anyhow::Error>>;

    fn handle(&mut self, Get(id): Get, _: &mut Context<Self>) -> Self::Result {
        let repo = self.repository.clone();
        Box::pin(
            async move {
                let res = repo.get_one(&id).await?;
                Ok(res)
            }
            .into_actor(self),
        )
    }
}

impl Handler<List> for SubscriptionService {
    type Result = ResponseActFuture<Self, Result<Vec<Subscription>, anyhow::Error>>;

    fn handle(&mut self, _: List, _: &mut Context<Self>) -> Self::Result {
        let repo = self.repository.clone();
        Box::pin(
            async move {
                let res = repo.list().await?;
                log::debug!("Listed {} subscriptions", res.len());
                Ok(res)
            }
            .into_actor(self),
        )
    }
}

impl Handler<Create> for SubscriptionService {
    type Result = ResponseActFuture<Self, Result<Subscription, anyhow::Error>>;

    fn handle(&mut self, _: Create, _: &mut Context<Self>) -> Self::Result {
        let repo = self.repository.clone();
        Box::pin(
            async move {
                let sub = repo.add_next().await?;
                log::info!("Created subscription {}", sub.id);
                Ok(sub)
            }
            .into_actor(self),
        )
    }
}

impl Handler<Cancel> for SubscriptionService {
    type Result = ResponseActFuture<Self, Result<Option<Subscription>, anyhow::Error>>;

    fn handle(&mut self, Cancel(target): Cancel, _: &mut Context<Self>) -> Self::Result {
        let repo = self.repository.clone();
        Box::pin(
            async move {
                let res = repo.cancel_matching(&target).await?;
                match &res {
                    Some(sub) => log::info!("Cancelled subscription {}", sub.id),
                    None => log::debug!("No active subscription matches {target:?}"),
                }
                Ok(res)
            }
            .into_actor(self),
        )
    }
}
