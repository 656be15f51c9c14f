use crate::api::SubscriptionApi;
use crate::config::DEFAULT_TIMEOUT;
use crate::error::TransportError;
use actix::prelude::*;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use subsync_types::subscription::{count_active, Subscription, SubscriptionId};

/// Local copy of the store's collection.
///
/// `loading` and the active count are derived on every read; nothing here is
/// updated alongside `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheState {
    data: Vec<Subscription>,
    pending_refreshes: usize,
}

impl CacheState {
    pub fn data(&self) -> &[Subscription] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Subscription> {
        self.data
    }

    /// True while at least one list fetch is outstanding.
    pub fn loading(&self) -> bool {
        self.pending_refreshes > 0
    }

    pub fn active_count(&self) -> usize {
        count_active(&self.data)
    }

    fn begin_refresh(&mut self) {
        self.pending_refreshes += 1;
    }

    fn end_refresh(&mut self) {
        self.pending_refreshes = self.pending_refreshes.saturating_sub(1);
    }

    fn replace_all(&mut self, data: Vec<Subscription>) {
        self.data = data;
    }

    fn append(&mut self, sub: Subscription) {
        // a refresh that landed first may already carry the record
        if !self.reconcile(&sub) {
            self.data.push(sub);
        }
    }

    /// Replaces the record with the same id in place.
    fn reconcile(&mut self, sub: &Subscription) -> bool {
        match self.data.iter_mut().find(|s| s.id == sub.id) {
            Some(local) => {
                *local = sub.clone();
                true
            }
            None => false,
        }
    }
}

/// Client-side replica of the subscription collection.
///
/// Requests run concurrently; each one reconciles `state` when its response
/// arrives, so the last response to land wins.
pub struct SubscriptionCache {
    api: Arc<dyn SubscriptionApi>,
    state: CacheState,
    timeout: Duration,
}

impl Actor for SubscriptionCache {
    type Context = Context<Self>;
}

impl SubscriptionCache {
    pub fn new(api: Arc<dyn SubscriptionApi>) -> Self {
        Self {
            api,
            state: CacheState::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn bounded<T, F>(timeout: Duration, request: F) -> impl Future<Output = Result<T, TransportError>>
where
    F: Future<Output = Result<T, TransportError>>,
{
    async move {
        tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }
}

#[derive(Message)]
#[rtype(result = "Result<(), TransportError>")]
pub struct Refresh;

#[derive(Message)]
#[rtype(result = "Result<Subscription, TransportError>")]
pub struct AddLocal;

#[derive(Message)]
#[rtype(result = "Result<Option<Subscription>, TransportError>")]
pub struct CancelLocal(pub Option<SubscriptionId>);

#[derive(Message)]
#[rtype(result = "usize")]
pub struct ActiveCount;

#[derive(Message)]
#[rtype(result = "CacheState")]
pub struct Snapshot;

impl Handler<Refresh> for SubscriptionCache {
    type Result = ResponseActFuture<Self, Result<(), TransportError>>;

    fn handle(&mut self, _: Refresh, _: &mut Context<Self>) -> Self::Result {
        self.state.begin_refresh();
        let api = self.api.clone();
        let request = bounded(self.timeout, async move { api.list().await });
        Box::pin(request.into_actor(self).map(|res, act, _| {
            act.state.end_refresh();
            match res {
                Ok(data) => {
                    log::debug!("Refreshed {} subscriptions", data.len());
                    act.state.replace_all(data);
                    Ok(())
                }
                Err(err) => {
                    log::warn!("Unable to refresh subscriptions: {err}");
                    Err(err)
                }
            }
        }))
    }
}

impl Handler<AddLocal> for SubscriptionCache {
    type Result = ResponseActFuture<Self, Result<Subscription, TransportError>>;

    fn handle(&mut self, _: AddLocal, _: &mut Context<Self>) -> Self::Result {
        let api = self.api.clone();
        let request = bounded(self.timeout, async move { api.create().await });
        Box::pin(request.into_actor(self).map(|res, act, _| {
            let sub = res.inspect_err(|err| log::warn!("Unable to add subscription: {err}"))?;
            act.state.append(sub.clone());
            Ok(sub)
        }))
    }
}

impl Handler<CancelLocal> for SubscriptionCache {
    type Result = ResponseActFuture<Self, Result<Option<Subscription>, TransportError>>;

    fn handle(&mut self, CancelLocal(id): CancelLocal, _: &mut Context<Self>) -> Self::Result {
        let api = self.api.clone();
        let request = bounded(self.timeout, async move { api.cancel(id).await });
        Box::pin(request.into_actor(self).map(|res, act, _| {
            let res = res.inspect_err(|err| log::warn!("Unable to cancel subscription: {err}"))?;
            match &res {
                Some(sub) => {
                    if !act.state.reconcile(sub) {
                        log::debug!("Cancelled subscription {} is not cached yet", sub.id);
                    }
                }
                None => log::debug!("Nothing to cancel"),
            }
            Ok(res)
        }))
    }
}

impl Handler<ActiveCount> for SubscriptionCache {
    type Result = MessageResult<ActiveCount>;

    fn handle(&mut self, _: ActiveCount, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.state.active_count())
    }
}

impl Handler<Snapshot> for SubscriptionCache {
    type Result = MessageResult<Snapshot>;

    fn handle(&mut self, _: Snapshot, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.state.clone())
    }
}
