use async_trait::async_trait;
use subsync_types::subscription::repository::{AddNext, CancelMatching, SubscriptionRepository};
use subsync_types::subscription::{CancelTarget, IdGenerator, Subscription, SubscriptionStatus};
use tokio::sync::Mutex;
use typesafe_repository::async_ops::{Add, Get, List};
use typesafe_repository::{IdentityOf, RefIdentity, Repository};

/// Insertion-ordered subscriptions held in process memory.
pub struct InMemorySubscriptionRepository {
    subscriptions: Mutex<Vec<Subscription>>,
    // only locked while `subscriptions` is held
    ids: Mutex<IdGenerator>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::with_subscriptions(vec![])
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
            ids: Mutex::new(IdGenerator::new()),
        }
    }

    /// One active and one cancelled record.
    pub fn seeded() -> Self {
        Self::with_subscriptions(vec![
            Subscription {
                id: "1".into(),
                status: SubscriptionStatus::Active,
            },
            Subscription {
                id: "2".into(),
                status: SubscriptionStatus::Cancelled,
            },
        ])
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository<Subscription> for InMemorySubscriptionRepository {
    type Error = anyhow::Error;
}

#[async_trait]
impl Get<Subscription> for InMemorySubscriptionRepository {
    async fn get_one(
        &self,
        id: &IdentityOf<Subscription>,
    ) -> Result<Option<Subscription>, Self::Error> {
        let subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions.iter().find(|s| s.id_ref() == id).cloned())
    }
}

#[async_trait]
impl List<Subscription> for InMemorySubscriptionRepository {
    async fn list(&self) -> Result<Vec<Subscription>, Self::Error> {
        Ok(self.subscriptions.lock().await.clone())
    }
}

#[async_trait]
impl Add<Subscription> for InMemorySubscriptionRepository {
    async fn add(&self, sub: Subscription) -> Result<(), Self::Error> {
        let mut subscriptions = self.subscriptions.lock().await;
        if subscriptions.iter().any(|s| s.id == sub.id) {
            return Err(anyhow::anyhow!("Subscription {} already exists", sub.id));
        }
        subscriptions.push(sub);
        Ok(())
    }
}

#[async_trait]
impl AddNext for InMemorySubscriptionRepository {
    async fn add_next(&self) -> Result<Subscription, Self::Error> {
        let mut subscriptions = self.subscriptions.lock().await;
        let id = self
            .ids
            .lock()
            .await
            .next_free_id(|id| subscriptions.iter().any(|s| s.id_ref() == id));
        let sub = Subscription::new(id);
        subscriptions.push(sub.clone());
        Ok(sub)
    }
}

#[async_trait]
impl CancelMatching for InMemorySubscriptionRepository {
    async fn cancel_matching(
        &self,
        target: &CancelTarget,
    ) -> Result<Option<Subscription>, Self::Error> {
        let mut subscriptions = self.subscriptions.lock().await;
        Ok(subscriptions
            .iter_mut()
            .find(|s| target.matches(s))
            .map(|s| {
                s.cancel();
                s.clone()
            }))
    }
}

impl SubscriptionRepository for InMemorySubscriptionRepository {}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use std::collections::HashSet;
    use std::sync::Arc;
    use subsync_types::subscription::service::{self, SubscriptionService};

    fn sub(id: &str, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: id.into(),
            status,
        }
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let repo = InMemorySubscriptionRepository::new();
        for id in ["c", "a", "b"] {
            repo.add(sub(id, SubscriptionStatus::Active))
                .await
                .expect("add");
        }
        let ids: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|s| s.id.0)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn add_rejects_duplicate_id() {
        let repo = InMemorySubscriptionRepository::seeded();
        assert!(repo
            .add(sub("1", SubscriptionStatus::Active))
            .await
            .is_err());
        assert_eq!(repo.list().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn cancel_by_id_is_idempotent() {
        let repo = InMemorySubscriptionRepository::seeded();
        let target = CancelTarget::Id("1".into());
        let cancelled = repo.cancel_matching(&target).await.expect("cancel");
        assert_eq!(cancelled, Some(sub("1", SubscriptionStatus::Cancelled)));
        let before = repo.list().await.expect("list");
        assert_eq!(repo.cancel_matching(&target).await.expect("cancel"), None);
        assert_eq!(repo.list().await.expect("list"), before);
    }

    #[tokio::test]
    async fn cancel_ignores_unknown_and_cancelled_ids() {
        let repo = InMemorySubscriptionRepository::seeded();
        let before = repo.list().await.expect("list");
        for id in ["2", "nonexistent"] {
            let res = repo
                .cancel_matching(&CancelTarget::Id(id.into()))
                .await
                .expect("cancel");
            assert_eq!(res, None);
        }
        assert_eq!(repo.list().await.expect("list"), before);
    }

    #[tokio::test]
    async fn cancel_without_id_picks_earliest_active() {
        let repo = InMemorySubscriptionRepository::with_subscriptions(vec![
            sub("x", SubscriptionStatus::Cancelled),
            sub("a", SubscriptionStatus::Active),
            sub("b", SubscriptionStatus::Active),
        ]);
        let first = repo
            .cancel_matching(&CancelTarget::FirstActive)
            .await
            .expect("cancel");
        assert_eq!(first.map(|s| s.id.0), Some("a".to_string()));
        let second = repo
            .cancel_matching(&CancelTarget::FirstActive)
            .await
            .expect("cancel");
        assert_eq!(second.map(|s| s.id.0), Some("b".to_string()));
        let none = repo
            .cancel_matching(&CancelTarget::FirstActive)
            .await
            .expect("cancel");
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn get_one_finds_by_id() {
        let repo = InMemorySubscriptionRepository::seeded();
        let found = repo.get_one(&"2".into()).await.expect("get");
        assert_eq!(found, Some(sub("2", SubscriptionStatus::Cancelled)));
        assert_eq!(repo.get_one(&"3".into()).await.expect("get"), None);
    }

    #[actix_rt::test]
    async fn service_issues_unique_ids() {
        let store =
            SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::seeded())).start();
        let mut ids = HashSet::new();
        for _ in 0..200 {
            let sub = store
                .send(service::Create)
                .await
                .expect("mailbox")
                .expect("create");
            assert!(sub.is_active());
            assert!(ids.insert(sub.id));
        }
        let listed = store
            .send(service::List)
            .await
            .expect("mailbox")
            .expect("list");
        assert_eq!(listed.len(), 202);
        let newest = ids.iter().max_by_key(|id| id.parse::<u64>().ok());
        assert_eq!(listed.last().map(|s| &s.id), newest);
    }

    #[tokio::test]
    async fn add_next_skips_ids_already_stored() {
        let mut clock = IdGenerator::new();
        let upcoming: Vec<_> = (0..50)
            .map(|_| Subscription::new(clock.next_id()))
            .collect();
        let repo = InMemorySubscriptionRepository::with_subscriptions(upcoming);
        for _ in 0..200 {
            repo.add_next().await.expect("add_next");
        }
        let listed = repo.list().await.expect("list");
        let unique: HashSet<_> = listed.iter().map(|s| &s.id).collect();
        assert_eq!(listed.len(), 250);
        assert_eq!(unique.len(), 250);
    }

    #[actix_rt::test]
    async fn services_sharing_a_store_never_collide() {
        let repo: Arc<dyn SubscriptionRepository> = Arc::new(InMemorySubscriptionRepository::new());
        let first = SubscriptionService::new(repo.clone()).start();
        let second = SubscriptionService::new(repo.clone()).start();
        let mut pending = Vec::new();
        for _ in 0..250 {
            pending.push(first.send(service::Create));
            pending.push(second.send(service::Create));
        }
        let mut ids = HashSet::new();
        for req in pending {
            let sub = req.await.expect("mailbox").expect("create");
            assert!(ids.insert(sub.id));
        }
        assert_eq!(repo.list().await.expect("list").len(), 500);
    }

    #[actix_rt::test]
    async fn service_cancel_twice_returns_none() {
        let store =
            SubscriptionService::new(Arc::new(InMemorySubscriptionRepository::new())).start();
        let created = store
            .send(service::Create)
            .await
            .expect("mailbox")
            .expect("create");
        let target = CancelTarget::Id(created.id.clone());
        let first = store
            .send(service::Cancel(target.clone()))
            .await
            .expect("mailbox")
            .expect("cancel");
        assert_eq!(first.map(|s| s.status), Some(SubscriptionStatus::Cancelled));
        let second = store
            .send(service::Cancel(target))
            .await
            .expect("mailbox")
            .expect("cancel");
        assert_eq!(second, None);
        let stored = store
            .send(service::Get(created.id))
            .await
            .expect("mailbox")
            .expect("get");
        assert_eq!(stored.map(|s| s.status), Some(SubscriptionStatus::Cancelled));
    }
}
