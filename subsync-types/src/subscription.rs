use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use typesafe_repository::macros::Id;
use typesafe_repository::{GetIdentity, Identity, IdentityOf, RefIdentity};

pub mod repository;
pub mod service;

#[derive(
    Deref, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Display,
)]
pub struct SubscriptionId(pub String);

impl From<String> for SubscriptionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SubscriptionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[display("active")]
    Active,
    #[display("cancelled")]
    Cancelled,
}

#[derive(Id, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[Id(get_id, ref_id)]
pub struct Subscription {
    #[id]
    pub id: SubscriptionId,
    pub status: SubscriptionStatus,
}

impl Subscription {
    pub fn new(id: SubscriptionId) -> Self {
        Self {
            id,
            status: SubscriptionStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Moves an active subscription to `cancelled`.
    /// Returns `false` if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.status {
            SubscriptionStatus::Active => {
                self.status = SubscriptionStatus::Cancelled;
                true
            }
            SubscriptionStatus::Cancelled => false,
        }
    }
}

pub fn count_active<'a, I: IntoIterator<Item = &'a Subscription>>(subscriptions: I) -> usize {
    subscriptions.into_iter().filter(|s| s.is_active()).count()
}

/// Which record a cancellation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelTarget {
    Id(IdentityOf<Subscription>),
    FirstActive,
    /// An identifier no record can carry, e.g. a non-string JSON value.
    Nothing,
}

impl CancelTarget {
    pub fn matches(&self, subscription: &Subscription) -> bool {
        if !subscription.is_active() {
            return false;
        }
        match self {
            Self::Id(id) => subscription.id_ref() == id,
            Self::FirstActive => true,
            Self::Nothing => false,
        }
    }

    /// Reads a cancel request body.
    ///
    /// A body that isn't a JSON object, or whose `id` is absent or falsy
    /// (`null`, `""`, `0`, `false`), targets the first active record. Any other
    /// `id` is compared verbatim, so a non-string one matches nothing.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::FirstActive;
        }
        let value = match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Unable to parse cancel request body: {err}");
                return Self::FirstActive;
            }
        };
        let id = match value {
            Value::Object(mut fields) => fields.remove("id").unwrap_or(Value::Null),
            _ => {
                log::warn!("Cancel request body is not an object, ignoring it");
                return Self::FirstActive;
            }
        };
        match id {
            Value::String(id) => Some(SubscriptionId(id)).into(),
            id if is_falsy(&id) => Self::FirstActive,
            id => {
                log::debug!("Cancel request id {id} is not a string");
                Self::Nothing
            }
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// An empty id means "no identifier supplied".
impl From<Option<SubscriptionId>> for CancelTarget {
    fn from(id: Option<SubscriptionId>) -> Self {
        match id {
            Some(id) if !id.is_empty() => Self::Id(id),
            _ => Self::FirstActive,
        }
    }
}

/// Body of the cancel request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelRequest {
    #[serde(
        default,
        deserialize_with = "crate::empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<SubscriptionId>,
}

/// Issues time-derived ids that never repeat within the generator's lifetime.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> SubscriptionId {
        self.next_at(now_millis())
    }

    /// Skips ids for which `taken` holds, so seeded or foreign records never collide.
    pub fn next_free_id(&mut self, taken: impl Fn(&SubscriptionId) -> bool) -> SubscriptionId {
        self.next_free_at(now_millis(), taken)
    }

    fn next_at(&mut self, now: u64) -> SubscriptionId {
        let next = now.max(self.last.saturating_add(1));
        self.last = next;
        SubscriptionId(next.to_string())
    }

    fn next_free_at(
        &mut self,
        now: u64,
        taken: impl Fn(&SubscriptionId) -> bool,
    ) -> SubscriptionId {
        let mut id = self.next_at(now);
        while taken(&id) {
            id = self.next_at(now);
        }
        id
    }
}

fn now_millis() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
