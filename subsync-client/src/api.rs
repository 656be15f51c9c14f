use crate::config::ClientOptions;
use crate::error::TransportError;
use actix::Addr;
use anyhow::Context as AnyhowContext;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use subsync_types::subscription::service::{self, SubscriptionService};
use subsync_types::subscription::{CancelRequest, Subscription, SubscriptionId};

/// Request/response exchange with the subscription store.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscription>, TransportError>;
    async fn create(&self) -> Result<Subscription, TransportError>;
    /// `Ok(None)` means no active record matched.
    async fn cancel(&self, id: Option<SubscriptionId>)
        -> Result<Option<Subscription>, TransportError>;
}

pub struct HttpSubscriptionApi {
    endpoint: reqwest::Url,
    reads: ClientWithMiddleware,
    writes: ClientWithMiddleware,
}

impl HttpSubscriptionApi {
    pub fn new(options: &ClientOptions) -> Result<Self, anyhow::Error> {
        let endpoint = format!(
            "{}/api/subscriptions",
            options.base_url.trim_end_matches('/')
        )
        .parse::<reqwest::Url>()
        .context(format!("Invalid subscription API url {}", options.base_url))?;
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.read_retries);
        let reads = ClientBuilder::new(client.clone())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let writes = ClientBuilder::new(client).build();
        Ok(Self {
            endpoint,
            reads,
            writes,
        })
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, TransportError> {
    let status = res.status();
    if !status.is_success() {
        return Err(TransportError::Status(status));
    }
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl SubscriptionApi for HttpSubscriptionApi {
    async fn list(&self) -> Result<Vec<Subscription>, TransportError> {
        let res = self.reads.get(self.endpoint.clone()).send().await?;
        read_json(res).await
    }

    async fn create(&self) -> Result<Subscription, TransportError> {
        let res = self.writes.post(self.endpoint.clone()).send().await?;
        read_json(res).await
    }

    async fn cancel(
        &self,
        id: Option<SubscriptionId>,
    ) -> Result<Option<Subscription>, TransportError> {
        let body = serde_json::to_vec(&CancelRequest { id })?;
        let res = self
            .writes
            .patch(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await?;
        read_json(res).await
    }
}

/// Talks to a store actor running in the same process.
#[derive(Clone)]
pub struct ServiceSubscriptionApi {
    service: Addr<SubscriptionService>,
}

impl ServiceSubscriptionApi {
    pub fn new(service: Addr<SubscriptionService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SubscriptionApi for ServiceSubscriptionApi {
    async fn list(&self) -> Result<Vec<Subscription>, TransportError> {
        Ok(self.service.send(service::List).await??)
    }

    async fn create(&self) -> Result<Subscription, TransportError> {
        Ok(self.service.send(service::Create).await??)
    }

    async fn cancel(
        &self,
        id: Option<SubscriptionId>,
    ) -> Result<Option<Subscription>, TransportError> {
        Ok(self.service.send(service::Cancel(id.into())).await??)
    }
}
