use derive_more::{Display, Error};
use std::time::Duration;

/// A rejected cache operation. The cache state is left as it was.
#[derive(Debug, Display, Error)]
pub enum TransportError {
    #[display("Request failed: {_0}")]
    Request(reqwest_middleware::Error),
    #[error(ignore)]
    #[display("Unexpected response status {_0}")]
    Status(reqwest::StatusCode),
    #[display("Malformed payload: {_0}")]
    Decode(serde_json::Error),
    #[error(ignore)]
    #[display("No response within {}ms", _0.as_millis())]
    Timeout(Duration),
    #[display("Subscription store is unreachable: {_0}")]
    Mailbox(actix::MailboxError),
    #[error(ignore)]
    #[display("Subscription store failed: {_0}")]
    Store(anyhow::Error),
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::Request(err)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(reqwest_middleware::Error::Reqwest(err))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}

impl From<actix::MailboxError> for TransportError {
    fn from(err: actix::MailboxError) -> Self {
        Self::Mailbox(err)
    }
}

impl From<anyhow::Error> for TransportError {
    fn from(err: anyhow::Error) -> Self {
        Self::Store(err)
    }
}
