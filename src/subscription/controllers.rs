use crate::control::{ControllerError, Response};
use actix::Addr;
use actix_web::web::{Bytes, Data, Path};
use actix_web::{get, patch, post, HttpResponse};
use subsync_types::subscription::{self, service::SubscriptionService, CancelTarget};

#[get("/api/subscriptions")]
pub async fn list_subscriptions(subscription_service: Data<Addr<SubscriptionService>>) -> Response {
    let subscriptions = subscription_service
        .send(subscription::service::List)
        .await??;
    Ok(HttpResponse::Ok().json(&subscriptions))
}

#[get("/api/subscriptions/{id}")]
pub async fn get_subscription(
    path: Path<String>,
    subscription_service: Data<Addr<SubscriptionService>>,
) -> Response {
    let id = path.into_inner();
    if id.trim().is_empty() {
        return Err(ControllerError::InvalidInput {
            field: "id".to_string(),
            msg: "must not be empty".to_string(),
        });
    }
    let subscription = subscription_service
        .send(subscription::service::Get(id.into()))
        .await??
        .ok_or(ControllerError::NotFound)?;
    Ok(HttpResponse::Ok().json(&subscription))
}

#[post("/api/subscriptions")]
pub async fn create_subscription(subscription_service: Data<Addr<SubscriptionService>>) -> Response {
    let subscription = subscription_service
        .send(subscription::service::Create)
        .await??;
    Ok(HttpResponse::Ok().json(&subscription))
}

/// Answers with the cancelled record, or `null` when nothing matched.
#[patch("/api/subscriptions")]
pub async fn cancel_subscription(
    body: Bytes,
    subscription_service: Data<Addr<SubscriptionService>>,
) -> Response {
    let target = CancelTarget::from_body(&body);
    let subscription = subscription_service
        .send(subscription::service::Cancel(target))
        .await??;
    Ok(HttpResponse::Ok().json(&subscription))
}
