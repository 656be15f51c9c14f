#![deny(clippy::unwrap_used)]

use actix::Addr;
use actix_web::web::{self, Data, ServiceConfig};
use subsync_types::subscription::service::SubscriptionService;

pub mod config;
pub mod control;
pub mod subscription;

/// Registers the subscription routes and their store on an actix-web app.
pub fn configure(
    subscription_service: Addr<SubscriptionService>,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(Data::new(subscription_service))
            .service(subscription::controllers::list_subscriptions)
            .service(subscription::controllers::get_subscription)
            .service(subscription::controllers::create_subscription)
            .service(subscription::controllers::cancel_subscription)
            .default_service(web::route().to(control::not_found));
    }
}
