pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod forms;
pub mod routes;
pub mod session;
pub mod store;
pub mod views;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware, web, App,
};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::routes::{account, home, message, user};

/// The whole Warbler application, ready for `HttpServer` or
/// `actix_web::test::init_service`.
pub fn app(
    config: AppConfig,
    db: DatabaseConnection,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(db))
        .wrap(middleware::from_fn(session::session_handler))
        .wrap(middleware::from_fn(routes::no_cache::no_cache_handler))
        .wrap(middleware::Logger::default())
        .configure(home::config)
        .configure(account::config)
        .configure(user::config)
        .configure(message::config)
        .default_service(web::route().to(routes::not_found))
}
