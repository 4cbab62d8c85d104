pub mod account;
pub mod home;
pub mod message;
pub mod no_cache;
pub mod user;

use actix_web::{http::header, http::StatusCode, HttpResponse};

use crate::auth::CurrentUser;
use crate::entity::user as user_entity;
use crate::session::Session;
use crate::views::{self, Chrome};

/// Renders a full page, consuming the pending flashes.
pub(crate) fn render<F>(session: &Session, user: Option<&user_entity::Model>, page: F) -> HttpResponse
where
    F: FnOnce(&Chrome<'_>) -> String,
{
    let flashes = session.take_flashes();
    let chrome = Chrome {
        user,
        flashes: &flashes,
    };
    HttpResponse::Ok()
        .content_type(views::HTML)
        .body(page(&chrome))
}

pub(crate) fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub async fn not_found(session: Session, current: CurrentUser) -> HttpResponse {
    let mut resp = render(&session, current.0.as_ref(), |chrome| {
        views::layout("Page not found", chrome, views::NOT_FOUND_BODY)
    });
    *resp.status_mut() = StatusCode::NOT_FOUND;
    resp
}
