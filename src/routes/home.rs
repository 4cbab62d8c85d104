use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;

use super::render;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::session::Session;
use crate::store::{messages, users};
use crate::views::home as home_views;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(homepage)));
}

/// Landing page for visitors, timeline for logged-in users.
async fn homepage(
    db: web::Data<DatabaseConnection>,
    session: Session,
    current: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let Some(me) = current.0 else {
        return Ok(render(&session, None, home_views::anon_home_page));
    };

    let warbles = messages::timeline(db.get_ref(), me.id).await?;
    let liked: HashSet<i32> = messages::liked_ids(db.get_ref(), me.id).await?;
    let stats = users::stats(db.get_ref(), me.id).await?;

    Ok(render(&session, Some(&me), |chrome| {
        home_views::timeline_page(chrome, &me, &stats, &warbles, &liked)
    }))
}
