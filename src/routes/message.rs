use actix_web::{web, HttpResponse};
use sea_orm::DatabaseConnection;

use super::{redirect, render};
use crate::auth::{deny, AuthUser, CurrentUser};
use crate::error::AppError;
use crate::forms::{FieldErrors, MessageForm};
use crate::session::{Level, Session};
use crate::store::messages::{self, Warble};
use crate::views::messages as message_views;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/messages/new")
            .route(web::get().to(new_message_form))
            .route(web::post().to(new_message)),
    )
    .service(web::resource("/messages/{id:\\d+}").route(web::get().to(show_message)))
    .service(web::resource("/messages/{id:\\d+}/delete").route(web::post().to(delete_message)))
    .service(web::resource("/messages/{id:\\d+}/like").route(web::post().to(toggle_like)));
}

async fn new_message_form(session: Session, auth: AuthUser) -> HttpResponse {
    render(&session, Some(&auth.0), |chrome| {
        message_views::new_message_page(chrome, &MessageForm::default(), &FieldErrors::default())
    })
}

async fn new_message(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    form: web::Form<MessageForm>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    if let Err(errors) = form.validate() {
        return Ok(render(&session, Some(&me), |chrome| {
            message_views::new_message_page(chrome, &form, &errors)
        }));
    }
    messages::create(db.get_ref(), me.id, form.text()).await?;
    Ok(redirect(format!("/users/{}", me.id)))
}

async fn show_message(
    db: web::Data<DatabaseConnection>,
    session: Session,
    current: CurrentUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let (msg, author) = find_message(db.get_ref(), *path).await?;
    let likes = messages::likes_for(db.get_ref(), msg.id).await?;
    let viewer = current.0.as_ref();
    let liked = viewer.map_or(false, |v| likes.iter().any(|l| l.user_id == v.id));

    Ok(render(&session, viewer, |chrome| {
        message_views::show_message_page(chrome, &msg, &author, liked, likes.len())
    }))
}

async fn delete_message(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let (msg, _) = find_message(db.get_ref(), *path).await?;
    if msg.user_id != me.id {
        return Err(deny(&session));
    }
    messages::delete(db.get_ref(), msg.id).await?;
    Ok(redirect(format!("/users/{}", me.id)))
}

async fn toggle_like(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let (msg, _) = find_message(db.get_ref(), *path).await?;
    if msg.user_id == me.id {
        session.flash(Level::Danger, "You cannot like your own warble.");
        return Ok(redirect("/"));
    }
    messages::toggle_like(db.get_ref(), me.id, msg.id).await?;
    Ok(redirect("/"))
}

async fn find_message(db: &DatabaseConnection, id: i32) -> Result<Warble, AppError> {
    messages::find(db, id).await?.ok_or(AppError::NotFound)
}
