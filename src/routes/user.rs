use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use log::info;
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use super::{redirect, render};
use crate::auth::{AuthUser, CurrentUser};
use crate::entity::user;
use crate::error::AppError;
use crate::forms::{EditProfileForm, FieldErrors};
use crate::session::{Level, Session};
use crate::store::{messages, users};
use crate::views::users::{self as user_views, Profile};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::get().to(list_users)))
        .service(
            web::resource("/users/profile")
                .route(web::get().to(edit_profile_form))
                .route(web::post().to(edit_profile)),
        )
        .service(web::resource("/users/delete").route(web::post().to(delete_user)))
        .service(web::resource("/users/follow/{id:\\d+}").route(web::post().to(follow)))
        .service(web::resource("/users/stop-following/{id:\\d+}").route(web::post().to(stop_following)))
        .service(web::resource("/users/{id:\\d+}").route(web::get().to(show_user)))
        .service(web::resource("/users/{id:\\d+}/following").route(web::get().to(show_following)))
        .service(web::resource("/users/{id:\\d+}/followers").route(web::get().to(show_followers)))
        .service(web::resource("/users/{id:\\d+}/likes").route(web::get().to(show_likes)));
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn list_users(
    db: web::Data<DatabaseConnection>,
    session: Session,
    current: CurrentUser,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let found = users::search(db.get_ref(), query.q.as_deref()).await?;
    let following = viewer_following(db.get_ref(), current.0.as_ref()).await?;
    Ok(render(&session, current.0.as_ref(), |chrome| {
        user_views::index_page(chrome, &found, &following)
    }))
}

async fn show_user(
    db: web::Data<DatabaseConnection>,
    session: Session,
    current: CurrentUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let target = find_user(db.get_ref(), *path).await?;
    let viewer = current.0.as_ref();
    let profile = load_profile(db.get_ref(), &target, viewer).await?;
    let own_messages = messages::for_user(db.get_ref(), target.id).await?;
    let liked = match viewer {
        Some(v) => messages::liked_ids(db.get_ref(), v.id).await?,
        None => HashSet::new(),
    };

    Ok(render(&session, viewer, |chrome| {
        let content = user_views::profile_messages(&target, &own_messages, chrome, &liked);
        user_views::profile_page(chrome, &profile, &format!("@{}", target.username), &content)
    }))
}

async fn show_following(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let target = find_user(db.get_ref(), *path).await?;
    let list = users::following(db.get_ref(), target.id).await?;
    follow_list_page(db.get_ref(), &session, &me, &target, &list, "Following").await
}

async fn show_followers(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let target = find_user(db.get_ref(), *path).await?;
    let list = users::followers(db.get_ref(), target.id).await?;
    follow_list_page(db.get_ref(), &session, &me, &target, &list, "Followers").await
}

async fn follow_list_page(
    db: &DatabaseConnection,
    session: &Session,
    me: &user::Model,
    target: &user::Model,
    list: &[user::Model],
    title: &str,
) -> Result<HttpResponse, AppError> {
    let profile = load_profile(db, target, Some(me)).await?;
    let following = viewer_following(db, Some(me)).await?;
    Ok(render(session, Some(me), |chrome| {
        let content = user_views::user_grid(list, chrome, &following);
        user_views::profile_page(chrome, &profile, title, &content)
    }))
}

async fn show_likes(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let target = find_user(db.get_ref(), *path).await?;
    let profile = load_profile(db.get_ref(), &target, Some(&me)).await?;
    let liked_warbles = messages::liked_by(db.get_ref(), target.id).await?;
    let my_likes = messages::liked_ids(db.get_ref(), me.id).await?;

    Ok(render(&session, Some(&me), |chrome| {
        let mut content = String::new();
        crate::views::messages::message_list(&mut content, &liked_warbles, Some(me.id), &my_likes);
        user_views::profile_page(chrome, &profile, "Likes", &content)
    }))
}

async fn follow(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let target = find_user(db.get_ref(), *path).await?;
    if target.id == me.id {
        session.flash(Level::Danger, "You cannot follow yourself.");
    } else {
        users::follow(db.get_ref(), me.id, target.id).await?;
    }
    Ok(redirect(format!("/users/{}/following", me.id)))
}

async fn stop_following(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    let target = find_user(db.get_ref(), *path).await?;
    users::unfollow(db.get_ref(), me.id, target.id).await?;
    Ok(redirect(format!("/users/{}/following", me.id)))
}

async fn edit_profile_form(session: Session, auth: AuthUser) -> HttpResponse {
    let me = auth.0;
    let form = EditProfileForm {
        username: Some(me.username.clone()),
        email: Some(me.email.clone()),
        image_url: Some(me.image_url.clone()),
        header_image_url: Some(me.header_image_url.clone()),
        bio: me.bio.clone(),
        location: me.location.clone(),
        password: None,
    };
    render(&session, Some(&me), |chrome| {
        user_views::edit_profile_page(chrome, &form, &FieldErrors::default())
    })
}

async fn edit_profile(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
    form: web::Form<EditProfileForm>,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    if let Err(errors) = form.validate() {
        return Ok(render(&session, Some(&me), |chrome| {
            user_views::edit_profile_page(chrome, &form, &errors)
        }));
    }

    let verified = users::authenticate(db.get_ref(), &me.username, form.password()).await?;
    if verified.is_none() {
        session.flash(Level::Danger, "Wrong password, please try again.");
        return Ok(redirect("/"));
    }

    let user_id = me.id;
    match users::update_profile(db.get_ref(), me.clone(), form.to_update()).await {
        Ok(_) => Ok(redirect(format!("/users/{}", user_id))),
        Err(e) if e.is_integrity() => {
            session.flash(Level::Danger, "Username or email already taken");
            Ok(render(&session, Some(&me), |chrome| {
                user_views::edit_profile_page(chrome, &form, &FieldErrors::default())
            }))
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete_user(
    db: web::Data<DatabaseConnection>,
    session: Session,
    auth: AuthUser,
) -> Result<HttpResponse, AppError> {
    let me = auth.0;
    users::delete(db.get_ref(), me.id).await?;
    session.logout();
    info!("account closed id={}", me.id);
    Ok(redirect("/signup"))
}

async fn find_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
    users::find(db, id).await?.ok_or(AppError::NotFound)
}

async fn load_profile<'a>(
    db: &DatabaseConnection,
    target: &'a user::Model,
    viewer: Option<&user::Model>,
) -> Result<Profile<'a>, AppError> {
    let stats = users::stats(db, target.id).await?;
    let viewer_follows = match viewer {
        Some(v) if v.id != target.id => users::is_following(db, v.id, target.id).await?,
        _ => false,
    };
    Ok(Profile {
        user: target,
        stats,
        viewer_follows,
    })
}

async fn viewer_following(
    db: &DatabaseConnection,
    viewer: Option<&user::Model>,
) -> Result<HashSet<i32>, AppError> {
    match viewer {
        Some(v) => Ok(users::following_ids(db, v.id).await?.into_iter().collect()),
        None => Ok(HashSet::new()),
    }
}
