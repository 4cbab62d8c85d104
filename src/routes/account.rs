use actix_web::{web, HttpResponse};
use log::info;
use sea_orm::DatabaseConnection;

use super::{redirect, render};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::forms::{FieldErrors, LoginForm, SignupForm};
use crate::session::{Level, Session};
use crate::store::users;
use crate::views::auth as auth_views;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/signup")
            .route(web::get().to(signup_form))
            .route(web::post().to(signup)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    )
    .service(web::resource("/logout").route(web::get().to(logout)));
}

async fn signup_form(session: Session) -> HttpResponse {
    session.logout();
    render(&session, None, |chrome| {
        auth_views::signup_page(chrome, &SignupForm::default(), &FieldErrors::default())
    })
}

async fn signup(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<SignupForm>,
) -> Result<HttpResponse, AppError> {
    session.logout();
    if let Err(errors) = form.validate() {
        return Ok(render(&session, None, |chrome| {
            auth_views::signup_page(chrome, &form, &errors)
        }));
    }

    match users::signup(db.get_ref(), form.to_new_user(), config.bcrypt_cost).await {
        Ok(user) => {
            session.login(user.id);
            Ok(redirect("/"))
        }
        Err(e) if e.is_integrity() => {
            info!("signup rejected for {}: {}", form.username(), e);
            session.flash(Level::Danger, "Username already taken");
            Ok(render(&session, None, |chrome| {
                auth_views::signup_page(chrome, &form, &FieldErrors::default())
            }))
        }
        Err(e) => Err(e.into()),
    }
}

async fn login_form(session: Session) -> HttpResponse {
    render(&session, None, |chrome| {
        auth_views::login_page(chrome, &LoginForm::default(), &FieldErrors::default())
    })
}

async fn login(
    db: web::Data<DatabaseConnection>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    if let Err(errors) = form.validate() {
        return Ok(render(&session, None, |chrome| {
            auth_views::login_page(chrome, &form, &errors)
        }));
    }

    match users::authenticate(db.get_ref(), form.username(), form.password()).await? {
        Some(user) => {
            session.login(user.id);
            session.flash(Level::Success, format!("Hello, {}!", user.username));
            Ok(redirect("/"))
        }
        None => {
            session.flash(Level::Danger, "Invalid credentials.");
            Ok(render(&session, None, |chrome| {
                auth_views::login_page(chrome, &form, &FieldErrors::default())
            }))
        }
    }
}

async fn logout(session: Session) -> HttpResponse {
    session.logout();
    session.flash(Level::Success, "You have successfully logged out.");
    redirect("/login")
}
