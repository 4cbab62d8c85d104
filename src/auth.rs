use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use log::debug;
use sea_orm::DatabaseConnection;

use crate::entity::user;
use crate::error::AppError;
use crate::session::{Level, Session, CURR_USER_KEY};
use crate::store::users;

pub const ACCESS_UNAUTHORIZED: &str = "Access unauthorized.";

/// The user the session points at, if it points at one that exists.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<user::Model>);

/// A logged-in user. Extraction fails with a flash and a redirect home.
#[derive(Clone, Debug)]
pub struct AuthUser(pub user::Model);

/// Queues the unauthorized flash and returns the error that redirects home.
pub fn deny(session: &Session) -> AppError {
    session.flash(Level::Danger, ACCESS_UNAUTHORIZED);
    AppError::Unauthorized
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let session = req.extensions().get::<Session>().cloned();

        Box::pin(async move {
            let (Some(db), Some(session)) = (db, session) else {
                return Err(AppError::system_exception().into());
            };
            let user = load_user(&db, &session).await?;
            Ok(CurrentUser(user))
        })
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();
        let session = req.extensions().get::<Session>().cloned();

        Box::pin(async move {
            let (Some(db), Some(session)) = (db, session) else {
                return Err(AppError::system_exception().into());
            };
            match load_user(&db, &session).await? {
                Some(user) => Ok(AuthUser(user)),
                None => Err(deny(&session).into()),
            }
        })
    }
}

async fn load_user(db: &DatabaseConnection, session: &Session) -> Result<Option<user::Model>, AppError> {
    let Some(user_id) = session.user_id() else {
        return Ok(None);
    };
    let user = users::find(db, user_id).await?;
    if user.is_none() {
        debug!("{}={} does not match any user", CURR_USER_KEY, user_id);
    }
    Ok(user)
}
