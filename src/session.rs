//! Cookie-backed sessions.
//!
//! The whole session lives client side as an HS256-signed token in a single
//! cookie. [`session_handler`] loads it before routing and writes it back
//! only when a handler (or an extractor that rejected the request) changed
//! it, so flashes queued on an error path still reach the next page.

use std::cell::RefCell;
use std::rc::Rc;

use actix_web::{
    body::MessageBody,
    cookie::{Cookie, SameSite},
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use chrono::{Duration, Utc};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;

/// Name of the session attribute holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Danger,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub curr_user: Option<i32>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    state: SessionState,
    exp: usize,
}

pub fn encode_state(config: &AppConfig, state: &SessionState) -> Result<String, AppError> {
    let exp = (Utc::now() + Duration::days(config.session_days)).timestamp() as usize;
    let claims = Claims {
        state: state.clone(),
        exp,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .map_err(|e| {
        error!("session encode failed: {}", e);
        AppError::system_exception()
    })
}

/// Returns `None` for anything that is not a valid, unexpired token signed
/// with our key.
pub fn decode_state(config: &AppConfig, token: &str) -> Option<SessionState> {
    let key = DecodingKey::from_secret(config.secret_key.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => Some(data.claims.state),
        Err(e) => {
            debug!("discarding session cookie: {}", e);
            None
        }
    }
}

pub fn session_cookie(config: &AppConfig, state: &SessionState) -> Result<Cookie<'static>, AppError> {
    let value = encode_state(config, state)?;
    Ok(Cookie::build(config.session_cookie.clone(), value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish())
}

struct Inner {
    state: SessionState,
    modified: bool,
}

/// Per-request handle on the session; clones share the same state.
#[derive(Clone)]
pub struct Session(Rc<RefCell<Inner>>);

impl Session {
    fn new(state: SessionState) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            state,
            modified: false,
        })))
    }

    pub fn user_id(&self) -> Option<i32> {
        self.0.borrow().state.curr_user
    }

    pub fn login(&self, user_id: i32) {
        let mut inner = self.0.borrow_mut();
        inner.state.curr_user = Some(user_id);
        inner.modified = true;
    }

    pub fn logout(&self) {
        let mut inner = self.0.borrow_mut();
        if inner.state.curr_user.take().is_some() {
            inner.modified = true;
        }
    }

    pub fn flash(&self, level: Level, message: impl Into<String>) {
        let mut inner = self.0.borrow_mut();
        inner.state.flashes.push(Flash {
            level,
            message: message.into(),
        });
        inner.modified = true;
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        let mut inner = self.0.borrow_mut();
        if inner.state.flashes.is_empty() {
            return Vec::new();
        }
        inner.modified = true;
        std::mem::take(&mut inner.state.flashes)
    }

    fn is_modified(&self) -> bool {
        self.0.borrow().modified
    }

    fn snapshot(&self) -> SessionState {
        self.0.borrow().state.clone()
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();
        ready(session.ok_or_else(|| {
            error!("session middleware is not installed");
            AppError::system_exception().into()
        }))
    }
}

pub async fn session_handler<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody,
{
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .cloned()
        .ok_or_else(AppError::system_exception)?;

    let state = req
        .request()
        .cookie(&config.session_cookie)
        .and_then(|c| decode_state(&config, c.value()))
        .unwrap_or_default();
    let session = Session::new(state);
    req.extensions_mut().insert(session.clone());

    let mut res = next.call(req).await?;

    if session.is_modified() {
        let cookie = session_cookie(&config, &session.snapshot())?;
        res.response_mut().add_cookie(&cookie)?;
    }
    Ok(res)
}
