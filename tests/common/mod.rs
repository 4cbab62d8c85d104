#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::Cookie,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use regex::Regex;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use warbler::config::AppConfig;
use warbler::entity::{message, user};
use warbler::session::{self, SessionState};
use warbler::store::{messages, users};

pub fn test_config() -> AppConfig {
    AppConfig {
        server_port: 0,
        sqlite_path: String::new(),
        database_url: Some("sqlite::memory:".to_string()),
        secret_key: "warbler-test-secret".to_string(),
        session_cookie: "session".to_string(),
        session_days: 1,
        bcrypt_cost: 4,
    }
}

pub async fn test_db() -> DatabaseConnection {
    warbler::db::connect("sqlite::memory:")
        .await
        .expect("in-memory database")
}

pub async fn signup(db: &DatabaseConnection, username: &str, email: &str, password: &str) -> user::Model {
    users::signup(
        db,
        users::NewUser {
            username,
            email,
            password,
            image_url: None,
        },
        4,
    )
    .await
    .expect("signup")
}

pub async fn add_message(db: &DatabaseConnection, user_id: i32, text: &str) -> message::Model {
    messages::create(db, user_id, text).await.expect("create message")
}

/// The cookie a browser would hold after `user_id` logged in.
pub fn login_cookie(config: &AppConfig, user_id: i32) -> Cookie<'static> {
    let state = SessionState {
        curr_user: Some(user_id),
        flashes: Vec::new(),
    };
    session::session_cookie(config, &state).expect("session cookie")
}

#[derive(Serialize)]
struct WideClaims {
    curr_user: i64,
    exp: i64,
}

/// A correctly signed session cookie whose user id does not fit the
/// users table's key type.
pub fn wide_id_cookie(config: &AppConfig, user_id: i64) -> Cookie<'static> {
    let claims = WideClaims {
        curr_user: user_id,
        exp: (Utc::now() + Duration::days(1)).timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .expect("sign session");
    Cookie::new(config.session_cookie.clone(), token)
}

pub struct Page {
    pub status: StatusCode,
    pub body: String,
    pub cookie: Option<Cookie<'static>>,
}

/// Sends `req` and follows redirects with GETs, carrying the session
/// cookie along like a browser.
pub async fn fetch<S, B>(
    app: &S,
    config: &AppConfig,
    req: test::TestRequest,
    cookie: Option<Cookie<'static>>,
) -> Page
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let mut jar = cookie;
    let mut req = req;
    loop {
        if let Some(c) = &jar {
            req = req.cookie(c.clone());
        }
        let resp = test::call_service(app, req.to_request()).await;
        if let Some(c) = resp
            .response()
            .cookies()
            .find(|c| c.name() == config.session_cookie)
        {
            jar = Some(c.into_owned());
        }

        let status = resp.status();
        if status.is_redirection() {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("/")
                .to_string();
            req = test::TestRequest::get().uri(&location);
            continue;
        }

        let body = test::read_body(resp).await;
        return Page {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
            cookie: jar,
        };
    }
}

/// Text of each `<li class="stat">` on a profile page, tags stripped.
pub fn stat_texts(body: &str) -> Vec<String> {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    body.split(r#"<li class="stat">"#)
        .skip(1)
        .map(|chunk| {
            let inner = chunk.split("</li>").next().unwrap_or("");
            tags.replace_all(inner, " ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
