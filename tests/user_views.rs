mod common;

use actix_web::{http::header, http::StatusCode, test};
use common::{add_message, fetch, login_cookie, signup, stat_texts, test_config, test_db};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use warbler::entity::user;
use warbler::store::{messages, users};

struct Fixture {
    db: DatabaseConnection,
    testuser: user::Model,
    u1: user::Model,
    u2: user::Model,
    u3: user::Model,
}

async fn setup() -> Fixture {
    let db = test_db().await;
    let testuser = signup(&db, "testuser", "test@test.com", "testuser").await;
    let u1 = signup(&db, "abc", "test1@test.com", "password").await;
    let u2 = signup(&db, "efg", "test2@test.com", "password").await;
    let u3 = signup(&db, "hij", "test3@test.com", "password").await;
    signup(&db, "testing", "test4@test.com", "password").await;
    Fixture {
        db,
        testuser,
        u1,
        u2,
        u3,
    }
}

async fn setup_likes(f: &Fixture) -> i32 {
    add_message(&f.db, f.testuser.id, "trending warble").await;
    add_message(&f.db, f.testuser.id, "Eating some lunch").await;
    let liked = add_message(&f.db, f.u1.id, "likable warble").await;
    messages::like(&f.db, f.testuser.id, liked.id).await.unwrap();
    liked.id
}

async fn setup_followers(f: &Fixture) {
    users::follow(&f.db, f.testuser.id, f.u1.id).await.unwrap();
    users::follow(&f.db, f.testuser.id, f.u2.id).await.unwrap();
    users::follow(&f.db, f.u1.id, f.testuser.id).await.unwrap();
}

#[actix_web::test]
async fn users_index_lists_everyone() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let page = fetch(&app, &config, test::TestRequest::get().uri("/users"), None).await;
    assert_eq!(page.status, StatusCode::OK);
    for name in ["@testuser", "@abc", "@efg", "@hij", "@testing"] {
        assert!(page.body.contains(name), "missing {name}");
    }
}

#[actix_web::test]
async fn users_search_filters_by_username() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let page = fetch(&app, &config, test::TestRequest::get().uri("/users?q=test"), None).await;
    assert!(page.body.contains("@testuser"));
    assert!(page.body.contains("@testing"));
    assert!(!page.body.contains("@abc"));
    assert!(!page.body.contains("@efg"));
    assert!(!page.body.contains("@hij"));

    let none = fetch(&app, &config, test::TestRequest::get().uri("/users?q=zzz"), None).await;
    assert!(none.body.contains("Sorry, no users found"));
}

#[actix_web::test]
async fn user_show_renders_profile() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}", f.testuser.id);
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("@testuser"));
}

#[actix_web::test]
async fn missing_user_is_not_found() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let page = fetch(&app, &config, test::TestRequest::get().uri("/users/99999"), None).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    let huge = fetch(&app, &config, test::TestRequest::get().uri("/users/99999999999"), None).await;
    assert_eq!(huge.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn user_show_with_likes_counts_them() {
    let f = setup().await;
    setup_likes(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}", f.testuser.id);
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), None).await;
    assert_eq!(
        stat_texts(&page.body),
        vec!["Messages 2", "Following 0", "Followers 0", "Likes 1"]
    );
}

#[actix_web::test]
async fn add_like_then_remove_it() {
    let f = setup().await;
    let liked = add_message(&f.db, f.u1.id, "The earth is round").await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;
    let cookie = Some(login_cookie(&config, f.testuser.id));

    let uri = format!("/messages/{}/like", liked.id);
    let page = fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie.clone()).await;
    assert_eq!(page.status, StatusCode::OK);
    let likes = messages::likes_for(&f.db, liked.id).await.unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].user_id, f.testuser.id);

    fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie).await;
    assert!(messages::likes_for(&f.db, liked.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn liking_own_message_is_refused() {
    let f = setup().await;
    let mine = add_message(&f.db, f.testuser.id, "self promotion").await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/messages/{}/like", mine.id);
    let cookie = Some(login_cookie(&config, f.testuser.id));
    let page = fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie).await;
    assert!(page.body.contains("You cannot like your own warble."));
    assert!(messages::likes_for(&f.db, mine.id).await.unwrap().is_empty());
}

#[actix_web::test]
async fn unauthenticated_like_is_refused() {
    let f = setup().await;
    let liked_id = setup_likes(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/messages/{}/like", liked_id);
    let page = fetch(&app, &config, test::TestRequest::post().uri(&uri), None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Access unauthorized"));
    assert_eq!(messages::likes_for(&f.db, liked_id).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn likes_page_lists_liked_messages() {
    let f = setup().await;
    setup_likes(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}/likes", f.testuser.id);
    let cookie = Some(login_cookie(&config, f.testuser.id));
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), cookie).await;
    assert!(page.body.contains("likable warble"));
    assert!(!page.body.contains("Eating some lunch"));
}

#[actix_web::test]
async fn user_show_with_follows_counts_them() {
    let f = setup().await;
    setup_followers(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}", f.testuser.id);
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), None).await;
    assert_eq!(
        stat_texts(&page.body),
        vec!["Messages 0", "Following 2", "Followers 1", "Likes 0"]
    );
}

#[actix_web::test]
async fn following_page_lists_followed_users() {
    let f = setup().await;
    setup_followers(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}/following", f.testuser.id);
    let cookie = Some(login_cookie(&config, f.testuser.id));
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), cookie).await;
    assert!(page.body.contains("@abc"));
    assert!(page.body.contains("@efg"));
    assert!(!page.body.contains("@hij"));
    assert!(!page.body.contains("@testing"));
}

#[actix_web::test]
async fn followers_page_lists_followers() {
    let f = setup().await;
    setup_followers(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}/followers", f.testuser.id);
    let cookie = Some(login_cookie(&config, f.testuser.id));
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), cookie).await;
    assert!(page.body.contains("@abc"));
    assert!(!page.body.contains("@efg"));
    assert!(!page.body.contains("@hij"));
    assert!(!page.body.contains("@testing"));
}

#[actix_web::test]
async fn follow_pages_require_login() {
    let f = setup().await;
    setup_followers(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    for suffix in ["following", "followers", "likes"] {
        let uri = format!("/users/{}/{}", f.testuser.id, suffix);
        let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), None).await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(!page.body.contains("@abc"), "{suffix} leaked");
        assert!(page.body.contains("Access unauthorized"), "{suffix} not refused");
    }
}

#[actix_web::test]
async fn follow_and_stop_following() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;
    let cookie = Some(login_cookie(&config, f.testuser.id));

    let uri = format!("/users/follow/{}", f.u3.id);
    let page = fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie.clone()).await;
    assert!(page.body.contains("@hij"));
    assert!(users::is_following(&f.db, f.testuser.id, f.u3.id).await.unwrap());

    let uri = format!("/users/stop-following/{}", f.u3.id);
    let page = fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie).await;
    assert!(!page.body.contains("@hij"));
    assert!(!users::is_following(&f.db, f.testuser.id, f.u3.id).await.unwrap());
}

#[actix_web::test]
async fn following_yourself_is_refused() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/follow/{}", f.testuser.id);
    let cookie = Some(login_cookie(&config, f.testuser.id));
    fetch(&app, &config, test::TestRequest::post().uri(&uri), cookie).await;
    assert!(!users::is_following(&f.db, f.testuser.id, f.testuser.id).await.unwrap());
}

#[actix_web::test]
async fn signup_logs_in_and_shows_timeline() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let req = test::TestRequest::post().uri("/signup").set_form([
        ("username", "newbie"),
        ("email", "newbie@test.com"),
        ("password", "newbie-pass"),
    ]);
    let page = fetch(&app, &config, req, None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("@newbie"));
    assert!(page.body.contains("Log out"));
    assert!(users::authenticate(&f.db, "newbie", "newbie-pass").await.unwrap().is_some());
}

#[actix_web::test]
async fn signup_with_taken_username_rerenders_form() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let req = test::TestRequest::post().uri("/signup").set_form([
        ("username", "testuser"),
        ("email", "other@test.com"),
        ("password", "password"),
    ]);
    let page = fetch(&app, &config, req, None).await;
    assert!(page.body.contains("Username already taken"));
    assert!(page.body.contains("Join Warbler today."));
}

#[actix_web::test]
async fn login_and_logout() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let bad = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "testuser"), ("password", "wrong-password")]);
    let page = fetch(&app, &config, bad, None).await;
    assert!(page.body.contains("Invalid credentials."));

    let good = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "testuser"), ("password", "testuser")]);
    let page = fetch(&app, &config, good, None).await;
    assert!(page.body.contains("Hello, testuser!"));
    assert!(page.body.contains("Log out"));

    let page = fetch(&app, &config, test::TestRequest::get().uri("/logout"), page.cookie).await;
    assert!(page.body.contains("You have successfully logged out."));
    assert!(page.body.contains("Welcome back."));
    assert!(page.body.contains("Log in"));
}

#[actix_web::test]
async fn flashes_are_shown_once() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let uri = format!("/users/{}/following", f.testuser.id);
    let page = fetch(&app, &config, test::TestRequest::get().uri(&uri), None).await;
    assert!(page.body.contains("Access unauthorized"));

    let again = fetch(&app, &config, test::TestRequest::get().uri("/"), page.cookie).await;
    assert!(!again.body.contains("Access unauthorized"));
}

#[actix_web::test]
async fn edit_profile_requires_current_password() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;
    let cookie = Some(login_cookie(&config, f.testuser.id));

    let wrong = test::TestRequest::post().uri("/users/profile").set_form([
        ("username", "renamed"),
        ("email", "test@test.com"),
        ("bio", "new bio"),
        ("password", "not-my-password"),
    ]);
    let page = fetch(&app, &config, wrong, cookie.clone()).await;
    assert!(page.body.contains("Wrong password, please try again."));
    let unchanged = users::find(&f.db, f.testuser.id).await.unwrap().unwrap();
    assert_eq!(unchanged.username, "testuser");

    let right = test::TestRequest::post().uri("/users/profile").set_form([
        ("username", "renamed"),
        ("email", "test@test.com"),
        ("bio", "new bio"),
        ("location", "Nowhere"),
        ("password", "testuser"),
    ]);
    let page = fetch(&app, &config, right, cookie).await;
    assert!(page.body.contains("@renamed"));
    assert!(page.body.contains("new bio"));
    assert!(page.body.contains("Nowhere"));
}

#[actix_web::test]
async fn edit_profile_with_taken_username_keeps_old_one() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;
    let cookie = Some(login_cookie(&config, f.testuser.id));

    let req = test::TestRequest::post().uri("/users/profile").set_form([
        ("username", "abc"),
        ("email", "test@test.com"),
        ("password", "testuser"),
    ]);
    let page = fetch(&app, &config, req, cookie).await;
    assert!(page.body.contains("Username or email already taken"));
    let unchanged = users::find(&f.db, f.testuser.id).await.unwrap().unwrap();
    assert_eq!(unchanged.username, "testuser");
}

#[actix_web::test]
async fn delete_user_logs_out_and_removes_account() {
    let f = setup().await;
    setup_likes(&f).await;
    setup_followers(&f).await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;
    let cookie = Some(login_cookie(&config, f.testuser.id));

    let page = fetch(&app, &config, test::TestRequest::post().uri("/users/delete"), cookie).await;
    assert!(page.body.contains("Join Warbler today."));
    assert!(page.body.contains("Sign up"));
    assert!(users::find(&f.db, f.testuser.id).await.unwrap().is_none());
    assert_eq!(users::stats(&f.db, f.u1.id).await.unwrap().followers, 0);
}

#[actix_web::test]
async fn failed_account_delete_keeps_session_and_account() {
    let f = setup().await;
    f.db
        .execute(Statement::from_string(DatabaseBackend::Sqlite, "DROP TABLE likes"))
        .await
        .unwrap();
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let req = test::TestRequest::post()
        .uri("/users/delete")
        .cookie(login_cookie(&config, f.testuser.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp
        .response()
        .cookies()
        .all(|c| c.name() != config.session_cookie));
    assert!(users::find(&f.db, f.testuser.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn responses_are_not_cached() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config, f.db.clone())).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let cache = resp
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(cache.contains("no-cache"), "{cache}");
    assert!(resp.headers().contains_key(header::PRAGMA));
}

#[actix_web::test]
async fn unknown_route_renders_not_found_page() {
    let f = setup().await;
    let config = test_config();
    let app = test::init_service(warbler::app(config.clone(), f.db.clone())).await;

    let page = fetch(&app, &config, test::TestRequest::get().uri("/no/such/page"), None).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains(warbler::views::NOT_FOUND_BODY));
}
