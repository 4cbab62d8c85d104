use std::collections::HashSet;
use std::fmt::Write;

use super::messages::message_list;
use super::{escape, layout, Chrome};
use crate::entity::{message, user};
use crate::store::users::UserStats;

pub fn anon_home_page(chrome: &Chrome<'_>) -> String {
    layout(
        "Warbler",
        chrome,
        r#"<div class="home-hero">
  <h1>What's Happening?</h1>
  <h4>New to Warbler?</h4>
  <a href="/signup" class="btn btn-primary">Sign up now</a>
</div>"#,
    )
}

pub fn timeline_page(
    chrome: &Chrome<'_>,
    me: &user::Model,
    stats: &UserStats,
    warbles: &[(message::Model, user::Model)],
    liked: &HashSet<i32>,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<div class="row">
  <aside class="col-md-4 col-lg-3 col-sm-12" id="home-aside">
    <div class="card user-card">
      <div class="image-wrapper"><img src="{header}" alt="" class="card-hero"></div>
      <a href="/users/{id}" class="card-link">
        <img src="{image}" alt="Image for {username}" class="card-image">
        <p>@{username}</p>
      </a>
      <ul class="user-stats nav nav-pills">
        <li><p class="small">Messages</p><h4><a href="/users/{id}">{messages}</a></h4></li>
        <li><p class="small">Following</p><h4><a href="/users/{id}/following">{following}</a></h4></li>
        <li><p class="small">Followers</p><h4><a href="/users/{id}/followers">{followers}</a></h4></li>
      </ul>
    </div>
  </aside>
  <div class="col-lg-6 col-md-8 col-sm-12">
"#,
        header = escape(&me.header_image_url),
        id = me.id,
        image = escape(&me.image_url),
        username = escape(&me.username),
        messages = stats.messages,
        following = stats.following,
        followers = stats.followers,
    );
    message_list(&mut body, warbles, Some(me.id), liked);
    body.push_str("  </div>\n</div>");
    layout("Home", chrome, &body)
}
