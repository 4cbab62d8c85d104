use std::collections::HashSet;
use std::fmt::Write;

use super::messages::message_list;
use super::{escape, input, layout, Chrome};
use crate::entity::{message, user};
use crate::forms::{EditProfileForm, FieldErrors};
use crate::store::users::UserStats;

fn follow_button(html: &mut String, target: &user::Model, following: &HashSet<i32>) {
    if following.contains(&target.id) {
        let _ = write!(
            html,
            r#"<form method="POST" action="/users/stop-following/{}">
  <button class="btn btn-primary btn-sm">Unfollow</button>
</form>
"#,
            target.id
        );
    } else {
        let _ = write!(
            html,
            r#"<form method="POST" action="/users/follow/{}">
  <button class="btn btn-outline-primary btn-sm">Follow</button>
</form>
"#,
            target.id
        );
    }
}

pub fn user_card(html: &mut String, u: &user::Model, chrome: &Chrome<'_>, following: &HashSet<i32>) {
    let _ = write!(
        html,
        r#"<div class="col-lg-4 col-md-6 col-12">
<div class="card user-card">
<div class="card-inner">
  <div class="image-wrapper"><img src="{header}" alt="" class="card-hero"></div>
  <div class="card-contents">
    <a href="/users/{id}" class="card-link">
      <img src="{image}" alt="Image for {username}" class="card-image">
      <p>@{username}</p>
    </a>
"#,
        header = escape(&u.header_image_url),
        id = u.id,
        image = escape(&u.image_url),
        username = escape(&u.username),
    );
    if let Some(viewer) = chrome.viewer_id() {
        if viewer != u.id {
            follow_button(html, u, following);
        }
    }
    let _ = write!(
        html,
        r#"  </div>
  <p class="card-bio">{}</p>
</div>
</div>
</div>
"#,
        escape(u.bio.as_deref().unwrap_or(""))
    );
}

fn card_grid(html: &mut String, users: &[user::Model], chrome: &Chrome<'_>, following: &HashSet<i32>) {
    html.push_str("<div class=\"row justify-content-end\">\n<div class=\"col-sm-9\">\n<div class=\"row\">\n");
    for u in users {
        user_card(html, u, chrome, following);
    }
    html.push_str("</div>\n</div>\n</div>\n");
}

pub fn index_page(chrome: &Chrome<'_>, users: &[user::Model], following: &HashSet<i32>) -> String {
    let mut body = String::new();
    if users.is_empty() {
        body.push_str("<h3>Sorry, no users found</h3>\n");
    } else {
        body.push_str("<div class=\"row justify-content-center\">\n<div class=\"col-sm-12\">\n<div class=\"row\">\n");
        for u in users {
            user_card(&mut body, u, chrome, following);
        }
        body.push_str("</div>\n</div>\n</div>\n");
    }
    layout("Users", chrome, &body)
}

/// Whose profile is shown and how the viewer relates to it.
pub struct Profile<'a> {
    pub user: &'a user::Model,
    pub stats: UserStats,
    pub viewer_follows: bool,
}

fn stat(html: &mut String, label: &str, href: &str, count: u64) {
    let _ = write!(
        html,
        r#"      <li class="stat">
        <p class="small">{label}</p>
        <h4><a href="{href}">{count}</a></h4>
      </li>
"#,
        label = label,
        href = href,
        count = count,
    );
}

/// The profile header shared by the profile, following, followers and
/// likes pages, wrapped around `content`.
pub fn profile_page(chrome: &Chrome<'_>, profile: &Profile<'_>, title: &str, content: &str) -> String {
    let u = profile.user;
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<div id="warbler-hero" class="full-width" style="background-image: url('{header}')"></div>
<img src="{image}" alt="Image for {username}" id="profile-avatar">
<div class="row full-width">
  <div class="container">
    <div class="row justify-content-end">
      <div class="col-9">
        <ul class="user-stats nav nav-pills">
"#,
        header = escape(&u.header_image_url),
        image = escape(&u.image_url),
        username = escape(&u.username),
    );
    stat(&mut body, "Messages", &format!("/users/{}", u.id), profile.stats.messages);
    stat(&mut body, "Following", &format!("/users/{}/following", u.id), profile.stats.following);
    stat(&mut body, "Followers", &format!("/users/{}/followers", u.id), profile.stats.followers);
    stat(&mut body, "Likes", &format!("/users/{}/likes", u.id), profile.stats.likes);
    body.push_str("          <div class=\"ml-auto\">\n");

    match chrome.viewer_id() {
        Some(viewer) if viewer == u.id => {
            body.push_str(
                r#"            <a href="/users/profile" class="btn btn-outline-secondary">Edit Profile</a>
            <form method="POST" action="/users/delete" class="form-inline">
              <button class="btn btn-outline-danger ml-2">Delete Profile</button>
            </form>
"#,
            );
        }
        Some(_) => {
            let action = if profile.viewer_follows { "stop-following" } else { "follow" };
            let label = if profile.viewer_follows { "Unfollow" } else { "Follow" };
            let _ = write!(
                body,
                r#"            <form method="POST" action="/users/{action}/{id}">
              <button class="btn btn-outline-primary">{label}</button>
            </form>
"#,
                action = action,
                id = u.id,
                label = label,
            );
        }
        None => {}
    }

    let _ = write!(
        body,
        r#"          </div>
        </ul>
      </div>
    </div>
  </div>
</div>
<div class="row">
  <div class="col-sm-3">
    <h4 id="sidebar-username">@{username}</h4>
    <p class="user-bio">{bio}</p>
    <p class="user-location"><span class="fa fa-map-marker"></span>{location}</p>
  </div>
  <div class="col-sm-9">
{content}
  </div>
</div>"#,
        username = escape(&u.username),
        bio = escape(u.bio.as_deref().unwrap_or("")),
        location = escape(u.location.as_deref().unwrap_or("")),
        content = content,
    );
    layout(title, chrome, &body)
}

pub fn profile_messages(author: &user::Model, messages: &[message::Model], chrome: &Chrome<'_>, liked: &HashSet<i32>) -> String {
    let warbles: Vec<(message::Model, user::Model)> = messages
        .iter()
        .map(|m| (m.clone(), author.clone()))
        .collect();
    let mut html = String::new();
    message_list(&mut html, &warbles, chrome.viewer_id(), liked);
    html
}

pub fn user_grid(users: &[user::Model], chrome: &Chrome<'_>, following: &HashSet<i32>) -> String {
    let mut html = String::new();
    card_grid(&mut html, users, chrome, following);
    html
}

pub fn edit_profile_page(chrome: &Chrome<'_>, form: &EditProfileForm, errors: &FieldErrors) -> String {
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    let mut body = String::new();
    body.push_str(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <h2 class="join-message">Edit Your Profile.</h2>
    <form method="POST" id="user_form">
"#,
    );
    input(&mut body, "text", "username", "Username", &field(&form.username), errors);
    input(&mut body, "email", "email", "E-mail", &field(&form.email), errors);
    input(&mut body, "text", "image_url", "(Optional) Image URL", &field(&form.image_url), errors);
    input(&mut body, "text", "header_image_url", "(Optional) Header Image URL", &field(&form.header_image_url), errors);
    input(&mut body, "text", "bio", "(Optional) Tell us about yourself", &field(&form.bio), errors);
    input(&mut body, "text", "location", "(Optional) Location", &field(&form.location), errors);
    body.push_str("      <p>To confirm changes, enter your password:</p>\n");
    input(&mut body, "password", "password", "Password", "", errors);
    body.push_str(
        r#"      <div class="edit-btn-area">
        <button class="btn btn-success">Edit this user!</button>
        <a href="/" class="btn btn-outline-secondary">Cancel</a>
      </div>
    </form>
  </div>
</div>"#,
    );
    layout("Edit profile", chrome, &body)
}
