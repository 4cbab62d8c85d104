//! Server-rendered HTML pages.

pub mod auth;
pub mod home;
pub mod messages;
pub mod users;

use std::fmt::Write;

use crate::entity::user;
use crate::forms::FieldErrors;
use crate::session::Flash;

pub const HTML: &str = "text/html; charset=utf-8";

/// What every page needs besides its own body: who is looking at it and
/// which flashes to show.
pub struct Chrome<'a> {
    pub user: Option<&'a user::Model>,
    pub flashes: &'a [Flash],
}

impl Chrome<'_> {
    pub fn anonymous() -> Chrome<'static> {
        Chrome {
            user: None,
            flashes: &[],
        }
    }

    pub fn viewer_id(&self) -> Option<i32> {
        self.user.map(|u| u.id)
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(title: &str, chrome: &Chrome<'_>, body: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css">
  <link rel="stylesheet" href="/static/stylesheets/style.css">
</head>
<body class="{body_class}">
<nav class="navbar navbar-expand">
  <div class="container-fluid">
    <div class="navbar-header">
      <a href="/" class="navbar-brand"><span>Warbler</span></a>
    </div>
    <ul class="nav navbar-nav navbar-right">
"#,
        title = escape(title),
        body_class = if chrome.user.is_some() { "" } else { "onboarding" },
    );

    match chrome.user {
        None => {
            html.push_str(
                r#"      <li><a href="/signup">Sign up</a></li>
      <li><a href="/login">Log in</a></li>
"#,
            );
        }
        Some(u) => {
            let _ = write!(
                html,
                r#"      <li>
        <form class="navbar-form navbar-right" action="/users" method="GET">
          <input name="q" class="form-control" placeholder="Search Warbler" id="search">
          <button class="btn btn-default">Search</button>
        </form>
      </li>
      <li><a href="/users/{id}"><img src="{image}" alt="{username}" class="navbar-image"></a></li>
      <li><a href="/messages/new">New Message</a></li>
      <li><a href="/logout">Log out</a></li>
"#,
                id = u.id,
                image = escape(&u.image_url),
                username = escape(&u.username),
            );
        }
    }

    html.push_str("    </ul>\n  </div>\n</nav>\n<div class=\"container\">\n");
    for flash in chrome.flashes {
        let _ = writeln!(
            html,
            r#"  <div class="alert alert-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }
    html.push_str(body);
    html.push_str("\n</div>\n</body>\n</html>\n");
    html
}

/// Renders a text-like input with its label and any validation errors.
pub(crate) fn input(
    html: &mut String,
    kind: &str,
    name: &str,
    placeholder: &str,
    value: &str,
    errors: &FieldErrors,
) {
    let _ = writeln!(
        html,
        r#"  <input type="{kind}" name="{name}" id="{name}" placeholder="{placeholder}" value="{value}" class="form-control">"#,
        kind = kind,
        name = name,
        placeholder = escape(placeholder),
        value = escape(value),
    );
    for msg in errors.for_field(name) {
        let _ = writeln!(html, r#"  <span class="text-danger">{}</span>"#, escape(msg));
    }
}

pub const NOT_FOUND_BODY: &str = r#"<div class="row justify-content-center">
  <div class="col-md-6">
    <h1>404</h1>
    <p>Sorry, that page doesn't exist.</p>
    <a href="/" class="btn btn-primary">Go home</a>
  </div>
</div>"#;

pub fn not_found_page() -> String {
    layout("Page not found", &Chrome::anonymous(), NOT_FOUND_BODY)
}

pub fn error_page() -> String {
    layout(
        "Something went wrong",
        &Chrome::anonymous(),
        r#"<div class="row justify-content-center">
  <div class="col-md-6">
    <h1>Something went wrong</h1>
    <p>Please try again later.</p>
  </div>
</div>"#,
    )
}
