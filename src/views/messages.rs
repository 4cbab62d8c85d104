use std::collections::HashSet;
use std::fmt::Write;

use super::{escape, layout, Chrome};
use crate::entity::{message, user};
use crate::forms::{FieldErrors, MessageForm};

pub fn format_timestamp(msg: &message::Model) -> String {
    msg.timestamp.format("%d %B %Y").to_string()
}

/// One timeline entry. The like toggle is offered to logged-in viewers on
/// messages they did not write.
pub fn message_item(
    html: &mut String,
    msg: &message::Model,
    author: &user::Model,
    viewer_id: Option<i32>,
    liked: &HashSet<i32>,
) {
    let _ = write!(
        html,
        r#"<li class="list-group-item">
  <a href="/messages/{id}" class="message-link"></a>
  <a href="/users/{uid}"><img src="{image}" alt="" class="timeline-image"></a>
  <div class="message-area">
    <a href="/users/{uid}">@{username}</a>
    <span class="text-muted">{date}</span>
    <p>{text}</p>
  </div>
"#,
        id = msg.id,
        uid = author.id,
        image = escape(&author.image_url),
        username = escape(&author.username),
        date = format_timestamp(msg),
        text = escape(&msg.text),
    );
    if let Some(viewer) = viewer_id {
        if viewer != author.id {
            let (class, label) = if liked.contains(&msg.id) {
                ("btn-primary", "Unlike")
            } else {
                ("btn-secondary", "Like")
            };
            let _ = write!(
                html,
                r#"  <form method="POST" action="/messages/{id}/like" class="messages-like">
    <button class="btn btn-sm {class}">{label}</button>
  </form>
"#,
                id = msg.id,
                class = class,
                label = label,
            );
        }
    }
    html.push_str("</li>\n");
}

pub fn message_list(
    html: &mut String,
    warbles: &[(message::Model, user::Model)],
    viewer_id: Option<i32>,
    liked: &HashSet<i32>,
) {
    html.push_str("<ul class=\"list-group\" id=\"messages\">\n");
    for (msg, author) in warbles {
        message_item(html, msg, author, viewer_id, liked);
    }
    html.push_str("</ul>\n");
}

pub fn new_message_page(chrome: &Chrome<'_>, form: &MessageForm, errors: &FieldErrors) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <form method="POST">
"#,
    );
    let _ = writeln!(
        body,
        r#"  <textarea name="text" id="text" class="form-control" rows="3" placeholder="What's happening?">{}</textarea>"#,
        escape(form.text())
    );
    for msg in errors.for_field("text") {
        let _ = writeln!(body, r#"  <span class="text-danger">{}</span>"#, escape(msg));
    }
    body.push_str(
        r#"      <button class="btn btn-outline-success btn-block">Add my message!</button>
    </form>
  </div>
</div>"#,
    );
    layout("New message", chrome, &body)
}

pub fn show_message_page(
    chrome: &Chrome<'_>,
    msg: &message::Model,
    author: &user::Model,
    liked: bool,
    like_count: usize,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        r#"<div class="bg"></div>
<div class="row justify-content-center">
  <div class="col-md-6">
    <ul class="list-group no-hover" id="messages">
      <li class="list-group-item">
        <a href="/users/{uid}"><img src="{image}" alt="" class="timeline-image"></a>
        <div class="message-area">
          <div class="message-heading">
            <a href="/users/{uid}">@{username}</a>
"#,
        uid = author.id,
        image = escape(&author.image_url),
        username = escape(&author.username),
    );

    match chrome.viewer_id() {
        Some(viewer) if viewer == author.id => {
            let _ = write!(
                body,
                r#"            <form method="POST" action="/messages/{}/delete">
              <button class="btn btn-outline-danger">Delete</button>
            </form>
"#,
                msg.id
            );
        }
        Some(_) => {
            let _ = write!(
                body,
                r#"            <form method="POST" action="/messages/{id}/like">
              <button class="btn {class}">{label}</button>
            </form>
"#,
                id = msg.id,
                class = if liked { "btn-primary" } else { "btn-secondary" },
                label = if liked { "Unlike" } else { "Like" },
            );
        }
        None => {}
    }

    let _ = write!(
        body,
        r#"          </div>
          <p class="single-message">{text}</p>
          <span class="text-muted">{date}</span>
          <span class="text-muted likes-count">{likes} likes</span>
        </div>
      </li>
    </ul>
  </div>
</div>"#,
        text = escape(&msg.text),
        date = format_timestamp(msg),
        likes = like_count,
    );
    layout("Message", chrome, &body)
}
