//! Form payloads and their validation rules.
//!
//! Every field is optional on the wire so a missing input renders as a
//! field error instead of a rejected request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::entity::message::MAX_TEXT_LEN;
use crate::store::users::{NewUser, ProfileUpdate};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn value(field: &Option<String>) -> &str {
    field.as_deref().map(str::trim).unwrap_or("")
}

// passwords are taken verbatim, whitespace included
fn password(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

fn check_required(errors: &mut FieldErrors, name: &'static str, v: &str) {
    if v.is_empty() {
        errors.add(name, "This field is required.");
    }
}

fn check_email(errors: &mut FieldErrors, v: &str) {
    if v.is_empty() {
        errors.add("email", "This field is required.");
    } else if !EMAIL_RE.is_match(v) {
        errors.add("email", "Invalid email address.");
    }
}

fn check_password(errors: &mut FieldErrors, raw: &Option<String>) {
    let len = raw.as_deref().map(|p| p.chars().count()).unwrap_or(0);
    if len < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Field must be at least {} characters long.", MIN_PASSWORD_LEN),
        );
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignupForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        check_required(&mut errors, "username", self.username());
        check_email(&mut errors, self.email());
        check_password(&mut errors, &self.password);
        errors.into_result()
    }

    pub fn username(&self) -> &str {
        value(&self.username)
    }

    pub fn email(&self) -> &str {
        value(&self.email)
    }

    pub fn image_url(&self) -> Option<&str> {
        Some(value(&self.image_url)).filter(|v| !v.is_empty())
    }

    pub fn to_new_user(&self) -> NewUser<'_> {
        NewUser {
            username: self.username(),
            email: self.email(),
            password: password(&self.password),
            image_url: self.image_url(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        check_required(&mut errors, "username", self.username());
        check_password(&mut errors, &self.password);
        errors.into_result()
    }

    pub fn username(&self) -> &str {
        value(&self.username)
    }

    pub fn password(&self) -> &str {
        password(&self.password)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageForm {
    pub text: Option<String>,
}

impl MessageForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        let text = self.text();
        check_required(&mut errors, "text", text);
        if text.chars().count() > MAX_TEXT_LEN {
            errors.add(
                "text",
                format!("Field cannot be longer than {} characters.", MAX_TEXT_LEN),
            );
        }
        errors.into_result()
    }

    pub fn text(&self) -> &str {
        value(&self.text)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EditProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub password: Option<String>,
}

impl EditProfileForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        check_required(&mut errors, "username", value(&self.username));
        check_email(&mut errors, value(&self.email));
        check_password(&mut errors, &self.password);
        errors.into_result()
    }

    pub fn password(&self) -> &str {
        password(&self.password)
    }

    pub fn to_update(&self) -> ProfileUpdate<'_> {
        ProfileUpdate {
            username: value(&self.username),
            email: value(&self.email),
            image_url: self.image_url.as_deref(),
            header_image_url: self.header_image_url.as_deref(),
            bio: self.bio.as_deref(),
            location: self.location.as_deref(),
        }
    }
}
