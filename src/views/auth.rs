use super::{input, layout, Chrome};
use crate::forms::{FieldErrors, LoginForm, SignupForm};

pub fn signup_page(chrome: &Chrome<'_>, form: &SignupForm, errors: &FieldErrors) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <h2 class="join-message">Join Warbler today.</h2>
    <form method="POST" id="user_form">
"#,
    );
    input(&mut body, "text", "username", "Username", form.username(), errors);
    input(&mut body, "email", "email", "E-mail", form.email(), errors);
    input(&mut body, "password", "password", "Password", "", errors);
    input(&mut body, "text", "image_url", "(Optional) Image URL", form.image_url().unwrap_or(""), errors);
    body.push_str(
        r#"      <button class="btn btn-primary btn-lg btn-block">Sign me up!</button>
    </form>
  </div>
</div>"#,
    );
    layout("Sign up", chrome, &body)
}

pub fn login_page(chrome: &Chrome<'_>, form: &LoginForm, errors: &FieldErrors) -> String {
    let mut body = String::new();
    body.push_str(
        r#"<div class="row justify-content-md-center">
  <div class="col-md-7 col-lg-5">
    <h2 class="join-message">Welcome back.</h2>
    <form method="POST" id="user_form">
"#,
    );
    input(&mut body, "text", "username", "Username", form.username(), errors);
    input(&mut body, "password", "password", "Password", "", errors);
    body.push_str(
        r#"      <button class="btn btn-primary btn-block btn-lg">Log in</button>
    </form>
    <p class="text-muted">New here? <a href="/signup">Sign up</a></p>
  </div>
</div>"#,
    );
    layout("Log in", chrome, &body)
}
