use axum::{
    extract::State,
    http::{
        header::{LOCATION, SET_COOKIE},
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Utc;
use serde::Deserialize;

use crate::session::{expired_cookie, session_cookie};

use super::AppState;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html lang="ru">
<head>
<meta charset="utf-8">
<title>Вход</title>
<style>
body{background:#0b0d12;color:#e9eef8;font-family:system-ui,sans-serif;margin:0;padding:40px}
form{max-width:400px;margin:80px auto;background:#0f1320;padding:24px;border-radius:12px;border:1px solid #1e2530}
input{box-sizing:border-box;width:100%;padding:12px;margin:10px 0;border-radius:8px;border:1px solid #222a35;background:#0b1119;color:#fff}
button{padding:12px 16px;border-radius:8px;background:#2a6bff;border:0;color:#fff;font-weight:600;cursor:pointer}
.err{color:#ff6b7d;margin:0 0 6px}
</style>
</head>
<body>
<form method="post" action="/login">
<h2>Вход в дашборд</h2>
{error}
<input name="password" type="password" placeholder="Пароль" autofocus>
<button type="submit">Войти</button>
</form>
</body>
</html>
"#;

fn login_page(error: Option<&str>) -> Html<String> {
    let error = error.map_or_else(String::new, |msg| format!(r#"<p class="err">{msg}</p>"#));
    Html(LOGIN_PAGE.replace("{error}", &error))
}

fn redirect(location: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginForm {
    #[serde(default)]
    password: String,
}

pub(super) async fn login_form(State(state): State<AppState>) -> Response {
    if !state.session.enabled() {
        return redirect("/");
    }
    login_page(None).into_response()
}

pub(super) async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.session.enabled() {
        return redirect("/");
    }
    if !state.session.check_password(&form.password) {
        tracing::warn!("login: wrong password");
        return (StatusCode::UNAUTHORIZED, login_page(Some("Неверный пароль"))).into_response();
    }
    let Some(token) = state.session.issue(Utc::now()) else {
        return redirect("/login");
    };
    tracing::info!("login: session issued");
    (
        StatusCode::FOUND,
        [(LOCATION, "/".to_string()), (SET_COOKIE, session_cookie(&token))],
    )
        .into_response()
}

pub(super) async fn logout() -> Response {
    (
        StatusCode::FOUND,
        [(LOCATION, "/login".to_string()), (SET_COOKIE, expired_cookie())],
    )
        .into_response()
}
