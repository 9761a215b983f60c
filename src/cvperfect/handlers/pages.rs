//! Page shells. Rendering lives in the client bundle; these only give each
//! guarded route a document to mount into.

use crate::guard::DASHBOARD_PATH;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};

fn shell(title: &str, page: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} | CVPerfect</title></head>\n<body><main id=\"app\" data-page=\"{page}\"></main></body>\n</html>\n"
    ))
}

pub async fn root() -> Redirect {
    Redirect::temporary(DASHBOARD_PATH)
}

pub async fn dashboard() -> Html<String> {
    shell("Dashboard", "dashboard")
}

pub async fn history() -> Html<String> {
    shell("History", "history")
}

pub async fn billing() -> Html<String> {
    shell("Billing", "billing")
}

pub async fn sign_in() -> Html<String> {
    shell("Sign in", "signin")
}

pub async fn sign_up() -> Html<String> {
    shell("Create account", "signup")
}

pub async fn reset_password() -> Html<String> {
    shell("Reset password", "reset-password")
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, shell("Not found", "not-found"))
}
