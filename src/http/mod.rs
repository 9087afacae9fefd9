//! HTTP surface.
//!
//! Every handler is a thin translation: it wraps the route into a
//! [`Request`], forwards it to the owning task through the request channel
//! and maps the [`AppReply`] it gets back onto a response.  Handlers never
//! touch the shared context themselves.
//!
//! | Route            | Method | Session | Answer                         |
//! |------------------|--------|---------|--------------------------------|
//! | `/`              | GET    | no      | login page or 303 `/dashboard` |
//! | `/login`         | POST   | no      | 303 `/dashboard` or 401        |
//! | `/logout`        | GET    | yes     | 303 `/`                        |
//! | `/dashboard`     | GET    | yes     | static page                    |
//! | `/report`        | GET    | yes     | static page                    |
//! | `/data`          | GET    | yes     | current reading                |
//! | `/get_settings`  | GET    | yes     | alert settings                 |
//! | `/save_settings` | POST   | yes     | 303 `/dashboard` or 400        |
//! | `/sms`           | POST   | yes     | `Queued`                       |
//! | `/history`       | GET    | yes     | last 10 rows                   |
//! | `/monthly_data`  | GET    | yes     | last 30 daily averages         |
//!
//! A privileged route without a live session answers 303 `/`.  If the
//! owning task is gone every route answers 503.

pub mod pages;
pub mod views;

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use log::error;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::app::commands::{AppCommand, AppReply, Request, SettingsUpdate};
use crate::runtime::{Envelope, RequestSender};
use crate::session::SESSION_COOKIE;
use views::{DataView, HistoryRow, MonthlyRow, SettingsView};

/// Browser cache lifetime of the static pages.
const PAGE_CACHE_CONTROL: &str = "max-age=60";

#[derive(Clone)]
pub struct HttpState {
    requests: RequestSender,
}

/// Build the router; `requests` feeds the owning task.
pub fn router(requests: RequestSender) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/dashboard", get(dashboard))
        .route("/report", get(report))
        .route("/data", get(data))
        .route("/get_settings", get(get_settings))
        .route("/save_settings", post(save_settings))
        .route("/sms", post(sms))
        .route("/history", get(history))
        .route("/monthly_data", get(monthly_data))
        .with_state(HttpState { requests })
}

// ── Forms ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub phone: String,
    pub lt: f32,
    pub lh: f32,
    pub lw: f32,
    pub la: i32,
}

impl From<SettingsForm> for SettingsUpdate {
    fn from(f: SettingsForm) -> Self {
        Self {
            phone: f.phone,
            limit_temp: f.lt,
            limit_humidity: f.lh,
            limit_weight: f.lw,
            limit_air: f.la,
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────

async fn landing(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::Landing).await {
        Ok(AppReply::AlreadyAuthenticated) => Redirect::to("/dashboard").into_response(),
        Ok(AppReply::LoginForm) => Html(pages::LOGIN_PAGE).into_response(),
        other => fallback(other),
    }
}

async fn login(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let command = AppCommand::Login {
        username: form.username,
        password: form.password,
    };
    match call(&state, &headers, command).await {
        Ok(AppReply::LoggedIn { cookie }) => {
            let set = format!("{SESSION_COOKIE}={cookie}; Path=/; HttpOnly");
            ([(header::SET_COOKIE, set)], Redirect::to("/dashboard")).into_response()
        }
        Ok(AppReply::LoginRejected) => {
            (StatusCode::UNAUTHORIZED, Html(pages::LOGIN_FAILED_PAGE)).into_response()
        }
        other => fallback(other),
    }
}

async fn logout(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::Logout).await {
        Ok(AppReply::LoggedOut) => {
            let clear = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly");
            ([(header::SET_COOKIE, clear)], Redirect::to("/")).into_response()
        }
        other => fallback(other),
    }
}

async fn dashboard(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    static_page(&state, &headers, pages::DASHBOARD_PAGE).await
}

async fn report(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    static_page(&state, &headers, pages::REPORT_PAGE).await
}

async fn data(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::CurrentReading).await {
        Ok(AppReply::Reading(r)) => Json(DataView::from(&r)).into_response(),
        other => fallback(other),
    }
}

async fn get_settings(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::GetSettings).await {
        Ok(AppReply::Settings(s)) => Json(SettingsView::from(&s)).into_response(),
        other => fallback(other),
    }
}

async fn save_settings(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Response {
    let command = AppCommand::SaveSettings(form.into());
    match call(&state, &headers, command).await {
        Ok(AppReply::SettingsSaved) => Redirect::to("/dashboard").into_response(),
        Ok(AppReply::SettingsRejected(reason)) => {
            (StatusCode::BAD_REQUEST, reason).into_response()
        }
        other => fallback(other),
    }
}

async fn sms(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::TriggerSms).await {
        Ok(AppReply::SmsQueued) => (StatusCode::OK, "Queued").into_response(),
        other => fallback(other),
    }
}

async fn history(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::History).await {
        Ok(AppReply::History(rows)) => {
            let rows: Vec<HistoryRow> = rows.into_iter().map(HistoryRow::from).collect();
            Json(rows).into_response()
        }
        other => fallback(other),
    }
}

async fn monthly_data(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    match call(&state, &headers, AppCommand::MonthlyAverages).await {
        Ok(AppReply::Monthly(days)) => {
            let rows: Vec<MonthlyRow> = days.into_iter().map(MonthlyRow::from).collect();
            Json(rows).into_response()
        }
        other => fallback(other),
    }
}

// ── Plumbing ──────────────────────────────────────────────────

async fn static_page(state: &HttpState, headers: &HeaderMap, page: &'static str) -> Response {
    match call(state, headers, AppCommand::Page).await {
        Ok(AppReply::Granted) => {
            ([(header::CACHE_CONTROL, PAGE_CACHE_CONTROL)], Html(page)).into_response()
        }
        other => fallback(other),
    }
}

/// Forward one command to the owning task and wait for its answer.
async fn call(
    state: &HttpState,
    headers: &HeaderMap,
    command: AppCommand,
) -> Result<AppReply, StatusCode> {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let (reply, answer) = oneshot::channel();
    let envelope = Envelope {
        request: Request::new(cookie, command),
        reply,
    };
    if state.requests.send(envelope).await.is_err() {
        error!("Owning task is gone, request refused");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    answer.await.map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}

/// Answers shared by every route.
fn fallback(result: Result<AppReply, StatusCode>) -> Response {
    match result {
        Ok(AppReply::Unauthorized) => Redirect::to("/").into_response(),
        Ok(AppReply::StorageFailed) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Ok(unexpected) => {
            error!("Unexpected reply {unexpected:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(status) => status.into_response(),
    }
}
