//! End-to-end tests: axum router → request channel → owning task → store.
//!
//! Each test spins up a real [`Monitor`] on the test runtime with mock
//! hardware and a manual clock, then drives the router in-process with
//! `tower::ServiceExt::oneshot`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use hivewatch::app::service::MonitorService;
use hivewatch::config::MonitorConfig;
use hivewatch::http::router;
use hivewatch::model::{Reading, Settings};
use hivewatch::runtime::{Monitor, request_channel};
use hivewatch::session::MarkerSession;
use hivewatch::storage::SqliteStore;

use super::mock_hw::{ManualClock, MockHardware, RecordingSink};

const FORM: &str = "application/x-www-form-urlencoded";

// ── Harness ───────────────────────────────────────────────────

struct Harness {
    app: Router,
    clock: ManualClock,
    store: SqliteStore,
    owner: JoinHandle<()>,
}

impl Harness {
    async fn start(store: SqliteStore) -> Self {
        let config = MonitorConfig::default();
        let settings = store.load_settings().await.unwrap();
        let session = MarkerSession::new("admin", "beehive", config.auth.session_timeout_ms);
        let service = MonitorService::new(&config, settings, Box::new(session));
        let clock = ManualClock::new();
        let monitor = Monitor::new(
            service,
            MockHardware::calm(),
            clock.clone(),
            RecordingSink::new(),
            store.clone(),
            Duration::from_millis(10),
        );
        let (tx, rx) = request_channel();
        let owner = tokio::spawn(monitor.run(rx));
        Self {
            app: router(tx),
            clock,
            store,
            owner,
        }
    }

    async fn in_memory() -> Self {
        let store = SqliteStore::open_in_memory(&Settings::default()).await.unwrap();
        Self::start(store).await
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Log in and return the `Cookie` header value to send back.
    async fn login(&self) -> String {
        let resp = self
            .send(post("/login", "username=admin&password=beehive", None))
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let set = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        set.split(';').next().unwrap().to_string()
    }

    /// Wait until the first scheduled persist has landed.
    async fn settle(&self) {
        for _ in 0..200 {
            if !self.store.query_recent(1).await.unwrap().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("monitor never persisted its first reading");
    }

    /// Drop the router (the last sender) and wait for the owner to exit.
    async fn stop(self) {
        let Self { app, owner, .. } = self;
        drop(app);
        owner.await.unwrap();
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

async fn text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hivewatch-{}-{}.db", name, std::process::id()));
    remove_db(&path);
    path
}

fn remove_db(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut p = path.as_os_str().to_owned();
        p.push(suffix);
        let _ = std::fs::remove_file(p);
    }
}

fn reading(temperature: f32) -> Reading {
    Reading {
        temperature,
        humidity: 60.0,
        weight: 45.0,
        air_quality: 210,
        ..Reading::default()
    }
}

// ── Session ───────────────────────────────────────────────────

#[tokio::test]
async fn landing_serves_login_form_without_session() {
    let h = Harness::in_memory().await;
    let resp = h.send(get("/", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(text(resp).await.contains("action=\"/login\""));
    h.stop().await;
}

#[tokio::test]
async fn privileged_routes_redirect_without_session() {
    let h = Harness::in_memory().await;
    for uri in ["/dashboard", "/report", "/data", "/get_settings", "/history", "/monthly_data"] {
        let resp = h.send(get(uri, None)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/", "{uri}");
    }
    let resp = h.send(post("/sms", "", None)).await;
    assert_eq!(location(&resp), "/");
    h.stop().await;
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let h = Harness::in_memory().await;
    let resp = h
        .send(post("/login", "username=admin&password=honey", None))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert!(text(resp).await.contains("Try again"));
    h.stop().await;
}

#[tokio::test]
async fn login_opens_dashboard() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;
    assert_eq!(cookie, "HIVESESSION=hive-authenticated");

    let resp = h.send(get("/", Some(&cookie))).await;
    assert_eq!(location(&resp), "/dashboard");

    let resp = h.send(get("/dashboard", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "max-age=60");
    assert!(text(resp).await.contains("/get_settings"));
    h.stop().await;
}

#[tokio::test]
async fn logout_closes_the_session() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;

    let resp = h.send(get("/logout", Some(&cookie))).await;
    assert_eq!(location(&resp), "/");
    let cleared = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let resp = h.send(get("/data", Some(&cookie))).await;
    assert_eq!(location(&resp), "/");
    h.stop().await;
}

#[tokio::test]
async fn idle_session_expires() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;

    h.clock.set(1_000_000);
    let resp = h.send(get("/data", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The request above slid the window to 1_000_000 + 30 min.
    h.clock.set(1_000_000 + 1_800_001);
    let resp = h.send(get("/data", Some(&cookie))).await;
    assert_eq!(location(&resp), "/");
    h.stop().await;
}

// ── Data and settings ─────────────────────────────────────────

#[tokio::test]
async fn data_reports_the_current_reading() {
    let h = Harness::in_memory().await;
    h.settle().await;
    let cookie = h.login().await;

    let resp = h.send(get("/data", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(body["temp"], 30.0);
    assert_eq!(body["hum"], 55.0);
    assert_eq!(body["weight"], 42.0);
    assert_eq!(body["air"], 150);
    h.stop().await;
}

#[tokio::test]
async fn saved_settings_survive_a_restart() {
    let path = temp_db("settings");
    let store = SqliteStore::open(&path, &Settings::default()).await.unwrap();
    let h = Harness::start(store).await;
    let cookie = h.login().await;

    let resp = h
        .send(post(
            "/save_settings",
            "phone=%2B254711111111&lt=35&lh=80&lw=100&la=400",
            Some(&cookie),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");

    let expected = r#"{"phone":"+254711111111","lt":35.0,"lh":80.0,"lw":100.0,"la":400}"#;
    let resp = h.send(get("/get_settings", Some(&cookie))).await;
    assert_eq!(text(resp).await, expected);
    h.stop().await;

    let store = SqliteStore::open(&path, &Settings::default()).await.unwrap();
    let h = Harness::start(store).await;
    let cookie = h.login().await;
    let resp = h.send(get("/get_settings", Some(&cookie))).await;
    assert_eq!(text(resp).await, expected);
    h.stop().await;
    remove_db(&path);
}

#[tokio::test]
async fn invalid_settings_are_refused() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;

    let resp = h
        .send(post(
            "/save_settings",
            "phone=call-me&lt=35&lh=80&lw=100&la=400",
            Some(&cookie),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = h.send(get("/get_settings", Some(&cookie))).await;
    let body: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(body["phone"], "");
    assert_eq!(body["lt"], 40.0);
    h.stop().await;
}

#[tokio::test]
async fn malformed_settings_form_is_a_client_error() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;

    let resp = h
        .send(post(
            "/save_settings",
            "phone=%2B254711111111&lt=35&lh=80&lw=100&la=abc",
            Some(&cookie),
        ))
        .await;
    assert!(resp.status().is_client_error(), "got {}", resp.status());

    let resp = h.send(get("/get_settings", Some(&cookie))).await;
    let body: serde_json::Value = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(body["phone"], "");
    h.stop().await;
}

#[tokio::test]
async fn sms_trigger_answers_queued() {
    let h = Harness::in_memory().await;
    let cookie = h.login().await;
    let resp = h.send(post("/sms", "", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "Queued");
    h.stop().await;
}

// ── History ───────────────────────────────────────────────────

#[tokio::test]
async fn history_returns_ten_newest_rows() {
    let h = Harness::in_memory().await;
    h.settle().await;
    for i in 1..=12 {
        h.store.save_reading(&reading(i as f32), None, i * 1_000).await.unwrap();
    }
    let cookie = h.login().await;

    let resp = h.send(get("/history", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<serde_json::Value> = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(rows.len(), 10);
    let temps: Vec<f64> = rows.iter().map(|r| r["temp"].as_f64().unwrap()).collect();
    assert_eq!(temps, vec![12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0]);
    assert_eq!(rows[0]["timestamp"], "OFFLINE-12s");
    assert_eq!(rows[0]["mq"], 210);
    h.stop().await;
}

#[tokio::test]
async fn monthly_data_skips_offline_rows() {
    let h = Harness::in_memory().await;
    h.settle().await;
    let day1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
    h.store
        .save_reading(&reading(30.0), day1.and_hms_opt(9, 0, 0), 0)
        .await
        .unwrap();
    h.store
        .save_reading(&reading(32.0), day1.and_hms_opt(15, 0, 0), 0)
        .await
        .unwrap();
    h.store
        .save_reading(&reading(28.0), day2.and_hms_opt(10, 0, 0), 0)
        .await
        .unwrap();
    h.store.save_reading(&reading(99.0), None, 5_000).await.unwrap();
    let cookie = h.login().await;

    let resp = h.send(get("/monthly_data", Some(&cookie))).await;
    let days: Vec<serde_json::Value> = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["day"], "2024-05-02");
    assert_eq!(days[0]["avg_temp"], 28.0);
    assert_eq!(days[1]["day"], "2024-05-01");
    assert_eq!(days[1]["avg_temp"], 31.0);
    assert_eq!(days[1]["avg_mq"], 210.0);
    h.stop().await;
}

#[tokio::test]
async fn monthly_averages_are_rounded_to_two_decimals() {
    let h = Harness::in_memory().await;
    h.settle().await;
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    h.store
        .save_reading(&reading(36.2), day.and_hms_opt(9, 0, 0), 0)
        .await
        .unwrap();
    let cookie = h.login().await;

    let resp = h.send(get("/monthly_data", Some(&cookie))).await;
    let body = text(resp).await;
    assert!(body.contains("\"avg_temp\":36.2,"), "{body}");
    h.stop().await;
}

// ── Storage failure ───────────────────────────────────────────

#[tokio::test]
async fn storage_failure_answers_500_and_monitor_keeps_serving() {
    let h = Harness::in_memory().await;
    h.settle().await;
    let cookie = h.login().await;
    h.store.close().await;

    let resp = h.send(get("/history", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let resp = h.send(get("/monthly_data", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Let the owner run a few more ticks against the closed store.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let resp = h.send(get("/data", Some(&cookie))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    h.stop().await;
}

// ── Owner gone ────────────────────────────────────────────────

#[tokio::test]
async fn requests_fail_fast_when_owner_is_gone() {
    let (tx, rx) = request_channel();
    drop(rx);
    let app = router(tx);
    let resp = app.oneshot(get("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
