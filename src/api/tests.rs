use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::{Value, json};

use crate::auth::jwt::generate_access_token;
use crate::config::Config;
use crate::model::role::Role;
use crate::model::user::{NewUser, User};
use crate::routes;
use crate::service::AppState;
use crate::store::InMemoryStore;

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

async fn seed_user(state: &AppState, username: &str, role: Role) -> User {
    state
        .store
        .insert_user(NewUser {
            username: username.to_string(),
            password: "not-a-real-hash".to_string(),
            full_name: username.to_string(),
            email: format!("{username}@example.com"),
            role_id: role.id(),
        })
        .await
        .unwrap()
}

fn bearer(config: &Config, user: &User) -> (header::HeaderName, String) {
    let token = generate_access_token(
        user.id,
        user.username.clone(),
        user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

struct Harness {
    state: AppState,
    config: Config,
    admin: User,
    employee: User,
}

async fn harness() -> Harness {
    let config = Config::for_tests();
    let state = AppState::new(Arc::new(InMemoryStore::new()), config.day_lock_idle);
    let admin = seed_user(&state, "admin", Role::Admin).await;
    let employee = seed_user(&state, "yamada", Role::Employee).await;
    Harness {
        state,
        config,
        admin,
        employee,
    }
}

macro_rules! app {
    ($h:expr) => {{
        let config = $h.config.clone();
        test::init_service(
            App::new()
                .app_data(Data::new($h.state.clone()))
                .app_data(Data::new($h.config.clone()))
                .configure(move |cfg| routes::configure(cfg, config.clone())),
        )
        .await
    }};
}

async fn body_json(resp: ServiceResponse) -> Value {
    test::read_body_json(resp).await
}

// governor keys on the peer address, which test requests lack by default
macro_rules! call {
    ($app:expr, $req:expr $(,)?) => {
        test::call_service($app, $req.peer_addr(peer()).to_request())
    };
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let h = harness().await;
    let app = app!(h);

    let resp = call!(&app, test::TestRequest::get().uri("/api/attendance/today")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/today")
            .insert_header((header::AUTHORIZATION, "Bearer garbage")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(resp).await["message"].is_string());
}

#[actix_web::test]
async fn today_without_record_is_an_unsaved_day() {
    let h = harness().await;
    let app = app!(h);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance/today")
            .insert_header(bearer(&h.config, &h.employee)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], 0);
    assert_eq!(body["state"], "not_started");
    assert_eq!(body["status"], "not_clocked_in");
}

#[actix_web::test]
async fn clock_events_follow_the_day_state() {
    let h = harness().await;
    let app = app!(h);
    let auth = bearer(&h.config, &h.employee);

    let post = |action: &str| {
        test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(auth.clone())
            .set_json(json!({ "action": action }))
    };

    let resp = call!(&app, post("clock_out")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(&app, post("teleport")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("teleport"));

    let resp = call!(&app, post("clock_in")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "出勤を記録しました");
    assert_eq!(body["record"]["state"], "working");
    assert_eq!(body["record"]["status"], "present");

    let resp = call!(&app, post("clock_in")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["message"], "既に出勤記録があります");

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance")
            .insert_header(auth.clone()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn list_rejects_malformed_dates() {
    let h = harness().await;
    let app = app!(h);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/attendance?start_date=2026-13-01")
            .insert_header(bearer(&h.config, &h.employee)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_routes_reject_employees() {
    let h = harness().await;
    let app = app!(h);
    let auth = bearer(&h.config, &h.employee);

    for uri in [
        "/api/admin/users",
        "/api/correction-requests/admin",
        "/api/reports/attendance-summary",
    ] {
        let resp = call!(&app, test::TestRequest::get().uri(uri).insert_header(auth.clone())).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let resp = call!(
        &app,
        test::TestRequest::put()
            .uri("/api/correction-requests/1/decision")
            .insert_header(auth)
            .set_json(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn correction_request_round_trip() {
    let h = harness().await;
    let app = app!(h);
    let employee = bearer(&h.config, &h.employee);
    let admin = bearer(&h.config, &h.admin);

    let request = json!({
        "requested_date": "2026-01-05",
        "requested_clock_in": "09:00",
        "requested_clock_out": "18:00",
        "requested_break_start": "12:00",
        "requested_break_end": "13:00",
        "reason": "打刻忘れ"
    });

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/correction-requests")
            .insert_header(employee.clone())
            .set_json(&request),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["status"], "pending");
    let id = created["id"].as_u64().unwrap();

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/correction-requests")
            .insert_header(employee.clone())
            .set_json(&request),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/correction-requests/admin?status=pending")
            .insert_header(admin.clone()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

    let resp = call!(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/correction-requests/{id}/decision"))
            .insert_header(admin.clone())
            .set_json(json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let decide = || {
        test::TestRequest::put()
            .uri(&format!("/api/correction-requests/{id}/decision"))
            .insert_header(admin.clone())
            .set_json(json!({ "status": "approved", "admin_notes": "OK" }))
    };

    let resp = call!(
        &app, decide()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["request"]["status"], "approved");
    assert_eq!(body["request"]["approved_by"], h.admin.id);
    assert_eq!(body["record"]["clock_in"], "2026-01-05T09:00:00");
    assert_eq!(body["record"]["state"], "finished");

    let resp = call!(
        &app, decide()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri(&format!(
                "/api/reports/attendance-summary?start_date=2026-01-05&end_date=2026-01-05&user_id={}",
                h.employee.id
            ))
            .insert_header(admin),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["total_records"], 1);
    assert_eq!(body["summary"][0]["work_hours"], 8.0);
    assert_eq!(body["summary"][0]["break_hours"], 1.0);
}

#[actix_web::test]
async fn admin_creates_and_corrects_records() {
    let h = harness().await;
    let app = app!(h);
    let admin = bearer(&h.config, &h.admin);

    let create = json!({
        "user_id": h.employee.id,
        "date": "2026-01-06",
        "clock_in": "09:00",
        "reason": "打刻漏れ"
    });

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/attendance")
            .insert_header(admin.clone())
            .set_json(&create),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/attendance")
            .insert_header(admin.clone())
            .set_json(&create),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/attendance/correct")
            .insert_header(admin.clone())
            .set_json(json!({
                "user_id": h.employee.id,
                "date": "2026-01-06",
                "clock_out": "08:00",
                "reason": "修正"
            })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/attendance/correct")
            .insert_header(admin.clone())
            .set_json(json!({
                "user_id": h.employee.id,
                "date": "2026-01-06",
                "clock_out": "18:00",
                "reason": "退勤漏れ"
            })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["record"]["clock_out"], "2026-01-06T18:00:00");
    assert!(
        body["record"]["admin_log"]
            .as_str()
            .unwrap()
            .contains("by admin] 退勤漏れ")
    );

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/api/admin/attendance/correct")
            .insert_header(admin.clone())
            .set_json(json!({
                "user_id": 9999,
                "date": "2026-01-06",
                "clock_in": "09:00",
                "reason": "x"
            })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/admin/users")
            .insert_header(admin),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users = body_json(resp).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(users[0].get("password").is_none());
}

#[actix_web::test]
async fn register_then_login() {
    let h = harness().await;
    let app = app!(h);

    let register = json!({
        "username": "suzuki",
        "password": "secret-pass",
        "full_name": "鈴木 花子",
        "email": "suzuki@example.com"
    });

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&register),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&register),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "suzuki", "password": "wrong" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = call!(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": "suzuki", "password": "secret-pass" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["is_admin"], false);
    let token = body["access_token"].as_str().unwrap().to_string();

    let resp = call!(
        &app,
        test::TestRequest::get()
            .uri("/api/correction-requests")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}"))),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
