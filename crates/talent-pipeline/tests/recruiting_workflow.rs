//! End-to-end scenarios for the candidate pipeline, driven through the public router so
//! intake, lookups, listings, and stage transitions are validated together.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use talent_pipeline::recruiting::{
    recruiting_router, CandidateId, InMemoryRecruitingStore, RecruitingState,
    SqliteRecruitingStore,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

async fn send(router: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize"))),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload = serde_json::from_slice(&bytes).expect("json payload");
    (status, payload)
}

#[tokio::test]
async fn created_candidate_can_be_fetched_by_id() {
    let router = recruiting_router(RecruitingState::new(Arc::new(
        InMemoryRecruitingStore::default(),
    )));
    let submission = json!({
        "firstName": "Lucía",
        "lastName": "Fernández",
        "email": "lucia.fernandez@example.com",
        "phone": "712345678",
        "address": "Gran Vía 1, Madrid"
    });

    let (status, created) = send(&router, Method::POST, "/candidates", Some(submission.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().expect("candidate id");

    let (status, fetched) = send(&router, Method::GET, &format!("/candidates/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);
    for field in ["firstName", "lastName", "email", "phone", "address"] {
        assert_eq!(fetched[field], submission[field], "{field} round-trips");
    }
    assert_eq!(fetched["applications"], json!([]));
}

#[tokio::test]
async fn position_listing_averages_interview_scores() {
    let store = Arc::new(InMemoryRecruitingStore::default());
    let router = recruiting_router(RecruitingState::new(store.clone()));

    let (_, created) = send(
        &router,
        Method::POST,
        "/candidates",
        Some(json!({
            "firstName": "Jorge",
            "lastName": "Martín",
            "email": "jorge.martin@example.com"
        })),
    )
    .await;
    let candidate_id = CandidateId(created["data"]["id"].as_i64().expect("candidate id"));

    let position = store.add_position("Frontend Engineer").expect("position");
    let screening = store
        .add_interview_step(position.id, "Initial Screening", 1)
        .expect("step");
    let technical = store
        .add_interview_step(position.id, "Technical Interview", 2)
        .expect("step");
    let application = store
        .add_application(candidate_id, position.id, screening.id, date(2024, 2, 1))
        .expect("application");
    store
        .add_interview(application.id, date(2024, 2, 3), Some(3))
        .expect("interview");
    store
        .add_interview(application.id, date(2024, 2, 8), Some(5))
        .expect("interview");

    let listing_uri = format!("/positions/{}/candidates", position.id);
    let (status, listing) = send(&router, Method::GET, &listing_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["completeName"], "Jorge Martín");
    assert_eq!(listing[0]["currentInterviewStep"], "Initial Screening");
    assert_eq!(listing[0]["averagePoints"].as_f64(), Some(4.0));

    let (status, updated) = send(
        &router,
        Method::PUT,
        &format!("/candidates/{candidate_id}/stage"),
        Some(json!({ "positionId": position.id.0, "interviewStepId": technical.id.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["currentInterviewStep"], "Technical Interview");

    let (_, listing) = send(&router, Method::GET, &listing_uri, None).await;
    assert_eq!(listing[0]["currentInterviewStep"], "Technical Interview");
    assert_eq!(listing[0]["averagePoints"].as_f64(), Some(4.0));
}

#[tokio::test]
async fn sqlite_store_serves_the_same_routes() {
    let store = Arc::new(
        SqliteRecruitingStore::connect("sqlite::memory:")
            .await
            .expect("sqlite store"),
    );
    let router = recruiting_router(RecruitingState::new(store.clone()));

    let (status, created) = send(
        &router,
        Method::POST,
        "/candidates",
        Some(json!({
            "firstName": "Marta",
            "lastName": "Ruiz",
            "email": "marta.ruiz@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let candidate_id = CandidateId(created["data"]["id"].as_i64().expect("candidate id"));

    let (status, duplicate) = send(
        &router,
        Method::POST,
        "/candidates",
        Some(json!({
            "firstName": "Marta",
            "lastName": "Ruiz",
            "email": "marta.ruiz@example.com"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate["error"], "The email already exists in the database");

    let position = store.add_position("Platform Engineer").await.expect("position");
    let step = store
        .add_interview_step(position.id, "Initial Screening", 1)
        .await
        .expect("step");
    let application = store
        .add_application(candidate_id, position.id, step.id, date(2024, 7, 1))
        .await
        .expect("application");
    store
        .add_interview(application.id, date(2024, 7, 2), None)
        .await
        .expect("interview");

    let (status, listing) = send(
        &router,
        Method::GET,
        &format!("/positions/{}/candidates", position.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing[0]["completeName"], "Marta Ruiz");
    assert!(listing[0]["averagePoints"].is_null());

    let (status, missing) = send(&router, Method::GET, "/positions/424242/candidates", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], "Position not found");
}
