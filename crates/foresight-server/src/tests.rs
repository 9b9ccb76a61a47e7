//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use foresight_core::forecast::Narrator;
use foresight_core::import::{import_transactions, parse_csv};
use foresight_core::{AIClient, MockBackend, YearMonth};
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

fn open_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router_with_service(db, ForecastService::new(EngineConfig::default()), open_config())
}

/// Database holding three completed months of rising spending
fn seeded_db() -> Database {
    let db = Database::in_memory().unwrap();
    let current = YearMonth::current();
    let mut csv = String::from("date,description,amount,category\n");
    for (offset, groceries) in [(3, "200.00"), (2, "300.00"), (1, "400.00")] {
        let day = current.add_months(-offset).first_day();
        csv.push_str(&format!("{},Salary,4000.00,\n", day));
        csv.push_str(&format!("{},Rent,-800.00,Housing\n", day));
        csv.push_str(&format!("{},Groceries,-{},Groceries\n", day, groceries));
    }
    let transactions = parse_csv(csv.as_bytes()).unwrap();
    import_transactions(&db, &transactions).unwrap();
    db
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["narrative"], false);
}

// ========== Expense Forecast API Tests ==========

#[tokio::test]
async fn test_forecast_from_supplied_history() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "history": [
            { "month": "2024-01", "income": 400000, "expense": 100000 },
            { "month": "2024-02", "income": 400000, "expense": 110000 },
            { "month": "2024-03", "income": 400000, "expense": 120000 }
        ]
    });
    let response = app
        .oneshot(post_json("/api/forecast/expenses", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["month"], "2024-04");
    assert_eq!(json["trend"], "increasing");
    assert_eq!(json["monthly_income"], 400000);
    let predicted = json["predicted_expense"].as_i64().unwrap();
    assert!(predicted > 100000 && predicted < 120000);
    assert!(json["confidence"].as_u64().unwrap() < 95);
    assert!(json.get("narrative").is_none());
}

#[tokio::test]
async fn test_forecast_insufficient_history_is_422() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "history": [{ "month": "2024-01", "income": 0, "expense": 100000 }]
    });
    let response = app
        .oneshot(post_json("/api/forecast/expenses", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Not enough data yet"));
}

#[tokio::test]
async fn test_forecast_from_stored_transactions() {
    let app = create_router_with_service(
        seeded_db(),
        ForecastService::new(EngineConfig::default()),
        open_config(),
    );

    let response = app
        .oneshot(get("/api/forecast/expenses?months=6"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["month"], YearMonth::current().to_string());
    assert_eq!(json["trend"], "increasing");
    let breakdown = json["breakdown"].as_array().unwrap();
    assert_eq!(breakdown[0]["category"], "Housing");
}

#[tokio::test]
async fn test_forecast_rejects_bad_window() {
    let app = setup_test_app();

    let response = app
        .oneshot(get("/api/forecast/expenses?months=0"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_with_narrative() {
    let service = ForecastService::new(EngineConfig::default()).with_narrator(Narrator::new(
        AIClient::Mock(MockBackend::with_reply("Spending is creeping up.")),
        Duration::from_secs(1),
    ));
    let app = create_router_with_service(seeded_db(), service, open_config());

    let response = app
        .oneshot(get("/api/forecast/expenses?narrate=true"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["narrative"], "Spending is creeping up.");
}

#[tokio::test]
async fn test_forecast_narrative_falls_back_when_backend_fails() {
    let service = ForecastService::new(EngineConfig::default()).with_narrator(Narrator::new(
        AIClient::Mock(MockBackend::unhealthy()),
        Duration::from_secs(1),
    ));
    let app = create_router_with_service(seeded_db(), service, open_config());

    let response = app
        .oneshot(get("/api/forecast/expenses?narrate=true"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["narrative"], foresight_core::NARRATIVE_FALLBACK);
    assert!(json["predicted_expense"].as_i64().unwrap() > 0);
}

// ========== Goal Projection API Tests ==========

#[tokio::test]
async fn test_goal_projection() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "current_savings": 0,
        "goal_amount": 100000,
        "monthly_income": 40000,
        "monthly_expense": 15000
    });
    let response = app
        .oneshot(post_json("/api/goals/projection", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["months_to_goal"], 4);
    assert_eq!(json["monthly_balance"], 25000);
}

#[tokio::test]
async fn test_goal_projection_unreachable() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "goal_amount": 100000,
        "monthly_income": 50000,
        "monthly_expense": 60000
    });
    let response = app
        .oneshot(post_json("/api/goals/projection", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["feasibility"], "unrealistic");
    assert_eq!(json["months_to_goal"], foresight_core::MONTHS_UNREACHABLE);
    assert!(json["estimated_completion_date"].is_null());
}

// ========== Plan API Tests ==========

#[tokio::test]
async fn test_plan_crud_flow() {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_service(
        db.clone(),
        ForecastService::new(EngineConfig::default()),
        open_config(),
    );

    // Create
    let body = serde_json::json!({
        "name": "Emergency fund",
        "goal_amount": 600000,
        "monthly_contribution": 50000,
        "plan_type": "emergency_fund"
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/plans", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let id = json["id"].as_i64().unwrap();
    assert_eq!(json["current_amount"], 0);

    // Contribute
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/plans/{}/contributions", id),
            serde_json::json!({ "amount": 150000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["current_amount"], 150000);

    // Forecast: one 1500.00 contribution in the window averages 500.00/month
    let response = app
        .clone()
        .oneshot(get(&format!("/api/plans/{}/forecast", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["remaining_amount"], 450000);
    assert_eq!(json["average_monthly_contribution"], 50000);
    assert_eq!(json["months_to_goal"], 9);
    assert!(json["advice"].as_str().unwrap().starts_with("Great pace!"));

    // List
    let response = app.clone().oneshot(get("/api/plans")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/plans/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/plans/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(db.list_plans().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_plan_validation() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/plans",
            serde_json::json!({ "name": "  ", "goal_amount": 1000 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_plan() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/plans",
            serde_json::json!({ "name": "Car", "goal_amount": 1000000 }),
        ))
        .await
        .unwrap();
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let put = |uri: String, body: serde_json::Value| {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(put(
            format!("/api/plans/{}", id),
            serde_json::json!({
                "name": "Used car",
                "goal_amount": 600000,
                "current_amount": 100000,
                "plan_type": "purchase"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Used car");
    assert_eq!(json["goal_amount"], 600000);
    assert_eq!(json["plan_type"], "purchase");

    let response = app
        .oneshot(put(
            "/api/plans/999".to_string(),
            serde_json::json!({ "name": "Ghost", "goal_amount": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contribution_to_missing_plan() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json(
            "/api/plans/999/contributions",
            serde_json::json!({ "amount": 1000 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plan_forecast_missing_plan() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/plans/42/forecast")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Plan 42 not found");
}

// ========== Scenario API Tests ==========

#[tokio::test]
async fn test_simulate_with_explicit_baseline() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "scenario": {
            "name": "Gym membership",
            "monthly_change": 5000,
            "affects": "expense"
        },
        "monthly_income": 500000,
        "monthly_expense": 400000,
        "months": 6
    });
    let response = app
        .oneshot(post_json("/api/scenarios/simulate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["difference"], -5000);
    assert!((json["impact_percentage"].as_f64().unwrap() + 5.0).abs() < 1e-9);
    let timeline = json["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 6);
    assert_eq!(timeline[5]["new"], 95000 * 6);
}

#[tokio::test]
async fn test_simulate_uses_stored_baseline() {
    let app = create_router_with_service(
        seeded_db(),
        ForecastService::new(EngineConfig::default()),
        open_config(),
    );

    let body = serde_json::json!({
        "scenario": { "name": "Raise", "monthly_change": 20000, "affects": "income" },
        "months": 3
    });
    let response = app
        .oneshot(post_json("/api/scenarios/simulate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    // Income 4000.00, expense average 1100.00
    assert_eq!(json["original_balance"], 290000);
    assert_eq!(json["new_balance"], 310000);
}

#[tokio::test]
async fn test_simulate_without_history_is_422() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "scenario": { "name": "Raise", "monthly_change": 20000, "affects": "income" }
    });
    let response = app
        .oneshot(post_json("/api/scenarios/simulate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_simulate_rejects_long_horizon() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "scenario": { "name": "Raise", "monthly_change": 1, "affects": "income" },
        "monthly_income": 1,
        "monthly_expense": 1,
        "months": MAX_SIMULATION_MONTHS + 1
    });
    let response = app
        .oneshot(post_json("/api/scenarios/simulate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_simulate_rejects_out_of_range_baseline() {
    let app = setup_test_app();

    let body = serde_json::json!({
        "scenario": { "name": "Raise", "monthly_change": 1, "affects": "income" },
        "monthly_income": i64::MAX / 4,
        "monthly_expense": 0,
        "months": 12
    });
    let response = app
        .oneshot(post_json("/api/scenarios/simulate", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("monthly_income is out of range"));
}

#[tokio::test]
async fn test_amount_limits_on_goal_and_plan_endpoints() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/goals/projection",
            serde_json::json!({
                "goal_amount": 100000,
                "monthly_income": i64::MAX,
                "monthly_expense": i64::MIN
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/plans",
            serde_json::json!({ "name": "Moon", "goal_amount": i64::MAX }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Authentication Tests ==========

#[tokio::test]
async fn test_auth_required() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router_with_service(db, ForecastService::default(), config);

    let response = app.oneshot(get("/api/plans")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_with_api_key() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router_with_service(db, ForecastService::default(), config);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/plans")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/plans")
                .header("authorization", "Bearer secret-kez")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(parse_api_keys(" a, b ,,c"), vec!["a", "b", "c"]);
    assert!(parse_api_keys("").is_empty());
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc".to_string()];
    assert!(validate_api_key("abc", &keys));
    assert!(!validate_api_key("abcd", &keys));
    assert!(!validate_api_key("abd", &keys));
    assert!(!validate_api_key("abc", &[]));
}

// ========== File-backed database ==========

#[tokio::test]
async fn test_plans_persist_in_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.db");
    let path = path.to_str().unwrap();

    let app = create_router_with_service(
        Database::new_unencrypted(path).unwrap(),
        ForecastService::default(),
        open_config(),
    );
    let response = app
        .oneshot(post_json(
            "/api/plans",
            serde_json::json!({ "name": "Trip", "goal_amount": 250000 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reopened = Database::new_unencrypted(path).unwrap();
    assert_eq!(reopened.list_plans().unwrap()[0].name, "Trip");
}
