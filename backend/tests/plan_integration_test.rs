//! Integration tests for plan generation, storage and exports

mod common;

use axum::http::StatusCode;
use common::{completion_body, profile_json, TestApp};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_generate_then_fetch_current_plan() {
    let app = TestApp::without_completion_mock().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_string_contains("Age: 30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(common::PLAN_REPLY)))
        .expect(1)
        .mount(&app.completion)
        .await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    let (status, body) = app
        .post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let generated: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(generated["shape"]["workout_days"], 7);
    assert_eq!(generated["shape"]["is_complete_week"], true);
    assert_eq!(generated["plan"]["workout"][0]["exercises"][0]["sets"], "3");

    let (status, body) = app.get("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let current: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(current["user"]["name"], "Sam");
    assert_eq!(current["plan"], generated["plan"]);
}

#[tokio::test]
async fn test_current_plan_missing_is_404() {
    let app = TestApp::new().await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    let (status, _) = app.get("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app.get_bytes("/api/v1/plans/current/pdf", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_profile_is_400_and_skips_model() {
    let app = TestApp::without_completion_mock().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.completion)
        .await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    let mut profile: Value = serde_json::from_str(&profile_json("Sam")).unwrap();
    profile["heightCm"] = json!(10);
    let (status, body) = app
        .post("/api/v1/plans/generate", &profile.to_string(), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"]["field"], "heightCm");

    let (status, _) = app
        .post("/api/v1/plans/generate", r#"{"age": "thirty"}"#, Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_502_and_keeps_old_plan() {
    let app = TestApp::without_completion_mock().await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    // First request succeeds, every later one is rate limited
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(common::PLAN_REPLY)))
        .up_to_n_times(1)
        .mount(&app.completion)
        .await;
    app.mock_completion(429, json!({"error": {"message": "rate limited"}}))
        .await;

    let (status, _) = app
        .post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Failed to generate plan"));
    assert!(!body.contains("rate limited"));

    let (status, _) = app.get("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unparseable_model_output_is_502() {
    let app = TestApp::without_completion_mock().await;
    app.mock_completion(200, completion_body("Sorry, I can't do that."))
        .await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    let (status, _) = app
        .post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = app.get("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_name_comes_from_account() {
    let app = TestApp::new().await;
    let token = app.sign_up("Priya", "priya@example.com").await;

    let (status, _) = app
        .post("/api/v1/plans/generate", &profile_json(""), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/v1/plans/current", Some(&token)).await;
    let current: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(current["user"]["name"], "Priya");
}

#[tokio::test]
async fn test_plans_are_per_account() {
    let app = TestApp::new().await;
    let first = app.sign_up("A", "a@example.com").await;
    let second = app.sign_up("B", "b@example.com").await;

    app.post("/api/v1/plans/generate", &profile_json("A"), Some(&first))
        .await;

    let (status, _) = app.get("/api/v1/plans/current", Some(&second)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_clears_plan() {
    let app = TestApp::new().await;
    let token = app.sign_up("Sam", "sam@example.com").await;
    app.post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;

    let status = app.delete("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Clearing twice is fine
    let status = app.delete("/api/v1/plans/current", Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_pdf_export() {
    let app = TestApp::new().await;
    let token = app.sign_up("Sam", "sam@example.com").await;
    app.post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;

    let (status, bytes, content_type) = app
        .get_bytes("/api/v1/plans/current/pdf", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[tokio::test]
async fn test_narration_views() {
    let app = TestApp::new().await;
    let token = app.sign_up("Sam", "sam@example.com").await;
    app.post("/api/v1/plans/generate", &profile_json("Sam"), Some(&token))
        .await;

    let (status, body) = app
        .get("/api/v1/plans/current/narration?view=diet", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let narration: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(narration["view"], "diet");
    assert!(narration["text"]
        .as_str()
        .unwrap()
        .starts_with("Monday: Breakfast Oats."));

    let (_, body) = app
        .get("/api/v1/plans/current/narration", Some(&token))
        .await;
    let narration: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(narration["view"], "workout");
    assert!(narration["text"].as_str().unwrap().contains("Push-up. 3 sets of 12."));

    let (status, _) = app
        .get("/api/v1/plans/current/narration?view=cardio", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_image_url_and_blank_prompt() {
    let app = TestApp::new().await;
    let token = app.sign_up("Sam", "sam@example.com").await;

    let (status, body) = app
        .post("/api/v1/images", r#"{"prompt": "Healthy food photo of Oats"}"#, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    let image: Value = serde_json::from_str(&body).unwrap();
    assert!(image["image_url"]
        .as_str()
        .unwrap()
        .ends_with("/prompt/Healthy%20food%20photo%20of%20Oats?width=1024&height=1024"));

    let (status, _) = app
        .post("/api/v1/images", r#"{"prompt": "  "}"#, Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/images", "{}", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_motivation_quote_and_fallback() {
    let app = TestApp::without_completion_mock().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("\"Discipline is freedom.\"")),
        )
        .up_to_n_times(1)
        .mount(&app.completion)
        .await;
    app.mock_completion(500, json!({})).await;

    let (status, body) = app.get("/api/v1/motivation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["quote"], "Discipline is freedom.");

    let (status, body) = app.get("/api/v1/motivation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap()["quote"],
        "Show up today. Your future self is watching."
    );
}
