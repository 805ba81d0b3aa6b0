//! Common test utilities for integration tests
//!
//! Every `TestApp` owns a temporary directory for the flat-file user store
//! and the plan files, and a mock completion endpoint.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fitness_coach_backend::{config::AppConfig, routes, state::AppState};
use secrecy::SecretString;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A week-long plan wrapped in a code fence, the way models answer
pub const PLAN_REPLY: &str = r#"```json
{
  "workout": [
    {"day": "Monday", "focus": "Push", "exercises": [{"name": "Push-up", "sets": 3, "reps": "12", "rest": "60s"}]},
    {"day": "Tuesday", "focus": "Pull", "exercises": [{"name": "Row", "sets": "4", "reps": "10", "rest": "90s"}]},
    {"day": "Wednesday", "focus": "Legs", "exercises": [{"name": "Squat", "sets": "5", "reps": "5", "rest": "2m"}]},
    {"day": "Thursday", "focus": "Rest", "exercises": []},
    {"day": "Friday", "focus": "Upper", "exercises": [{"name": "Press", "sets": "3", "reps": "8", "rest": "90s"}]},
    {"day": "Saturday", "focus": "Lower", "exercises": [{"name": "Deadlift", "sets": "3", "reps": "5", "rest": "3m"}]},
    {"day": "Sunday", "focus": "Mobility", "exercises": [{"name": "Stretch", "sets": "1", "reps": "10 min", "rest": "-"}]}
  ],
  "diet": [
    {"day": "Monday", "Breakfast": "Oats", "Lunch": "Rice and dal", "Dinner": "Paneer", "Snacks": "Nuts"},
    {"day": "Tuesday", "Breakfast": "Poha", "Lunch": "Roti", "Dinner": "Khichdi"},
    {"day": "Wednesday", "Breakfast": "Idli", "Lunch": "Rajma", "Dinner": "Soup"},
    {"day": "Thursday", "Breakfast": "Upma", "Lunch": "Chole", "Dinner": "Salad"},
    {"day": "Friday", "Breakfast": "Dosa", "Lunch": "Pulao", "Dinner": "Tofu"},
    {"day": "Saturday", "Breakfast": "Paratha", "Lunch": "Curd rice", "Dinner": "Dal"},
    {"day": "Sunday", "Breakfast": "Smoothie", "Lunch": "Biryani", "Dinner": "Soup"}
  ],
  "tips": ["Sleep 8 hours", "Drink water"],
  "motivation": ["One rep at a time"]
}
```"#;

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub completion: MockServer,
    pub dir: TempDir,
}

impl TestApp {
    /// Create an app whose completion endpoint answers with `PLAN_REPLY`
    pub async fn new() -> Self {
        let app = Self::without_completion_mock().await;
        app.mock_completion(200, completion_body(PLAN_REPLY)).await;
        app
    }

    /// Create an app with no completion behaviour mounted yet
    pub async fn without_completion_mock() -> Self {
        let completion = MockServer::start().await;
        let dir = TempDir::new().unwrap();

        let mut config = AppConfig::default();
        config.completion.base_url = completion.uri();
        config.completion.api_key = Some(SecretString::new("test-key".to_string()));
        config.user_store.path = dir.path().join("db.json");
        config.storage.plan_dir = dir.path().join("plans");
        config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();

        let state = AppState::new(config).unwrap();
        let app = routes::create_router(state.clone());

        Self {
            app,
            state,
            completion,
            dir,
        }
    }

    /// Answer every completion request with `status` and `body`
    pub async fn mock_completion(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.completion)
            .await;
    }

    /// Sign up a fresh account and return its access token
    pub async fn sign_up(&self, name: &str, email: &str) -> String {
        let body = json!({"name": name, "email": email, "password": "password123"});
        let (status, text) = self.post("/api/v1/auth/signup", &body.to_string(), None).await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", text);
        let session: Value = serde_json::from_str(&text).unwrap();
        session["access_token"].as_str().unwrap().to_string()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec(), content_type)
    }

    fn builder(method: &str, path: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let request = Self::builder("GET", path, token).body(Body::empty()).unwrap();
        let (status, body, _) = self.send(request).await;
        (status, String::from_utf8(body).unwrap())
    }

    /// Make a GET request and keep the raw body and content type
    pub async fn get_bytes(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> (StatusCode, Vec<u8>, Option<String>) {
        let request = Self::builder("GET", path, token).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str, token: Option<&str>) -> (StatusCode, String) {
        let request = Self::builder("POST", path, token)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body, _) = self.send(request).await;
        (status, String::from_utf8(body).unwrap())
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, token: Option<&str>) -> StatusCode {
        let request = Self::builder("DELETE", path, token).body(Body::empty()).unwrap();
        self.send(request).await.0
    }
}

/// OpenAI-style completion response carrying `content`
pub fn completion_body(content: &str) -> Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

/// A valid profile as the form submits it
pub fn profile_json(name: &str) -> String {
    json!({
        "name": name,
        "age": 30,
        "gender": "Male",
        "heightCm": 180,
        "weightKg": 80,
        "goal": "Muscle Gain",
        "level": "Beginner",
        "location": "Gym",
        "diet": "Veg"
    })
    .to_string()
}
