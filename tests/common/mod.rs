// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chemgenius::{
    ai::{AiError, CategorizeInput, ExamQuizRequest, StudyAssistant},
    config::Config,
    engine::RoastRequest,
    models::{
        chat::ChatMessage,
        question::GeneratedQuestion,
        topic::{OrganizedQuestion, SubTopic, Topic},
        user::{NewUser, ROLE_ADMIN},
    },
    routes,
    state::AppState,
    store::{UserStore, memory::MemoryStore},
    utils::hash::hash_password,
};
use serde_json::{Value, json};

pub const ROAST_TEXT: &str = "You just violated the Octet rule. Carbon is crying right now.";
pub const ADMIN_SIGNUP_KEY: &str = "let-me-in";

/// How the canned assistant behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    /// Well-formed answers everywhere.
    Healthy,
    /// Quiz generation returns an out-of-range answer index.
    MalformedQuiz,
    /// Every call fails as if no API key were configured.
    Disabled,
}

pub struct StubAssistant {
    mode: StubMode,
}

impl StubAssistant {
    pub fn new(mode: StubMode) -> Self {
        Self { mode }
    }

    fn check(&self) -> Result<(), AiError> {
        match self.mode {
            StubMode::Disabled => Err(AiError::Disabled),
            _ => Ok(()),
        }
    }

    fn questions(&self, count: usize) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.check()?;
        let correct = if self.mode == StubMode::MalformedQuiz { 7 } else { 1 };
        let batch: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("stub-{}", i + 1),
                    "questionText": format!("Which species is most stable? ({})", i + 1),
                    "options": ["Methyl cation", "Tertiary carbocation", "Primary carbocation", "Vinyl cation"],
                    "correctAnswerIndex": correct,
                    "explanation": "Hyperconjugation and induction stabilise the tertiary carbocation.",
                    "hint": "Count the alkyl groups.",
                    "difficulty": if i % 2 == 0 { "Easy" } else { "Hard" },
                    "topic": "Carbocations"
                })
            })
            .collect();
        Ok(serde_json::from_value(Value::Array(batch)).expect("stub questions deserialize"))
    }
}

#[async_trait]
impl StudyAssistant for StubAssistant {
    async fn categorize(&self, input: CategorizeInput) -> Result<Vec<Topic>, AiError> {
        self.check()?;
        let source = match input {
            CategorizeInput::Text(text) => text,
            CategorizeInput::Image(_) => "from image".to_string(),
        };
        Ok(vec![Topic {
            name: "Organic Chemistry".to_string(),
            subtopics: vec![SubTopic {
                name: "Alkanes".to_string(),
                questions: vec![OrganizedQuestion {
                    id: Some("o1".to_string()),
                    text: source,
                    difficulty: None,
                }],
            }],
        }])
    }

    async fn generate_review_quiz(
        &self,
        _topics: &[Topic],
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.questions(5)
    }

    async fn generate_exam_quiz(
        &self,
        request: &ExamQuizRequest,
    ) -> Result<Vec<GeneratedQuestion>, AiError> {
        self.questions(request.count)
    }

    async fn generate_diagram(&self, concept: &str) -> Result<String, AiError> {
        self.check()?;
        if concept == "nothing" {
            return Ok("I'm sorry, I can't draw that.".to_string());
        }
        Ok(format!(
            "```svg\n<svg xmlns=\"http://www.w3.org/2000/svg\"><title>{}</title></svg>\n```",
            concept
        ))
    }

    async fn roast(&self, _request: &RoastRequest) -> Result<String, AiError> {
        self.check()?;
        Ok(ROAST_TEXT.to_string())
    }

    async fn chat_reply(&self, history: &[ChatMessage], message: &str) -> Result<String, AiError> {
        self.check()?;
        Ok(format!("({} earlier) You asked: {}", history.len(), message))
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_email: None,
        admin_password: None,
        admin_signup_key: Some(ADMIN_SIGNUP_KEY.to_string()),
        gemini_api_key: None,
        gemini_base_url: "http://127.0.0.1:9".to_string(),
        gemini_model: "stub".to_string(),
        ai_timeout: Duration::from_secs(5),
        roast_timeout: Duration::from_secs(2),
    }
}

/// Spawns the app on a random port, backed by the in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(StubMode::Healthy).await
}

pub async fn spawn_app_with(mode: StubMode) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        store.clone(),
        Arc::new(StubAssistant::new(mode)),
        test_config(),
    );
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers a fresh student and returns its bearer token.
    pub async fn student_token(&self) -> String {
        let email = format!("s_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
        let response = self.register("Student", &email, "password123").await;
        assert_eq!(response.status().as_u16(), 201);
        self.token_for(&email, "password123").await
    }

    /// Seeds an admin straight into the store and returns its bearer token.
    pub async fn admin_token(&self) -> String {
        let email = format!("a_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);
        self.store
            .create_user(NewUser {
                name: "Admin".to_string(),
                email: email.clone(),
                password_hash: hash_password("adminpass").unwrap(),
                role: ROLE_ADMIN.to_string(),
            })
            .await
            .unwrap();
        self.token_for(&email, "adminpass").await
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let body: Value = self.login(email, password).await.json().await.unwrap();
        body["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
