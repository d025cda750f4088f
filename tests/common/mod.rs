#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use exam_backend::{
    cache::{KvCache, MemoryCache},
    config::{Config, LogFormat},
    error::{Error, Result},
    models::{
        answer::Answer,
        user::{Role, User},
    },
    routes::build_router,
    services::submission_service::SubmissionWorker,
    stores::{AnswerStore, NewUser, UserChanges, UserStore},
    utils::time::{Clock, ManualClock},
    AppState, Backends,
};

#[derive(Default)]
pub struct InMemoryAnswerStore {
    rows: Mutex<HashMap<(i64, i64), Answer>>,
}

impl InMemoryAnswerStore {
    fn write(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        at: DateTime<Utc>,
        is_draft: bool,
    ) -> Option<Answer> {
        let mut rows = self.rows.lock().unwrap();
        let next_id = rows.len() as i64 + 1;
        let row = rows.entry((participant_id, question_id)).or_insert(Answer {
            id: next_id,
            participant_id,
            question_id,
            answer_text: String::new(),
            submitted_at: at,
            is_draft: true,
        });
        if is_draft && !row.is_draft {
            return None;
        }
        row.answer_text = answer_text.to_string();
        row.submitted_at = at;
        row.is_draft = is_draft;
        Some(row.clone())
    }

    pub fn snapshot(&self) -> Vec<Answer> {
        let mut all: Vec<Answer> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|a| a.id);
        all
    }
}

#[async_trait]
impl AnswerStore for InMemoryAnswerStore {
    async fn upsert_final(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Answer> {
        self.write(participant_id, question_id, answer_text, submitted_at, false)
            .ok_or_else(|| Error::Internal("final write rejected".into()))
    }

    async fn upsert_draft(
        &self,
        participant_id: i64,
        question_id: i64,
        answer_text: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<Option<Answer>> {
        Ok(self.write(participant_id, question_id, answer_text, saved_at, true))
    }

    async fn find(&self, participant_id: i64, question_id: i64) -> Result<Option<Answer>> {
        Ok(self.rows.lock().unwrap().get(&(participant_id, question_id)).cloned())
    }

    async fn find_by_participant(&self, participant_id: i64) -> Result<Vec<Answer>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|a| a.participant_id == participant_id)
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Answer>> {
        Ok(self.snapshot())
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(Error::Conflict("Email already registered".into()));
        }
        let created = User {
            id: users.len() as i64 + 1,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound("User not found".into()))?;
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role.as_str().to_string();
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(Error::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }
}

/// Cache whose deletes always fail; everything else goes to a real cache.
pub struct FailingDeleteCache {
    pub inner: MemoryCache,
}

#[async_trait]
impl KvCache for FailingDeleteCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(Error::Cache("delete refused".into()))
    }
}

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "postgres://postgres@localhost/exam_test".into(),
        db_max_connections: 1,
        run_migrations: false,
        jwt_secret: "integration-test-secret-123".into(),
        jwt_ttl_hours: 24,
        default_exam_duration_secs: 3600,
        max_exam_duration_secs: 86_400,
        session_grace_secs: 30,
        draft_ttl_secs: 3600,
        cache_max_entries: 10_000,
        submission_workers: 2,
        submission_queue_capacity: 16,
        submission_status_ttl_secs: 3600,
        auth_rps: 1000,
        log_format: LogFormat::Pretty,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub worker: SubmissionWorker,
    pub clock: ManualClock,
    pub answers: Arc<InMemoryAnswerStore>,
    pub users: Arc<InMemoryUserStore>,
}

/// App wired to in-memory stores and a manual clock. The Postgres pool is
/// lazy and never connects as long as the exercised routes avoid it.
pub fn test_app_with_cache(
    config: Config,
    cache: impl FnOnce(Arc<dyn Clock>) -> Arc<dyn KvCache>,
) -> TestApp {
    let clock = ManualClock::default();
    let clock_arc: Arc<dyn Clock> = Arc::new(clock.clone());
    let answers = Arc::new(InMemoryAnswerStore::default());
    let users = Arc::new(InMemoryUserStore::default());
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .expect("lazy pool");

    let backends = Backends {
        cache: cache(clock_arc.clone()),
        answers: answers.clone(),
        users: users.clone(),
        clock: clock_arc,
    };
    let (state, worker) = AppState::new(config, pool, backends);
    TestApp {
        router: build_router(state.clone()),
        state,
        worker,
        clock,
        answers,
        users,
    }
}

pub fn test_app() -> TestApp {
    test_app_with_cache(test_config(), |clock| Arc::new(MemoryCache::new(10_000, clock)))
}

impl TestApp {
    pub fn token_for(&self, user_id: i64, role: Role) -> String {
        self.state
            .auth_service
            .issue_token(user_id, role)
            .expect("issue token")
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let (status, bytes) = self.call_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };
        (status, json)
    }

    pub async fn call_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<JsonValue>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {}", t));
        }
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Sends `raw` verbatim as an `application/json` body.
    pub async fn call_text(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        raw: &str,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {}", t));
        }
        let request = builder.body(Body::from(raw.to_string())).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
    }
}
