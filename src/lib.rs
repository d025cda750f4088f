pub mod cache;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;
pub mod utils;

use std::sync::Arc;

use crate::cache::{KvCache, MemoryCache};
use crate::config::Config;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::{
    auth_service::AuthService,
    exam_service::ExamService,
    exam_session_service::{ExamSessionService, SessionSettings},
    question_service::QuestionService,
    submission_service::{submission_channel, SubmissionQueue, SubmissionWorker},
    user_service::UserService,
};
use crate::stores::{AnswerStore, PgAnswerStore, PgUserStore, UserStore};
use crate::utils::time::{Clock, SystemClock};
use sqlx::PgPool;

/// Swappable storage seams. The server wires Postgres and the in-process
/// cache; tests substitute their own.
#[derive(Clone)]
pub struct Backends {
    pub cache: Arc<dyn KvCache>,
    pub answers: Arc<dyn AnswerStore>,
    pub users: Arc<dyn UserStore>,
    pub clock: Arc<dyn Clock>,
}

impl Backends {
    pub fn postgres(config: &Config, pool: &PgPool) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            cache: Arc::new(MemoryCache::new(config.cache_max_entries, clock.clone())),
            answers: Arc::new(PgAnswerStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            clock,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub answers: Arc<dyn AnswerStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub exam_service: ExamService,
    pub question_service: QuestionService,
    pub session_service: ExamSessionService,
    pub submissions: SubmissionQueue,
    pub auth_limiter: RateLimiter,
}

impl AppState {
    /// Builds the shared state plus the worker half of the submission queue,
    /// which the caller is expected to spawn.
    pub fn new(config: Config, pool: PgPool, backends: Backends) -> (Self, SubmissionWorker) {
        let Backends {
            cache,
            answers,
            users,
            clock,
        } = backends;

        let auth_service = AuthService::new(
            users.clone(),
            config.jwt_secret.clone(),
            config.jwt_ttl_hours,
        );
        let session_service = ExamSessionService::new(
            cache.clone(),
            answers.clone(),
            clock.clone(),
            SessionSettings::from(&config),
        );
        let (submissions, worker) = submission_channel(
            config.submission_queue_capacity,
            cache,
            answers.clone(),
            clock,
            config.submission_status_ttl(),
        );

        let state = Self {
            auth_limiter: RateLimiter::new(config.auth_rps),
            config: Arc::new(config),
            exam_service: ExamService::new(pool.clone()),
            question_service: QuestionService::new(pool.clone()),
            user_service: UserService::new(users),
            pool,
            answers,
            auth_service,
            session_service,
            submissions,
        };
        (state, worker)
    }
}
