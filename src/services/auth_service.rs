use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::stores::{NewUser, UserStore};
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Caller identity resolved from a bearer token; inserted into request
/// extensions by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let password_hash = hash_password(password).await?;
        let user = self
            .users
            .create(NewUser {
                email: email.trim().to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let invalid = || Error::Unauthorized("Invalid email or password".to_string());

        let user = self.users.find_by_email(email.trim()).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash).await? {
            tracing::info!(user_id = user.id, "login rejected: wrong password");
            return Err(invalid());
        }
        let token = self.issue_token(user.id, user.role())?;
        Ok((token, user))
    }

    /// `exp` is wall-clock time: `jsonwebtoken` validates it against the
    /// system clock, not the injected exam clock.
    pub fn issue_token(&self, user_id: i64, role: Role) -> Result<String> {
        let exp = (Utc::now() + self.token_ttl).timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp,
            role: Some(role.as_str().to_string()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;
        let role = data
            .claims
            .role
            .as_deref()
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::User);
        Ok(AuthUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::user_store::MockUserStore;

    const SECRET: &str = "test-secret-0123456789";

    fn user(id: i64, email: &str, hash: String, role: &str) -> User {
        User {
            id,
            email: email.to_string(),
            password_hash: hash,
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    fn service(store: MockUserStore) -> AuthService {
        AuthService::new(Arc::new(store), SECRET.to_string(), 24)
    }

    #[tokio::test]
    async fn token_round_trips_identity() {
        let svc = service(MockUserStore::new());
        let token = svc.issue_token(42, Role::Admin).unwrap();
        let who = svc.verify_token(&token).unwrap();
        assert_eq!(who, AuthUser { user_id: 42, role: Role::Admin });
        assert!(who.is_admin());
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let svc = service(MockUserStore::new());
        let other = AuthService::new(
            Arc::new(MockUserStore::new()),
            "another-secret-abcdefgh".into(),
            24,
        );
        let token = other.issue_token(1, Role::User).unwrap();
        assert!(matches!(svc.verify_token(&token), Err(Error::Token(_))));

        let stale = Claims {
            sub: "1".into(),
            exp: (Utc::now() - Duration::days(3)).timestamp() as usize,
            role: Some("user".into()),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &stale,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(svc.verify_token(&token).is_err());
    }

    #[test]
    fn expiry_is_measured_from_wall_clock() {
        let svc = service(MockUserStore::new());
        let token = svc.issue_token(5, Role::User).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;
        let expected = (Utc::now() + Duration::hours(24)).timestamp();
        assert!((claims.exp as i64 - expected).abs() <= 5);
    }

    #[tokio::test]
    async fn login_checks_password() {
        let hash = hash_password("secret1").await.unwrap();
        let mut store = MockUserStore::new();
        store
            .expect_find_by_email()
            .returning(move |email| Ok(Some(user(9, email, hash.clone(), "user"))));
        let svc = service(store);

        let (token, found) = svc.login("a@b.io", "secret1").await.unwrap();
        assert_eq!(found.id, 9);
        assert_eq!(svc.verify_token(&token).unwrap().user_id, 9);

        assert!(matches!(
            svc.login("a@b.io", "wrong").await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn unknown_email_is_unauthorized() {
        let mut store = MockUserStore::new();
        store.expect_find_by_email().returning(|_| Ok(None));
        let svc = service(store);
        assert!(matches!(
            svc.login("nobody@b.io", "whatever").await,
            Err(Error::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn register_hashes_and_defaults_to_user_role() {
        let mut store = MockUserStore::new();
        store
            .expect_create()
            .withf(|u| u.role == Role::User && u.password_hash.starts_with("$argon2"))
            .returning(|u| Ok(user(1, &u.email, u.password_hash, u.role.as_str())));
        let svc = service(store);
        let created = svc.register(" new@b.io ", "secret1").await.unwrap();
        assert_eq!(created.email, "new@b.io");
    }
}
