use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::stores::{NewUser, UserChanges, UserStore};
use crate::utils::crypto::hash_password;
use crate::utils::token::generate_secret;

const TEMP_PASSWORD_LEN: usize = 12;

/// Admin-side user management.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

/// A created user plus the generated password, present only when the admin
/// did not supply one.
#[derive(Debug)]
pub struct CreatedUser {
    pub user: User,
    pub temporary_password: Option<String>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.users.find_all().await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn create(
        &self,
        email: &str,
        password: Option<&str>,
        role: Role,
    ) -> Result<CreatedUser> {
        let (password, temporary_password) = match password {
            Some(p) => (p.to_string(), None),
            None => {
                let generated = generate_secret(TEMP_PASSWORD_LEN);
                (generated.clone(), Some(generated))
            }
        };
        let user = self
            .users
            .create(NewUser {
                email: email.trim().to_string(),
                password_hash: hash_password(&password).await?,
                role,
            })
            .await?;
        tracing::info!(user_id = user.id, role = role.as_str(), "user created by admin");
        Ok(CreatedUser {
            user,
            temporary_password,
        })
    }

    pub async fn update(
        &self,
        id: i64,
        email: Option<String>,
        password: Option<String>,
        role: Option<Role>,
    ) -> Result<User> {
        let password_hash = match password {
            Some(p) => Some(hash_password(&p).await?),
            None => None,
        };
        let changes = UserChanges {
            email: email.map(|e| e.trim().to_string()),
            role,
            password_hash,
        };
        self.users.update(id, changes).await
    }

    /// Admins cannot delete their own account.
    pub async fn delete(&self, acting_user_id: i64, id: i64) -> Result<()> {
        if acting_user_id == id {
            return Err(Error::BadRequest("Cannot delete your own account".to_string()));
        }
        self.users.delete(id).await?;
        tracing::info!(user_id = id, by = acting_user_id, "user deleted");
        Ok(())
    }
}
