//! Sign-up, login and bearer-token authentication.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use domains::validation::{PASSWORD_MIN_LEN, USERNAME_MAX_LEN};
use domains::{
    DomainError, IssuedToken, NewUser, PasswordHasher, Requester, Result, TokenService, User,
    UserRepository, ValidationErrors,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub username: String,
    pub password: String,
    pub password_repeat: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn signup(&self, input: Signup) -> Result<User> {
        let mut errors = ValidationErrors::new();
        let username = input.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add(
                "username",
                format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
            );
        }
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            errors.add(
                "password",
                format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
            );
        }
        if input.password != input.password_repeat {
            errors.add("password_repeat", "Passwords do not match.");
        }
        let email = input.email.trim().to_string();
        if !email.is_empty() && !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }
        errors.into_result()?;

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                username,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => {
                    DomainError::field("username", "A user with that username already exists.")
                }
                other => other,
            })?;
        info!(subsystem = "accounts", op = "signup", user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, input: Login) -> Result<IssuedToken> {
        let user = self.users.find_by_username(input.username.trim()).await?;
        let user = match user {
            Some(user) if self.hasher.verify(&input.password, &user.password_hash) => user,
            _ => {
                warn!(subsystem = "accounts", op = "login", "Rejected login attempt");
                return Err(DomainError::Unauthorized(
                    "Invalid username or password.".to_string(),
                ));
            }
        };
        self.tokens.issue(&Requester {
            id: user.id,
            username: user.username,
        })
    }

    /// Resolves a bearer token to the caller.
    pub fn authenticate(&self, token: &str) -> Result<Requester> {
        self.tokens.verify(token)
    }

    pub async fn profile(&self, requester: &Requester) -> Result<User> {
        self.users
            .find_by_id(requester.id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User no longer exists.".to_string()))
    }
}
