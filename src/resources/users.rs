//! Users route group.
//!
//! # Responsibilities
//! - Account creation (`POST /signup`) with hashed passwords
//! - Read-only listing and lookup
//!
//! # Design Decisions
//! - Emails are unique, case-insensitively; the index reserves an email
//!   atomically so two concurrent signups cannot both claim it
//! - Hashing runs on the blocking pool

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::http::extract::Path;
use crate::http::AppState;
use crate::pipeline::RequestContext;
use crate::resources::query::ListQuery;
use crate::resources::repository::{Entity, Repository};
use crate::resources::response::{self, parse_body, parse_id, to_values};

pub const DUPLICATE_EMAIL: &str = "Email already in use";
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub password_hash: String,
}

impl Entity for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        PasswordHash::new(&self.password_hash)
            .map(|hash| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

/// Signup form as posted by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignupInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::bad_request("Please tell us your name!"));
        }
        let email = self.email.trim();
        let valid_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid_email {
            return Err(AppError::bad_request("Please provide a valid email"));
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AppError::bad_request(
                "Password must have at least 8 characters",
            ));
        }
        if self.password != self.password_confirm {
            return Err(AppError::bad_request("Passwords are not the same!"));
        }
        Ok(())
    }
}

/// User records plus the unique email index.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Repository<User>,
    emails: DashMap<String, Uuid>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new user, failing when the email is taken.
    pub fn register(&self, user: User) -> AppResult<User> {
        match self.emails.entry(user.email.to_lowercase()) {
            Entry::Occupied(_) => Err(AppError::bad_request(DUPLICATE_EMAIL)),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                Ok(self.users.insert(user))
            }
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.get(id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.users.contains(id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let id = *self.emails.get(&email.trim().to_lowercase())?;
        self.users.get(id)
    }

    pub fn list(&self) -> Vec<User> {
        self.users.list()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AppError::unexpected(err.to_string()))
}

async fn signup(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let input: SignupInput = parse_body(&ctx.body)?;
    input.validate()?;

    // Cheap check first so duplicates skip the hashing cost.
    if state.store.users.find_by_email(&input.email).is_some() {
        return Err(AppError::bad_request(DUPLICATE_EMAIL));
    }

    let password = input.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(AppError::unexpected)??;

    let user = state.store.users.register(User {
        id: Uuid::new_v4(),
        name: input.name.trim().to_owned(),
        email: input.email.trim().to_lowercase(),
        role: "user".to_owned(),
        created_at: Utc::now(),
        password_hash,
    })?;

    tracing::info!(user_id = %user.id, "User signed up");
    response::one(StatusCode::CREATED, "user", user)
}

async fn list_users(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let query = ListQuery::from_query(&ctx.query)?;
    let records = to_values(&state.store.users.list())?;
    Ok(response::many("users", query.apply(records)))
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    let user = state
        .store
        .users
        .get(parse_id(&id)?)
        .ok_or_else(|| AppError::not_found("No user found with that ID"))?;
    response::one(StatusCode::OK, "user", user)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
}
