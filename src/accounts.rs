use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, issue_token},
    database,
    error::{AppError, FieldError},
    models::{LoginPayload, RegisterPayload, User, UserView, provided},
    state::SharedState,
};

pub async fn register_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<Value>, AppError> {
    validate_registration(&payload)?;

    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if database::find_user_by_email(&state, &email).await?.is_some() {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "User already exists!",
        )]));
    }

    let user = User {
        id: Uuid::new_v4(),
        avatar: gravatar_url(&email),
        name,
        email,
        password: hash_password(&password)?,
        date: Utc::now(),
    };
    database::put_user(&state, &user).await?;

    let token = issue_token(&state.config.jwt_secret, user.id)?;

    Ok(Json(json!({ "token": token })))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, AppError> {
    validate_login(&payload)?;

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let user = database::find_user_by_email(&state, &email)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid credentials!"))?;

    if !verify_password(&password, &user.password) {
        return Err(AppError::bad_request("Invalid credentials!"));
    }

    let token = issue_token(&state.config.jwt_secret, user.id)?;

    Ok(Json(json!({ "token": token })))
}

pub async fn current_user_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<UserView>, AppError> {
    let user = database::find_user(&state, auth.0)
        .await?
        .ok_or_else(|| AppError::not_found("User not found!"))?;

    Ok(Json(UserView::from(&user)))
}

fn validate_registration(payload: &RegisterPayload) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if provided(&payload.name).is_none() {
        errors.push(FieldError::new("name", "Name is required!"));
    }
    if !provided(&payload.email).is_some_and(|email| email.contains('@')) {
        errors.push(FieldError::new("email", "Please include a valid email!"));
    }
    if payload.password.as_deref().map_or(0, str::len) < 6 {
        errors.push(FieldError::new(
            "password",
            "Please enter a password with 6 or more characters!",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn validate_login(payload: &LoginPayload) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if provided(&payload.email).is_none() {
        errors.push(FieldError::new("email", "Please include a valid email!"));
    }
    if provided(&payload.password).is_none() {
        errors.push(FieldError::new("password", "Password is required!"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    let hash: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();

    format!("https://www.gravatar.com/avatar/{hash}?s=200&r=pg&d=mm")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravatar_normalizes_case_and_whitespace() {
        assert_eq!(gravatar_url("Dev@Example.com "), gravatar_url("dev@example.com"));
    }

    #[test]
    fn gravatar_hash_is_hex() {
        let url = gravatar_url("dev@example.com");
        let hash = url
            .strip_prefix("https://www.gravatar.com/avatar/")
            .and_then(|rest| rest.split('?').next())
            .unwrap();

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();

        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn registration_requires_all_fields() {
        let result = validate_registration(&RegisterPayload::default());

        let Err(AppError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let params: Vec<&str> = errors.iter().map(|error| error.param).collect();
        assert_eq!(params, ["name", "email", "password"]);
    }

    #[test]
    fn registration_rejects_short_password() {
        let payload = RegisterPayload {
            name: Some("Dev".to_string()),
            email: Some("dev@example.com".to_string()),
            password: Some("short".to_string()),
        };

        let Err(AppError::Validation(errors)) = validate_registration(&payload) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param, "password");
    }
}
