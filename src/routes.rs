use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    database,
    error::{AppError, FieldError},
    github,
    models::{EducationPayload, ExperiencePayload, Profile, ProfilePayload, provided},
    profile,
    state::SharedState,
};

pub async fn root_handler() -> &'static str {
    "API running"
}

pub async fn my_profile_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    let profile = database::find_profile(&state, auth.0)
        .await?
        .ok_or_else(|| AppError::bad_request("There is no profile for this user!"))?;

    Ok(Json(profile::populate(&state, &profile).await?))
}

pub async fn upsert_profile_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Value>, AppError> {
    validate_profile_payload(&payload)?;

    let profile = profile::upsert_profile(&state, auth.0, &payload).await?;

    Ok(Json(profile::populate(&state, &profile).await?))
}

pub async fn list_profiles_handler(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Value>>, AppError> {
    let profiles = database::all_profiles(&state).await?;

    Ok(Json(profile::populate_all(&state, profiles).await?))
}

pub async fn profile_by_user_handler(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let owner =
        Uuid::parse_str(&user_id).map_err(|_| AppError::bad_request("Profile not found!"))?;

    let profile = database::find_profile(&state, owner)
        .await?
        .ok_or_else(|| AppError::bad_request("Profile not found!"))?;

    Ok(Json(profile::populate(&state, &profile).await?))
}

pub async fn delete_account_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Value>, AppError> {
    profile::delete_account(&state, auth.0).await?;

    Ok(Json(json!({ "msg": "User deleted!" })))
}

pub async fn add_experience_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<ExperiencePayload>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(profile::add_experience(&state, auth.0, payload).await?))
}

pub async fn update_experience_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(exp_id): Path<String>,
    Json(payload): Json<ExperiencePayload>,
) -> Result<Json<Profile>, AppError> {
    let entry_id = parse_entry_id(&exp_id, "Experience entry not found!")?;

    Ok(Json(profile::update_experience(&state, auth.0, entry_id, &payload).await?))
}

pub async fn remove_experience_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let entry_id = parse_entry_id(&exp_id, "Experience entry not found!")?;

    Ok(Json(profile::remove_experience(&state, auth.0, entry_id).await?))
}

pub async fn add_education_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<EducationPayload>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(profile::add_education(&state, auth.0, payload).await?))
}

pub async fn update_education_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(edu_id): Path<String>,
    Json(payload): Json<EducationPayload>,
) -> Result<Json<Profile>, AppError> {
    let entry_id = parse_entry_id(&edu_id, "Education entry not found!")?;

    Ok(Json(profile::update_education(&state, auth.0, entry_id, &payload).await?))
}

pub async fn remove_education_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let entry_id = parse_entry_id(&edu_id, "Education entry not found!")?;

    Ok(Json(profile::remove_education(&state, auth.0, entry_id).await?))
}

pub async fn github_repos_handler(
    State(state): State<SharedState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(github::fetch_repos(&state, &username).await?))
}

fn validate_profile_payload(payload: &ProfilePayload) -> Result<(), AppError> {
    let mut errors = Vec::new();

    if provided(&payload.status).is_none() {
        errors.push(FieldError::new("status", "Status is required!"));
    }
    if provided(&payload.skills).is_none() {
        errors.push(FieldError::new("skills", "Skills is required!"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

// A malformed id can never match a stored entry, so it reports the same way
// as an unknown one.
fn parse_entry_id(raw: &str, missing: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(missing))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_payload_requires_status_and_skills() {
        let result = validate_profile_payload(&ProfilePayload::default());

        let Err(AppError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let params: Vec<&str> = errors.iter().map(|error| error.param).collect();
        assert_eq!(params, ["status", "skills"]);
    }

    #[test]
    fn empty_status_counts_as_missing() {
        let payload = ProfilePayload {
            status: Some(String::new()),
            skills: Some("js".to_string()),
            ..Default::default()
        };

        let Err(AppError::Validation(errors)) = validate_profile_payload(&payload) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param, "status");
    }

    #[test]
    fn malformed_entry_id_reports_not_found() {
        let result = parse_entry_id("not-a-uuid", "Experience entry not found!");

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
