//! Profile service: merge-or-create semantics for the profile document and
//! orchestration of the embedded experience/education lists.
//!
//! Every operation is one store read, an in-memory edit, and one whole
//! document write-back, so a failed write leaves the stored profile as it was.

use serde_json::Value;
use uuid::Uuid;

use crate::{
    database,
    entries::{insert_front, position_of, remove_by_id},
    error::AppError,
    models::{
        Education, EducationPayload, Experience, ExperiencePayload, Profile, ProfilePayload,
        Social, UserCard, overwrite, overwrite_opt, provided,
    },
    state::State,
};

/// Literal split-and-trim, no empty filtering: a trailing comma yields a
/// trailing empty element.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',').map(|skill| skill.trim().to_string()).collect()
}

/// The social block only exists when at least one link was supplied, and is
/// rebuilt from scratch each time it is.
pub fn build_social(payload: &ProfilePayload) -> Option<Social> {
    let social = Social {
        youtube: provided(&payload.youtube).map(str::to_string),
        twitter: provided(&payload.twitter).map(str::to_string),
        facebook: provided(&payload.facebook).map(str::to_string),
        linkedin: provided(&payload.linkedin).map(str::to_string),
        instagram: provided(&payload.instagram).map(str::to_string),
    };

    let any_supplied = [
        &social.youtube,
        &social.twitter,
        &social.facebook,
        &social.linkedin,
        &social.instagram,
    ]
    .into_iter()
    .any(|link| link.is_some());

    any_supplied.then_some(social)
}

/// Partial merge: supplied fields overwrite, everything else is retained.
pub fn merge_fields(profile: &mut Profile, payload: &ProfilePayload) {
    overwrite_opt(&mut profile.company, &payload.company);
    overwrite_opt(&mut profile.website, &payload.website);
    overwrite_opt(&mut profile.location, &payload.location);
    overwrite_opt(&mut profile.bio, &payload.bio);
    overwrite(&mut profile.status, &payload.status);
    overwrite_opt(&mut profile.github_username, &payload.github_username);

    if let Some(raw) = provided(&payload.skills) {
        profile.skills = split_skills(raw);
    }
    if let Some(social) = build_social(payload) {
        profile.social = Some(social);
    }
}

pub async fn upsert_profile(
    state: &State,
    owner: Uuid,
    payload: &ProfilePayload,
) -> Result<Profile, AppError> {
    let mut profile = database::find_profile(state, owner)
        .await?
        .unwrap_or_else(|| Profile::new(owner));

    merge_fields(&mut profile, payload);
    database::put_profile(state, &profile).await?;

    Ok(profile)
}

/// Swaps the bare owner id for the owner's display fields, the way the
/// profile is handed back to clients.
pub async fn populate(state: &State, profile: &Profile) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(profile)?;

    if let Some(user) = database::find_user(state, profile.user).await? {
        value["user"] = serde_json::to_value(UserCard::from(&user))?;
    }

    Ok(value)
}

pub async fn populate_all(state: &State, profiles: Vec<Profile>) -> Result<Vec<Value>, AppError> {
    let users = database::all_users(state).await?;

    profiles
        .iter()
        .map(|profile| {
            let mut value = serde_json::to_value(profile)?;
            if let Some(user) = users.get(&profile.user) {
                value["user"] = serde_json::to_value(UserCard::from(user))?;
            }
            Ok(value)
        })
        .collect()
}

pub async fn add_experience(
    state: &State,
    owner: Uuid,
    payload: ExperiencePayload,
) -> Result<Profile, AppError> {
    let entry = Experience::try_build(payload)?;

    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::unauthorized("There is no profile for this user!"))?;

    insert_front(&mut profile.experience, entry);
    database::put_profile(state, &profile).await?;

    Ok(profile)
}

pub async fn update_experience(
    state: &State,
    owner: Uuid,
    entry_id: Uuid,
    payload: &ExperiencePayload,
) -> Result<Profile, AppError> {
    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found!"))?;

    let index = position_of(&profile.experience, entry_id)
        .ok_or_else(|| AppError::not_found("Experience entry not found!"))?;

    profile.experience[index].apply(payload);
    database::put_profile(state, &profile).await?;

    Ok(profile)
}

pub async fn remove_experience(
    state: &State,
    owner: Uuid,
    entry_id: Uuid,
) -> Result<Profile, AppError> {
    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found!"))?;

    remove_by_id(&mut profile.experience, entry_id)
        .ok_or_else(|| AppError::not_found("Experience entry not found!"))?;

    database::put_profile(state, &profile).await?;

    Ok(profile)
}

pub async fn add_education(
    state: &State,
    owner: Uuid,
    payload: EducationPayload,
) -> Result<Profile, AppError> {
    let entry = Education::try_build(payload)?;

    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::unauthorized("There is no profile for this user!"))?;

    insert_front(&mut profile.education, entry);
    database::put_profile(state, &profile).await?;

    Ok(profile)
}

pub async fn update_education(
    state: &State,
    owner: Uuid,
    entry_id: Uuid,
    payload: &EducationPayload,
) -> Result<Profile, AppError> {
    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found!"))?;

    let index = position_of(&profile.education, entry_id)
        .ok_or_else(|| AppError::not_found("Education entry not found!"))?;

    profile.education[index].apply(payload);
    database::put_profile(state, &profile).await?;

    Ok(profile)
}

pub async fn remove_education(
    state: &State,
    owner: Uuid,
    entry_id: Uuid,
) -> Result<Profile, AppError> {
    let mut profile = database::find_profile(state, owner)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found!"))?;

    remove_by_id(&mut profile.education, entry_id)
        .ok_or_else(|| AppError::not_found("Education entry not found!"))?;

    database::put_profile(state, &profile).await?;

    Ok(profile)
}

/// Removing an account cascades: posts first, then the profile, then the
/// user record itself. Sequential single-document deletes, no transaction.
pub async fn delete_account(state: &State, owner: Uuid) -> Result<(), AppError> {
    database::delete_posts_by_author(state, owner).await?;
    database::delete_profile(state, owner).await?;

    if let Some(user) = database::find_user(state, owner).await? {
        database::delete_user(state, &user).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_split_keeps_trailing_empty_element() {
        assert_eq!(split_skills("a, b ,c,"), ["a", "b", "c", ""]);
    }

    #[test]
    fn skills_split_single_value() {
        assert_eq!(split_skills("rust"), ["rust"]);
    }

    #[test]
    fn social_absent_when_no_links_supplied() {
        let payload = ProfilePayload {
            status: Some("Dev".to_string()),
            skills: Some("js,go".to_string()),
            ..Default::default()
        };

        assert!(build_social(&payload).is_none());
    }

    #[test]
    fn social_keeps_only_supplied_links() {
        let payload = ProfilePayload {
            twitter: Some("https://twitter.com/dev".to_string()),
            youtube: Some(String::new()),
            ..Default::default()
        };

        let social = build_social(&payload).unwrap();
        assert_eq!(social.twitter.as_deref(), Some("https://twitter.com/dev"));
        assert!(social.youtube.is_none());
        assert!(social.linkedin.is_none());
    }

    #[test]
    fn second_merge_retains_untouched_fields() {
        let mut profile = Profile::new(Uuid::new_v4());

        merge_fields(
            &mut profile,
            &ProfilePayload {
                status: Some("Dev".to_string()),
                skills: Some("js,go".to_string()),
                ..Default::default()
            },
        );
        merge_fields(
            &mut profile,
            &ProfilePayload {
                company: Some("Acme".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(profile.status, "Dev");
        assert_eq!(profile.skills, ["js", "go"]);
        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert!(profile.social.is_none());
    }

    #[test]
    fn social_is_replaced_as_a_unit() {
        let mut profile = Profile::new(Uuid::new_v4());

        merge_fields(
            &mut profile,
            &ProfilePayload {
                youtube: Some("https://youtube.com/@dev".to_string()),
                ..Default::default()
            },
        );
        merge_fields(
            &mut profile,
            &ProfilePayload {
                twitter: Some("https://twitter.com/dev".to_string()),
                ..Default::default()
            },
        );

        let social = profile.social.unwrap();
        assert_eq!(social.twitter.as_deref(), Some("https://twitter.com/dev"));
        assert!(social.youtube.is_none());
    }

    #[test]
    fn merge_ignores_empty_strings() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.bio = Some("keep me".to_string());

        merge_fields(
            &mut profile,
            &ProfilePayload {
                bio: Some(String::new()),
                ..Default::default()
            },
        );

        assert_eq!(profile.bio.as_deref(), Some("keep me"));
    }
}
