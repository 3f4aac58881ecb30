//! # Redis
//!
//! Persistent store.
//!
//! ## Layout
//!
//! - One hash per collection, one field per document
//! - `profiles`: owner uuid -> profile JSON (one profile per owner by construction)
//! - `users`: user uuid -> user JSON
//! - `user_emails`: normalized email -> user uuid, for login lookups
//! - `posts`: post uuid -> post JSON
//!
//! A whole document is written with a single `HSET`, so concurrent writers
//! race with plain last-write-wins and no partial documents are ever visible.

use std::{collections::HashMap, time::Duration};

use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Post, Profile, User},
    state::State,
};

pub const PROFILES: &str = "profiles";
pub const USERS: &str = "users";
pub const USER_EMAILS: &str = "user_emails";
pub const POSTS: &str = "posts";

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

async fn read_doc<T: DeserializeOwned>(
    state: &State,
    collection: &str,
    id: &str,
) -> Result<Option<T>, AppError> {
    let mut conn = state.redis_connection.clone();
    let raw: Option<String> = conn.hget(collection, id).await?;

    Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?)
}

async fn write_doc<T: Serialize>(
    state: &State,
    collection: &str,
    id: &str,
    doc: &T,
) -> Result<(), AppError> {
    let mut conn = state.redis_connection.clone();
    let raw = serde_json::to_string(doc)?;
    let _: () = conn.hset(collection, id, raw).await?;

    Ok(())
}

async fn remove_doc(state: &State, collection: &str, id: &str) -> Result<(), AppError> {
    let mut conn = state.redis_connection.clone();
    let _: usize = conn.hdel(collection, id).await?;

    Ok(())
}

async fn read_all<T: DeserializeOwned>(state: &State, collection: &str) -> Result<Vec<T>, AppError> {
    let mut conn = state.redis_connection.clone();
    let raw: Vec<String> = conn.hvals(collection).await?;

    raw.iter()
        .map(|raw| serde_json::from_str(raw).map_err(AppError::from))
        .collect()
}

pub async fn find_profile(state: &State, owner: Uuid) -> Result<Option<Profile>, AppError> {
    read_doc(state, PROFILES, &owner.to_string()).await
}

pub async fn put_profile(state: &State, profile: &Profile) -> Result<(), AppError> {
    write_doc(state, PROFILES, &profile.user.to_string(), profile).await
}

pub async fn delete_profile(state: &State, owner: Uuid) -> Result<(), AppError> {
    remove_doc(state, PROFILES, &owner.to_string()).await
}

pub async fn all_profiles(state: &State) -> Result<Vec<Profile>, AppError> {
    read_all(state, PROFILES).await
}

pub async fn find_user(state: &State, id: Uuid) -> Result<Option<User>, AppError> {
    read_doc(state, USERS, &id.to_string()).await
}

pub async fn find_user_by_email(state: &State, email: &str) -> Result<Option<User>, AppError> {
    let mut conn = state.redis_connection.clone();
    let id: Option<String> = conn.hget(USER_EMAILS, normalize_email(email)).await?;

    match id {
        Some(id) => read_doc(state, USERS, &id).await,
        None => Ok(None),
    }
}

pub async fn put_user(state: &State, user: &User) -> Result<(), AppError> {
    write_doc(state, USERS, &user.id.to_string(), user).await?;

    let mut conn = state.redis_connection.clone();
    let _: () = conn
        .hset(USER_EMAILS, normalize_email(&user.email), user.id.to_string())
        .await?;

    Ok(())
}

pub async fn delete_user(state: &State, user: &User) -> Result<(), AppError> {
    remove_doc(state, USERS, &user.id.to_string()).await?;
    remove_doc(state, USER_EMAILS, &normalize_email(&user.email)).await
}

pub async fn all_users(state: &State) -> Result<HashMap<Uuid, User>, AppError> {
    let users: Vec<User> = read_all(state, USERS).await?;

    Ok(users.into_iter().map(|user| (user.id, user)).collect())
}

pub async fn find_post(state: &State, id: Uuid) -> Result<Option<Post>, AppError> {
    read_doc(state, POSTS, &id.to_string()).await
}

pub async fn put_post(state: &State, post: &Post) -> Result<(), AppError> {
    write_doc(state, POSTS, &post.id.to_string(), post).await
}

pub async fn delete_post(state: &State, id: Uuid) -> Result<(), AppError> {
    remove_doc(state, POSTS, &id.to_string()).await
}

pub async fn all_posts(state: &State) -> Result<Vec<Post>, AppError> {
    read_all(state, POSTS).await
}

pub async fn delete_posts_by_author(state: &State, author: Uuid) -> Result<(), AppError> {
    let posts = all_posts(state).await?;

    for post in posts.iter().filter(|post| post.user == author) {
        remove_doc(state, POSTS, &post.id.to_string()).await?;
    }

    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
