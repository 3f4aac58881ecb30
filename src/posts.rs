use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    database,
    error::{AppError, FieldError},
    models::{Comment, CommentPayload, Like, Post, PostPayload, UserCard},
    state::SharedState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn list_posts_handler(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Post>>, AppError> {
    let mut posts = database::all_posts(&state).await?;
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(paginate(
        posts,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )))
}

pub async fn create_post_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Value>, AppError> {
    let text = validate_post_text(&payload.text)?;

    let post = Post {
        id: Uuid::new_v4(),
        user: auth.0,
        text,
        images: payload.images.unwrap_or_default(),
        likes: Vec::new(),
        comments: Vec::new(),
        tags: payload.tags.unwrap_or_default(),
        created_at: Utc::now(),
    };
    database::put_post(&state, &post).await?;

    populate_post(&state, &post).await.map(Json)
}

pub async fn get_post_handler(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let post = load_post(&state, &post_id).await?;

    populate_post(&state, &post).await.map(Json)
}

pub async fn delete_post_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let post = load_post(&state, &post_id).await?;

    if post.user != auth.0 {
        return Err(AppError::unauthorized("User not authorized!"));
    }

    database::delete_post(&state, post.id).await?;

    Ok(Json(json!({ "msg": "Post removed!" })))
}

pub async fn like_post_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, AppError> {
    let mut post = load_post(&state, &post_id).await?;

    if post.likes.iter().any(|like| like.user == auth.0) {
        return Err(AppError::bad_request("Post already liked!"));
    }

    post.likes.insert(0, Like { user: auth.0 });
    database::put_post(&state, &post).await?;

    Ok(Json(post.likes))
}

pub async fn unlike_post_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<Like>>, AppError> {
    let mut post = load_post(&state, &post_id).await?;

    let index = post
        .likes
        .iter()
        .position(|like| like.user == auth.0)
        .ok_or_else(|| AppError::bad_request("Post has not yet been liked!"))?;

    post.likes.remove(index);
    database::put_post(&state, &post).await?;

    Ok(Json(post.likes))
}

pub async fn add_comment_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(post_id): Path<String>,
    Json(payload): Json<CommentPayload>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let text = validate_comment_text(&payload.text)?;

    let mut post = load_post(&state, &post_id).await?;

    post.comments.insert(
        0,
        Comment {
            id: Uuid::new_v4(),
            user: auth.0,
            text,
            created_at: Utc::now(),
        },
    );
    database::put_post(&state, &post).await?;

    Ok(Json(post.comments))
}

pub async fn remove_comment_handler(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let mut post = load_post(&state, &post_id).await?;

    let comment_id = Uuid::parse_str(&comment_id)
        .map_err(|_| AppError::not_found("Comment does not exist!"))?;
    let index = post
        .comments
        .iter()
        .position(|comment| comment.id == comment_id)
        .ok_or_else(|| AppError::not_found("Comment does not exist!"))?;

    if post.comments[index].user != auth.0 {
        return Err(AppError::unauthorized("User not authorized!"));
    }

    post.comments.remove(index);
    database::put_post(&state, &post).await?;

    Ok(Json(post.comments))
}

async fn load_post(state: &SharedState, raw_id: &str) -> Result<Post, AppError> {
    let id = Uuid::parse_str(raw_id).map_err(|_| AppError::not_found("Post not found!"))?;

    database::find_post(state, id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found!"))
}

async fn populate_post(state: &SharedState, post: &Post) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(post)?;

    if let Some(user) = database::find_user(state, post.user).await? {
        value["user"] = serde_json::to_value(UserCard::from(&user))?;
    }

    Ok(value)
}

pub fn validate_post_text(text: &Option<String>) -> Result<String, AppError> {
    let trimmed = text.as_deref().unwrap_or("").trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "text",
            "Post text is required!",
        )]));
    }
    if trimmed.chars().count() > 500 {
        return Err(AppError::Validation(vec![FieldError::new(
            "text",
            "Post text must be 500 characters or less!",
        )]));
    }

    Ok(trimmed.to_string())
}

pub fn validate_comment_text(text: &Option<String>) -> Result<String, AppError> {
    let trimmed = text.as_deref().unwrap_or("").trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "text",
            "Comment text is required!",
        )]));
    }

    Ok(trimmed.to_string())
}

pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Vec<T> {
    let page = page.max(1);

    items.into_iter().skip((page - 1) * limit).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_text_is_trimmed() {
        assert_eq!(validate_post_text(&Some("  hello  ".to_string())).unwrap(), "hello");
    }

    #[test]
    fn empty_post_text_is_rejected() {
        assert!(validate_post_text(&Some("   ".to_string())).is_err());
        assert!(validate_post_text(&None).is_err());
    }

    #[test]
    fn oversized_post_text_is_rejected() {
        let text = "x".repeat(501);

        assert!(validate_post_text(&Some(text)).is_err());
        assert!(validate_post_text(&Some("x".repeat(500))).is_ok());
    }

    #[test]
    fn paginate_skips_earlier_pages() {
        let items: Vec<u32> = (1..=25).collect();

        assert_eq!(paginate(items.clone(), 1, 10), (1..=10).collect::<Vec<u32>>());
        assert_eq!(paginate(items.clone(), 3, 10), (21..=25).collect::<Vec<u32>>());
        assert_eq!(paginate(items, 4, 10), Vec::<u32>::new());
    }

    #[test]
    fn page_zero_reads_as_first_page() {
        let items: Vec<u32> = (1..=5).collect();

        assert_eq!(paginate(items, 0, 2), [1, 2]);
    }
}
