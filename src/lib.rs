//! # DevLink
//!
//! A small social network for developers: accounts, profiles with
//! experience/education records, posts with likes and comments, and a
//! GitHub repository lookup proxied through the backend.
//!
//! All state lives in Redis as JSON documents (see [`database`]); every
//! request is one read, an in-memory edit, and one write-back.
//!
//! Run locally:
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//! The JWT secret is read from `/run/secrets/JWT_SECRET`, everything else
//! from environment variables with logged defaults.

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    routing::{delete, get, post, put},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod accounts;
pub mod auth;
pub mod config;
pub mod database;
pub mod entries;
pub mod error;
pub mod github;
pub mod models;
pub mod posts;
pub mod profile;
pub mod routes;
pub mod state;

use accounts::{current_user_handler, login_handler, register_handler};
use posts::{
    add_comment_handler, create_post_handler, delete_post_handler, get_post_handler,
    like_post_handler, list_posts_handler, remove_comment_handler, unlike_post_handler,
};
use routes::{
    add_education_handler, add_experience_handler, delete_account_handler, github_repos_handler,
    list_profiles_handler, my_profile_handler, profile_by_user_handler, remove_education_handler,
    remove_experience_handler, root_handler, update_education_handler, update_experience_handler,
    upsert_profile_handler,
};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-auth-token")])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/users", post(register_handler))
        .route("/auth", get(current_user_handler).post(login_handler))
        .route(
            "/profile",
            get(list_profiles_handler)
                .post(upsert_profile_handler)
                .delete(delete_account_handler),
        )
        .route("/profile/me", get(my_profile_handler))
        .route("/profile/user/{user_id}", get(profile_by_user_handler))
        .route("/profile/github/{username}", get(github_repos_handler))
        .route("/profile/experience", put(add_experience_handler))
        .route(
            "/profile/experience/{exp_id}",
            put(update_experience_handler).delete(remove_experience_handler),
        )
        .route("/profile/education", put(add_education_handler))
        .route(
            "/profile/education/{edu_id}",
            put(update_education_handler).delete(remove_education_handler),
        )
        .route("/posts", get(list_posts_handler).post(create_post_handler))
        .route("/posts/{post_id}", get(get_post_handler).delete(delete_post_handler))
        .route("/posts/like/{post_id}", put(like_post_handler))
        .route("/posts/unlike/{post_id}", put(unlike_post_handler))
        .route("/posts/comment/{post_id}", post(add_comment_handler))
        .route("/posts/comment/{post_id}/{comment_id}", delete(remove_comment_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
