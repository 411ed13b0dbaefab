//! Route configuration.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use folio_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use utoipa::OpenApi;

pub const API_PREFIX: &str = "/api/v0";

/// Build the application router with all routes and middleware layers.
pub fn build_router(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api = Router::new()
        .route(
            "/projects/{project_id}/images",
            post(handlers::project_images::upload_project_image)
                .get(handlers::project_images::list_project_images),
        )
        .route(
            "/projects/{project_id}/images/{image_id}",
            get(handlers::project_images::get_project_image)
                .put(handlers::project_images::update_project_image)
                .patch(handlers::project_images::update_project_image)
                .delete(handlers::project_images::delete_project_image),
        )
        .route(
            "/projects/{project_id}/images/{image_id}/primary",
            put(handlers::project_images::set_primary_project_image),
        )
        .route(
            "/posts/{post_id}/images",
            post(handlers::post_images::upload_post_image)
                .get(handlers::post_images::list_post_images),
        )
        .route(
            "/posts/{post_id}/images/{image_id}",
            get(handlers::post_images::get_post_image)
                .put(handlers::post_images::update_post_image)
                .patch(handlers::post_images::update_post_image)
                .delete(handlers::post_images::delete_post_image),
        )
        .route(
            "/posts/{post_id}/images/{image_id}/primary",
            put(handlers::post_images::set_primary_post_image),
        );

    // Generous slack over the raw file limit for multipart framing and the
    // metadata fields.
    let body_limit = config.image_max_file_size_bytes + 64 * 1024;

    let app = Router::new()
        .nest(API_PREFIX, api)
        .route("/health", get(handlers::health::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ];
    if config.cors_origins.iter().any(|o| o == "*") {
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any))
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any))
    }
}
