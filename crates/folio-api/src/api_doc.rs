//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use folio_core::models::{AssetKind, AssetPatch, AssetResponse, ParentKind};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folio Media API",
        version = "0.1.0",
        description = "Image asset management for portfolio projects and blog posts"
    ),
    paths(
        handlers::health::health,
        handlers::project_images::upload_project_image,
        handlers::project_images::list_project_images,
        handlers::project_images::get_project_image,
        handlers::project_images::update_project_image,
        handlers::project_images::set_primary_project_image,
        handlers::project_images::delete_project_image,
        handlers::post_images::upload_post_image,
        handlers::post_images::list_post_images,
        handlers::post_images::get_post_image,
        handlers::post_images::update_post_image,
        handlers::post_images::set_primary_post_image,
        handlers::post_images::delete_post_image,
    ),
    components(schemas(AssetResponse, AssetPatch, AssetKind, ParentKind, ErrorResponse)),
    tags(
        (name = "project-images", description = "Images attached to portfolio projects"),
        (name = "post-images", description = "Images attached to blog posts"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
