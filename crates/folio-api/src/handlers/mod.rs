pub mod health;
pub mod post_images;
pub mod project_images;
pub mod shared;
