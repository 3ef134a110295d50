use axum::{Router, routing::get};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new().route(
        "/categories",
        get(handlers::get_categories).post(handlers::create_category),
    )
}
