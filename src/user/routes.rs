use axum::{
    Router,
    routing::{get, put},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route("/users/profile", put(handlers::update_profile))
        .route("/users/orders", get(handlers::get_my_orders))
}
