use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/cart",
            get(handlers::get_cart)
                .post(handlers::add_to_cart)
                .delete(handlers::clear_cart),
        )
        .route(
            "/cart/{id}",
            put(handlers::update_cart_item).delete(handlers::remove_from_cart),
        )
        .route("/cart/checkout", post(handlers::checkout))
}
