use axum::{
    Router,
    routing::{delete, get},
};

use super::handlers;
use crate::utils::types::Pool;

pub fn get_routes() -> Router<Pool> {
    Router::new()
        .route(
            "/products",
            get(handlers::get_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            delete(handlers::delete_product)
                .put(handlers::update_product)
                .get(handlers::get_product_by_id),
        )
        .route("/products/user/my-products", get(handlers::get_my_products))
}
