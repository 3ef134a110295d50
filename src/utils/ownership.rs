use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::product::models::Product;
use crate::utils::error::ApiError;

/// Single ownership contract for mutating operations: loads the product and
/// checks the caller owns it. Absent rows map to NotFound, foreign rows to
/// Ownership.
pub async fn assert_product_owner(
    conn: &mut AsyncPgConnection,
    product_id: i32,
    owner_id: Uuid,
) -> Result<Product, ApiError> {
    use axum_market::schema::products;

    let product = products::table
        .find(product_id)
        .select(Product::as_select())
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    if product.user_id != owner_id {
        return Err(ApiError::Ownership(
            "You do not own this product".to_owned(),
        ));
    }

    Ok(product)
}
