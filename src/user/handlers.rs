use std::collections::HashMap;

use super::models::{UpdateProfilePayload, UpdateUserProfile, UpdatedProfile};
use crate::auth::models::{AccessTokenClaims, SafeUser};
use crate::category::models::Category;
use crate::order::models::{Order, OrderItem, OrderItemWithProduct, OrderWithProducts};
use crate::product::models::{Product, ProductWithCategory};
use crate::utils::error::ApiError;
use crate::utils::types::Pool;
use axum::extract::{Json, State};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use validator::Validate;

pub async fn update_profile(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UpdatedProfile>, ApiError> {
    use axum_market::schema::users;

    let user_id = claims.user_id()?;
    payload.validate()?;

    let changes = UpdateUserProfile {
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
        profile_picture: payload.profile_picture,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let user = diesel::update(users::table.find(user_id))
        .set(&changes)
        .returning(SafeUser::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;

    Ok(Json(UpdatedProfile {
        message: "Profile updated successfully".to_owned(),
        user,
    }))
}

/// Purchase history, newest orders first, each order carrying its snapshot
/// lines joined with product and category.
pub async fn get_my_orders(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<Json<Vec<OrderWithProducts>>, ApiError> {
    use axum_market::schema::{categories, order_items, orders, products};

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let my_orders: Vec<Order> = orders::table
        .filter(orders::user_id.eq(&user_id))
        .order(orders::created_at.desc())
        .select(Order::as_select())
        .load(&mut conn)
        .await?;

    let order_ids: Vec<i32> = my_orders.iter().map(|o| o.id).collect();

    let lines: Vec<(OrderItem, Product, Category)> = order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .inner_join(products::table.inner_join(categories::table))
        .select((
            OrderItem::as_select(),
            Product::as_select(),
            Category::as_select(),
        ))
        .load(&mut conn)
        .await?;

    let mut by_order: HashMap<i32, Vec<OrderItemWithProduct>> = HashMap::new();
    for (item, product, category) in lines {
        by_order
            .entry(item.order_id)
            .or_default()
            .push(OrderItemWithProduct {
                item,
                product: ProductWithCategory { product, category },
            });
    }

    let res = my_orders
        .into_iter()
        .map(|order| OrderWithProducts {
            order_items: by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(Json(res))
}
