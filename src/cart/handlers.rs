use super::models::{
    AddCartItem, AddedToCart, CartItem, CartItemWithCategory, CartItemWithProduct, CartSummary,
    CheckoutPayload, NewCartItem, PlacedOrder, UpdateCartItem, cart_total,
    is_supported_payment_method,
};
use crate::auth::models::AccessTokenClaims;
use crate::category::models::Category;
use crate::order::models::{
    NewOrder, NewOrderItem, ORDER_STATUS_PENDING, Order, OrderItem, OrderWithItems,
};
use crate::product::models::{Product, ProductListing, ProductWithCategory, SellerSummary};
use crate::utils::error::ApiError;
use crate::utils::types::{MessageResponse, Pool};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum_market::schema::{cart_items, categories, order_items, orders, products, users};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;
use validator::Validate;

pub async fn get_cart(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<Json<CartSummary>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let rows: Vec<(CartItem, Product, Category, (Uuid, String))> = cart_items::table
        .filter(cart_items::user_id.eq(&user_id))
        .inner_join(
            products::table
                .inner_join(categories::table)
                .inner_join(users::table),
        )
        .select((
            CartItem::as_select(),
            Product::as_select(),
            Category::as_select(),
            (users::id, users::username),
        ))
        .load(&mut conn)
        .await?;

    let total = cart_total(rows.iter().map(|(item, product, _, _)| {
        (&product.price, item.quantity)
    }));
    let item_count = rows.len();

    let items = rows
        .into_iter()
        .map(|(item, product, category, (id, username))| CartItemWithProduct {
            item,
            product: ProductListing {
                product,
                category,
                user: SellerSummary { id, username },
            },
        })
        .collect();

    Ok(Json(CartSummary {
        items,
        total,
        item_count,
    }))
}

pub async fn add_to_cart(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Json(payload): Json<AddCartItem>,
) -> Result<(StatusCode, Json<AddedToCart>), ApiError> {
    payload.validate()?;

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let product = products::table
        .find(payload.product_id)
        .filter(products::is_active.eq(true))
        .select(Product::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    if product.user_id == user_id {
        return Err(ApiError::InvalidOperation(
            "Cannot add your own product to cart".to_owned(),
        ));
    }

    let new_item = NewCartItem {
        user_id,
        product_id: product.id,
        quantity: payload.quantity,
    };

    // single atomic upsert: concurrent adds for the same line cannot lose an
    // increment
    let item: CartItem = diesel::insert_into(cart_items::table)
        .values(&new_item)
        .on_conflict((cart_items::user_id, cart_items::product_id))
        .do_update()
        .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
        .returning(CartItem::as_returning())
        .get_result(&mut conn)
        .await?;

    let category = categories::table
        .find(product.category_id)
        .select(Category::as_select())
        .first(&mut conn)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddedToCart {
            message: "Item added to cart".to_owned(),
            cart_item: CartItemWithCategory {
                item,
                product: ProductWithCategory { product, category },
            },
        }),
    ))
}

pub async fn update_cart_item(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCartItem>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::InvalidOperation(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let updated = diesel::update(
        cart_items::table
            .filter(cart_items::id.eq(id))
            .filter(cart_items::user_id.eq(&user_id)),
    )
    .set(cart_items::quantity.eq(payload.quantity))
    .execute(&mut conn)
    .await?;

    if updated == 0 {
        return Err(ApiError::NotFound("Cart item not found".to_owned()));
    }

    Ok(Json(MessageResponse::new("Cart item updated successfully")))
}

pub async fn remove_from_cart(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let deleted = diesel::delete(
        cart_items::table
            .filter(cart_items::id.eq(id))
            .filter(cart_items::user_id.eq(&user_id)),
    )
    .execute(&mut conn)
    .await?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Cart item not found".to_owned()));
    }

    Ok(Json(MessageResponse::new("Item removed from cart")))
}

pub async fn clear_cart(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    diesel::delete(cart_items::table.filter(cart_items::user_id.eq(&user_id)))
        .execute(&mut conn)
        .await?;

    Ok(Json(MessageResponse::new("Cart cleared successfully")))
}

pub async fn checkout(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Json(payload): Json<CheckoutPayload>,
) -> Result<(StatusCode, Json<PlacedOrder>), ApiError> {
    payload.validate()?;

    if !is_supported_payment_method(&payload.payment_method) {
        return Err(ApiError::Validation(
            "Unsupported payment method".to_owned(),
        ));
    }

    let user_id = claims.user_id()?;
    let shipping_address =
        serde_json::to_value(&payload.shipping_address).map_err(ApiError::internal)?;
    let payment_method = payload.payment_method;

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    // order creation, item snapshots and cart clearing commit or roll back as
    // one unit; a failed checkout leaves the cart intact
    let order = conn
        .transaction::<Order, ApiError, _>(move |conn| {
            Box::pin(async move {
                let lines: Vec<(CartItem, Product)> = cart_items::table
                    .filter(cart_items::user_id.eq(&user_id))
                    .inner_join(products::table)
                    .select((CartItem::as_select(), Product::as_select()))
                    .load(conn)
                    .await?;

                if lines.is_empty() {
                    return Err(ApiError::InvalidOperation("Cart is empty".to_owned()));
                }

                let total = cart_total(
                    lines
                        .iter()
                        .map(|(item, product)| (&product.price, item.quantity)),
                );

                let order: Order = diesel::insert_into(orders::table)
                    .values(NewOrder {
                        user_id,
                        shipping_address,
                        payment_method,
                        total,
                        status: ORDER_STATUS_PENDING.to_owned(),
                    })
                    .returning(Order::as_returning())
                    .get_result(conn)
                    .await?;

                let snapshots: Vec<NewOrderItem> = lines
                    .iter()
                    .map(|(item, product)| NewOrderItem {
                        order_id: order.id,
                        product_id: product.id,
                        quantity: item.quantity,
                        price: product.price.clone(),
                    })
                    .collect();

                diesel::insert_into(order_items::table)
                    .values(&snapshots)
                    .execute(conn)
                    .await?;

                diesel::delete(cart_items::table.filter(cart_items::user_id.eq(&user_id)))
                    .execute(conn)
                    .await?;

                Ok(order)
            })
        })
        .await?;

    let items = order_items::table
        .filter(order_items::order_id.eq(order.id))
        .select(OrderItem::as_select())
        .load(&mut conn)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlacedOrder {
            message: "Order placed successfully".to_owned(),
            order: OrderWithItems {
                order,
                order_items: items,
            },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDateTime;
    use diesel::pg::Pg;

    #[test]
    fn add_to_cart_is_an_atomic_increment_upsert() {
        let new_item = NewCartItem {
            user_id: Uuid::nil(),
            product_id: 1,
            quantity: 2,
        };
        let stmt = diesel::insert_into(cart_items::table)
            .values(&new_item)
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)));

        let sql = diesel::debug_query::<Pg, _>(&stmt).to_string();

        assert!(sql.contains("ON CONFLICT"));
        assert!(sql.contains(r#""user_id""#));
        assert!(sql.contains(r#""product_id""#));
        assert!(sql.contains("DO UPDATE"));
        // the increment reads the existing row plus the excluded insert values
        assert!(sql.contains(r#""cart_items"."quantity" +"#));
        assert!(sql.to_lowercase().contains(r#"excluded."quantity""#));
    }

    fn product_fixture(id: i32, price: &str, seller: Uuid) -> Product {
        Product {
            id,
            title: format!("product {}", id),
            description: "solid, barely used".to_owned(),
            price: price.parse().unwrap(),
            quantity: 3,
            condition: "good".to_owned(),
            is_active: true,
            brand: None,
            model: None,
            material: None,
            color: None,
            length: None,
            width: None,
            height: None,
            weight: None,
            year_of_manufacture: None,
            original_packaging: false,
            manual_included: false,
            working_condition_desc: None,
            images: vec![],
            category_id: 1,
            user_id: seller,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn order_snapshots_freeze_the_current_price() {
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        let lines = vec![
            (
                CartItem {
                    id: 1,
                    user_id: buyer,
                    product_id: 10,
                    quantity: 3,
                },
                product_fixture(10, "50.00", seller),
            ),
            (
                CartItem {
                    id: 2,
                    user_id: buyer,
                    product_id: 11,
                    quantity: 1,
                },
                product_fixture(11, "19.99", seller),
            ),
        ];

        let total = cart_total(
            lines
                .iter()
                .map(|(item, product)| (&product.price, item.quantity)),
        );
        assert_eq!(total, "169.99".parse::<BigDecimal>().unwrap());

        let snapshots: Vec<NewOrderItem> = lines
            .iter()
            .map(|(item, product)| NewOrderItem {
                order_id: 7,
                product_id: product.id,
                quantity: item.quantity,
                price: product.price.clone(),
            })
            .collect();

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].price, "50.00".parse::<BigDecimal>().unwrap());
        assert_eq!(snapshots[0].quantity, 3);
        assert_eq!(snapshots[1].price, "19.99".parse::<BigDecimal>().unwrap());
    }
}
