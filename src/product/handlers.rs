use std::collections::HashMap;

use super::models::{
    MAX_IMAGES, NewProduct, NewProductPayload, Product, ProductDetail, ProductFilters,
    ProductListing, ProductWithCategory, SavedProduct, SellerDetail, SellerSummary,
    UpdateProduct, UpdateProductPayload, is_valid_condition,
};
use crate::auth::models::AccessTokenClaims;
use crate::category::models::Category;
use crate::utils::error::ApiError;
use crate::utils::ownership::assert_product_owner;
use crate::utils::types::{MessageResponse, Pool};
use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum_market::schema::products;
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;
use validator::Validate;

/// Active products narrowed by the optional catalog filters, newest first.
pub(crate) fn filtered_query(filters: &ProductFilters) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table
        .filter(products::is_active.eq(true))
        .into_boxed();

    if let Some(category_id) = filters.category {
        query = query.filter(products::category_id.eq(category_id));
    }
    if let Some(condition) = &filters.condition {
        query = query.filter(products::condition.eq(condition.clone()));
    }
    if let Some(min) = &filters.min_price {
        query = query.filter(products::price.ge(min.clone()));
    }
    if let Some(max) = &filters.max_price {
        query = query.filter(products::price.le(max.clone()));
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        query = query.filter(
            products::title
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern.clone()))
                .or(products::brand.ilike(pattern.clone()))
                .or(products::model.ilike(pattern)),
        );
    }

    query.order(products::created_at.desc())
}

pub async fn get_products(
    State(pool): State<Pool>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<Vec<ProductListing>>, ApiError> {
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let items = filtered_query(&filters)
        .load::<Product>(&mut conn)
        .await?;

    let listings = into_listings(&mut conn, items).await?;

    Ok(Json(listings))
}

pub async fn get_product_by_id(
    State(pool): State<Pool>,
    Path(id): Path<i32>,
) -> Result<Json<ProductDetail>, ApiError> {
    use axum_market::schema::{categories, users};

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let product = products::table
        .find(id)
        .filter(products::is_active.eq(true))
        .select(Product::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_owned()))?;

    let category = categories::table
        .find(product.category_id)
        .select(Category::as_select())
        .first(&mut conn)
        .await?;

    let (seller_id, username, full_name, phone) = users::table
        .find(product.user_id)
        .select((users::id, users::username, users::full_name, users::phone))
        .first::<(Uuid, String, Option<String>, Option<String>)>(&mut conn)
        .await?;

    Ok(Json(ProductDetail {
        product,
        category,
        user: SellerDetail {
            id: seller_id,
            username,
            full_name,
            phone,
        },
    }))
}

pub async fn create_product(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Json(payload): Json<NewProductPayload>,
) -> Result<(StatusCode, Json<SavedProduct>), ApiError> {
    let user_id = claims.user_id()?;

    payload.validate()?;
    check_price(&payload.price)?;
    check_condition(&payload.condition)?;
    if let Some(quantity) = payload.quantity {
        check_quantity(quantity)?;
    }
    let images = payload.images.unwrap_or_default();
    check_images(&images)?;

    let new_product = NewProduct {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        quantity: payload.quantity.unwrap_or(1),
        condition: payload.condition,
        is_active: true,
        brand: payload.brand,
        model: payload.model,
        material: payload.material,
        color: payload.color,
        length: payload.length,
        width: payload.width,
        height: payload.height,
        weight: payload.weight,
        year_of_manufacture: payload.year_of_manufacture,
        original_packaging: payload.original_packaging.unwrap_or(false),
        manual_included: payload.manual_included.unwrap_or(false),
        working_condition_desc: payload.working_condition_desc,
        images,
        category_id: payload.category_id,
        user_id,
    };

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let product = diesel::insert_into(products::table)
        .values(&new_product)
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await?;

    let listing = into_listing(&mut conn, product).await?;

    Ok((
        StatusCode::CREATED,
        Json(SavedProduct {
            message: "Product created successfully".to_owned(),
            product: listing,
        }),
    ))
}

pub async fn update_product(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<SavedProduct>, ApiError> {
    let user_id = claims.user_id()?;

    payload.validate()?;
    if let Some(price) = &payload.price {
        check_price(price)?;
    }
    if let Some(condition) = &payload.condition {
        check_condition(condition)?;
    }
    if let Some(quantity) = payload.quantity {
        check_quantity(quantity)?;
    }
    if let Some(images) = &payload.images {
        check_images(images)?;
    }

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    assert_product_owner(&mut conn, id, user_id).await?;

    let changes = UpdateProduct {
        title: payload.title,
        description: payload.description,
        price: payload.price,
        category_id: payload.category_id,
        quantity: payload.quantity,
        condition: payload.condition,
        brand: payload.brand,
        model: payload.model,
        material: payload.material,
        color: payload.color,
        length: payload.length,
        width: payload.width,
        height: payload.height,
        weight: payload.weight,
        year_of_manufacture: payload.year_of_manufacture,
        original_packaging: payload.original_packaging,
        manual_included: payload.manual_included,
        working_condition_desc: payload.working_condition_desc,
        images: payload.images,
        updated_at: Utc::now().naive_utc(),
    };

    let product = diesel::update(products::table.find(id))
        .set(&changes)
        .returning(Product::as_returning())
        .get_result(&mut conn)
        .await?;

    let listing = into_listing(&mut conn, product).await?;

    Ok(Json(SavedProduct {
        message: "Product updated successfully".to_owned(),
        product: listing,
    }))
}

pub async fn delete_product(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    assert_product_owner(&mut conn, id, user_id).await?;

    // soft delete so order items referencing the product stay resolvable
    diesel::update(products::table.find(id))
        .set((
            products::is_active.eq(false),
            products::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)
        .await?;

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

pub async fn get_my_products(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<Json<Vec<ProductWithCategory>>, ApiError> {
    use axum_market::schema::categories;

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let rows: Vec<(Product, Category)> = products::table
        .filter(products::user_id.eq(&user_id))
        .filter(products::is_active.eq(true))
        .inner_join(categories::table)
        .order(products::created_at.desc())
        .select((Product::as_select(), Category::as_select()))
        .load(&mut conn)
        .await?;

    let res = rows
        .into_iter()
        .map(|(product, category)| ProductWithCategory { product, category })
        .collect();

    Ok(Json(res))
}

fn check_price(price: &BigDecimal) -> Result<(), ApiError> {
    if price <= &BigDecimal::from(0) {
        return Err(ApiError::Validation("Price must be positive".to_owned()));
    }
    Ok(())
}

fn check_condition(condition: &str) -> Result<(), ApiError> {
    if !is_valid_condition(condition) {
        return Err(ApiError::Validation(format!(
            "Condition must be one of: {}",
            super::models::CONDITIONS.join(", ")
        )));
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), ApiError> {
    if quantity < 1 {
        return Err(ApiError::Validation(
            "Quantity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

fn check_images(images: &[String]) -> Result<(), ApiError> {
    if images.len() > MAX_IMAGES {
        return Err(ApiError::Validation(format!(
            "At most {} images are allowed",
            MAX_IMAGES
        )));
    }
    Ok(())
}

async fn into_listing(
    conn: &mut AsyncPgConnection,
    product: Product,
) -> Result<ProductListing, ApiError> {
    let mut listings = into_listings(conn, vec![product]).await?;
    listings
        .pop()
        .ok_or_else(|| ApiError::internal("product vanished while building response"))
}

/// Attaches category and seller summary to each product with two batched
/// lookups.
async fn into_listings(
    conn: &mut AsyncPgConnection,
    items: Vec<Product>,
) -> Result<Vec<ProductListing>, ApiError> {
    use axum_market::schema::{categories, users};

    let category_ids: Vec<i32> = items.iter().map(|p| p.category_id).collect();
    let seller_ids: Vec<Uuid> = items.iter().map(|p| p.user_id).collect();

    let category_map: HashMap<i32, Category> = categories::table
        .filter(categories::id.eq_any(category_ids))
        .select(Category::as_select())
        .load::<Category>(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let seller_map: HashMap<Uuid, SellerSummary> = users::table
        .filter(users::id.eq_any(seller_ids))
        .select((users::id, users::username))
        .load::<(Uuid, String)>(conn)
        .await?
        .into_iter()
        .map(|(id, username)| (id, SellerSummary { id, username }))
        .collect();

    items
        .into_iter()
        .map(|product| {
            let category = category_map
                .get(&product.category_id)
                .cloned()
                .ok_or_else(|| {
                    ApiError::internal(format!("missing category {}", product.category_id))
                })?;
            let user = seller_map
                .get(&product.user_id)
                .cloned()
                .ok_or_else(|| ApiError::internal(format!("missing seller {}", product.user_id)))?;

            Ok(ProductListing {
                product,
                category,
                user,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filters: &ProductFilters) -> String {
        diesel::debug_query::<Pg, _>(&filtered_query(filters)).to_string()
    }

    #[test]
    fn listing_always_excludes_inactive_products() {
        let sql = sql_for(&ProductFilters::default());
        assert!(sql.contains(r#""products"."is_active""#));
        assert!(sql.contains(r#"ORDER BY "products"."created_at" DESC"#));
    }

    #[test]
    fn search_matches_title_description_brand_and_model() {
        let filters = ProductFilters {
            search: Some("camera".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&filters);

        assert_eq!(sql.matches("ILIKE").count(), 4);
        assert!(sql.contains(r#""products"."title""#));
        assert!(sql.contains(r#""products"."description""#));
        assert!(sql.contains(r#""products"."brand""#));
        assert!(sql.contains(r#""products"."model""#));
        assert!(sql.contains("%camera%"));
    }

    #[test]
    fn price_range_is_inclusive_bounds() {
        let filters = ProductFilters {
            min_price: Some("10".parse().unwrap()),
            max_price: Some("99.99".parse().unwrap()),
            ..Default::default()
        };
        let sql = sql_for(&filters);

        assert!(sql.contains(r#""products"."price" >="#));
        assert!(sql.contains(r#""products"."price" <="#));
    }

    #[test]
    fn category_and_condition_filter_by_equality() {
        let filters = ProductFilters {
            category: Some(7),
            condition: Some("good".to_owned()),
            ..Default::default()
        };
        let sql = sql_for(&filters);

        assert!(sql.contains(r#""products"."category_id" ="#));
        assert!(sql.contains(r#""products"."condition" ="#));
    }

    #[test]
    fn unfiltered_query_has_no_search_clause() {
        let sql = sql_for(&ProductFilters::default());
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn price_must_be_positive() {
        assert!(check_price(&"0.01".parse().unwrap()).is_ok());
        assert!(check_price(&BigDecimal::from(0)).is_err());
        assert!(check_price(&"-5".parse().unwrap()).is_err());
    }

    #[test]
    fn image_cap_is_enforced() {
        let five = vec![String::from("/uploads/a.jpg"); 5];
        assert!(check_images(&five).is_ok());

        let six = vec![String::from("/uploads/a.jpg"); 6];
        assert!(check_images(&six).is_err());
    }
}
