use axum_market::schema::products;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::category::models::Category;

pub const CONDITIONS: [&str; 5] = ["new", "like-new", "good", "fair", "poor"];
pub const MAX_IMAGES: usize = 5;

pub fn is_valid_condition(value: &str) -> bool {
    CONDITIONS.contains(&value)
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub condition: String,
    pub is_active: bool,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub year_of_manufacture: Option<i32>,
    pub original_packaging: bool,
    pub manual_included: bool,
    pub working_condition_desc: Option<String>,
    pub images: Vec<String>,
    pub category_id: i32,
    pub user_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub condition: String,
    pub is_active: bool,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub year_of_manufacture: Option<i32>,
    pub original_packaging: bool,
    pub manual_included: bool,
    pub working_condition_desc: Option<String>,
    pub images: Vec<String>,
    pub category_id: i32,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProductPayload {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub price: BigDecimal,
    pub category_id: i32,
    pub quantity: Option<i32>,
    pub condition: String,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub material: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub year_of_manufacture: Option<i32>,
    pub original_packaging: Option<bool>,
    pub manual_included: Option<bool>,
    pub working_condition_desc: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Partial update. A missing field leaves the column untouched, it is never
/// nulled.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category_id: Option<i32>,
    pub quantity: Option<i32>,
    pub condition: Option<String>,
    #[validate(length(max = 50))]
    pub brand: Option<String>,
    #[validate(length(max = 50))]
    pub model: Option<String>,
    #[validate(length(max = 50))]
    pub material: Option<String>,
    #[validate(length(max = 30))]
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub year_of_manufacture: Option<i32>,
    pub original_packaging: Option<bool>,
    pub manual_included: Option<bool>,
    pub working_condition_desc: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category_id: Option<i32>,
    pub quantity: Option<i32>,
    pub condition: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub year_of_manufacture: Option<i32>,
    pub original_packaging: Option<bool>,
    pub manual_included: Option<bool>,
    pub working_condition_desc: Option<String>,
    pub images: Option<Vec<String>>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub category: Option<i32>,
    pub search: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellerSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SellerDetail {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// Catalog entry: product plus category and a seller summary.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub user: SellerSummary,
}

/// Single-product view with richer seller contact info.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub user: SellerDetail,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SavedProduct {
    pub message: String,
    pub product: ProductListing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_domain() {
        for condition in CONDITIONS {
            assert!(is_valid_condition(condition));
        }
        assert!(!is_valid_condition("mint"));
        assert!(!is_valid_condition("NEW"));
        assert!(!is_valid_condition(""));
    }

    #[test]
    fn filters_deserialize_from_query_params() {
        let filters: ProductFilters =
            serde_urlencoded::from_str("category=3&search=bike&minPrice=10.50&maxPrice=99")
                .unwrap();

        assert_eq!(filters.category, Some(3));
        assert_eq!(filters.search.as_deref(), Some("bike"));
        assert_eq!(filters.min_price, Some("10.50".parse().unwrap()));
        assert_eq!(filters.max_price, Some("99".parse().unwrap()));
        assert!(filters.condition.is_none());
    }
}
