use axum_market::schema::{order_items, orders};
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::product::models::ProductWithCategory;

pub const ORDER_STATUS_PENDING: &str = "pending";

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub user_id: Uuid,
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub total: BigDecimal,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub total: BigDecimal,
    pub status: String,
}

/// Snapshot of one cart line at purchase time. The price is frozen here and
/// never follows later product price changes.
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Insertable, Debug, PartialEq)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 1, max = 50))]
    pub city: String,
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub zip_code: String,
    pub phone: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemWithProduct {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: ProductWithCategory,
}

/// Purchase-history entry: order plus its lines joined with product and
/// category.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithProducts {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItemWithProduct>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_address_requires_the_core_fields() {
        let ok = ShippingAddress {
            full_name: "Ada Lovelace".to_owned(),
            address: "12 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: String::new(),
            zip_code: "N1 9GU".to_owned(),
            phone: "+44 20 7946 0000".to_owned(),
        };
        assert!(ok.validate().is_ok());

        let missing_city = ShippingAddress {
            city: String::new(),
            ..ok
        };
        assert!(missing_city.validate().is_err());
    }
}
