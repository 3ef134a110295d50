use axum_market::schema::cart_items;
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::order::models::{OrderWithItems, ShippingAddress};
use crate::product::models::{ProductListing, ProductWithCategory};

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, PartialEq)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i32,
    pub user_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItem {
    pub user_id: Uuid,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItem {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItem {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_payment_method() -> String {
    "cash_on_delivery".to_owned()
}

pub fn is_supported_payment_method(method: &str) -> bool {
    matches!(method, "cash_on_delivery")
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWithProduct {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: ProductListing,
}

/// Full cart view: joined items, the running total and the number of
/// distinct lines (not the summed quantities).
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartItemWithProduct>,
    pub total: BigDecimal,
    pub item_count: usize,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddedToCart {
    pub message: String,
    pub cart_item: CartItemWithCategory,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartItemWithCategory {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: ProductWithCategory,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub message: String,
    pub order: OrderWithItems,
}

/// Σ price × quantity over the given lines.
pub fn cart_total<'a, I>(lines: I) -> BigDecimal
where
    I: IntoIterator<Item = (&'a BigDecimal, i32)>,
{
    lines
        .into_iter()
        .fold(BigDecimal::from(0), |acc, (price, quantity)| {
            acc + price * BigDecimal::from(quantity)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total([]), BigDecimal::from(0));
    }

    #[test]
    fn total_is_price_times_quantity_summed() {
        let p1 = price("50.00");
        let p2 = price("19.99");

        let total = cart_total([(&p1, 3), (&p2, 2)]);

        assert_eq!(total, price("189.98"));
    }

    #[test]
    fn incrementing_a_line_raises_the_total_not_the_line_count() {
        let p = price("50.00");

        // one line at quantity 2, then the same line bumped to 3
        assert_eq!(cart_total([(&p, 2)]), price("100.00"));
        assert_eq!(cart_total([(&p, 3)]), price("150.00"));
    }

    #[test]
    fn payment_methods_are_cash_on_delivery_only() {
        assert!(is_supported_payment_method("cash_on_delivery"));
        assert!(!is_supported_payment_method("credit_card"));
        assert!(!is_supported_payment_method(""));
    }

    #[test]
    fn add_payload_rejects_sub_one_quantity() {
        use validator::Validate;

        let zero = AddCartItem {
            product_id: 1,
            quantity: 0,
        };
        assert!(zero.validate().is_err());

        let one = AddCartItem {
            product_id: 1,
            quantity: 1,
        };
        assert!(one.validate().is_ok());
    }
}
