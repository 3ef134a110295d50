use axum_market::schema::categories;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, PartialEq)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Insertable, Deserialize, Validate, Debug)]
#[diesel(table_name = categories)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCategory {
    pub message: String,
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_bounds() {
        let ok = NewCategory {
            name: "Electronics".to_owned(),
            description: Some("Phones, laptops, gadgets".to_owned()),
        };
        assert!(ok.validate().is_ok());

        let empty = NewCategory {
            name: String::new(),
            description: None,
        };
        assert!(empty.validate().is_err());

        let long = NewCategory {
            name: "x".repeat(51),
            description: None,
        };
        assert!(long.validate().is_err());
    }
}
