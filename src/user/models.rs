use axum_market::schema::users;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::models::SafeUser;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_picture: Option<String>,
}

/// Missing fields stay untouched; `updated_at` is always bumped.
#[derive(AsChangeset)]
#[diesel(table_name = users)]
pub struct UpdateUserProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_picture: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedProfile {
    pub message: String,
    pub user: SafeUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_payload_bounds() {
        let ok = UpdateProfilePayload {
            full_name: Some("Grace Hopper".to_owned()),
            phone: None,
            address: None,
            profile_picture: None,
        };
        assert!(ok.validate().is_ok());

        let empty_name = UpdateProfilePayload {
            full_name: Some(String::new()),
            phone: None,
            address: None,
            profile_picture: None,
        };
        assert!(empty_name.validate().is_err());
    }
}
