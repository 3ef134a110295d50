use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_market::schema::users;
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;
use validator::Validate;

use crate::utils::error::ApiError;

pub const TOKEN_TTL_DAYS: i64 = 7;

/// Bearer-token claims. Extracting this from a request is what makes a
/// handler require authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub exp: i64,
}

impl AccessTokenClaims {
    pub fn new(user_id: Uuid) -> Self {
        let exp = (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp();

        Self {
            sub: user_id.to_string(),
            exp,
        }
    }

    pub fn user_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub).map_err(|_| ApiError::Auth("Invalid token".to_owned()))
    }
}

fn jwt_secret() -> Result<String, ApiError> {
    env::var("JWT_SECRET").map_err(|_| ApiError::internal("JWT_SECRET must be set"))
}

pub fn issue_token(user_id: Uuid) -> Result<String, ApiError> {
    let claims = AccessTokenClaims::new(user_id);

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret()?.as_bytes()),
    )
    .map_err(ApiError::internal)
}

pub fn verify_token(token: &str) -> Result<AccessTokenClaims, ApiError> {
    jsonwebtoken::decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret()?.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Auth("Invalid or expired token".to_owned()))
}

impl<S> FromRequestParts<S> for AccessTokenClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Auth("Missing authorization token".to_owned()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Auth("Invalid authorization header".to_owned()))?;

        verify_token(token)
    }
}

#[derive(Queryable, Selectable, Debug, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// User row without the password hash, the only shape serialized outward.
#[derive(Queryable, Selectable, Serialize, Debug, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<User> for SafeUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            phone: user.phone,
            address: user.address,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub message: String,
    pub user: SafeUser,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_secret() {
        unsafe { env::set_var("JWT_SECRET", "test-secret") };
    }

    #[test]
    fn token_round_trip_yields_the_same_user() {
        set_secret();
        let user_id = Uuid::new_v4();

        let token = issue_token(user_id).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn garbage_token_is_rejected() {
        set_secret();

        let err = verify_token("not-a-token").unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        set_secret();
        let claims = AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = verify_token(&token).unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[test]
    fn register_payload_bounds() {
        let payload = RegisterUser {
            email: "buyer@example.com".to_owned(),
            username: "buyer".to_owned(),
            password: "secret1".to_owned(),
            full_name: None,
            phone: None,
            address: None,
        };
        assert!(payload.validate().is_ok());

        let short_name = RegisterUser {
            username: "ab".to_owned(),
            ..payload
        };
        assert!(short_name.validate().is_err());

        let bad_email = RegisterUser {
            email: "not-an-email".to_owned(),
            username: "buyer".to_owned(),
            password: "secret1".to_owned(),
            full_name: None,
            phone: None,
            address: None,
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterUser {
            email: "buyer@example.com".to_owned(),
            username: "buyer".to_owned(),
            password: "short".to_owned(),
            full_name: None,
            phone: None,
            address: None,
        };
        assert!(short_password.validate().is_err());
    }
}
