use super::models::{
    AccessTokenClaims, AuthResponse, LoginUser, NewUser, RegisterUser, SafeUser, User, issue_token,
};
use crate::utils::error::ApiError;
use crate::utils::types::Pool;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use bcrypt::{DEFAULT_COST, hash, verify};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;
use validator::Validate;

pub async fn register(
    State(pool): State<Pool>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    use axum_market::schema::users;

    payload.validate()?;

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let taken = users::table
        .filter(
            users::email
                .eq(&payload.email)
                .or(users::username.eq(&payload.username)),
        )
        .select(users::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()?;

    if taken.is_some() {
        return Err(ApiError::Conflict(
            "User with this email or username already exists".to_owned(),
        ));
    }

    let password_hash = create_password_hash(payload.password).await?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: payload.email,
        username: payload.username,
        password_hash,
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
    };

    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(SafeUser::as_returning())
        .get_result(&mut conn)
        .await?;

    let token = issue_token(new_user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_owned(),
            user,
            token,
        }),
    ))
}

pub async fn login(
    State(pool): State<Pool>,
    Json(payload): Json<LoginUser>,
) -> Result<Json<AuthResponse>, ApiError> {
    use axum_market::schema::users;

    payload.validate()?;

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let user = users::table
        .filter(users::email.eq(&payload.email))
        .select(User::as_select())
        .first::<User>(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::Auth("Invalid email or password".to_owned()))?;

    let password_ok = verify_password(payload.password, user.password_hash.clone()).await?;
    if !password_ok {
        return Err(ApiError::Auth("Invalid email or password".to_owned()));
    }

    let token = issue_token(user.id)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_owned(),
        user: user.into(),
        token,
    }))
}

pub async fn profile(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
) -> Result<Json<SafeUser>, ApiError> {
    use axum_market::schema::users;

    let user_id = claims.user_id()?;
    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let user = users::table
        .find(user_id)
        .select(SafeUser::as_select())
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| ApiError::NotFound("User not found".to_owned()))?;

    Ok(Json(user))
}

async fn create_password_hash(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash(password, DEFAULT_COST))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)
}

async fn verify_password(password: String, password_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn password_hash_verifies_and_rejects() {
        let hashed = create_password_hash("hunter42".to_owned()).await.unwrap();

        assert!(
            verify_password("hunter42".to_owned(), hashed.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password("wrong".to_owned(), hashed)
                .await
                .unwrap()
        );
    }
}
