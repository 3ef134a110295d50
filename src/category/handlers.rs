use super::models::{Category, CreatedCategory, NewCategory};
use crate::auth::models::AccessTokenClaims;
use crate::utils::error::ApiError;
use crate::utils::types::Pool;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::RunQueryDsl;
use validator::Validate;

pub async fn get_categories(
    State(pool): State<Pool>,
) -> Result<Json<Vec<Category>>, ApiError> {
    use axum_market::schema::categories;

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let res = categories::table
        .order(categories::name.asc())
        .select(Category::as_select())
        .load(&mut conn)
        .await?;

    Ok(Json(res))
}

pub async fn create_category(
    State(pool): State<Pool>,
    claims: AccessTokenClaims,
    Json(payload): Json<NewCategory>,
) -> Result<(StatusCode, Json<CreatedCategory>), ApiError> {
    use axum_market::schema::categories;

    claims.user_id()?;
    payload.validate()?;

    let mut conn = pool.get().await.map_err(ApiError::internal)?;

    let category = diesel::insert_into(categories::table)
        .values(&payload)
        .returning(Category::as_returning())
        .get_result(&mut conn)
        .await
        .map_err(|err| match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ApiError::Conflict("Category name already exists".to_owned())
            }
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedCategory {
            message: "Category created successfully".to_owned(),
            category,
        }),
    ))
}
