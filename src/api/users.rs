use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::MongoDB;
use crate::models::PublicProfile;
use crate::services::user_service;

use super::failure;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/check-username",
    tag = "Users",
    params(UsernameQuery),
    responses(
        (status = 200, description = "Username is available"),
        (status = 400, description = "Invalid or taken username")
    )
)]
pub async fn check_username(
    db: web::Data<MongoDB>,
    query: web::Query<UsernameQuery>,
) -> HttpResponse {
    log::info!("🔎 GET /users/check-username - {}", query.username);

    match user_service::check_username(&db, &query.username).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("GET /users/check-username", &e, "Error checking username"),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn public_profile(db: web::Data<MongoDB>, username: web::Path<String>) -> HttpResponse {
    match user_service::public_profile(&db, &username).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("GET /users/{username}", &e, "Error fetching profile"),
    }
}
