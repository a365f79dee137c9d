use actix_web::{web, HttpResponse};

use crate::config::AppConfig;
use crate::database::MongoDB;
use crate::services::auth_service::{
    self, Claims, ResendCodeRequest, SessionResponse, SigninRequest, SigninResponse,
    SignupRequest, VerifyRequest,
};
use crate::services::Mailer;

use super::failure;

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created, verification code emailed"),
        (status = 400, description = "Invalid input, username taken or email already registered"),
        (status = 500, description = "Verification email could not be sent")
    )
)]
pub async fn signup(
    db: web::Data<MongoDB>,
    mailer: web::Data<dyn Mailer>,
    request: web::Json<SignupRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/signup - username: {}", request.username);

    match auth_service::signup(&db, mailer.get_ref(), &request).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => failure("POST /auth/signup", &e, "Server error while registering user"),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Account verified"),
        (status = 400, description = "Invalid, incorrect or expired code"),
        (status = 404, description = "User not found")
    )
)]
pub async fn verify(db: web::Data<MongoDB>, request: web::Json<VerifyRequest>) -> HttpResponse {
    log::info!("✓ POST /auth/verify - username: {}", request.username);

    match auth_service::verify(&db, &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("POST /auth/verify", &e, "Server error while verifying user"),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-code",
    tag = "Auth",
    request_body = ResendCodeRequest,
    responses(
        (status = 200, description = "A fresh code was emailed"),
        (status = 404, description = "No pending verification for this username")
    )
)]
pub async fn resend_code(
    db: web::Data<MongoDB>,
    mailer: web::Data<dyn Mailer>,
    request: web::Json<ResendCodeRequest>,
) -> HttpResponse {
    log::info!("🔁 POST /auth/resend-code - username: {}", request.username);

    match auth_service::resend_code(&db, mailer.get_ref(), &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("POST /auth/resend-code", &e, "Server error while sending code"),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "Auth",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = SigninResponse),
        (status = 401, description = "Unknown user or incorrect password"),
        (status = 403, description = "Account not verified yet")
    )
)]
pub async fn signin(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    request: web::Json<SigninRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/signin - identifier: {}", request.identifier);

    match auth_service::signin(&db, &config.jwt, &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure(
            "POST /auth/signin",
            &e,
            "Authentication failed. Please try again later.",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Current session user", body = SessionResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn session(
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    log::info!("👤 GET /auth/session - user: {}", claims.username);

    match auth_service::session(&db, &config, &claims).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("GET /auth/session", &e, "Error fetching session"),
    }
}
