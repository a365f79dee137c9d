use crate::{
    config::{AppConfig, JwtSettings},
    database::MongoDB,
    models::{ApiResponse, SessionUser, User},
    services::mail_service::Mailer,
    utils::{
        generate_verification_code, validation, verification_code_expiry, AppError,
    },
};
use bcrypt::hash;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BCRYPT_COST: u32 = 10;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user _id (hex)
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_accepting_messages: bool,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyRequest {
    pub username: String,
    pub code: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResendCodeRequest {
    pub username: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SigninRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SigninResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub profile_url: String,
}

// ==================== TOKENS ====================

pub fn generate_jwt(user: &User, settings: &JwtSettings) -> Result<(String, i64), AppError> {
    let now = Utc::now();
    let expires_at = Duration::try_days(settings.max_age_days)
        .filter(|lifetime| *lifetime > Duration::zero())
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Invalid session lifetime: {} days",
                settings.max_age_days
            ))
        })?
        .timestamp();

    let claims = Claims {
        sub: user.id_hex(),
        username: user.username.clone(),
        email: user.email.clone(),
        is_verified: user.is_verified,
        is_accepting_messages: user.is_accepting_messages,
        iat: now.timestamp() as usize,
        exp: expires_at as usize,
        jti: Uuid::new_v4().to_string(),
        aud: settings.audience.clone(),
        iss: settings.issuer.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))?;

    Ok((token, expires_at))
}

pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_issuer(&[settings.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

pub fn parse_user_id(sub: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(sub).map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
}

// ==================== PASSWORDS ====================

async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

async fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed))
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
}

// ==================== SIGNUP / VERIFY ====================

impl SignupRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::Validator::new()
            .check("username", validation::validate_username(&self.username))
            .check("fullname", validation::validate_fullname(&self.fullname))
            .check("email", validation::validate_email(&self.email))
            .check("password", validation::validate_password(&self.password))
            .finish("Invalid input")
    }
}

/// Registers a new account or refreshes a pending (unverified) one, then
/// emails the verification code.
pub async fn signup(
    db: &MongoDB,
    mailer: &dyn Mailer,
    request: &SignupRequest,
) -> Result<ApiResponse, AppError> {
    request.validate()?;

    let users = db.users();
    let email = request.email.trim().to_lowercase();

    let verified_with_username = users
        .find_one(doc! { "username": &request.username, "is_verified": true })
        .await?;
    if verified_with_username.is_some() {
        return Err(AppError::BadRequest("User with this username already exists".to_string()));
    }

    let existing = users.find_one(doc! { "email": &email }).await?;
    if existing.as_ref().is_some_and(|user| user.is_verified) {
        return Err(AppError::BadRequest("User already exists with this email".to_string()));
    }

    // A pending registration under another email does not hold the name
    let released = users
        .delete_many(doc! {
            "username": &request.username,
            "is_verified": false,
            "email": { "$ne": &email },
        })
        .await?;
    if released.deleted_count > 0 {
        log::info!("🧹 Released username {} from a stale pending signup", request.username);
    }

    let verify_code = generate_verification_code();
    let expiry = BsonDateTime::from_millis(verification_code_expiry(Utc::now()).timestamp_millis());
    let hashed_password = hash_password(&request.password).await?;

    match existing {
        Some(existing) => {
            log::info!("🔁 Refreshing pending registration for {}", email);
            users
                .update_one(
                    doc! { "_id": existing.id },
                    doc! { "$set": {
                        "username": &request.username,
                        "fullname": &request.fullname,
                        "password": &hashed_password,
                        "verify_code": &verify_code,
                        "verify_code_expiry": expiry,
                        "updated_at": BsonDateTime::now(),
                    } },
                )
                .await?;
        }
        None => {
            let new_user = User {
                id: None,
                fullname: request.fullname.clone(),
                username: request.username.clone(),
                email: email.clone(),
                password: hashed_password,
                verify_code: verify_code.clone(),
                verify_code_expiry: expiry,
                is_verified: false,
                is_accepting_messages: true,
                messages: Vec::new(),
                created_at: Some(BsonDateTime::now()),
                updated_at: Some(BsonDateTime::now()),
            };
            users.insert_one(&new_user).await?;
        }
    }

    mailer
        .send_verification_email(&email, &request.username, &verify_code)
        .await?;

    log::info!("✅ User registered: {} ({})", request.username, email);

    Ok(ApiResponse::ok("User registered successfully. Please verify your account."))
}

/// Checks a submitted code against the stored one
pub fn check_verification(user: &User, code: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    if user.is_verified {
        return Err(AppError::BadRequest("Account is already verified".to_string()));
    }
    if user.code_expired_at(now) {
        return Err(AppError::BadRequest(
            "Verification code has expired. Please sign up again to get a new code".to_string(),
        ));
    }
    if user.verify_code != code {
        return Err(AppError::BadRequest("Incorrect verification code".to_string()));
    }
    Ok(())
}

pub async fn verify(db: &MongoDB, request: &VerifyRequest) -> Result<ApiResponse, AppError> {
    validation::Validator::new()
        .check("username", validation::validate_username(&request.username))
        .finish("Invalid username")?;
    validation::Validator::new()
        .check("code", validation::validate_verify_code(&request.code))
        .finish("Invalid verification code")?;

    let users = db.users();
    let user = users
        .find_one(doc! { "username": &request.username })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    check_verification(&user, &request.code, Utc::now())?;

    users
        .update_one(
            doc! { "_id": user.id },
            doc! { "$set": { "is_verified": true, "updated_at": BsonDateTime::now() } },
        )
        .await?;

    log::info!("✅ Account verified: {}", user.username);

    Ok(ApiResponse::ok("Account verified successfully"))
}

pub async fn resend_code(
    db: &MongoDB,
    mailer: &dyn Mailer,
    request: &ResendCodeRequest,
) -> Result<ApiResponse, AppError> {
    validation::Validator::new()
        .check("username", validation::validate_username(&request.username))
        .finish("Invalid username")?;

    let users = db.users();
    let user = users
        .find_one(doc! { "username": &request.username })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Err(AppError::BadRequest("Account is already verified".to_string()));
    }

    let verify_code = generate_verification_code();
    let expiry = BsonDateTime::from_millis(verification_code_expiry(Utc::now()).timestamp_millis());

    users
        .update_one(
            doc! { "_id": user.id },
            doc! { "$set": {
                "verify_code": &verify_code,
                "verify_code_expiry": expiry,
                "updated_at": BsonDateTime::now(),
            } },
        )
        .await?;

    mailer
        .send_verification_email(&user.email, &user.username, &verify_code)
        .await?;

    Ok(ApiResponse::ok("Verification code sent"))
}

// ==================== SESSIONS ====================

pub async fn signin(
    db: &MongoDB,
    settings: &JwtSettings,
    request: &SigninRequest,
) -> Result<ApiResponse<SigninResponse>, AppError> {
    let identifier = request.identifier.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide both email/username and password".to_string(),
        ));
    }

    let user = db
        .users()
        .find_one(doc! {
            "$or": [
                { "email": identifier.to_lowercase() },
                { "username": identifier },
            ]
        })
        .await?
        .ok_or_else(|| AppError::Unauthorized("No user found with this email or username".to_string()))?;

    if !user.is_verified {
        return Err(AppError::Forbidden(
            "Please verify your account before logging in".to_string(),
        ));
    }

    if !verify_password(&request.password, &user.password).await? {
        return Err(AppError::Unauthorized("Incorrect password".to_string()));
    }

    let (token, expires_at) = generate_jwt(&user, settings)?;

    Ok(ApiResponse::with_data(
        "Signed in successfully",
        SigninResponse {
            token,
            expires_at,
            user: SessionUser::from(&user),
        },
    ))
}

pub async fn session(
    db: &MongoDB,
    config: &AppConfig,
    claims: &Claims,
) -> Result<ApiResponse<SessionResponse>, AppError> {
    let user_id = parse_user_id(&claims.sub)?;

    let user = db
        .users()
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::with_data(
        "Session fetched successfully",
        SessionResponse {
            profile_url: config.profile_url(&user.username),
            user: SessionUser::from(&user),
        },
    ))
}
