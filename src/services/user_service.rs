use crate::{
    database::MongoDB,
    models::{ApiResponse, PublicProfile},
    utils::{validation, AppError},
};
use mongodb::bson::doc;

fn validate_username_param(username: &str) -> Result<(), AppError> {
    validation::Validator::new()
        .check("username", validation::validate_username(username))
        .finish_joined()
}

/// Username availability for the signup form. Only verified accounts hold a name.
pub async fn check_username(db: &MongoDB, username: &str) -> Result<ApiResponse, AppError> {
    validate_username_param(username)?;

    let taken = db
        .users()
        .find_one(doc! { "username": username, "is_verified": true })
        .await?
        .is_some();

    if taken {
        return Err(AppError::BadRequest("Username is taken".to_string()));
    }

    Ok(ApiResponse::ok("Username is unique"))
}

/// Data behind a shareable profile link
pub async fn public_profile(
    db: &MongoDB,
    username: &str,
) -> Result<ApiResponse<PublicProfile>, AppError> {
    validate_username_param(username)?;

    let user = db
        .users()
        .find_one(doc! { "username": username, "is_verified": true })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::with_data(
        "Profile fetched successfully",
        PublicProfile {
            username: user.username,
            is_accepting_messages: user.is_accepting_messages,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_db;
    use crate::models::sample_user;

    #[test]
    fn test_username_param_errors_are_joined() {
        let err = validate_username_param("x!").unwrap_err();
        assert_eq!(err.to_string(), "Username must not contain special characters");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_only_verified_users_hold_names() {
        let db = test_db().await;

        let mut pending = sample_user();
        pending.id = None;
        db.users().insert_one(&pending).await.unwrap();

        assert!(check_username(&db, "jane").await.is_ok());
        assert!(matches!(public_profile(&db, "jane").await, Err(AppError::NotFound(_))));

        db.users()
            .update_one(doc! { "username": "jane" }, doc! { "$set": { "is_verified": true } })
            .await
            .unwrap();

        assert!(matches!(check_username(&db, "jane").await, Err(AppError::BadRequest(_))));
        let profile = public_profile(&db, "jane").await.unwrap().data.unwrap();
        assert!(profile.is_accepting_messages);

        db.database().drop().await.unwrap();
    }
}
