use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use super::Message;

pub const USERS_COLLECTION: &str = "users";

/// User document (collection "users")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub fullname: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    pub verify_code: String,
    pub verify_code_expiry: BsonDateTime,
    pub is_verified: bool,
    #[serde(default)]
    pub is_accepting_messages: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<BsonDateTime>,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn code_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.verify_code_expiry.timestamp_millis() < now.timestamp_millis()
    }
}

/// Session view of a user, never includes credentials
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_accepting_messages: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_hex(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
            is_accepting_messages: user.is_accepting_messages,
        }
    }
}

/// What a visitor sees behind a profile link
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PublicProfile {
    pub username: String,
    pub is_accepting_messages: bool,
}

#[cfg(test)]
pub(crate) fn sample_user() -> User {
    User {
        id: Some(ObjectId::new()),
        fullname: "Jane".to_string(),
        username: "jane".to_string(),
        email: "jane@example.com".to_string(),
        password: "$2b$04$invalidhashinvalidhashinvalidhashinvalidhashinvali".to_string(),
        verify_code: "123456".to_string(),
        verify_code_expiry: BsonDateTime::from_millis(Utc::now().timestamp_millis() + 60_000),
        is_verified: false,
        is_accepting_messages: true,
        messages: Vec::new(),
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn test_missing_optional_fields_default() {
        let doc = bson::doc! {
            "_id": ObjectId::new(),
            "fullname": "Jane",
            "username": "jane",
            "email": "jane@example.com",
            "password": "hash",
            "verify_code": "123456",
            "verify_code_expiry": BsonDateTime::now(),
            "is_verified": true,
        };

        let user: User = bson::from_document(doc).unwrap();
        assert!(!user.is_accepting_messages);
        assert!(user.messages.is_empty());
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_session_user_omits_credentials() {
        let user = sample_user();
        let json = serde_json::to_value(SessionUser::from(&user)).unwrap();
        assert_eq!(json["username"], "jane");
        assert!(json.get("password").is_none());
        assert!(json.get("verify_code").is_none());
    }

    #[test]
    fn test_code_expiry_check() {
        let mut user = sample_user();
        let now = Utc::now();
        user.verify_code_expiry = BsonDateTime::from_millis(now.timestamp_millis() - 1);
        assert!(user.code_expired_at(now));
        user.verify_code_expiry = BsonDateTime::from_millis(now.timestamp_millis() + 1_000);
        assert!(!user.code_expired_at(now));
    }
}
