use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Anonymous message, embedded in the recipient's user document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub created_at: BsonDateTime,
}

impl Message {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            content: content.into(),
            created_at: BsonDateTime::now(),
        }
    }
}

/// Message as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_hex(),
            content: message.content,
            created_at: DateTime::from_timestamp_millis(message.created_at.timestamp_millis())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_keeps_id_and_timestamp() {
        let message = Message {
            id: ObjectId::new(),
            content: "You give great talks".to_string(),
            created_at: BsonDateTime::from_millis(1_700_000_000_000),
        };
        let hex = message.id.to_hex();

        let view = MessageView::from(message);
        assert_eq!(view.id, hex);
        assert_eq!(view.created_at.timestamp_millis(), 1_700_000_000_000);
    }
}
