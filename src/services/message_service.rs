// Embedded message store: every message lives in its recipient's user
// document, under `messages`.

use crate::{
    database::MongoDB,
    models::{ApiResponse, Message, MessageView},
    utils::{validation, AppError},
};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    options::ReturnDocument,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub username: String,
    pub content: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AcceptMessagesRequest {
    pub accept_messages: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AcceptMessagesStatus {
    pub is_accepting_messages: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageList {
    pub messages: Vec<MessageView>,
    pub total: usize,
}

/// Shape produced by the `$group` stage of the messages pipeline
#[derive(Debug, Deserialize)]
struct GroupedMessages {
    messages: Vec<Message>,
}

/// $match -> $unwind -> $sort (newest first) -> $group
pub fn messages_pipeline(user_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "_id": user_id } },
        doc! { "$unwind": "$messages" },
        doc! { "$sort": { "messages.created_at": -1 } },
        doc! { "$group": { "_id": "$_id", "messages": { "$push": "$messages" } } },
    ]
}

pub async fn toggle_accept_messages(
    db: &MongoDB,
    user_id: ObjectId,
    accept: bool,
) -> Result<ApiResponse<AcceptMessagesStatus>, AppError> {
    let updated = db
        .users()
        .find_one_and_update(
            doc! { "_id": user_id },
            doc! { "$set": { "is_accepting_messages": accept, "updated_at": bson::DateTime::now() } },
        )
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized("Failed to update user status to accept messages".to_string())
        })?;

    log::info!("🔧 {} now accepting messages: {}", updated.username, updated.is_accepting_messages);

    Ok(ApiResponse::with_data(
        "Message acceptance status updated successfully",
        AcceptMessagesStatus {
            is_accepting_messages: updated.is_accepting_messages,
        },
    ))
}

pub async fn get_accept_messages(
    db: &MongoDB,
    user_id: ObjectId,
) -> Result<ApiResponse<AcceptMessagesStatus>, AppError> {
    let user = db
        .users()
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::with_data(
        "User message acceptance status fetched successfully",
        AcceptMessagesStatus {
            is_accepting_messages: user.is_accepting_messages,
        },
    ))
}

pub async fn get_messages(
    db: &MongoDB,
    user_id: ObjectId,
) -> Result<ApiResponse<MessageList>, AppError> {
    let users = db.users();

    let mut cursor = users.aggregate(messages_pipeline(user_id)).await?;

    let messages = match cursor.try_next().await? {
        Some(grouped) => bson::from_document::<GroupedMessages>(grouped)?.messages,
        None => {
            // $unwind drops users with an empty inbox
            let exists = users.count_documents(doc! { "_id": user_id }).await? > 0;
            if !exists {
                return Err(AppError::NotFound("User not found".to_string()));
            }
            Vec::new()
        }
    };

    let messages: Vec<MessageView> = messages.into_iter().map(MessageView::from).collect();
    let total = messages.len();

    Ok(ApiResponse::with_data(
        "Messages fetched successfully",
        MessageList { messages, total },
    ))
}

impl SendMessageRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::Validator::new()
            .check("username", validation::validate_username(&self.username))
            .finish_joined()?;
        validation::Validator::new()
            .check("content", validation::validate_message_content(&self.content))
            .finish_joined()
    }
}

pub async fn send_message(
    db: &MongoDB,
    request: &SendMessageRequest,
) -> Result<ApiResponse, AppError> {
    request.validate()?;

    let users = db.users();
    let user = users
        .find_one(doc! { "username": &request.username, "is_verified": true })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !user.is_accepting_messages {
        return Err(AppError::Forbidden("User is not accepting messages".to_string()));
    }

    let message = bson::to_bson(&Message::new(request.content.clone()))
        .map_err(|e| AppError::Internal(format!("Failed to encode message: {}", e)))?;

    // Re-check the flag atomically so a concurrent opt-out wins
    let result = users
        .update_one(
            doc! { "_id": user.id, "is_accepting_messages": true },
            doc! { "$push": { "messages": message } },
        )
        .await?;

    if result.modified_count == 0 {
        return Err(AppError::Forbidden("User is not accepting messages".to_string()));
    }

    log::info!("📨 Message delivered to {}", user.username);

    Ok(ApiResponse::ok("Message sent successfully"))
}

pub fn parse_message_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::invalid("id", "Invalid message id"))
}

pub async fn delete_message(
    db: &MongoDB,
    user_id: ObjectId,
    message_id: &str,
) -> Result<ApiResponse, AppError> {
    let message_id = parse_message_id(message_id)?;

    let result = db
        .users()
        .update_one(
            doc! { "_id": user_id },
            doc! { "$pull": { "messages": { "_id": message_id } } },
        )
        .await?;

    if result.modified_count == 0 {
        return Err(AppError::NotFound("Message not found or already deleted".to_string()));
    }

    Ok(ApiResponse::ok("Message deleted successfully"))
}
