use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::services::auth_service::{parse_user_id, Claims};
use crate::services::message_service::{
    self, AcceptMessagesRequest, AcceptMessagesStatus, MessageList, SendMessageRequest,
};

use super::{failure, metrics};

#[utoipa::path(
    post,
    path = "/api/v1/messages/send",
    tag = "Messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message delivered"),
        (status = 400, description = "Invalid username or content"),
        (status = 403, description = "User is not accepting messages"),
        (status = 404, description = "User not found")
    )
)]
pub async fn send_message(
    db: web::Data<MongoDB>,
    request: web::Json<SendMessageRequest>,
) -> HttpResponse {
    log::info!("📨 POST /messages/send - to: {}", request.username);

    match message_service::send_message(&db, &request).await {
        Ok(response) => {
            metrics::increment_messages_delivered();
            HttpResponse::Created().json(response)
        }
        Err(e) => failure("POST /messages/send", &e, "Error sending message"),
    }
}

/// GET /api/v1/messages - caller's inbox, newest first
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Inbox", body = MessageList),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_messages(db: web::Data<MongoDB>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("📋 GET /messages - user: {}", claims.username);

    let result = match parse_user_id(&claims.sub) {
        Ok(user_id) => message_service::get_messages(&db, user_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("GET /messages", &e, "Error getting messages"),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/messages/accept",
    tag = "Messages",
    responses(
        (status = 200, description = "Current acceptance flag", body = AcceptMessagesStatus),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_accept_messages(
    db: web::Data<MongoDB>,
    claims: web::ReqData<Claims>,
) -> HttpResponse {
    let result = match parse_user_id(&claims.sub) {
        Ok(user_id) => message_service::get_accept_messages(&db, user_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure(
            "GET /messages/accept",
            &e,
            "Error getting user message acceptance status",
        ),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/messages/accept",
    tag = "Messages",
    request_body = AcceptMessagesRequest,
    responses(
        (status = 200, description = "Flag updated", body = AcceptMessagesStatus),
        (status = 400, description = "Body is not a boolean flag"),
        (status = 401, description = "Unauthorized or user no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn toggle_accept_messages(
    db: web::Data<MongoDB>,
    claims: web::ReqData<Claims>,
    request: web::Json<AcceptMessagesRequest>,
) -> HttpResponse {
    log::info!(
        "🔧 POST /messages/accept - user: {}, accept: {}",
        claims.username,
        request.accept_messages
    );

    let result = match parse_user_id(&claims.sub) {
        Ok(user_id) => {
            message_service::toggle_accept_messages(&db, user_id, request.accept_messages).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure(
            "POST /messages/accept",
            &e,
            "Error toggling user message acceptance status",
        ),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 400, description = "Invalid message id"),
        (status = 404, description = "Message not found or already deleted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_message(
    db: web::Data<MongoDB>,
    claims: web::ReqData<Claims>,
    message_id: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️  DELETE /messages/{} - user: {}", message_id, claims.username);

    let result = match parse_user_id(&claims.sub) {
        Ok(user_id) => message_service::delete_message(&db, user_id, &message_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("DELETE /messages/{id}", &e, "Error deleting message"),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_config;
    use actix_web::{http::StatusCode, test, web, App};

    // Route-level checks that never reach the database
    #[actix_web::test]
    async fn test_inbox_routes_require_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_config()))
                .configure(crate::api::configure),
        )
        .await;

        let requests = vec![
            test::TestRequest::get().uri("/api/v1/messages"),
            test::TestRequest::get().uri("/api/v1/messages/accept"),
            test::TestRequest::post()
                .uri("/api/v1/messages/accept")
                .set_json(serde_json::json!({ "accept_messages": true })),
            test::TestRequest::delete().uri("/api/v1/messages/65f0c0ffee0000000000abcd"),
            test::TestRequest::get().uri("/api/v1/auth/session"),
        ];

        for req in requests {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
