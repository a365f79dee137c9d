pub mod auth;
pub mod health;
pub mod messages;
pub mod metrics;
pub mod swagger;
pub mod users;

use actix_web::{error::InternalError, web, HttpResponse};

use crate::models::ApiResponse;
use crate::utils::AppError;

/// Logs a failed operation (client errors at warn, server errors at error)
/// and renders it as the JSON envelope.
pub(crate) fn failure(route: &str, err: &AppError, fallback: &str) -> HttpResponse {
    if err.is_server_error() {
        log::error!("❌ {} failed: {}", route, err);
    } else {
        log::warn!("⚠️ {} rejected: {}", route, err);
    }
    err.to_response(fallback)
}

/// Malformed JSON bodies get the same envelope as validation failures
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            let response = HttpResponse::BadRequest().json(ApiResponse::failure(message));
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query parameters: {}", err);
        let response = HttpResponse::BadRequest().json(ApiResponse::failure(message));
        InternalError::from_response(err, response).into()
    })
}

/// Registers every route. Shared by `main` and handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use crate::middleware::AuthMiddleware;

    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .service(
            web::scope("/api/v1/auth")
                .route("/signup", web::post().to(auth::signup))
                .route("/verify", web::post().to(auth::verify))
                .route("/resend-code", web::post().to(auth::resend_code))
                .route("/signin", web::post().to(auth::signin))
                .service(
                    web::resource("/session")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(auth::session)),
                ),
        )
        .service(
            web::scope("/api/v1/users")
                .route("/check-username", web::get().to(users::check_username))
                .route("/{username}", web::get().to(users::public_profile)),
        )
        // Sending is public; everything else acts on the caller's own inbox
        .service(
            web::scope("/api/v1/messages")
                .route("/send", web::post().to(messages::send_message))
                .service(
                    web::resource("")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(messages::get_messages)),
                )
                .service(
                    web::resource("/accept")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(messages::get_accept_messages))
                        .route(web::post().to(messages::toggle_accept_messages)),
                )
                .service(
                    web::resource("/{id}")
                        .wrap(AuthMiddleware)
                        .route(web::delete().to(messages::delete_message)),
                ),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::message_service::AcceptMessagesRequest;
    use actix_web::{http::StatusCode, test, App};

    async fn echo_flag(request: web::Json<AcceptMessagesRequest>) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse::ok(request.accept_messages.to_string()))
    }

    #[actix_web::test]
    async fn test_non_boolean_accept_flag_is_rejected_with_envelope() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .route("/accept", web::post().to(echo_flag)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/accept")
            .set_json(serde_json::json!({ "accept_messages": "yes" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));

        let req = test::TestRequest::post()
            .uri("/accept")
            .set_json(serde_json::json!({ "accept_messages": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
