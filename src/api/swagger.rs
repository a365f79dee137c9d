use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "True Feedback API",
        version = "1.0.0",
        description = "Anonymous feedback service. \n\n**Authentication:** inbox endpoints require a JWT Bearer token obtained from `/api/v1/auth/signin`.\n\nVisitors send messages to a username without signing in."
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::verify,
        crate::api::auth::resend_code,
        crate::api::auth::signin,
        crate::api::auth::session,

        // Users
        crate::api::users::check_username,
        crate::api::users::public_profile,

        // Messages
        crate::api::messages::send_message,
        crate::api::messages::get_messages,
        crate::api::messages::get_accept_messages,
        crate::api::messages::toggle_accept_messages,
        crate::api::messages::delete_message,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::VerifyRequest,
            crate::services::auth_service::ResendCodeRequest,
            crate::services::auth_service::SigninRequest,
            crate::services::auth_service::SigninResponse,
            crate::services::auth_service::SessionResponse,
            crate::services::message_service::SendMessageRequest,
            crate::services::message_service::AcceptMessagesRequest,
            crate::services::message_service::AcceptMessagesStatus,
            crate::services::message_service::MessageList,
            crate::models::SessionUser,
            crate::models::PublicProfile,
            crate::models::MessageView,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Signup, email verification and sessions."),
        (name = "Users", description = "Username availability and public profiles."),
        (name = "Messages", description = "Anonymous messages and the inbox of the signed-in user."),
        (name = "Health", description = "Health check and metrics."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/v1/auth/signin"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_inbox_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/messages"));
        assert!(doc.paths.paths.contains_key("/api/v1/messages/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/auth/signin"));
    }
}
