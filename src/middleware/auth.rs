use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::config::AppConfig;
use crate::models::ApiResponse;
use crate::services::auth_service;

/// Rejects requests without a valid bearer token. On success the decoded
/// `Claims` are available to handlers through `web::ReqData<Claims>`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match (req.app_data::<web::Data<AppConfig>>(), bearer_token(&req)) {
            (Some(config), Some(token)) => auth_service::verify_token(token, &config.jwt),
            (None, _) => {
                log::error!("❌ AppConfig missing from app data");
                Err(crate::utils::AppError::Internal("AppConfig missing".to_string()))
            }
            (_, None) => Err(crate::utils::AppError::Unauthorized(
                "Missing authorization token".to_string(),
            )),
        };

        match claims {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                let response = HttpResponse::Unauthorized().json(ApiResponse::failure("Unauthorized"));
                let (request, _) = req.into_parts();
                Box::pin(async move {
                    Ok(ServiceResponse::new(request, response).map_into_right_body())
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::models::sample_user;
    use crate::services::auth_service::Claims;
    use actix_web::{http::StatusCode, test, App};

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.username.clone())
    }

    macro_rules! protected_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(test_config()))
                    .service(
                        web::scope("/private")
                            .wrap(AuthMiddleware)
                            .route("", web::get().to(whoami)),
                    ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let app = protected_app!();
        let req = test::TestRequest::get().uri("/private").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Unauthorized");
    }

    #[actix_web::test]
    async fn test_garbage_token_is_unauthorized() {
        let app = protected_app!();
        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler_with_claims() {
        let app = protected_app!();
        let (token, _) = auth_service::generate_jwt(&sample_user(), &test_config().jwt).unwrap();

        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        assert_eq!(body, "jane");
    }
}
