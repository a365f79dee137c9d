use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static MESSAGES_DELIVERED: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_messages_delivered() {
    MESSAGES_DELIVERED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub messages_delivered_total: u64,
}

fn render(metrics: &MetricsResponse) -> String {
    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP 5xx responses\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n\
         \n\
         # HELP messages_delivered_total Anonymous messages stored\n\
         # TYPE messages_delivered_total counter\n\
         messages_delivered_total {}\n",
        metrics.http_requests_total, metrics.http_errors_total, metrics.messages_delivered_total
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String)
    )
)]
pub async fn get_metrics() -> HttpResponse {
    let metrics = MetricsResponse {
        http_requests_total: REQUEST_COUNT.load(Ordering::Relaxed),
        http_errors_total: ERROR_COUNT.load(Ordering::Relaxed),
        messages_delivered_total: MESSAGES_DELIVERED.load(Ordering::Relaxed),
    };

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render(&metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_exposition_format() {
        let text = render(&MetricsResponse {
            http_requests_total: 7,
            http_errors_total: 1,
            messages_delivered_total: 3,
        });
        assert!(text.contains("http_requests_total 7\n"));
        assert!(text.contains("http_errors_total 1\n"));
        assert!(text.contains("messages_delivered_total 3\n"));
    }
}
