use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{HeaderMap, Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info_span, Span};

use super::server::HttpServer;
use crate::service::response::Response;

/// 自定义请求 ID 生成器
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(request_id.parse().ok()?))
    }
}

impl HttpServer {
    pub fn create_router(&self) -> Router {
        let service = self.user_service.clone();

        let router = Router::new()
            .route(
                "/health",
                get({
                    let service = service.clone();
                    move || async move { service.health().await }
                }),
            )
            .route(
                "/api/users",
                get({
                    let service = service.clone();
                    move || async move { service.list_users().await }
                })
                .post({
                    let service = service.clone();
                    move |headers: HeaderMap, body: Bytes| async move {
                        service.create_user(headers, body).await
                    }
                }),
            )
            .route(
                "/api/users/{id}",
                get({
                    let service = service.clone();
                    move |Path(id): Path<String>| async move { service.get_user(id).await }
                })
                .delete({
                    let service = service.clone();
                    move |Path(id): Path<String>| async move { service.delete_user(id).await }
                }),
            )
            .fallback(route_not_found)
            // 应用中间件层
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.cfg.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<_>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("");

                        info_span!(
                            "http_request",
                            "http.method" = %request.method(),
                            "http.route" = %request.uri().path(),
                            "request.id" = %request_id,
                        )
                    })
                    .on_request(|_request: &Request<_>, _span: &Span| {
                        tracing::info!("Processing HTTP request");
                    })
                    .on_response(
                        |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                            tracing::info!(
                                "http.response.status_code" = %response.status(),
                                duration_ms = %latency.as_millis(),
                                "HTTP request completed"
                            );
                        },
                    )
                    .on_failure(
                        |error: tower_http::classify::ServerErrorsFailureClass,
                         latency: Duration,
                         _span: &Span| {
                            tracing::error!(
                                error = %error,
                                duration_ms = %latency.as_millis(),
                                "HTTP request failed"
                            );
                        },
                    ),
            )
            // 最外层生成请求 ID，保证 span 能拿到
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        if self.cfg.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }
}

async fn route_not_found() -> (StatusCode, Json<Response>) {
    (
        StatusCode::NOT_FOUND,
        Json(Response::failed("Route not found")),
    )
}
