//! Request id assignment
//!
//! Every request is tagged with an id taken from `x-request-id` or freshly
//! generated. The id is stored in a [`RequestContext`] request extension,
//! written into error bodies and copied onto the response headers.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use wsp_core::RequestContext;

use crate::error::{render_error, ErrorBody};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn incoming_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
}

pub async fn request_context(mut request: Request, next: Next) -> Response {
    let request_id = incoming_request_id(&request).unwrap_or_else(new_request_id);

    request
        .extensions_mut()
        .insert(RequestContext::new(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let response = next.run(request).instrument(span).await;

    // Error bodies are rendered before the id is known to the handler
    let mut response = match response.extensions().get::<ErrorBody>().cloned() {
        Some(body) => render_error(response.status(), body, request_id.clone()),
        None => response,
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, value);
    }
    response
}
