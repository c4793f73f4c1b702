use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Propagates an `x-request-id` header through the request and response.
///
/// A caller-supplied id is reused verbatim; a blank or missing one is
/// replaced with a fresh UUID. The same header value is stamped on both
/// sides so downstream layers and the client observe one id.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|value| !value.as_bytes().is_empty())
        .cloned()
        .unwrap_or_else(new_request_id);

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}

fn new_request_id() -> HeaderValue {
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_header_values() {
        let value = new_request_id();
        let text = value.to_str().unwrap();
        assert_eq!(text.len(), 36);
        assert!(Uuid::parse_str(text).is_ok());
    }
}
