//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("staff only"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::precondition_failed("stale"), StatusCode::PRECONDITION_FAILED)]
#[case(Error::service_unavailable("broker down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn body_of(error: &Error) -> (Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let payload = serde_json::from_slice(&bytes).expect("error payload");
    (trace_header, payload)
}

#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id() {
    let error = Error::internal("database password is hunter2")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "secret": "x" }));

    let (trace_header, payload) = body_of(&error).await;

    assert_eq!(trace_header.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[actix_web::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::conflict("login moviegoer is already taken")
        .with_details(json!({ "field": "login", "code": "duplicate_login" }));

    let (trace_header, payload) = body_of(&error).await;

    assert!(trace_header.is_none());
    assert_eq!(payload, error);
}

#[actix_web::test]
async fn unauthorized_responses_carry_a_bearer_challenge() {
    let response = ResponseError::error_response(&Error::unauthorized("token expired"));

    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|value| value.to_str().ok());
    assert_eq!(challenge, Some("Bearer realm=\"cinema\""));
}

#[actix_web::test]
async fn malformed_json_bodies_become_invalid_requests() {
    use actix_web::{test, web, App, HttpResponse};

    async fn echo(body: web::Json<serde_json::Value>) -> HttpResponse {
        HttpResponse::Ok().json(body.into_inner())
    }

    let app = test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/echo", web::post().to(echo)),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/echo")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"login\":")
        .to_request();

    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload: Error = test::read_body_json(res).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        payload.details().and_then(|details| details.get("code")),
        Some(&json!("malformed_body"))
    );
}
