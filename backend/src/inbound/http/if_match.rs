//! `ETag` issuing and `If-Match` checking for optimistic updates.
//!
//! Reads by id attach the signed [`ResourceTag`] of the entity as a quoted
//! `ETag`. Updates must send it back in `If-Match`; the header is verified
//! with the same signer and compared with the tag of the payload.

use actix_web::http::header::{ETAG, IF_MATCH};
use actix_web::{HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::ResourceSigner;
use crate::domain::{Error, ResourceTag};

fn quote(signed: &str) -> String {
    format!("\"{signed}\"")
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
}

/// `200 OK` with `body` and the signed tag as `ETag`.
pub(crate) fn tagged_json<T: Serialize>(
    signer: &dyn ResourceSigner,
    tag: &ResourceTag,
    body: &T,
) -> Result<HttpResponse, Error> {
    let signed = signer.sign(tag).map_err(|err| {
        Error::internal(format!("failed to sign entity tag: {err}"))
    })?;
    Ok(HttpResponse::Ok()
        .insert_header((ETAG, quote(&signed)))
        .json(body))
}

/// Check the request's `If-Match` against the tag of the entity being updated.
///
/// A missing header is a bad request; a header that fails verification or
/// names another entity is a failed precondition.
pub(crate) fn require_if_match(
    req: &HttpRequest,
    signer: &dyn ResourceSigner,
    expected: &ResourceTag,
) -> Result<(), Error> {
    let raw = req
        .headers()
        .get(IF_MATCH)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            Error::invalid_request("If-Match header is required").with_details(json!({
                "field": "If-Match",
                "code": "missing_if_match",
            }))
        })?;

    let presented = signer.verify(unquote(raw)).map_err(|err| {
        debug!(error = %err, "entity tag rejected");
        Error::precondition_failed("entity tag is not valid")
    })?;
    if &presented != expected {
        debug!(%presented, %expected, "entity tag mismatch");
        return Err(Error::precondition_failed(
            "entity tag does not match the submitted resource",
        ));
    }
    Ok(())
}
