//! JSON response decoding.
//!
//! Every MAAS endpoint answers with `application/json; charset=utf-8`. This
//! module checks the status and content type of a raw response and parses
//! the body.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::transport::RawResponse;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Decode a response body as JSON.
///
/// With `enforce_success`, a status of 400 or above fails with
/// `ClientError::Status` before the body is inspected. The media type is the
/// part of `content-type` before the first `;` and must be exactly
/// `application/json`; parameters such as `charset` are ignored.
///
/// # Errors
///
/// Returns `ClientError::Status` for a rejected status,
/// `ClientError::ContentType` when the media type is missing or not
/// `application/json`, and `ClientError::Json` when the body does not parse.
pub fn decode(response: &RawResponse, enforce_success: bool) -> Result<Value> {
    let status = response.status.as_u16();

    if enforce_success && !response.is_ok() {
        return Err(ClientError::Status {
            status,
            body: response.body.clone(),
        });
    }

    if !is_json_content_type(response.content_type()) {
        return Err(ClientError::ContentType {
            status,
            headers: response.headers.clone(),
            body: response.body.clone(),
        });
    }

    serde_json::from_str(&response.body).map_err(|_| ClientError::Json {
        status,
        headers: response.headers.clone(),
        body: response.body.clone(),
    })
}

/// Decode a response body into a typed value.
///
/// # Errors
///
/// Returns the errors of [`decode`], or `ClientError::UnexpectedResponse` if
/// the JSON does not match `T`.
pub fn decode_as<T: DeserializeOwned>(response: &RawResponse, enforce_success: bool) -> Result<T> {
    let value = decode(response, enforce_success)?;
    serde_json::from_value(value).map_err(|e| ClientError::UnexpectedResponse(e.to_string()))
}

/// Check the media type, ignoring parameters such as `charset`.
///
/// The comparison is exact: MAAS always sends the lowercase form, so a
/// differently spelled type means something other than the API answered.
fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|media_type| media_type == JSON_MEDIA_TYPE)
}
