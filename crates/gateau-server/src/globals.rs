//! Builds a request from CGI-style process variables.
//!
//! | Variable          | Becomes                           |
//! |-------------------|-----------------------------------|
//! | `REQUEST_METHOD`  | the method, `GET` when unset      |
//! | `REQUEST_URI`     | the URI, `/` when unset           |
//! | `QUERY_STRING`    | appended when the URI has no `?`  |
//! | `HTTP_*`          | headers, `HTTP_X_API_KEY` → `x-api-key` |
//! | `CONTENT_TYPE`    | `content-type`                    |
//! | `CONTENT_LENGTH`  | `content-length`                  |
//!
//! The body is left empty. Variables whose name or value is not valid
//! UTF-8 are skipped.

use gateau_core::{build_request, GateauResult, Request};
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use std::ffi::OsStr;

/// Builds a request from the current process environment.
pub fn request_from_env() -> GateauResult<Request> {
    request_from_vars(std::env::vars_os())
}

/// Builds a request from `vars`, a list of CGI-style name/value pairs.
///
/// Variables that are not valid UTF-8, or that do not form a valid header,
/// are skipped.
///
/// # Example
///
/// ```
/// use gateau_server::request_from_vars;
///
/// let request = request_from_vars([
///     ("REQUEST_METHOD".to_string(), "POST".to_string()),
///     ("REQUEST_URI".to_string(), "/articles".to_string()),
///     ("HTTP_ACCEPT".to_string(), "application/json".to_string()),
/// ])
/// .unwrap();
///
/// assert_eq!(request.method(), "POST");
/// assert_eq!(request.headers()["accept"], "application/json");
/// ```
pub fn request_from_vars<I, K, V>(vars: I) -> GateauResult<Request>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut method = None;
    let mut uri = None;
    let mut query = None;
    let mut headers = Vec::new();

    for (key, value) in vars {
        let (Some(key), Some(value)) = (key.as_ref().to_str(), value.as_ref().to_str()) else {
            tracing::debug!(
                variable = %key.as_ref().to_string_lossy(),
                "skipping variable that is not valid UTF-8"
            );
            continue;
        };
        let value = value.to_string();

        match key {
            "REQUEST_METHOD" => method = Some(value),
            "REQUEST_URI" => uri = Some(value),
            "QUERY_STRING" => query = Some(value),
            "CONTENT_TYPE" => headers.push((CONTENT_TYPE, value)),
            "CONTENT_LENGTH" => headers.push((CONTENT_LENGTH, value)),
            _ => {
                if let Some(name) = key.strip_prefix("HTTP_").and_then(header_name) {
                    headers.push((name, value));
                }
            }
        }
    }

    let method = method.filter(|m| !m.is_empty()).unwrap_or_else(|| "GET".to_string());
    let mut uri = uri.filter(|u| !u.is_empty()).unwrap_or_else(|| "/".to_string());
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        if !uri.contains('?') {
            uri.push('?');
            uri.push_str(&query);
        }
    }

    let mut request = build_request(&method, &uri)?;
    for (name, value) in headers {
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                request.headers_mut().append(name, value);
            }
            Err(_) => tracing::debug!(header = %name, "skipping header with invalid value"),
        }
    }
    Ok(request)
}

/// `ACCEPT_LANGUAGE` becomes `accept-language`.
fn header_name(suffix: &str) -> Option<HeaderName> {
    let name = suffix.to_ascii_lowercase().replace('_', "-");
    HeaderName::from_bytes(name.as_bytes()).ok()
}
