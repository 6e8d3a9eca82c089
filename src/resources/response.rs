//! Success envelopes shared by the API groups.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// `{"status": "success", "data": {<key>: <value>}}`
pub fn one(status: StatusCode, key: &str, value: impl Serialize) -> AppResult<Response> {
    let value = serde_json::to_value(value).map_err(AppError::unexpected)?;
    let mut data = serde_json::Map::new();
    data.insert(key.to_owned(), value);
    Ok((status, Json(json!({ "status": "success", "data": data }))).into_response())
}

/// `{"status": "success", "results": n, "data": {<key>: [..]}}`
pub fn many(key: &str, values: Vec<Value>) -> Response {
    let mut data = serde_json::Map::new();
    let results = values.len();
    data.insert(key.to_owned(), Value::Array(values));
    Json(json!({ "status": "success", "results": results, "data": data })).into_response()
}

/// Empty 204 reply to a delete.
pub fn deleted() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Serialize a list of records for the query engine.
pub fn to_values<T: Serialize>(records: &[T]) -> AppResult<Vec<Value>> {
    records
        .iter()
        .map(|record| serde_json::to_value(record).map_err(AppError::unexpected))
        .collect()
}

/// Parse an id taken from the URL.
pub fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("Invalid id: {raw}")))
}

/// Deserialize a request body into an input type.
pub fn parse_body<T: serde::de::DeserializeOwned>(body: &Value) -> AppResult<T> {
    serde_json::from_value(body.clone())
        .map_err(|err| AppError::bad_request(format!("Invalid input data. {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);

        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Invalid id: abc");
    }

    #[test]
    fn test_parse_body_reports_field() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Input {
            name: String,
        }

        let err = parse_body::<Input>(&json!({})).unwrap_err();
        assert!(err.client_message().starts_with("Invalid input data."));
        assert!(err.client_message().contains("name"));
    }
}
