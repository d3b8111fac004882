//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// The number of characters of a body that is logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED_FIELDS: [&str; 1] = ["password"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords in JSON request bodies are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };
    let body_text = redact_json_fields(&String::from_utf8_lossy(&body_bytes));
    log_body(&format!("Received request: {parts:#?}"), &body_text);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };
    log_body(
        &format!("Sending response: {parts:#?}"),
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, Error> {
    axum::body::to_bytes(body, usize::MAX).await.map_err(|error| {
        tracing::error!("could not read body for logging: {error}");
        Error::Internal(error.to_string())
    })
}

/// Replace the value of any top-level sensitive field in a JSON object.
///
/// Bodies that are not JSON objects are returned unchanged.
fn redact_json_fields(body_text: &str) -> String {
    let mut value = match serde_json::from_str::<Value>(body_text) {
        Ok(Value::Object(map)) => map,
        _ => return body_text.to_owned(),
    };

    let mut redacted = false;
    for field in REDACTED_FIELDS {
        if let Some(field_value) = value.get_mut(field) {
            *field_value = Value::String("********".to_owned());
            redacted = true;
        }
    }

    if redacted {
        Value::Object(value).to_string()
    } else {
        body_text.to_owned()
    }
}

fn log_body(message: &str, body: &str) {
    match body.char_indices().nth(LOG_BODY_LENGTH_LIMIT) {
        Some((end, _)) => {
            tracing::info!("{message}\nbody: {}...", &body[..end]);
            tracing::debug!("Full body: {body:?}");
        }
        None => tracing::info!("{message}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod logging_tests {
    use axum::{Json, Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{logging_middleware, redact_json_fields};

    #[test]
    fn redacts_password_field() {
        let body = r#"{"username":"alice","password":"hunter2"}"#;

        let redacted: Value = serde_json::from_str(&redact_json_fields(body)).unwrap();

        assert_eq!(
            redacted,
            json!({"username": "alice", "password": "********"})
        );
    }

    #[test]
    fn leaves_other_bodies_unchanged() {
        for body in [r#"{"name":"Salary"}"#, "not json", "", "[1,2,3]"] {
            assert_eq!(redact_json_fields(body), body);
        }
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        async fn echo(Json(body): Json<Value>) -> Json<Value> {
            Json(body)
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).unwrap();
        let body = json!({"password": "hunter2", "note": "é".repeat(100)});

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }
}
