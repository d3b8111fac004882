//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{auth_guard, get_log_out, post_log_in, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    health::get_health,
    logging::logging_middleware,
    profile::{get_profile_endpoint, update_profile_endpoint},
    record::{
        RecordKind, RecordState, create_record_endpoint, delete_record_endpoint,
        list_records_endpoint, update_record_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::HEALTH, get(get_health));

    let protected_routes = RecordKind::ALL
        .into_iter()
        .fold(
            Router::new()
                .route(
                    endpoints::CATEGORIES,
                    get(list_categories_endpoint).post(create_category_endpoint),
                )
                .route(
                    endpoints::CATEGORY,
                    put(update_category_endpoint).delete(delete_category_endpoint),
                )
                .route(
                    endpoints::PROFILE,
                    get(get_profile_endpoint).put(update_profile_endpoint),
                ),
            |router, kind| router.merge(record_routes(kind, &state)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The list, create, update and delete routes for one kind of record.
fn record_routes(kind: RecordKind, state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            kind.collection_path(),
            get(list_records_endpoint).post(create_record_endpoint),
        )
        .route(
            kind.item_path(),
            put(update_record_endpoint).delete(delete_record_endpoint),
        )
        .with_state(RecordState::new(kind, state))
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "the requested resource does not exist" })),
    )
        .into_response()
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{AppState, auth::COOKIE_TOKEN, endpoints, endpoints::format_endpoint};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let mut state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            std::time::Duration::from_secs(5),
        )
        .unwrap();
        state.password_hash_cost = 4;

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    async fn register_and_log_in(server: &TestServer, username: &str) -> Cookie<'static> {
        server
            .post(endpoints::USERS)
            .json(&json!({
                "name": username,
                "username": username,
                "password": "averysafeandsecurepassword"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({"username": username, "password": "averysafeandsecurepassword"}))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    #[tokio::test]
    async fn income_round_trips_through_the_api() {
        let server = get_test_server();
        let cookie = register_and_log_in(&server, "alice").await;

        let category: Value = server
            .post(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .json(&json!({"name": "Salary", "type": "Income"}))
            .await
            .json();
        let created = server
            .post(endpoints::INCOMES)
            .add_cookie(cookie.clone())
            .json(&json!({
                "name": "March pay",
                "amount": "1234.50",
                "category": category["id"],
                "date": "15/03/2024"
            }))
            .await;
        created.assert_status(StatusCode::CREATED);

        let incomes: Vec<Value> = server
            .get(endpoints::INCOMES)
            .add_cookie(cookie)
            .await
            .json();

        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0]["amount"], "1234.50");
        assert_eq!(incomes[0]["date"], "15/03/2024");
        assert_eq!(incomes[0]["category"], category["id"]);
    }

    #[tokio::test]
    async fn users_only_see_their_own_records() {
        let server = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;
        let category: Value = server
            .post(endpoints::CATEGORIES)
            .add_cookie(alice.clone())
            .json(&json!({"name": "Groceries", "type": "Expense"}))
            .await
            .json();
        let record: Value = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(alice)
            .json(&json!({
                "name": "Milk",
                "amount": "3.50",
                "category": category["id"],
                "date": "01/02/2024"
            }))
            .await
            .json();

        let listed: Vec<Value> = server
            .get(endpoints::TRANSACTIONS)
            .add_cookie(bob.clone())
            .await
            .json();
        let deleted = server
            .delete(&format_endpoint(
                endpoints::TRANSACTION,
                record["id"].as_i64().unwrap(),
            ))
            .add_cookie(bob)
            .await;

        assert!(listed.is_empty());
        deleted.assert_status_not_found();
    }

    #[tokio::test]
    async fn protected_routes_require_log_in() {
        let server = get_test_server();

        for path in [
            endpoints::PROFILE,
            endpoints::CATEGORIES,
            endpoints::TRANSACTIONS,
            endpoints::INCOMES,
            endpoints::INVESTMENTS,
        ] {
            server.get(path).await.assert_status_unauthorized();
        }
    }

    #[tokio::test]
    async fn log_out_clears_cookie() {
        let server = get_test_server();
        register_and_log_in(&server, "alice").await;

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(
            response.cookie(COOKIE_TOKEN).max_age(),
            Some(time::Duration::ZERO)
        );
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").await;

        response.assert_status_not_found();
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn health_does_not_require_log_in() {
        let server = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "up");
    }

    #[tokio::test]
    async fn profile_belongs_to_logged_in_user() {
        let server = get_test_server();
        let alice = register_and_log_in(&server, "alice").await;
        let bob = register_and_log_in(&server, "bob").await;

        server
            .put(endpoints::PROFILE)
            .add_cookie(alice.clone())
            .json(&json!({"name": "Alice Smith", "image": "alice.png"}))
            .await
            .assert_status_ok();

        let alice_profile: Value = server.get(endpoints::PROFILE).add_cookie(alice).await.json();
        let bob_profile: Value = server.get(endpoints::PROFILE).add_cookie(bob).await.json();
        assert_eq!(alice_profile["name"], "Alice Smith");
        assert_eq!(alice_profile["image"], "alice.png");
        assert_eq!(bob_profile["username"], "bob");
        assert_eq!(bob_profile["name"], "bob");
        assert_eq!(bob_profile["image"], Value::Null);
    }
}
