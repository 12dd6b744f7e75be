// ===================================
// tests/integration/auth_flow_tests.rs
// ===================================
//! End-to-end auth flows through the HTTP router
use crate::test_utils::{flat_file_app, memory_app, send, test_settings, Call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_signup_login_validate_logout() {
    let app = memory_app(&test_settings());

    let (status, body) = send(
        &app,
        Call::post_json(
            "/api/auth/signup",
            json!({ "identifier": "drSmith", "secret": "pw123", "role": "doctor" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"], json!({ "identifier": "drsmith", "role": "doctor" }));
    assert!(body["token"].as_str().is_some());

    let (status, body) = send(
        &app,
        Call::post_json("/api/auth/login", json!({ "identifier": "drsmith", "secret": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["role"], "doctor");
    let token = body["token"].as_str().unwrap().to_string();

    for method in [Method::GET, Method::POST] {
        let (status, body) =
            send(&app, Call::with_bearer(method, "/api/auth/validate", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "identifier": "drsmith", "role": "doctor" }));
    }

    let (status, _) = send(&app, Call::with_bearer(Method::POST, "/api/auth/logout", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) =
        send(&app, Call::with_bearer(Method::GET, "/api/auth/validate", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_003");
}

#[tokio::test]
async fn test_legacy_field_names_are_accepted() {
    let app = memory_app(&test_settings());

    let (status, _) = send(
        &app,
        Call::post_json(
            "/api/auth/signup",
            json!({ "username": "alice", "password": "pw", "role": "user" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Call::post_json("/api/auth/login", json!({ "username": "ALICE", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], json!({ "identifier": "alice", "role": "user" }));
}

#[tokio::test]
async fn test_duplicate_signup_is_conflict() {
    let app = memory_app(&test_settings());
    let signup = |id: &'static str| {
        Call::post_json(
            "/api/auth/signup",
            json!({ "identifier": id, "secret": "pw", "role": "user" }),
        )
    };

    assert_eq!(send(&app, signup("bob")).await.0, StatusCode::CREATED);
    let (status, body) = send(&app, signup("BOB")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ACCT_001");
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let app = memory_app(&test_settings());

    let bodies = [
        json!({ "secret": "pw", "role": "user" }),
        json!({ "identifier": "carol", "role": "user" }),
        json!({ "identifier": "carol", "secret": "pw" }),
        json!({ "identifier": "carol", "secret": "pw", "role": "admin" }),
        json!({ "identifier": "", "secret": "pw", "role": "user" }),
        json!({ "identifier": "has space", "secret": "pw", "role": "user" }),
        json!({ "identifier": 42, "secret": "pw", "role": "user" }),
    ];
    for body in bodies {
        let (status, reply) = send(&app, Call::post_json("/api/auth/signup", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(reply["error"]["code"], "VAL_001");
    }

    let mut not_json = Call::post_json("/api/auth/login", json!({}));
    not_json.body = Some("{not json".to_string());
    let (status, reply) = send(&app, not_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_half_was_wrong() {
    let app = memory_app(&test_settings());
    send(
        &app,
        Call::post_json(
            "/api/auth/signup",
            json!({ "identifier": "dave", "secret": "right", "role": "user" }),
        ),
    )
    .await;

    let wrong_secret = send(
        &app,
        Call::post_json("/api/auth/login", json!({ "identifier": "dave", "secret": "wrong" })),
    )
    .await;
    let unknown_user = send(
        &app,
        Call::post_json("/api/auth/login", json!({ "identifier": "nobody", "secret": "wrong" })),
    )
    .await;

    assert_eq!(wrong_secret.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_secret, unknown_user);
}

#[tokio::test]
async fn test_validate_rejects_bad_tokens() {
    let app = memory_app(&test_settings());

    let well_formed_but_unknown = "A".repeat(43);
    for token in ["garbage", "a", well_formed_but_unknown.as_str()] {
        let (status, body) =
            send(&app, Call::with_bearer(Method::GET, "/api/auth/validate", token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_003");
    }

    let mut no_header = Call::with_bearer(Method::GET, "/api/auth/validate", "");
    no_header.bearer = None;
    let (status, _) = send(&app, no_header).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_repeated_failures_lock_out_the_address() {
    let mut settings = test_settings();
    settings.auth_rate_limit.max_attempts = 3;
    let app = memory_app(&settings);
    send(
        &app,
        Call::post_json(
            "/api/auth/signup",
            json!({ "identifier": "erin", "secret": "right", "role": "user" }),
        ),
    )
    .await;

    let attempt = |secret: &'static str, ip: &'static str| {
        Call::post_json("/api/auth/login", json!({ "identifier": "erin", "secret": secret }))
            .from_ip(ip)
    };

    for _ in 0..3 {
        let (status, _) = send(&app, attempt("wrong", "203.0.113.9")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // even the right secret is refused while locked out
    let (status, body) = send(&app, attempt("right", "203.0.113.9")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "AUTH_004");

    let (status, _) = send(&app, attempt("right", "203.0.113.10")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_flat_file_backend_persists_accounts() {
    let settings = test_settings();
    let (app, dir) = flat_file_app(&settings);

    let (status, _) = send(
        &app,
        Call::post_json(
            "/api/auth/signup",
            json!({ "identifier": "Frank", "secret": "pw", "role": "doctor" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(dir.path().join("users").join("frank.json").exists());

    let (status, body) = send(
        &app,
        Call::post_json("/api/auth/login", json!({ "identifier": "frank", "secret": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "doctor");
}

#[tokio::test]
async fn test_health() {
    let app = memory_app(&test_settings());
    let mut call = Call::with_bearer(Method::GET, "/health", "");
    call.bearer = None;
    let (status, body) = send(&app, call).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}
