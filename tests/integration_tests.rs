//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client config → HTTP request → decoded records

use futures::TryStreamExt;
use lila_client::models::{GAME, USER};
use lila_client::{
    Client, ClientConfig, Error, Format, Method, Params, Request, Session, LIJSON, NDJSON, PGN,
    TEXT,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> Client {
    let config = ClientConfig::default()
        .with_base_url(mock_server.uri())
        .with_tablebase_url(format!("{}/tablebase/", mock_server.uri()))
        .with_explorer_url(format!("{}/explorer/", mock_server.uri()));
    Client::with_config(&config).unwrap()
}

// ============================================================================
// Game Export Tests
// ============================================================================

#[tokio::test]
async fn test_export_games_as_pgn_stream() {
    let mock_server = MockServer::start().await;
    let body = concat!(
        "[Event \"Rated Blitz game\"]\n[White \"bobby\"]\n[Black \"magnus\"]\n\n",
        "1. e4 e5 2. Nf3 Nc6 1-0\n\n\n",
        "[Event \"Casual Rapid game\"]\n[White \"magnus\"]\n[Black \"bobby\"]\n\n",
        "1. d4 d5 2. c4 1/2-1/2\n\n\n",
    );

    Mock::given(method("GET"))
        .and(path("/api/games/user/bobby"))
        .and(header("Accept", "application/x-chess-pgn"))
        .and(query_param("max", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-chess-pgn"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_eq!(client.game_format(Some(true)), Format::Pgn);

    let games: Vec<String> = client
        .api()
        .get(
            "/api/games/user/bobby",
            Request::with_format(PGN).stream().param("max", 2),
        )
        .await
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(games.len(), 2);
    assert!(games[0].starts_with("[Event \"Rated Blitz game\"]"));
    assert!(games[0].ends_with("1. e4 e5 2. Nf3 Nc6 1-0"));
    assert!(games[1].contains("[White \"magnus\"]\n[Black \"bobby\"]\n\n1. d4"));
}

#[tokio::test]
async fn test_export_games_as_ndjson_with_converter() {
    let mock_server = MockServer::start().await;
    let body = concat!(
        "{\"id\":\"q7ZvsdUF\",\"rated\":true,\"createdAt\":1514505150384,\"lastMoveAt\":1514505592843}\n",
        "{\"id\":\"Qa7FJNk2\",\"rated\":false,\"createdAt\":1514505150384}\n",
    );

    Mock::given(method("GET"))
        .and(path("/api/games/user/bobby"))
        .and(header("Accept", "application/x-ndjson"))
        .and(query_param("pgnInJson", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_eq!(client.game_format(None), Format::Ndjson);

    let mut games = client
        .api()
        .fetch_stream(
            Method::GET,
            "/api/games/user/bobby",
            Request::with_format(NDJSON)
                .param("pgnInJson", false)
                .converter(GAME.converter()),
        )
        .await
        .unwrap();

    let first = games.try_next().await.unwrap().unwrap();
    assert_eq!(first["id"], "q7ZvsdUF");
    assert_eq!(first["createdAt"], "2017-12-28T23:52:30.384Z");
    assert_eq!(first["lastMoveAt"], "2017-12-28T23:59:52.843Z");

    let second = games.try_next().await.unwrap().unwrap();
    assert_eq!(second["rated"], false);
    assert!(second.get("lastMoveAt").is_none());

    assert!(games.try_next().await.unwrap().is_none());
}

// ============================================================================
// Service Routing Tests
// ============================================================================

#[tokio::test]
async fn test_tablebase_and_explorer_use_their_base_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tablebase/standard"))
        .and(query_param("fen", "4k3/6KP/8/8/8/8/7p/8 w - - 0 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"category": "win"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/explorer/masters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"white": 10, "draws": 5})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let position = client
        .tablebase()
        .fetch(
            Method::GET,
            "standard",
            Request::new().param("fen", "4k3/6KP/8/8/8/8/7p/8 w - - 0 1"),
        )
        .await
        .unwrap();
    assert_eq!(position["category"], "win");

    let masters = client
        .explorer()
        .fetch(Method::GET, "masters", Request::new())
        .await
        .unwrap();
    assert_eq!(masters["white"], 10);
}

#[tokio::test]
async fn test_users_by_id_with_vendor_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(header("Accept", "application/vnd.lichess.v3+json"))
        .and(body_string("thibault,bobby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "thibault", "createdAt": 1_290_415_680_000_i64},
            {"id": "bobby", "createdAt": 0}
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let users = client
        .api()
        .fetch(
            Method::POST,
            "/api/users",
            Request::with_format(LIJSON)
                .text("thibault,bobby")
                .converter(USER.converter()),
        )
        .await
        .unwrap();

    assert_eq!(users[0]["createdAt"], "2010-11-22T08:48:00.000Z");
    assert_eq!(users[1]["createdAt"], "1970-01-01T00:00:00.000Z");
}

// ============================================================================
// Authentication and Error Tests
// ============================================================================

#[tokio::test]
async fn test_token_shared_across_services() {
    let mock_server = MockServer::start().await;

    Mock::given(header("Authorization", "Bearer lip_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(mock_server.uri())
        .with_tablebase_url(mock_server.uri())
        .with_token("lip_abc");
    let client = Client::with_config(&config).unwrap();
    assert!(client.session().is_authenticated());

    let a = client
        .api()
        .fetch(Method::GET, "/api/account", Request::with_format(TEXT))
        .await
        .unwrap();
    let b = client
        .tablebase()
        .fetch(Method::GET, "/standard", Request::with_format(TEXT))
        .await
        .unwrap();
    assert_eq!((a.as_str(), b.as_str()), ("ok", "ok"));
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user/nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not found"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .api()
        .get("/api/user/nobody", Request::new())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match &err {
        Error::Response(e) => {
            assert_eq!(e.reason(), "Not Found");
            assert_eq!(e.cause(), Some(&json!({"error": "Not found"})));
        }
        other => panic!("expected an error response, got {other:?}"),
    }
    assert_eq!(err.to_string(), r#"HTTP 404: Not Found: {"error":"Not found"}"#);
}

#[tokio::test]
async fn test_stream_error_status_raised_before_iteration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/stream/games-by-users"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = Client::with_session(
        Session::new(),
        &ClientConfig::default().with_base_url(mock_server.uri()),
    )
    .unwrap();

    let result = client
        .api()
        .post(
            "/api/stream/games-by-users",
            Request::with_format(NDJSON)
                .stream()
                .form(Params::new().with("users", "bobby,magnus")),
        )
        .await;

    match result {
        Err(e) => assert_eq!(e.status_code(), Some(429)),
        Ok(reply) => panic!("expected an error status, got {reply:?}"),
    }
}

#[tokio::test]
async fn test_bad_ndjson_line_surfaces_after_good_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stream/event"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"type\":\"gameStart\"}\n{oops\n", "application/x-ndjson"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut events = client
        .api()
        .get("/api/stream/event", Request::with_format(NDJSON).stream())
        .await
        .unwrap()
        .into_stream();

    let first: Value = events.try_next().await.unwrap().unwrap();
    assert_eq!(first["type"], "gameStart");

    let err = events.try_next().await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("line 2"));
}
