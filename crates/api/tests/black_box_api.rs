//! Black-box HTTP tests: spawn the real router on an ephemeral port and
//! drive it with `reqwest`, exactly as an external client would (spec §8).

use std::sync::Arc;
use std::time::Duration;

use apiv2_api::{build_app_with_validator, AppState};
use apiv2_auth::{JwksCache, JwksJwtValidator, JwtValidator, StaticKeySource};
use apiv2_core::AppConfig;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, PublicKeyUse, RSAKeyParameters, RSAKeyType,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;

// Throwaway 2048-bit test-only keypair; never used outside this module.
const TEST_PRIVATE_KEY_PEM: &str = include_str!("fixtures/test_key_pkcs1.pem");
const TEST_N: &str = "_NpSfq4RSo5N1ZljIrtTjQbKrh0-l8kfGtuzfHt6DD7Gx4_y2-W9YPdFZ2IT_OPS2p7XPd5S-EG2sIutY48tJVbgcF-JIvyg3vSwnfvFYTouzh0f4B-4l02tm_CpGvj9F9EaV6s6T6vyCokE2bufuI3KO8rOhZwpE7vO4PIuocZ788MMBP5FCEaGFdkhwjGp-pFtaOCAdWC_tLLLghXniLPAnWymwk7RNpBmL3MhEdF7OSrosFMvCb1jociPhmMs6t63Y5BOA4tbry7QDxDkIE3Yb9yZ16R91Jz2ijYZSCFVaz0XKrSAZf299jtCcJbOkHnnwsjrIPUz-L-s7kq9mw";
const TEST_E: &str = "AQAB";
const TEST_KID: &str = "test-key";

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    iss: &'a str,
    aud: &'a str,
    exp: i64,
    role: &'a str,
}

fn mint(config: &AppConfig, user_id: &str, role: &str) -> String {
    let claims = TestClaims { sub: user_id, iss: &config.user_pool_issuer, aud: &config.client_id, exp: 9_999_999_999, role };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY_PEM.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, &claims, &key).unwrap()
}

fn test_validator() -> Arc<dyn JwtValidator> {
    let jwk = Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_operations: None,
            key_algorithm: None,
            key_id: Some(TEST_KID.to_string()),
            x509_url: None,
            x509_chain: None,
            x509_sha1_fingerprint: None,
            x509_sha256_fingerprint: None,
        },
        algorithm: AlgorithmParameters::RSA(RSAKeyParameters { key_type: RSAKeyType::RSA, n: TEST_N.to_string(), e: TEST_E.to_string() }),
    };
    let set = JwkSet { keys: vec![jwk] };
    let cache = JwksCache::new(StaticKeySource(set), Duration::from_secs(60));
    let config = AppConfig::for_tests();
    Arc::new(JwksJwtValidator::new(config.user_pool_issuer, config.client_id, Arc::new(cache)))
}

struct TestServer {
    base_url: String,
    config: AppConfig,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig::for_tests();
        let state = AppState::in_memory(&config);
        let app = build_app_with_validator(&config, state, test_validator());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, config, handle }
    }

    fn token(&self, user_id: &str, role: &str) -> String {
        mint(&self.config, user_id, role)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_check_is_unauthenticated() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client.get(srv.url("/apiv2/internal/documents/doc1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["title"], "UnauthorizedError");
}

#[tokio::test]
async fn non_admin_is_forbidden_from_internal_routes() {
    let srv = TestServer::spawn().await;
    let token = srv.token("u1", "user");
    let client = reqwest::Client::new();
    let res = client.get(srv.url("/apiv2/internal/documents/doc1")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_then_get_document_round_trips_with_etag() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    let create_res = client
        .post(srv.url("/apiv2/internal/documents"))
        .bearer_auth(&token)
        .json(&json!({"id": "doc1", "data": {"title": "hello"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(create_res.status(), StatusCode::CREATED);
    assert!(create_res.headers().get(reqwest::header::LOCATION).is_some());
    let etag = create_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let get_res =
        client.get(srv.url("/apiv2/internal/documents/doc1")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(get_res.status(), StatusCode::OK);
    let body: serde_json::Value = get_res.json().await.unwrap();
    assert_eq!(body["data"]["title"], "hello");

    let not_modified = client
        .get(srv.url("/apiv2/internal/documents/doc1"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_NONE_MATCH, &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(not_modified.status(), StatusCode::NOT_MODIFIED);
    let not_modified_etag =
        not_modified.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();
    assert_eq!(not_modified_etag, etag);
}

#[tokio::test]
async fn create_duplicate_document_is_conflict() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    let body = json!({"id": "dup1", "data": {}});
    let first = client.post(srv.url("/apiv2/internal/documents")).bearer_auth(&token).json(&body).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(srv.url("/apiv2/internal/documents")).bearer_auth(&token).json(&body).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stale_if_match_is_rejected_then_correct_etag_succeeds() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    let create_res = client
        .post(srv.url("/apiv2/internal/documents"))
        .bearer_auth(&token)
        .json(&json!({"id": "doc2", "data": {"v": 1}}))
        .send()
        .await
        .unwrap();
    let etag = create_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let stale = client
        .put(srv.url("/apiv2/internal/documents/doc2"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, "\"not-the-real-etag\"")
        .json(&json!({"data": {"v": 2}}))
        .send()
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::PRECONDITION_FAILED);

    let fresh = client
        .put(srv.url("/apiv2/internal/documents/doc2"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, &etag)
        .json(&json!({"data": {"v": 2}}))
        .send()
        .await
        .unwrap();
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[tokio::test]
async fn users_list_returns_names_shape() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    for (id, name) in [("alice", "Alice"), ("bob", "Bob")] {
        let res = client
            .post(srv.url("/apiv2/internal/users"))
            .bearer_auth(&token)
            .json(&json!({"id": id, "name": name, "externalId": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let list_res = client.get(srv.url("/apiv2/internal/users")).bearer_auth(&token).send().await.unwrap();
    assert_eq!(list_res.status(), StatusCode::OK);
    let body: serde_json::Value = list_res.json().await.unwrap();
    let names = body["names"].as_array().unwrap();
    assert_eq!(names.len(), 2);
    assert!(body.get("items").is_none());

    let filtered_res = client
        .get(srv.url("/apiv2/internal/users?prefix=ali"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(filtered_res.status(), StatusCode::OK);
    let filtered_body: serde_json::Value = filtered_res.json().await.unwrap();
    assert_eq!(filtered_body["names"].as_array().unwrap(), &[json!("alice")]);
}

#[tokio::test]
async fn duplicate_user_id_is_conflict() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    let payload = json!({"id": "carol", "name": "Carol", "externalId": 9});
    let first = client.post(srv.url("/apiv2/internal/users")).bearer_auth(&token).json(&payload).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client.post(srv.url("/apiv2/internal/users")).bearer_auth(&token).json(&payload).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn external_me_reflects_the_caller_own_profile() {
    let srv = TestServer::spawn().await;
    let admin_token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    client
        .post(srv.url("/apiv2/internal/users"))
        .bearer_auth(&admin_token)
        .json(&json!({"id": "self1", "name": "Selfie", "externalId": 42}))
        .send()
        .await
        .unwrap();

    let self_token = srv.token("self1", "user");
    let res = client.get(srv.url("/apiv2/external/me")).bearer_auth(&self_token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], "self1");
    assert_eq!(body["name"], "Selfie");
}

#[tokio::test]
async fn game_round_and_move_flow_then_finish() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();

    let create_res = client
        .post(srv.url("/apiv2/internal/games"))
        .bearer_auth(&token)
        .json(&json!({"id": "game1", "type": "chess", "usersIds": ["alice"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(create_res.status(), StatusCode::CREATED);
    let game_etag = create_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let round_res = client
        .post(srv.url("/apiv2/internal/games/game1/rounds"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, &game_etag)
        .json(&json!({"id": "round1", "time": 0.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(round_res.status(), StatusCode::CREATED);

    let get_res = client.get(srv.url("/apiv2/internal/games/game1")).bearer_auth(&token).send().await.unwrap();
    let round_etag = get_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let move_res = client
        .post(srv.url("/apiv2/internal/games/game1/rounds/round1/moves"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, &round_etag)
        .json(&json!({"id": "move1", "userId": "alice", "value": 3.5, "valueDecorated": "3.5pts"}))
        .send()
        .await
        .unwrap();
    assert_eq!(move_res.status(), StatusCode::CREATED);

    let get_res = client.get(srv.url("/apiv2/internal/games/game1")).bearer_auth(&token).send().await.unwrap();
    let move_etag = get_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let finish_round_res = client
        .patch(srv.url("/apiv2/internal/games/game1/rounds/round1/finish"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, &move_etag)
        .send()
        .await
        .unwrap();
    assert_eq!(finish_round_res.status(), StatusCode::OK);
    let finish_round_etag =
        finish_round_res.headers().get(reqwest::header::ETAG).unwrap().to_str().unwrap().to_string();

    let finish_game_res = client
        .patch(srv.url("/apiv2/internal/games/game1/finish"))
        .bearer_auth(&token)
        .header(reqwest::header::IF_MATCH, &finish_round_etag)
        .send()
        .await
        .unwrap();
    assert_eq!(finish_game_res.status(), StatusCode::OK);
    let body: serde_json::Value = finish_game_res.json().await.unwrap();
    assert_eq!(body["isFinished"], true);

    let reopen = client
        .post(srv.url("/apiv2/internal/games/game1/rounds"))
        .bearer_auth(&token)
        .json(&json!({"id": "round2", "time": 0.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(reopen.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cors_preflight_is_answered_without_authentication() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let res = client.request(reqwest::Method::OPTIONS, srv.url("/apiv2/internal/documents")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.headers().get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
}

#[tokio::test]
async fn non_json_content_type_is_rejected() {
    let srv = TestServer::spawn().await;
    let token = srv.token("admin1", "admin");
    let client = reqwest::Client::new();
    let res = client
        .post(srv.url("/apiv2/internal/documents"))
        .bearer_auth(&token)
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body("{\"id\": \"x\", \"data\": {}}")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
