#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_keycloak::{
	_preludet::*,
	error::EncryptionError,
	jsonwebtoken::{self, Algorithm, EncodingKey, Header},
	provider::Keycloak,
};

const SHARED_SECRET: &str = "userinfo-hmac-secret";

fn encrypted_keycloak(base_url: &str) -> Keycloak {
	Keycloak::builder()
		.auth_server_url(base_url)
		.realm(TEST_REALM)
		.encryption_algorithm("HS256")
		.encryption_key(SHARED_SECRET)
		.build()
		.expect("Encrypted Keycloak resolver should build successfully.")
}

fn signed_claims(claims: &Value) -> String {
	jsonwebtoken::encode(
		&Header::new(Algorithm::HS256),
		claims,
		&EncodingKey::from_secret(SHARED_SECRET.as_bytes()),
	)
	.expect("Userinfo fixture token should encode.")
}

#[tokio::test]
async fn userinfo_json_becomes_resource_owner() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(realm_path("userinfo"))
				.header("authorization", "Bearer access-1");
			then.status(200).header("content-type", "application/json").body(
				"{\"sub\":\"4c2f\",\"name\":\"Jane Doe\",\"email\":\"jane@example.com\",\"preferred_username\":\"jane\"}",
			);
		})
		.await;
	let owner =
		client.get_resource_owner("access-1").await.expect("Userinfo lookup should succeed.");

	mock.assert_async().await;

	assert_eq!(owner.id(), Some("4c2f"));
	assert_eq!(owner.name(), Some("Jane Doe"));
	assert_eq!(owner.email(), Some("jane@example.com"));
	assert_eq!(owner.preferred_username(), Some("jane"));
}

#[tokio::test]
async fn signed_userinfo_is_decoded_with_configured_key() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(encrypted_keycloak(&server.base_url()));
	let claims = json!({ "sub": "4c2f", "email": "jane@example.com" });
	let token = signed_claims(&claims);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(realm_path("userinfo"));
			then.status(200).header("content-type", "application/jwt").body(token.as_str());
		})
		.await;
	let owner =
		client.get_resource_owner("access-1").await.expect("Signed userinfo should decode.");

	mock.assert_async().await;

	assert_eq!(Value::Object(owner.into_claims()), claims);
}

#[tokio::test]
async fn signed_userinfo_without_encryption_settings_fails() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let token = signed_claims(&json!({ "sub": "4c2f" }));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(realm_path("userinfo"));
			then.status(200).header("content-type", "application/jwt").body(token.as_str());
		})
		.await;
	let err = client
		.fetch_resource_owner("access-1")
		.await
		.expect_err("Undecodable userinfo must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Encryption(EncryptionError::UndeterminedEncryption)));
}

#[tokio::test]
async fn expired_bearer_tokens_report_http_status() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(realm_path("userinfo"));
			then.status(401).header("content-type", "application/json").body(
				"{\"error\":\"invalid_token\",\"error_description\":\"Token verification failed\"}",
			);
		})
		.await;
	let err = client.get_resource_owner("expired").await.expect_err("401 must fail.");

	mock.assert_async().await;

	assert_eq!(err.to_string(), "invalid_token: Token verification failed");
	assert_eq!(err.as_identity_provider().and_then(|provider| provider.status), Some(401));
}

#[tokio::test]
async fn logout_posts_refresh_token_and_returns_null_on_empty_body() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(realm_path("logout"))
				.header("content-type", "application/x-www-form-urlencoded")
				.form_urlencoded_tuple("client_id", TEST_CLIENT_ID)
				.form_urlencoded_tuple("client_secret", TEST_CLIENT_SECRET)
				.form_urlencoded_tuple("refresh_token", "refresh-1");
			then.status(204);
		})
		.await;
	let body = client.logout("refresh-1").await.expect("Logout should succeed.");

	mock.assert_async().await;

	assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn logout_rejection_is_a_provider_error() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("logout"));
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Invalid refresh token\"}");
		})
		.await;
	let err = client.logout("stale").await.expect_err("Rejected logout must fail.");

	mock.assert_async().await;

	assert_eq!(err.as_identity_provider().map(|provider| provider.error.as_str()), Some("invalid_grant"));
}

#[tokio::test]
async fn introspection_returns_claims_and_builds_resource_owner() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(realm_path("token/introspect"))
				.form_urlencoded_tuple("token", "access-1")
				.form_urlencoded_tuple("client_id", TEST_CLIENT_ID)
				.form_urlencoded_tuple("client_secret", TEST_CLIENT_SECRET);
			then.status(200).header("content-type", "application/json").body(
				"{\"active\":true,\"sub\":\"4c2f\",\"username\":\"jane\",\"realm_access\":{\"roles\":[\"admin\"]}}",
			);
		})
		.await;
	let claims = client.introspect_token("access-1").await.expect("Introspection should succeed.");

	assert_eq!(claims["active"], true);
	assert_eq!(claims["username"], "jane");

	let owner = client
		.get_resource_owner_from_introspected_token("access-1")
		.await
		.expect("Introspected owner should build.");

	mock.assert_calls_async(2).await;

	assert!(owner.is_active());
	assert_eq!(owner.id(), Some("4c2f"));
	assert_eq!(owner.realm_roles(), vec!["admin"]);
}

#[tokio::test]
async fn inactive_introspection_still_returns_claims() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("token/introspect"));
			then.status(200).header("content-type", "application/json").body("{\"active\":false}");
		})
		.await;
	let owner = client
		.get_resource_owner_from_introspected_token("revoked")
		.await
		.expect("Inactive tokens still produce claims.");

	mock.assert_async().await;

	assert!(!owner.is_active());
	assert_eq!(owner.id(), None);
}
