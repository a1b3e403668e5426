#![cfg(feature = "reqwest")]

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use httpmock::prelude::*;
// self
use oauth2_keycloak::{
	_preludet::*,
	error::{ResponseError, TransportError},
	flows::ClientAuthMethod,
	oauth::ReqwestTransportErrorMapper,
	provider::KeycloakClient,
};

#[tokio::test]
async fn exchange_code_posts_form_and_maps_token() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(realm_path("token"))
				.header("content-type", "application/x-www-form-urlencoded")
				.header("accept", "application/json")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "code-123")
				.form_urlencoded_tuple("redirect_uri", TEST_REDIRECT_URI)
				.form_urlencoded_tuple("client_id", TEST_CLIENT_ID)
				.form_urlencoded_tuple("client_secret", TEST_CLIENT_SECRET);
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"abc\",\"expires_in\":300,\"refresh_token\":\"r-1\",\"id_token\":\"h.p.s\",\"token_type\":\"Bearer\"}",
				);
		})
		.await;
	let token = client
		.exchange_code("code-123")
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.token(), "abc");
	assert_eq!(token.expires_in, Some(300));
	assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("r-1"));
	assert_eq!(token.id_token(), Some("h.p.s"));
	assert!(token.expires_at.is_some_and(|expires_at| expires_at > token.issued_at));
}

#[tokio::test]
async fn exchange_code_surfaces_provider_error_message() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("token"));
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"bad code\"}");
		})
		.await;
	let err = client.exchange_code("stale").await.expect_err("Invalid grant should fail.");

	mock.assert_async().await;

	let provider = err.as_identity_provider().expect("Error should come from the provider.");

	assert_eq!(err.to_string(), "invalid_grant: bad code");
	assert_eq!(provider.error, "invalid_grant");
	assert_eq!(provider.error_description.as_deref(), Some("bad code"));
	assert_eq!(provider.status, Some(400));
	assert_eq!(provider.body["error_description"], "bad code");
}

#[tokio::test]
async fn fetch_new_token_issues_a_single_refresh_post() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(realm_path("token"))
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "refresh-old");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"expires_in\":\"60\"}");
		})
		.await;
	let token =
		client.fetch_new_token("refresh-old").await.expect("Token refresh should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(token.token(), "access-new");
	assert_eq!(token.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-new"));
	assert_eq!(token.expires_in, Some(60));
}

#[tokio::test]
async fn client_secret_basic_sends_credentials_in_header() {
	let server = MockServer::start_async().await;
	let client = KeycloakClient::with_http_client(
		test_keycloak(&server.base_url()),
		test_credentials().with_auth_method(ClientAuthMethod::ClientSecretBasic),
		test_reqwest_http_client(),
		Arc::new(ReqwestTransportErrorMapper),
	);
	let expected = format!(
		"Basic {}",
		STANDARD.encode(format!("{TEST_CLIENT_ID}:{TEST_CLIENT_SECRET}"))
	);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(realm_path("token"))
				.header("authorization", expected.as_str())
				.form_urlencoded_tuple("grant_type", "refresh_token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"basic-access\"}");
		})
		.await;
	let token = client.refresh_token("r").await.expect("Basic-authenticated refresh should work.");

	mock.assert_async().await;

	assert_eq!(token.token(), "basic-access");
	assert_eq!(token.expires_at, None);
}

#[tokio::test]
async fn token_responses_without_access_token_or_with_bad_json_fail() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let missing = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("token")).form_urlencoded_tuple("code", "no-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token_type\":\"Bearer\"}");
		})
		.await;
	let malformed = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("token")).form_urlencoded_tuple("code", "bad-json");
			then.status(200).header("content-type", "application/json").body("{\"access_token\":");
		})
		.await;
	let err = client.exchange_code("no-token").await.expect_err("Missing token must fail.");

	assert!(matches!(err, Error::Response(ResponseError::MissingAccessToken)));

	let err = client.exchange_code("bad-json").await.expect_err("Malformed JSON must fail.");

	assert!(matches!(err, Error::Response(ResponseError::MalformedBody { status: Some(200), .. })));

	missing.assert_async().await;
	malformed.assert_async().await;
}

#[tokio::test]
async fn server_errors_and_unreachable_hosts_are_reported() {
	let server = MockServer::start_async().await;
	let client = build_reqwest_test_client(test_keycloak(&server.base_url()));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path(realm_path("token"));
			then.status(500).header("content-type", "text/html").body("<html>down</html>");
		})
		.await;
	let err = client.refresh_token("r").await.expect_err("HTML 500 must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Response(ResponseError::ServerError { status: 500 })));

	let offline = build_reqwest_test_client(test_keycloak("http://127.0.0.1:9"));
	let err = offline.refresh_token("r").await.expect_err("Closed port must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { endpoint: "token", .. })));
}
