//! Keycloak OAuth 2.0 client with realm-scoped authorization-code flows, logout, token
//! introspection, and JWT-encoded userinfo decoding on top of a provider-agnostic core.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod decode;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::ClientCredentials,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{Keycloak, KeycloakClient},
	};

	/// Client ID shared by integration test fixtures.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret shared by integration test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// Realm shared by integration test fixtures.
	pub const TEST_REALM: &str = "demo";
	/// Redirect URI shared by integration test fixtures.
	pub const TEST_REDIRECT_URI: &str = "https://app.example.com/callback";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Confidential client credentials used across integration tests.
	pub fn test_credentials() -> ClientCredentials {
		ClientCredentials::new(TEST_CLIENT_ID)
			.with_client_secret(TEST_CLIENT_SECRET)
			.with_redirect_uri(
				Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI should parse successfully."),
			)
	}

	/// Constructs a [`KeycloakClient`] backed by the reqwest transport used across integration
	/// tests.
	pub fn build_reqwest_test_client(keycloak: Keycloak) -> KeycloakClient {
		KeycloakClient::with_http_client(
			keycloak,
			test_credentials(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Keycloak resolver pointed at the provided mock server base URL without encryption.
	pub fn test_keycloak(base_url: &str) -> Keycloak {
		Keycloak::builder()
			.auth_server_url(base_url)
			.realm(TEST_REALM)
			.build()
			.expect("Keycloak test resolver should build successfully.")
	}

	/// Path of a realm endpoint served by the mock Keycloak server.
	pub fn realm_path(suffix: &str) -> String {
		format!("/realms/{TEST_REALM}/protocol/openid-connect/{suffix}")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use jsonwebtoken;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
