//! Keycloak realm resolver.
//!
//! Every endpoint lives under `<auth_server_url>/realms/<realm>/protocol/openid-connect/`.
//! Userinfo and introspection responses may arrive as signed JWTs (`application/jwt`);
//! when an algorithm and key are configured they are decoded through a [`ClaimsDecoder`].

mod config;
mod session;

pub use config::*;

// std
use std::fs;
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	decode::{ClaimsDecoder, JwtClaimsDecoder},
	error::{ConfigError, EncryptionError},
	provider::EndpointResolver,
};
#[cfg(feature = "reqwest")]
use crate::{flows::OAuth2Client, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

const DEFAULT_SCOPES: [&str; 2] = ["name", "email"];

#[cfg(feature = "reqwest")]
/// Keycloak client on the crate's default reqwest transport stack.
pub type KeycloakClient = OAuth2Client<Keycloak, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Endpoint suffixes below a realm's `protocol/openid-connect` path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeycloakEndpoint {
	/// `auth`
	Authorization,
	/// `token`
	Token,
	/// `userinfo`
	UserInfo,
	/// `token/introspect`
	Introspection,
	/// `logout`
	Logout,
}
impl KeycloakEndpoint {
	/// Path below `protocol/openid-connect`.
	pub const fn suffix(self) -> &'static str {
		match self {
			KeycloakEndpoint::Authorization => "auth",
			KeycloakEndpoint::Token => "token",
			KeycloakEndpoint::UserInfo => "userinfo",
			KeycloakEndpoint::Introspection => "token/introspect",
			KeycloakEndpoint::Logout => "logout",
		}
	}
}

/// Realm-scoped Keycloak resolver.
///
/// Cheap to clone; the decoder is shared.
#[derive(Clone)]
pub struct Keycloak {
	auth_server_url: Url,
	realm: String,
	encryption_algorithm: Option<String>,
	decoder: Option<Arc<dyn ClaimsDecoder>>,
}
impl Keycloak {
	/// Starts a [`KeycloakBuilder`].
	pub fn builder() -> KeycloakBuilder {
		KeycloakBuilder::default()
	}

	/// Base URL of the Keycloak server, without a trailing slash.
	pub fn auth_server_url(&self) -> &Url {
		&self.auth_server_url
	}

	/// Realm name.
	pub fn realm(&self) -> &str {
		&self.realm
	}

	/// Configured encryption algorithm name, if any.
	pub fn encryption_algorithm(&self) -> Option<&str> {
		self.encryption_algorithm.as_deref()
	}

	/// `<auth_server_url>/realms/<realm>`.
	pub fn realm_url(&self) -> Result<Url> {
		self.url_with_segments(&[])
	}

	/// Resolves one of the realm's OpenID Connect endpoints.
	pub fn endpoint(&self, endpoint: KeycloakEndpoint) -> Result<Url> {
		let mut segments = vec!["protocol", "openid-connect"];

		segments.extend(endpoint.suffix().split('/'));

		self.url_with_segments(&segments)
	}

	/// Token introspection endpoint.
	pub fn introspection_endpoint(&self) -> Result<Url> {
		self.endpoint(KeycloakEndpoint::Introspection)
	}

	/// End-session endpoint used for both logout redirects and back-channel logout.
	pub fn logout_endpoint(&self) -> Result<Url> {
		self.endpoint(KeycloakEndpoint::Logout)
	}

	/// Returns true when responses can be decoded, i.e. both an algorithm and a key were
	/// configured (or a custom decoder was installed).
	pub fn uses_encryption(&self) -> bool {
		self.decoder.is_some()
	}

	/// Decodes string responses with the configured decoder.
	///
	/// Objects, arrays, numbers, booleans, and `null` are returned unchanged. A string fails
	/// with [`EncryptionError::UndeterminedEncryption`] when no decoder is configured.
	pub fn decrypt_response(&self, response: Value) -> Result<Value> {
		let Value::String(token) = response else {
			return Ok(response);
		};
		let decoder = self.decoder.as_ref().ok_or(EncryptionError::UndeterminedEncryption)?;

		Ok(decoder.decode(&token)?)
	}

	fn url_with_segments(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.auth_server_url.clone();

		url.path_segments_mut()
			.map_err(|_| ConfigError::InvalidAuthServerUrl {
				url: self.auth_server_url.to_string(),
				source: None,
			})?
			.pop_if_empty()
			.extend(["realms", self.realm.as_str()])
			.extend(segments);

		Ok(url)
	}
}
impl EndpointResolver for Keycloak {
	fn authorization_endpoint(&self) -> Result<Url> {
		self.endpoint(KeycloakEndpoint::Authorization)
	}

	fn token_endpoint(&self) -> Result<Url> {
		self.endpoint(KeycloakEndpoint::Token)
	}

	fn userinfo_endpoint(&self) -> Result<Url> {
		self.endpoint(KeycloakEndpoint::UserInfo)
	}

	fn default_scopes(&self) -> ScopeList {
		ScopeList::new(DEFAULT_SCOPES).unwrap_or_default()
	}

	fn prepare_claims(&self, body: Value) -> Result<Value> {
		self.decrypt_response(body)
	}
}
impl Debug for Keycloak {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Keycloak")
			.field("auth_server_url", &self.auth_server_url.as_str())
			.field("realm", &self.realm)
			.field("encryption_algorithm", &self.encryption_algorithm)
			.field("uses_encryption", &self.uses_encryption())
			.finish()
	}
}

/// Builder for [`Keycloak`] values.
#[derive(Clone, Default)]
pub struct KeycloakBuilder {
	auth_server_url: Option<String>,
	realm: Option<String>,
	encryption_algorithm: Option<String>,
	encryption_key: Option<TokenSecret>,
	encryption_key_path: Option<PathBuf>,
	decoder: Option<Arc<dyn ClaimsDecoder>>,
}
impl KeycloakBuilder {
	/// Sets the Keycloak server base URL (e.g. `https://sso.example.com` or the legacy
	/// `https://sso.example.com/auth`).
	pub fn auth_server_url(mut self, url: impl Into<String>) -> Self {
		self.auth_server_url = Some(url.into());

		self
	}

	/// Sets the realm.
	pub fn realm(mut self, realm: impl Into<String>) -> Self {
		self.realm = Some(realm.into());

		self
	}

	/// Sets the algorithm used to decode string responses (`HS256`, `RS256`, …).
	pub fn encryption_algorithm(mut self, algorithm: impl Into<String>) -> Self {
		self.encryption_algorithm = Some(algorithm.into());

		self
	}

	/// Sets the key used to decode string responses.
	pub fn encryption_key(mut self, key: impl Into<TokenSecret>) -> Self {
		self.encryption_key = Some(key.into());

		self
	}

	/// Reads the decoding key from a file when [`build`](Self::build) runs.
	pub fn encryption_key_path(mut self, path: impl AsRef<Path>) -> Self {
		self.encryption_key_path = Some(path.as_ref().to_path_buf());

		self
	}

	/// Installs a custom decoder, overriding algorithm/key configuration.
	pub fn decoder(mut self, decoder: Arc<dyn ClaimsDecoder>) -> Self {
		self.decoder = Some(decoder);

		self
	}

	/// Validates the configuration and builds the resolver.
	///
	/// The key file, when configured, is read here so a bad path fails immediately.
	pub fn build(self) -> Result<Keycloak, ConfigError> {
		let raw_url = self
			.auth_server_url
			.as_deref()
			.map(str::trim)
			.filter(|url| !url.is_empty())
			.ok_or(ConfigError::MissingAuthServerUrl)?;
		let auth_server_url = parse_server_url(raw_url)?;
		let realm = self
			.realm
			.map(|realm| realm.trim().to_owned())
			.filter(|realm| !realm.is_empty())
			.ok_or(ConfigError::MissingRealm)?;
		let encryption_key = match (self.encryption_key, self.encryption_key_path) {
			(Some(_), Some(_)) => return Err(ConfigError::AmbiguousEncryptionKey),
			(Some(key), None) => Some(key),
			(None, Some(path)) => Some(read_key_file(path)?),
			(None, None) => None,
		}
		.filter(|key| !key.expose().trim().is_empty());
		// Blank settings count as absent, leaving encryption disabled.
		let encryption_algorithm = self
			.encryption_algorithm
			.map(|algorithm| algorithm.trim().to_owned())
			.filter(|algorithm| !algorithm.is_empty());
		let decoder = match (self.decoder, &encryption_algorithm, encryption_key) {
			(Some(decoder), _, _) => Some(decoder),
			(None, Some(algorithm), Some(key)) =>
				Some(Arc::new(JwtClaimsDecoder::new(algorithm, key.expose())?)
					as Arc<dyn ClaimsDecoder>),
			_ => None,
		};

		Ok(Keycloak { auth_server_url, realm, encryption_algorithm, decoder })
	}
}
impl Debug for KeycloakBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("KeycloakBuilder")
			.field("auth_server_url", &self.auth_server_url)
			.field("realm", &self.realm)
			.field("encryption_algorithm", &self.encryption_algorithm)
			.field("encryption_key", &self.encryption_key)
			.field("encryption_key_path", &self.encryption_key_path)
			.field("decoder_set", &self.decoder.is_some())
			.finish()
	}
}

fn parse_server_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim_end_matches('/')).map_err(|source| {
		ConfigError::InvalidAuthServerUrl { url: raw.to_owned(), source: Some(source) }
	})?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::InvalidAuthServerUrl { url: raw.to_owned(), source: None });
	}

	Ok(url)
}

fn read_key_file(path: PathBuf) -> Result<TokenSecret, ConfigError> {
	match fs::read_to_string(&path) {
		Ok(key) => Ok(TokenSecret::new(key)),
		Err(source) => Err(ConfigError::EncryptionKeyFile { path, source }),
	}
}
