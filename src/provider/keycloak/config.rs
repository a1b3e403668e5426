//! Serde-friendly Keycloak client configuration.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	flows::{ClientAuthMethod, ClientCredentials, OAuth2Client},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::keycloak::Keycloak,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Options accepted when constructing a Keycloak client.
///
/// Keys are snake_case; the camelCase spellings used by Keycloak adapter configs
/// (`clientId`, `authServerUrl`, …) are accepted as aliases.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// OAuth 2.0 client identifier.
	#[serde(alias = "clientId")]
	pub client_id: String,
	/// Client secret for confidential clients.
	#[serde(alias = "clientSecret")]
	pub client_secret: Option<TokenSecret>,
	/// Redirect URI registered with Keycloak.
	#[serde(alias = "redirectUri")]
	pub redirect_uri: Option<String>,
	/// Fixed `state` value; generated per redirect when absent.
	pub state: Option<String>,
	/// Keycloak server base URL.
	#[serde(alias = "authServerUrl")]
	pub auth_server_url: Option<String>,
	/// Realm name.
	pub realm: Option<String>,
	/// Algorithm used to decode JWT userinfo/introspection responses.
	#[serde(alias = "encryptionAlgorithm")]
	pub encryption_algorithm: Option<String>,
	/// Key used to decode JWT responses.
	#[serde(alias = "encryptionKey")]
	pub encryption_key: Option<TokenSecret>,
	/// File holding the decoding key; read once during construction.
	#[serde(alias = "encryptionKeyPath")]
	pub encryption_key_path: Option<PathBuf>,
	/// Client authentication method for back-channel requests.
	#[serde(alias = "clientAuthMethod")]
	pub client_auth_method: ClientAuthMethod,
}
impl ProviderConfig {
	/// Builds the realm resolver described by this configuration.
	pub fn keycloak(&self) -> Result<Keycloak, ConfigError> {
		let mut builder = Keycloak::builder();

		if let Some(url) = &self.auth_server_url {
			builder = builder.auth_server_url(url.as_str());
		}
		if let Some(realm) = &self.realm {
			builder = builder.realm(realm.as_str());
		}
		if let Some(algorithm) = &self.encryption_algorithm {
			builder = builder.encryption_algorithm(algorithm.as_str());
		}
		if let Some(key) = &self.encryption_key {
			builder = builder.encryption_key(key.clone());
		}
		if let Some(path) = &self.encryption_key_path {
			builder = builder.encryption_key_path(path);
		}

		builder.build()
	}

	/// Extracts the client credentials.
	pub fn credentials(&self) -> Result<ClientCredentials, ConfigError> {
		let client_id = self.client_id.trim();

		if client_id.is_empty() {
			return Err(ConfigError::MissingClientId);
		}

		let mut credentials =
			ClientCredentials::new(client_id).with_auth_method(self.client_auth_method);

		if let Some(secret) = &self.client_secret {
			credentials = credentials.with_client_secret(secret.clone());
		}
		if let Some(redirect_uri) = &self.redirect_uri {
			let redirect_uri =
				Url::parse(redirect_uri).map_err(|source| ConfigError::InvalidRedirect { source })?;

			credentials = credentials.with_redirect_uri(redirect_uri);
		}
		if let Some(state) = &self.state {
			credentials = credentials.with_state(state.as_str());
		}

		Ok(credentials)
	}
}

impl<C, M> OAuth2Client<Keycloak, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds a Keycloak client from configuration on a caller-provided transport.
	pub fn from_config_with_http_client(
		config: &ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		Ok(Self::with_http_client(config.keycloak()?, config.credentials()?, http_client, mapper))
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Client<Keycloak, ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds a Keycloak client from configuration on the default reqwest transport.
	pub fn from_config(config: &ProviderConfig) -> Result<Self> {
		Ok(Self::new(config.keycloak()?, config.credentials()?))
	}
}
