//! Provider-agnostic OAuth 2.0 client operations.
//!
//! [`OAuth2Client`] pairs an [`EndpointResolver`] with client credentials and a transport.
//! Every network operation performs exactly one HTTP round trip, and the returned future
//! resolves only once the provider has answered or the request failed.

pub mod authorize;
pub mod resource_owner;
pub mod token;

pub use authorize::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::Operation,
	provider::EndpointResolver,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// How the client authenticates against the token, introspection, and logout endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// `client_id` and `client_secret` travel in the form body.
	#[default]
	ClientSecretPost,
	/// HTTP Basic authentication with the client credentials.
	ClientSecretBasic,
}
impl ClientAuthMethod {
	/// Returns the RFC 7591 identifier for the method.
	pub fn as_str(self) -> &'static str {
		match self {
			ClientAuthMethod::ClientSecretPost => "client_secret_post",
			ClientAuthMethod::ClientSecretBasic => "client_secret_basic",
		}
	}
}

/// Registered client identity used by every operation.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret for confidential clients.
	pub client_secret: Option<TokenSecret>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Option<Url>,
	/// Fixed `state` value reused for every redirect, when configured.
	pub state: Option<String>,
	/// Client authentication method.
	pub auth_method: ClientAuthMethod,
}
impl ClientCredentials {
	/// Creates public-client credentials for `client_id`.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri: None,
			state: None,
			auth_method: ClientAuthMethod::default(),
		}
	}

	/// Attaches a client secret.
	pub fn with_client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the redirect URI sent with authorization redirects and code exchanges.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Pins the `state` value instead of generating one per redirect.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Overrides the client authentication method.
	pub fn with_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.auth_method = method;

		self
	}
}

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuth2Client<R> = OAuth2Client<R, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// OAuth 2.0 client bound to one provider.
///
/// The client holds immutable configuration plus `Arc`-shared transport handles, so it is
/// cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct OAuth2Client<R, C, M>
where
	R: EndpointResolver,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider resolver supplying endpoints, default scopes, and response hooks.
	pub resolver: R,
	/// Client identity applied to every request.
	pub credentials: ClientCredentials,
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
}
impl<R, C, M> OAuth2Client<R, C, M>
where
	R: EndpointResolver,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		resolver: R,
		credentials: ClientCredentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			resolver,
			credentials,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
		}
	}

	/// Sends one request, then parses and checks the response through the resolver.
	pub(crate) async fn send(
		&self,
		operation: Operation,
		request: oauth2::HttpRequest,
	) -> Result<Value> {
		let response = oauth::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			operation,
			request,
		)
		.await?;
		let body = oauth::parse_response(&response)?;

		self.resolver.check_response(response.status().as_u16(), &body)?;

		Ok(body)
	}
}
#[cfg(feature = "reqwest")]
impl<R> OAuth2Client<R, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	R: EndpointResolver,
{
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(resolver: R, credentials: ClientCredentials) -> Self {
		Self::with_http_client(
			resolver,
			credentials,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<R, C, M> Debug for OAuth2Client<R, C, M>
where
	R: EndpointResolver + Debug,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Client")
			.field("resolver", &self.resolver)
			.field("credentials", &self.credentials)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_debug_redacts_secret() {
		let credentials = ClientCredentials::new("web")
			.with_client_secret("hunter2")
			.with_state("fixed")
			.with_auth_method(ClientAuthMethod::ClientSecretBasic);
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("web"));
		assert!(!rendered.contains("hunter2"));
		assert_eq!(credentials.auth_method.as_str(), "client_secret_basic");
	}

	#[test]
	fn auth_method_defaults_to_form_post() {
		assert_eq!(ClientAuthMethod::default(), ClientAuthMethod::ClientSecretPost);
		assert_eq!(
			serde_json::from_str::<ClientAuthMethod>("\"client_secret_basic\"")
				.expect("Method should deserialize."),
			ClientAuthMethod::ClientSecretBasic
		);
	}
}
