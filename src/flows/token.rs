//! Token-endpoint grants: authorization code exchange and refresh.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	flows::OAuth2Client,
	http::ProviderHttpClient,
	oauth::{FormPost, TransportErrorMapper},
	obs::{self, Operation},
	provider::EndpointResolver,
};

/// OAuth 2.0 grant types sent to the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// Authorization Code grant.
	AuthorizationCode,
	/// Refresh Token grant.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::AuthorizationCode => "authorization_code",
			GrantType::RefreshToken => "refresh_token",
		}
	}

	fn operation(self) -> Operation {
		match self {
			GrantType::AuthorizationCode => Operation::ExchangeCode,
			GrantType::RefreshToken => Operation::RefreshToken,
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<R, C, M> OAuth2Client<R, C, M>
where
	R: EndpointResolver,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization code returned to the redirect URI for an access token.
	pub async fn exchange_code(&self, code: &str) -> Result<AccessToken> {
		let grant = GrantType::AuthorizationCode;

		obs::observe(grant.operation(), "exchange_code", async move {
			let mut form = FormPost::new(self.resolver.token_endpoint()?)
				.param("grant_type", grant.as_str())
				.param("code", code);

			if let Some(redirect_uri) = &self.credentials.redirect_uri {
				form = form.param("redirect_uri", redirect_uri.as_str());
			}

			self.request_token(grant, form).await
		})
		.await
	}

	/// Redeems a refresh token for a new access token.
	pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken> {
		let grant = GrantType::RefreshToken;

		obs::observe(grant.operation(), "refresh_token", async move {
			let form = FormPost::new(self.resolver.token_endpoint()?)
				.param("grant_type", grant.as_str())
				.param("refresh_token", refresh_token);

			self.request_token(grant, form).await
		})
		.await
	}

	async fn request_token(&self, grant: GrantType, form: FormPost) -> Result<AccessToken> {
		let request = form.client_auth(&self.credentials).into_request()?;
		let body = self.send(grant.operation(), request).await?;

		AccessToken::from_response(body, OffsetDateTime::now_utc())
	}
}
