//! Keycloak session operations: logout, introspection, and decoded resource owners.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ResourceOwner},
	flows::{AuthorizationOptions, OAuth2Client, ProviderRedirect},
	http::ProviderHttpClient,
	oauth::{FormPost, TransportErrorMapper},
	obs::{self, Operation},
	provider::keycloak::Keycloak,
};

impl<C, M> OAuth2Client<Keycloak, C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the end-session redirect.
	///
	/// The query is assembled exactly like [`build_authorization_url`](Self::build_authorization_url),
	/// so identical options produce identical query strings.
	pub fn build_logout_url(&self, options: &AuthorizationOptions) -> Result<ProviderRedirect> {
		Ok(self.redirect_to(self.resolver.logout_endpoint()?, options))
	}

	/// Ends the Keycloak session bound to `refresh_token`.
	///
	/// Keycloak answers a successful logout with an empty body, which is returned as
	/// [`Value::Null`].
	pub async fn logout(&self, refresh_token: &str) -> Result<Value> {
		const OPERATION: Operation = Operation::Logout;

		obs::observe(OPERATION, "logout", async move {
			let request = FormPost::new(self.resolver.logout_endpoint()?)
				.client_auth(&self.credentials)
				.param("refresh_token", refresh_token)
				.into_request()?;

			self.send(OPERATION, request).await
		})
		.await
	}

	/// Asks Keycloak whether `token` is active and returns the introspection claims.
	pub async fn introspect_token(&self, token: &str) -> Result<Value> {
		const OPERATION: Operation = Operation::Introspection;

		obs::observe(OPERATION, "introspect_token", async move {
			let request = FormPost::new(self.resolver.introspection_endpoint()?)
				.param("token", token)
				.client_auth(&self.credentials)
				.into_request()?;

			self.send(OPERATION, request).await
		})
		.await
	}

	/// Fetches userinfo for `token`, decoding JWT responses when encryption is configured.
	pub async fn get_resource_owner(&self, token: &str) -> Result<ResourceOwner> {
		self.fetch_resource_owner(token).await
	}

	/// Builds a resource owner from the introspection claims of `token`.
	pub async fn get_resource_owner_from_introspected_token(
		&self,
		token: &str,
	) -> Result<ResourceOwner> {
		let claims = self.introspect_token(token).await?;

		ResourceOwner::try_from(self.resolver.decrypt_response(claims)?)
	}

	/// Redeems `refresh_token` for a fresh access token with a single token-endpoint call.
	pub async fn fetch_new_token(&self, refresh_token: &str) -> Result<AccessToken> {
		self.refresh_token(refresh_token).await
	}
}
