//! Userinfo lookups and bearer authorization headers.

// crates.io
use oauth2::http::HeaderMap;
// self
use crate::{
	_prelude::*,
	auth::ResourceOwner,
	flows::OAuth2Client,
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
	provider::EndpointResolver,
};

impl<R, C, M> OAuth2Client<R, C, M>
where
	R: EndpointResolver,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the resource owner's claims from the userinfo endpoint.
	///
	/// The parsed body goes through [`EndpointResolver::prepare_claims`] first, which lets
	/// providers decode signed or encrypted userinfo responses.
	pub async fn fetch_resource_owner(&self, token: &str) -> Result<ResourceOwner> {
		const OPERATION: Operation = Operation::UserInfo;

		obs::observe(OPERATION, "fetch_resource_owner", async move {
			let request = oauth::bearer_get(&self.resolver.userinfo_endpoint()?, token)?;
			let body = self.send(OPERATION, request).await?;

			ResourceOwner::try_from(self.resolver.prepare_claims(body)?)
		})
		.await
	}

	/// Headers that authenticate a request with `token`.
	pub fn authorization_headers(&self, token: &str) -> Result<HeaderMap> {
		let (name, value) = oauth::bearer_header(token)?;
		let mut headers = HeaderMap::new();

		headers.insert(name, value);

		Ok(headers)
	}
}
