//! Authorization redirect assembly.
//!
//! Building a redirect never touches the network. The same query assembly backs the
//! authorization URL and Keycloak's end-session URL.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	flows::OAuth2Client,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::EndpointResolver,
};

const STATE_LEN: usize = 32;
const BASE_SCOPE: &str = "openid";

/// Per-call overrides for an authorization redirect.
#[derive(Clone, Debug, Default)]
pub struct AuthorizationOptions {
	/// Scopes that replace the default `openid` + provider scopes.
	pub scopes: Option<ScopeList>,
	/// `state` value that overrides the configured or generated one.
	pub state: Option<String>,
	/// Redirect URI that overrides the configured one.
	pub redirect_uri: Option<Url>,
	/// Additional query parameters appended after the standard ones.
	pub extra_params: Vec<(String, String)>,
}
impl AuthorizationOptions {
	/// Replaces the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeList) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Pins the `state` value for this redirect.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Overrides the redirect URI for this redirect.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Appends a provider-specific query parameter (`prompt`, `kc_idp_hint`, …).
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.push((key.into(), value.into()));

		self
	}
}

/// Redirect target plus the `state` the callback handler must compare against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRedirect {
	/// Fully-formed URL to send the end user to.
	pub url: Url,
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
}
impl ProviderRedirect {
	/// Returns true when `returned_state` matches the state sent with the redirect.
	pub fn state_matches(&self, returned_state: &str) -> bool {
		self.state == returned_state
	}
}

impl<R, C, M> OAuth2Client<R, C, M>
where
	R: EndpointResolver,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorization-endpoint redirect for the code flow.
	pub fn build_authorization_url(
		&self,
		options: &AuthorizationOptions,
	) -> Result<ProviderRedirect> {
		Ok(self.redirect_to(self.resolver.authorization_endpoint()?, options))
	}

	/// Scopes requested when the caller does not supply any: `openid` followed by the
	/// resolver's defaults.
	pub fn default_scopes(&self) -> ScopeList {
		ScopeList::new([BASE_SCOPE]).unwrap_or_default().merged(&self.resolver.default_scopes())
	}

	pub(crate) fn redirect_to(
		&self,
		mut url: Url,
		options: &AuthorizationOptions,
	) -> ProviderRedirect {
		let scopes = options.scopes.clone().unwrap_or_else(|| self.default_scopes());
		let state = options
			.state
			.clone()
			.or_else(|| self.credentials.state.clone())
			.unwrap_or_else(random_state);
		let redirect_uri = options.redirect_uri.as_ref().or(self.credentials.redirect_uri.as_ref());
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.credentials.client_id);

		if let Some(redirect_uri) = redirect_uri {
			pairs.append_pair("redirect_uri", redirect_uri.as_str());
		}
		if let Some(scope) = scopes.join(self.resolver.scope_separator()) {
			pairs.append_pair("scope", &scope);
		}

		pairs.append_pair("state", &state);

		for (key, value) in &options.extra_params {
			pairs.append_pair(key, value);
		}

		drop(pairs);

		ProviderRedirect { url, state }
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn random_state_is_alphanumeric() {
		let state = random_state();

		assert_eq!(state.len(), STATE_LEN);
		assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(state, random_state());
	}

	#[test]
	fn options_builder_collects_overrides() {
		let options = AuthorizationOptions::default()
			.with_state("abc")
			.with_param("prompt", "login")
			.with_param("kc_idp_hint", "github");

		assert_eq!(options.state.as_deref(), Some("abc"));
		assert_eq!(options.extra_params.len(), 2);

		let redirect = ProviderRedirect {
			url: Url::parse("https://kc.example.com/auth").expect("Fixture URL should parse."),
			state: "abc".into(),
		};

		assert!(redirect.state_matches("abc"));
		assert!(!redirect.state_matches("abd"));
	}
}
