//! Endpoint resolution hooks that customize the core client per provider.

// self
use crate::{_prelude::*, auth::ScopeList, oauth};

/// Supplies endpoints and response interpretation for one identity provider.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data types
/// so downstream crates never depend on a particular HTTP client. Only the three endpoint
/// methods are mandatory.
pub trait EndpointResolver: Send + Sync {
	/// Authorization endpoint the end user is redirected to.
	fn authorization_endpoint(&self) -> Result<Url>;

	/// Token endpoint used for code exchanges and refreshes.
	fn token_endpoint(&self) -> Result<Url>;

	/// Userinfo endpoint queried with a bearer token.
	fn userinfo_endpoint(&self) -> Result<Url>;

	/// Scopes appended after `openid` when the caller does not request any.
	fn default_scopes(&self) -> ScopeList {
		ScopeList::default()
	}

	/// Separator placed between scopes in the `scope` parameter.
	fn scope_separator(&self) -> char {
		' '
	}

	/// Turns provider error payloads into errors.
	///
	/// The default implementation is [`oauth::check_oauth_error`].
	fn check_response(&self, status: u16, body: &Value) -> Result<()> {
		oauth::check_oauth_error(status, body)
	}

	/// Transforms a parsed userinfo body before it becomes a resource owner.
	fn prepare_claims(&self, body: Value) -> Result<Value> {
		Ok(body)
	}
}

/// Resolver with fixed endpoint URLs, for providers that publish them directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticEndpoints {
	/// Authorization endpoint.
	pub authorization: Url,
	/// Token endpoint.
	pub token: Url,
	/// Userinfo endpoint.
	pub userinfo: Url,
	/// Default scopes appended after `openid`.
	pub scopes: ScopeList,
}
impl EndpointResolver for StaticEndpoints {
	fn authorization_endpoint(&self) -> Result<Url> {
		Ok(self.authorization.clone())
	}

	fn token_endpoint(&self) -> Result<Url> {
		Ok(self.token.clone())
	}

	fn userinfo_endpoint(&self) -> Result<Url> {
		Ok(self.userinfo.clone())
	}

	fn default_scopes(&self) -> ScopeList {
		self.scopes.clone()
	}
}
