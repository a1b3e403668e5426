//! Resource owner claims produced from userinfo or introspection responses.

// self
use crate::{_prelude::*, auth::token::access::json_kind, error::ResponseError};

/// Claims describing the authenticated subject.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceOwner {
	claims: Map<String, Value>,
}
impl ResourceOwner {
	/// Wraps an already-decoded claim map.
	pub fn new(claims: Map<String, Value>) -> Self {
		Self { claims }
	}

	/// Subject identifier (`sub`).
	pub fn id(&self) -> Option<&str> {
		self.str_claim("sub")
	}

	/// Display name (`name`).
	pub fn name(&self) -> Option<&str> {
		self.str_claim("name")
	}

	/// Email address (`email`).
	pub fn email(&self) -> Option<&str> {
		self.str_claim("email")
	}

	/// Login name (`preferred_username`).
	pub fn preferred_username(&self) -> Option<&str> {
		self.str_claim("preferred_username")
	}

	/// Realm-level roles from `realm_access.roles`.
	pub fn realm_roles(&self) -> Vec<&str> {
		roles_at(self.claims.get("realm_access"))
	}

	/// Client-level roles from `resource_access.<client>.roles`.
	pub fn client_roles(&self, client: &str) -> Vec<&str> {
		roles_at(self.claims.get("resource_access").and_then(|access| access.get(client)))
	}

	/// Introspection `active` flag; `false` when the claim is absent.
	pub fn is_active(&self) -> bool {
		self.claims.get("active").and_then(Value::as_bool).unwrap_or(false)
	}

	/// Raw claim lookup.
	pub fn get(&self, claim: &str) -> Option<&Value> {
		self.claims.get(claim)
	}

	/// Borrowed view of every claim.
	pub fn claims(&self) -> &Map<String, Value> {
		&self.claims
	}

	/// Consumes the owner and returns the claim map.
	pub fn into_claims(self) -> Map<String, Value> {
		self.claims
	}

	fn str_claim(&self, claim: &str) -> Option<&str> {
		self.claims.get(claim).and_then(Value::as_str)
	}
}
impl TryFrom<Value> for ResourceOwner {
	type Error = Error;

	fn try_from(value: Value) -> Result<Self> {
		match value {
			Value::Object(claims) => Ok(Self { claims }),
			other => Err(ResponseError::UnexpectedClaims { found: json_kind(&other) }.into()),
		}
	}
}

fn roles_at(container: Option<&Value>) -> Vec<&str> {
	container
		.and_then(|value| value.get("roles"))
		.and_then(Value::as_array)
		.map(|roles| roles.iter().filter_map(Value::as_str).collect())
		.unwrap_or_default()
}
