//! Access tokens minted by the token endpoint, plus the extra values providers attach.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::ResponseError};

#[derive(Deserialize)]
struct RawTokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<Seconds>,
	#[serde(default)]
	expires: Option<Seconds>,
	#[serde(flatten)]
	values: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
	Number(i64),
	Text(String),
}
impl Seconds {
	fn get(self) -> Result<i64> {
		match self {
			Self::Number(secs) => Ok(secs),
			Self::Text(raw) => raw
				.trim()
				.parse()
				.map_err(|_| ResponseError::InvalidExpiresIn { value: raw }.into()),
		}
	}
}

/// Immutable access token returned by a successful code exchange or refresh.
///
/// Fields outside the core set (`id_token`, `session_state`, `token_type`, `scope`,
/// `refresh_expires_in`, …) are kept verbatim in [`values`](Self::values).
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime in seconds as reported by the provider.
	pub expires_in: Option<i64>,
	/// Instant the response was received.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry derived from `expires_in` or the provider's `expires` timestamp.
	pub expires_at: Option<OffsetDateTime>,
	/// Every other field of the token response.
	pub values: Map<String, Value>,
}
impl AccessToken {
	/// Builds a token from a parsed token-endpoint body received at `issued_at`.
	pub fn from_response(body: Value, issued_at: OffsetDateTime) -> Result<Self> {
		if !body.is_object() {
			return Err(ResponseError::UnexpectedClaims { found: json_kind(&body) }.into());
		}

		let raw: RawTokenResponse = serde_path_to_error::deserialize(body)
			.map_err(|source| ResponseError::Parse { source, status: None })?;
		let access_token = raw
			.access_token
			.filter(|token| !token.is_empty())
			.map(TokenSecret::new)
			.ok_or(ResponseError::MissingAccessToken)?;
		let refresh_token =
			raw.refresh_token.filter(|token| !token.is_empty()).map(TokenSecret::new);
		let expires_in = raw.expires_in.map(Seconds::get).transpose()?;
		let expires = raw.expires.map(Seconds::get).transpose()?;
		let expires_at = match (expires_in, expires) {
			(Some(secs), _) if secs > 0 => Some(
				issued_at
					.checked_add(Duration::seconds(secs))
					.ok_or_else(|| ResponseError::InvalidExpiresIn { value: secs.to_string() })?,
			),
			(None, Some(timestamp)) => OffsetDateTime::from_unix_timestamp(timestamp).ok(),
			_ => None,
		};

		Ok(Self {
			access_token,
			refresh_token,
			expires_in,
			issued_at,
			expires_at,
			values: raw.values,
		})
	}

	/// Returns the access token string. Callers must avoid logging it.
	pub fn token(&self) -> &str {
		self.access_token.expose()
	}

	/// Returns the OpenID Connect `id_token`, when the provider issued one.
	pub fn id_token(&self) -> Option<&str> {
		self.values.get("id_token").and_then(Value::as_str)
	}

	/// Returns Keycloak's `session_state`, when present.
	pub fn session_state(&self) -> Option<&str> {
		self.values.get("session_state").and_then(Value::as_str)
	}

	/// Returns true once `instant` reaches the expiry. Tokens without an expiry never expire.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Convenience helper that checks expiry against the current UTC instant.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("values", &self.values.keys().collect::<Vec<_>>())
			.finish()
	}
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
