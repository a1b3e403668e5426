//! Client-level error types shared across flows, providers, and transports.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Identity provider answered with an OAuth `error` payload.
	#[error(transparent)]
	IdentityProvider(#[from] IdentityProviderError),
	/// A string response could not be decoded with the configured algorithm and key.
	#[error(transparent)]
	Encryption(#[from] EncryptionError),
	/// Provider response could not be interpreted.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Returns the provider error payload when the failure originated from the identity
	/// provider.
	pub fn as_identity_provider(&self) -> Option<&IdentityProviderError> {
		match self {
			Self::IdentityProvider(inner) => Some(inner),
			_ => None,
		}
	}

	/// HTTP status code of the response that caused the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::IdentityProvider(inner) => inner.status,
			Self::Response(
				ResponseError::MalformedBody { status, .. } | ResponseError::Parse { status, .. },
			) => *status,
			Self::Response(ResponseError::ServerError { status }) => Some(*status),
			Self::Transport(TransportError::Other { status, .. }) => *status,
			_ => None,
		}
	}

	/// Stable label naming the error family, suitable for log or metric fields.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Config(_) => "config",
			Self::IdentityProvider(_) => "identity_provider",
			Self::Encryption(_) => "encryption",
			Self::Response(_) => "response",
			Self::Transport(_) => "transport",
		}
	}
}

/// Configuration and validation failures raised while building clients or requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// The authorization server URL was not supplied.
	#[error("The auth server URL is required.")]
	MissingAuthServerUrl,
	/// The authorization server URL cannot be parsed or cannot carry path segments.
	#[error("The auth server URL `{url}` is invalid.")]
	InvalidAuthServerUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure, when the URL did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// The realm was not supplied or is blank.
	#[error("The realm is required.")]
	MissingRealm,
	/// The client identifier was not supplied or is blank.
	#[error("The client ID is required.")]
	MissingClientId,
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// The configured encryption algorithm is not recognized.
	#[error("Encryption algorithm `{algorithm}` is not supported.")]
	UnsupportedEncryptionAlgorithm {
		/// Algorithm name as configured.
		algorithm: String,
	},
	/// The configured encryption key cannot be loaded for the configured algorithm.
	#[error("Encryption key cannot be used with the {algorithm} algorithm.")]
	InvalidEncryptionKey {
		/// Algorithm name the key was loaded for.
		algorithm: String,
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The encryption key file could not be read.
	#[error("Encryption key file `{}` could not be read.", .path.display())]
	EncryptionKeyFile {
		/// Path supplied via configuration.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Both a literal encryption key and a key path were supplied.
	#[error("Configure either an encryption key or an encryption key path, not both.")]
	AmbiguousEncryptionKey,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// OAuth error payload (`error` + `error_description`) returned by the identity provider.
///
/// Covers `invalid_grant`, `invalid_client`, `invalid_token`, and any other code the provider
/// emits. The full parsed body stays attached for inspection.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct IdentityProviderError {
	/// Provider-supplied `error` code.
	pub error: String,
	/// Provider-supplied `error_description`, if any.
	pub error_description: Option<String>,
	/// Combined `error: error_description` message.
	pub message: String,
	/// HTTP status code of the failing response, when available.
	pub status: Option<u16>,
	/// Complete parsed response body.
	pub body: Value,
}
impl IdentityProviderError {
	/// Builds the error from its parts, deriving the combined message.
	pub fn new(
		error: impl Into<String>,
		error_description: Option<String>,
		status: Option<u16>,
		body: Value,
	) -> Self {
		let error = error.into();
		let message = match error_description.as_deref() {
			Some(description) => format!("{error}: {description}"),
			None => error.clone(),
		};

		Self { error, error_description, message, status, body }
	}
}

/// Failures decoding signed or encrypted provider responses.
#[derive(Debug, ThisError)]
pub enum EncryptionError {
	/// A string response arrived but no algorithm/key pair is configured to decode it.
	#[error(
		"The given response may be encrypted and sufficient encryption configuration has not been provided."
	)]
	UndeterminedEncryption,
	/// The configured decoder rejected the token (bad signature, expired, malformed).
	#[error("Response token could not be decoded.")]
	Decode {
		/// Decoder-specific failure.
		#[source]
		source: BoxError,
	},
}
impl EncryptionError {
	/// Wraps a decoder failure.
	pub fn decode(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Decode { source: Box::new(src) }
	}
}

/// Provider responses that cannot be turned into typed results.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Response declared JSON but the body is not valid JSON.
	#[error("Provider returned malformed JSON.")]
	MalformedBody {
		/// Underlying JSON syntax failure.
		#[source]
		source: serde_json::Error,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// JSON body does not have the expected shape.
	#[error("Provider response has an unexpected shape.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider failed with a server error and no JSON body.
	#[error("An OAuth server error was encountered that did not contain a JSON body.")]
	ServerError {
		/// HTTP status code.
		status: u16,
	},
	/// Token endpoint response omitted `access_token`.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// Token endpoint returned an `expires_in` that is not an integer number of seconds.
	#[error("The expires_in value `{value}` is not a valid number of seconds.")]
	InvalidExpiresIn {
		/// Raw value as returned by the provider.
		value: String,
	},
	/// Claims payload was not a JSON object.
	#[error("Expected a claims object but received {found}.")]
	UnexpectedClaims {
		/// JSON kind that was received instead.
		found: &'static str,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint label of the failing request.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured error.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint label of the failing request.
		endpoint: &'static str,
		/// Transport-supplied message.
		message: String,
		/// HTTP status code, when the failure happened after the response head arrived.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}
