//! Request dispatch and response interpretation shared by every provider operation.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderName, HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ResponseError, TransportError},
	flows::{ClientAuthMethod, ClientCredentials},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::Operation,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const BODY_PREVIEW_LIMIT: usize = 256;

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		operation: Operation,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(operation, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Other {
				endpoint: operation.endpoint(),
				message,
				status: meta.and_then(|value| value.status),
			}
			.into(),
			_ => TransportError::Other {
				endpoint: operation.endpoint(),
				message: "unrecognized transport failure".into(),
				status: meta.and_then(|value| value.status),
			}
			.into(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(operation: Operation, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(operation.endpoint(), err).into()
}

/// Form-encoded POST aimed at a provider endpoint.
#[derive(Clone, Debug)]
pub(crate) struct FormPost {
	url: Url,
	params: Vec<(&'static str, String)>,
	authorization: Option<String>,
}
impl FormPost {
	pub(crate) fn new(url: Url) -> Self {
		Self { url, params: Vec::new(), authorization: None }
	}

	pub(crate) fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
		self.params.push((key, value.into()));

		self
	}

	/// Applies the client's authentication method (form fields or HTTP Basic).
	pub(crate) fn client_auth(mut self, credentials: &ClientCredentials) -> Self {
		match credentials.auth_method {
			ClientAuthMethod::ClientSecretPost => {
				self = self.param("client_id", credentials.client_id.as_str());

				if let Some(secret) = &credentials.client_secret {
					self = self.param("client_secret", secret.expose());
				}
			},
			ClientAuthMethod::ClientSecretBasic => {
				let secret = credentials.client_secret.as_ref().map(|s| s.expose()).unwrap_or("");
				let pair = format!(
					"{}:{}",
					form_urlencoded::byte_serialize(credentials.client_id.as_bytes())
						.collect::<String>(),
					form_urlencoded::byte_serialize(secret.as_bytes()).collect::<String>(),
				);

				self.authorization = Some(format!("Basic {}", STANDARD.encode(pair)));
			},
		}

		self
	}

	pub(crate) fn into_request(self) -> Result<HttpRequest> {
		let body = form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.params.iter().map(|(key, value)| (*key, value.as_str())))
			.finish();
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(self.url.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, JSON_CONTENT_TYPE);

		if let Some(authorization) = self.authorization {
			builder = builder.header(AUTHORIZATION, authorization);
		}

		Ok(builder.body(body.into_bytes()).map_err(ConfigError::from)?)
	}
}

/// Builds the `Authorization: Bearer <token>` header pair.
pub fn bearer_header(token: &str) -> Result<(HeaderName, HeaderValue)> {
	let value = HeaderValue::from_str(&format!("Bearer {token}"))
		.map_err(|err| ConfigError::from(oauth2::http::Error::from(err)))?;

	Ok((AUTHORIZATION, value))
}

/// GET request authenticated with a bearer token.
pub(crate) fn bearer_get(url: &Url, token: &str) -> Result<HttpRequest> {
	let (name, value) = bearer_header(token)?;
	let request = Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, JSON_CONTENT_TYPE)
		.header(name, value)
		.body(Vec::new())
		.map_err(ConfigError::from)?;

	Ok(request)
}

/// Executes one request, mapping transport failures through `mapper`.
pub(crate) async fn dispatch<C, M>(
	http_client: &C,
	mapper: &M,
	operation: Operation,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());

	handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(operation, meta.take().as_ref(), err))
}

/// Parses a provider response body.
///
/// - empty bodies become [`Value::Null`];
/// - `application/x-www-form-urlencoded` bodies become an object of strings;
/// - bodies that parse as JSON are returned as-is;
/// - unparseable bodies declared as JSON fail with [`ResponseError::MalformedBody`];
/// - unparseable bodies with a 500 status fail with [`ResponseError::ServerError`];
/// - anything else (e.g. an `application/jwt` userinfo token) is returned as a string.
pub fn parse_response(response: &HttpResponse) -> Result<Value> {
	let status = response.status().as_u16();
	let content_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.unwrap_or_default()
		.to_ascii_lowercase();
	let body = response.body().as_slice();

	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}
	if content_type.contains("urlencoded") {
		let fields = form_urlencoded::parse(body)
			.into_owned()
			.map(|(key, value)| (key, Value::String(value)))
			.collect();

		return Ok(Value::Object(fields));
	}

	match serde_json::from_slice::<Value>(body) {
		Ok(value) => Ok(value),
		Err(source) if content_type.contains("json") =>
			Err(ResponseError::MalformedBody { source, status: Some(status) }.into()),
		Err(_) if status == 500 => Err(ResponseError::ServerError { status }.into()),
		Err(_) => Ok(Value::String(String::from_utf8_lossy(body).trim().to_owned())),
	}
}

/// Default provider error interpretation.
///
/// A non-empty `error` field is an [`IdentityProviderError`](crate::error::IdentityProviderError)
/// carrying `error_description` and the full body. A non-2xx status without an `error` field
/// is reported the same way with an `http_<status>` code.
pub fn check_oauth_error(status: u16, body: &Value) -> Result<()> {
	if let Some(code) = body.get("error").and_then(error_code) {
		let description = body
			.get("error_description")
			.and_then(Value::as_str)
			.filter(|description| !description.is_empty())
			.map(str::to_owned);

		return Err(crate::error::IdentityProviderError::new(
			code,
			description,
			Some(status),
			body.clone(),
		)
		.into());
	}
	if !(200..300).contains(&status) {
		return Err(crate::error::IdentityProviderError::new(
			format!("http_{status}"),
			body_preview(body),
			Some(status),
			body.clone(),
		)
		.into());
	}

	Ok(())
}

fn error_code(value: &Value) -> Option<String> {
	match value {
		Value::Null | Value::Bool(false) => None,
		Value::String(code) if code.is_empty() => None,
		Value::String(code) => Some(code.clone()),
		other => Some(other.to_string()),
	}
}

fn body_preview(body: &Value) -> Option<String> {
	let rendered = match body {
		Value::Null => return None,
		Value::String(raw) => raw.clone(),
		other => other.to_string(),
	};

	if rendered.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(rendered);
	}

	let mut buf: String = rendered.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	Some(buf)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::error::IdentityProviderError;

	fn response(status: u16, content_type: &str, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			oauth2::http::StatusCode::from_u16(status).expect("Fixture status is valid.");
		response.headers_mut().insert(
			CONTENT_TYPE,
			HeaderValue::from_str(content_type).expect("Fixture content type is valid."),
		);

		response
	}

	#[test]
	fn parses_json_form_jwt_and_empty_bodies() {
		assert_eq!(
			parse_response(&response(200, "application/json", "{\"sub\":\"1\"}"))
				.expect("JSON should parse."),
			json!({ "sub": "1" })
		);
		assert_eq!(
			parse_response(&response(200, "application/x-www-form-urlencoded", "a=1&b=two"))
				.expect("Form should parse."),
			json!({ "a": "1", "b": "two" })
		);
		assert_eq!(
			parse_response(&response(200, "application/jwt", "aaa.bbb.ccc\n"))
				.expect("JWT should be returned raw."),
			json!("aaa.bbb.ccc")
		);
		assert_eq!(
			parse_response(&response(204, "", "")).expect("Empty body should be null."),
			Value::Null
		);
	}

	#[test]
	fn malformed_json_and_bare_server_errors_fail() {
		let err = parse_response(&response(200, "application/json", "{oops"))
			.expect_err("Malformed JSON must fail.");

		assert!(matches!(err, Error::Response(ResponseError::MalformedBody { .. })));

		let err = parse_response(&response(500, "text/html", "<html>boom</html>"))
			.expect_err("Bare 500 must fail.");

		assert!(matches!(err, Error::Response(ResponseError::ServerError { status: 500 })));
	}

	#[test]
	fn oauth_error_fields_become_identity_provider_errors() {
		let body = json!({ "error": "invalid_grant", "error_description": "bad code" });
		let err = check_oauth_error(400, &body).expect_err("Error body must fail.");
		let Error::IdentityProvider(IdentityProviderError { message, status, body: attached, .. }) =
			err
		else {
			panic!("Expected an identity provider error.");
		};

		assert_eq!(message, "invalid_grant: bad code");
		assert_eq!(status, Some(400));
		assert_eq!(attached, body);
	}

	#[test]
	fn status_without_error_field_is_reported_and_success_passes() {
		let err = check_oauth_error(401, &Value::Null).expect_err("401 must fail.");

		assert_eq!(err.as_identity_provider().map(|e| e.error.as_str()), Some("http_401"));
		assert!(check_oauth_error(200, &json!({ "error": "" })).is_ok());
		assert!(check_oauth_error(200, &json!("aaa.bbb.ccc")).is_ok());
	}

	#[test]
	fn client_secret_basic_moves_credentials_into_header() {
		let credentials = ClientCredentials::new("my client")
			.with_client_secret("s3cr:t")
			.with_auth_method(ClientAuthMethod::ClientSecretBasic);
		let request = FormPost::new(Url::parse("https://kc.example.com/token").expect("URL."))
			.param("grant_type", "refresh_token")
			.client_auth(&credentials)
			.into_request()
			.expect("Request should build.");
		let header = request
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.expect("Basic header should be present.");

		assert_eq!(header, format!("Basic {}", STANDARD.encode("my+client:s3cr%3At")));
		assert_eq!(request.body().as_slice(), b"grant_type=refresh_token");
	}
}
