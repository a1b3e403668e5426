//! Token decoding contract used to turn signed or encrypted provider responses into claims.
//!
//! The crate never verifies signatures itself: [`ClaimsDecoder`] is the seam, and
//! [`JwtClaimsDecoder`] delegates verification to `jsonwebtoken`.

// crates.io
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, EncryptionError},
};

/// Decodes a token string into its claim payload, or fails.
pub trait ClaimsDecoder
where
	Self: Send + Sync,
{
	/// Verifies `token` and returns its claims.
	fn decode(&self, token: &str) -> Result<Value, EncryptionError>;
}

/// [`ClaimsDecoder`] backed by `jsonwebtoken` with a single algorithm and key.
///
/// Signature, `exp`, and `nbf` are checked. `exp` is optional and the audience is not
/// enforced, because Keycloak userinfo tokens are addressed to the client that requested
/// them.
#[derive(Clone)]
pub struct JwtClaimsDecoder {
	algorithm: Algorithm,
	key: DecodingKey,
	validation: Validation,
}
impl JwtClaimsDecoder {
	/// Builds a decoder from an algorithm name (`HS256`, `RS256`, …) and key material.
	///
	/// HMAC algorithms use the key as a shared secret; RSA, ECDSA, and EdDSA algorithms expect
	/// a PEM-encoded public key.
	pub fn new(algorithm: &str, key: &str) -> Result<Self, ConfigError> {
		let algorithm = Algorithm::from_str(algorithm.trim()).map_err(|_| {
			ConfigError::UnsupportedEncryptionAlgorithm { algorithm: algorithm.to_owned() }
		})?;
		let key = load_key(algorithm, key).map_err(|source| ConfigError::InvalidEncryptionKey {
			algorithm: format!("{algorithm:?}"),
			source,
		})?;
		let mut validation = Validation::new(algorithm);

		validation.required_spec_claims.clear();
		validation.validate_aud = false;
		validation.validate_nbf = true;

		Ok(Self { algorithm, key, validation })
	}

	/// Algorithm the decoder accepts.
	pub fn algorithm(&self) -> Algorithm {
		self.algorithm
	}
}
impl ClaimsDecoder for JwtClaimsDecoder {
	fn decode(&self, token: &str) -> Result<Value, EncryptionError> {
		jsonwebtoken::decode::<Value>(token.trim(), &self.key, &self.validation)
			.map(|data| data.claims)
			.map_err(EncryptionError::decode)
	}
}
impl Debug for JwtClaimsDecoder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtClaimsDecoder")
			.field("algorithm", &self.algorithm)
			.field("key", &"<redacted>")
			.finish()
	}
}

fn load_key(algorithm: Algorithm, key: &str) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
	match algorithm {
		Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 =>
			Ok(DecodingKey::from_secret(key.as_bytes())),
		Algorithm::RS256
		| Algorithm::RS384
		| Algorithm::RS512
		| Algorithm::PS256
		| Algorithm::PS384
		| Algorithm::PS512 => DecodingKey::from_rsa_pem(key.as_bytes()),
		Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key.as_bytes()),
		Algorithm::EdDSA => DecodingKey::from_ed_pem(key.as_bytes()),
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use jsonwebtoken::{EncodingKey, Header};
	use serde_json::json;
	// self
	use super::*;

	const SECRET: &str = "realm-shared-secret";

	fn sign(claims: &Value, secret: &str) -> String {
		jsonwebtoken::encode(
			&Header::new(Algorithm::HS256),
			claims,
			&EncodingKey::from_secret(secret.as_bytes()),
		)
		.expect("Fixture token should encode.")
	}

	#[test]
	fn hs256_round_trips_payload_without_exp() {
		let claims = json!({ "sub": "user-1", "email": "jane@example.com", "aud": "account" });
		let decoder = JwtClaimsDecoder::new("HS256", SECRET).expect("HS256 decoder should build.");

		assert_eq!(decoder.decode(&sign(&claims, SECRET)).expect("Token should decode."), claims);
	}

	#[test]
	fn wrong_key_fails_with_decode_error() {
		let decoder = JwtClaimsDecoder::new("HS256", SECRET).expect("HS256 decoder should build.");
		let err = decoder
			.decode(&sign(&json!({ "sub": "user-1" }), "other-secret"))
			.expect_err("Signature mismatch must fail.");

		assert!(matches!(err, EncryptionError::Decode { .. }));
	}

	#[test]
	fn expired_tokens_are_rejected() {
		let decoder = JwtClaimsDecoder::new("HS256", SECRET).expect("HS256 decoder should build.");
		let err = decoder
			.decode(&sign(&json!({ "sub": "user-1", "exp": 1_000_000 }), SECRET))
			.expect_err("Expired token must fail.");

		assert!(matches!(err, EncryptionError::Decode { .. }));
	}

	#[test]
	fn not_yet_valid_tokens_are_rejected() {
		let decoder = JwtClaimsDecoder::new("HS256", SECRET).expect("HS256 decoder should build.");
		let not_before = OffsetDateTime::now_utc().unix_timestamp() + 10_000_000;
		let err = decoder
			.decode(&sign(&json!({ "sub": "user-1", "nbf": not_before }), SECRET))
			.expect_err("Token used before nbf must fail.");

		assert!(matches!(err, EncryptionError::Decode { .. }));

		let claims = json!({ "sub": "user-1", "nbf": 1_000_000 });

		assert_eq!(
			decoder.decode(&sign(&claims, SECRET)).expect("Token past nbf should decode."),
			claims
		);
	}

	#[test]
	fn unknown_algorithms_and_bad_pem_fail_at_construction() {
		let err = JwtClaimsDecoder::new("XX999", SECRET).expect_err("Unknown algorithm must fail.");

		assert!(matches!(err, ConfigError::UnsupportedEncryptionAlgorithm { .. }));

		let err = JwtClaimsDecoder::new("RS256", "not a pem").expect_err("Bad PEM must fail.");

		assert!(matches!(err, ConfigError::InvalidEncryptionKey { .. }));
	}
}
