//! Introspects an access token passed on the command line and prints the resulting claims.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oauth2_keycloak::{
	flows::ClientCredentials,
	provider::{Keycloak, KeycloakClient},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let token = env::args().nth(1).ok_or_else(|| eyre!("usage: introspect_token <token>"))?;
	let keycloak = Keycloak::builder()
		.auth_server_url(env::var("KEYCLOAK_URL").unwrap_or_else(|_| "http://localhost:8080".into()))
		.realm(env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "demo".into()))
		.build()?;
	let credentials = ClientCredentials::new(
		env::var("KEYCLOAK_CLIENT_ID").unwrap_or_else(|_| "demo-client".into()),
	)
	.with_client_secret(env::var("KEYCLOAK_CLIENT_SECRET").unwrap_or_default());
	let client = KeycloakClient::new(keycloak, credentials);
	let owner = client.get_resource_owner_from_introspected_token(&token).await?;

	if !owner.is_active() {
		println!("Token is not active.");

		return Ok(());
	}

	println!("Subject: {:?}", owner.id());
	println!("Realm roles: {:?}", owner.realm_roles());
	println!("{}", serde_json::to_string_pretty(owner.claims())?);

	Ok(())
}
