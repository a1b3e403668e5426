//! Builds a Keycloak login redirect from JSON configuration, then, when `KEYCLOAK_CODE` is
//! set, exchanges the returned code and prints the signed-in user.

// std
use std::env;
// crates.io
use color_eyre::Result;
// self
use oauth2_keycloak::{
	flows::AuthorizationOptions,
	provider::{KeycloakClient, ProviderConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config: ProviderConfig = serde_json::from_str(&format!(
		r#"{{
			"clientId": "demo-client",
			"clientSecret": "demo-secret",
			"redirectUri": "http://localhost:8080/callback",
			"authServerUrl": "{}",
			"realm": "{}"
		}}"#,
		env::var("KEYCLOAK_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
		env::var("KEYCLOAK_REALM").unwrap_or_else(|_| "demo".into()),
	))?;
	let client = KeycloakClient::from_config(&config)?;
	let redirect = client.build_authorization_url(&AuthorizationOptions::default())?;

	println!("Send your user to {}.", redirect.url);
	println!("Keep state `{}` to validate the callback.", redirect.state);

	let Ok(code) = env::var("KEYCLOAK_CODE") else {
		println!("Set KEYCLOAK_CODE to the `code` query parameter to finish the login.");

		return Ok(());
	};
	let token = client.exchange_code(&code).await?;
	let owner = client.get_resource_owner(token.token()).await?;

	println!("Signed in as {:?} <{:?}>.", owner.preferred_username(), owner.email());

	if let Some(refresh_token) = &token.refresh_token {
		let logout = client.build_logout_url(&AuthorizationOptions::default())?;

		println!("End the browser session at {}.", logout.url);
		client.logout(refresh_token.expose()).await?;
		println!("Back-channel logout completed.");
	}

	Ok(())
}
