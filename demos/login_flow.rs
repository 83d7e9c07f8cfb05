//! Walks through one proxy login: print the authorize URL, then (when a code is supplied)
//! redeem it and resolve the user's identifier.
//!
//! ```sh
//! OWNCLOUD_URL=https://cloud.example.com OWNCLOUD_CLIENT_ID=id OWNCLOUD_CLIENT_SECRET=secret \
//!     cargo run --example login_flow -- <code>
//! ```

// std
use std::{env, time::Duration};
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use owncloud_oauth2::{
	flows::{OwncloudProvider, ReqwestOwncloudProvider},
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::ProviderSettings,
	reqwest,
};

const REDIRECT_URL: &str = "https://proxy.example.com/oauth2/callback";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let base = Url::parse(&env::var("OWNCLOUD_URL")?)?;
	let config = ProviderSettings::new(
		env::var("OWNCLOUD_CLIENT_ID")?,
		env::var("OWNCLOUD_CLIENT_SECRET")?,
	)
	.login_url(base.join("index.php/apps/oauth2/authorize")?)
	.redeem_url(base.join("index.php/apps/oauth2/api/v1/token")?)
	.validate_url(base.join("ocs/v1.php/cloud/user")?)
	.resolve()?;
	// Deadlines belong to the transport.
	let client = reqwest::Client::builder()
		.timeout(Duration::from_secs(10))
		.redirect(reqwest::redirect::Policy::none())
		.build()?;
	let provider: ReqwestOwncloudProvider = OwncloudProvider::with_http_client(
		config,
		ReqwestHttpClient::with_client(client),
		ReqwestTransportErrorMapper,
	);

	println!("Send your user to {}.", provider.login_url(REDIRECT_URL, "demo-state"));

	let Some(code) = env::args().nth(1) else {
		println!("Pass the `code` query parameter from the redirect to finish the login.");

		return Ok(());
	};
	let session = provider.authenticate(REDIRECT_URL, &code).await?;
	let identifier =
		session.identifier().ok_or_else(|| eyre!("Login finished without an identifier."))?;

	println!("Authenticated {identifier}.");

	Ok(())
}
