use std::io;

use acme::{AccountCredentials, Client, ClientConfig, DirectoryUrl};
use tokio::fs;

const ACCOUNTS_DIR: &str = "./acme-accounts";

const CONTACT_EMAIL: Option<&str> = None;

#[actix_web::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("ensuring accounts dir exists");
    fs::create_dir_all(ACCOUNTS_DIR).await?;

    let key_path = format!("{ACCOUNTS_DIR}/account.pem");
    let config = ClientConfig::new(DirectoryUrl::LetsEncryptStaging);

    log::info!("loading signing key from disk");
    let account = match fs::read_to_string(&key_path).await {
        Ok(signing_key_pem) => {
            log::info!("loading account from signing key");
            let credentials = AccountCredentials::from_pem(&signing_key_pem, CONTACT_EMAIL)?;

            let client = Client::new(config.with_credentials(credentials)).await?;
            client.account().get().await?
        }

        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::info!("fetching LetsEncrypt directory");
            let client = Client::new(config).await?;

            log::info!("generating signing key and registering with ACME provider");
            let account = client.account().create(CONTACT_EMAIL, true).await?;

            if let Some(signing_key_pem) = account.private_key_pem() {
                log::info!("persisting account to {key_path}");
                fs::write(&key_path, signing_key_pem).await?;
            }

            account
        }

        Err(err) => return Err(err.into()),
    };

    dbg!(&account);

    Ok(())
}
