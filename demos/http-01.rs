use std::{fs, time::Duration};

use acme::{api::ChallengeType, api::OrderStatus, Client, Csr, DirectoryUrl};
use actix_files::Files;
use actix_web::{App, HttpServer};

const PRIMARY_NAME: &str = "example.org";

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Use `DirectoryUrl::LetsEncrypt` for production uses.
    let url = DirectoryUrl::LetsEncryptStaging;

    fs::create_dir_all("acme-challenge")?;

    // Create temporary Actix Web server for ACME challenge.
    let srv = HttpServer::new(|| {
        App::new().service(
            Files::new("/.well-known/acme-challenge", "acme-challenge").show_files_listing(),
        )
    })
    .bind(("0.0.0.0", 80))?
    .shutdown_timeout(0)
    .run();

    let srv_handle = srv.handle();
    let srv_task = actix_web::rt::spawn(srv);

    // Fetch the directory of the ACME provider.
    let client = Client::fetch(url).await?;

    // Generate a private key and register an account with your ACME provider.
    // You should write `account.private_key_pem()` to disk and restore the
    // account with `AccountCredentials::from_pem` afterwards.
    let account = client.account().create(["foo@bar.com"], true).await?;
    log::info!("account registered: {}", account.url());

    // Order a new TLS certificate for a domain.
    let orders = client.orders();
    let order = orders.create([PRIMARY_NAME], None, None).await?;

    // If the ownership of the domain(s) have already been
    // authorized in a previous order, there is nothing to
    // describe. The ACME API provider decides.
    for challenge in orders
        .describe_pending_challenges(&order, ChallengeType::Http01)
        .await?
    {
        // For HTTP, the challenge is a text file that needs to
        // be accessible over the web for the domain(s) you are
        // trying to get a certificate for:
        //
        // http://example.org/.well-known/acme-challenge/<token>
        let token = challenge
            .endpoint
            .rsplit('/')
            .next()
            .unwrap_or_default();

        // The proof is the contents of the file.
        fs::write(format!("acme-challenge/{token}"), &challenge.value)?;

        // After the file is accessible from the web, call this to
        // tell the ACME API to start checking the existence of the
        // proof.
        orders.validate_challenge(&challenge.url).await?;
    }

    // The authorizations change status to either confirm
    // ownership of the domain, or fail due to not finding the
    // proof.
    let failed = orders.wait(&order, Duration::from_secs(120)).await?;
    if !failed.is_empty() {
        eyre::bail!("validation failed: {failed:?}");
    }

    // Ownership is proven. Create a private key and CSR for the
    // certificate.
    let csr = Csr::new_p256(&[PRIMARY_NAME])?;

    // Submit the CSR. This causes the ACME provider to enter a
    // state of "processing" that must be polled until the
    // certificate is either issued or rejected.
    let mut order = orders.finalize(&order, csr.der()).await?;

    while order.status() == OrderStatus::Processing {
        tokio::time::sleep(Duration::from_secs(5)).await;
        orders.refresh(&mut order).await?;
    }

    // Finally download the certificate.
    let chain = client.certificates().download(&order).await?;
    println!("{}", chain.concat());
    println!("{}", csr.private_key_pem());

    // Stop temporary server for ACME challenge
    srv_handle.stop(true).await;
    srv_task.await??;

    // Delete acme-challenge dir
    fs::remove_dir_all("./acme-challenge")?;

    Ok(())
}
