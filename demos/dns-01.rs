use std::{io, time::Duration};

use acme::{api::ChallengeType, api::OrderStatus, Client, Csr, DirectoryUrl};

const PRIMARY_NAME: &str = "example.org";
const WILDCARD_NAME: &str = "*.example.org";

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let client = Client::fetch(DirectoryUrl::LetsEncryptStaging).await?;
    client.account().create(["foo@bar.com"], true).await?;

    // Wildcard names can only be validated over DNS.
    let orders = client.orders();
    let order = orders
        .create([PRIMARY_NAME, WILDCARD_NAME], None, None)
        .await?;

    let challenges = orders
        .describe_pending_challenges(&order, ChallengeType::Dns01)
        .await?;

    // Both names share the same record name, so the DNS zone ends up
    // with two TXT values for it.
    println!("Create these TXT records:");
    for challenge in &challenges {
        println!("  {} TXT \"{}\"", challenge.endpoint, challenge.value);
    }

    println!("Press enter once the records are published.");
    io::stdin().read_line(&mut String::new())?;

    for challenge in &challenges {
        orders.validate_challenge(&challenge.url).await?;
    }

    let failed = orders.wait(&order, Duration::from_secs(300)).await?;
    for authz in &failed {
        log::error!(
            "{} is {:?}: {:?}",
            authz.identifier.value,
            authz.status,
            authz.challenges.iter().find_map(|c| c.error.as_ref())
        );
    }
    if !failed.is_empty() {
        eyre::bail!("{} authorizations failed", failed.len());
    }

    let csr = Csr::new_p256(&[PRIMARY_NAME, WILDCARD_NAME])?;
    let mut order = orders.finalize(&order, csr.der()).await?;

    while order.status() == OrderStatus::Processing {
        tokio::time::sleep(Duration::from_secs(5)).await;
        orders.refresh(&mut order).await?;
    }

    for cert in client.certificates().download(&order).await? {
        print!("{cert}");
    }

    Ok(())
}
