//! Creates a firewall in sync mode, shows its events, and deletes it again.
//!
//! Needs `GRIDSCALE_UUID` and `GRIDSCALE_TOKEN`; `GRIDSCALE_URL` is optional.
//!
//! Run with: `cargo run --example sync_create`

use gsclient::resources::firewall::{CreateFirewall, FirewallRule, FirewallRules};
use gsclient::{Client, Config, Context, Error, ErrorCategory};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("gsclient=debug,sync_create=info")
        .init();

    let config = Config::from_env()?
        .sync(true)
        .log_level(LevelFilter::DEBUG)
        .request_check_timeout(Duration::from_secs(120))
        .build()?;
    let client = Client::new(config);

    // Ctrl-C cancels whatever wait is in progress.
    let ctx = Context::background();
    let on_interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let firewall = CreateFirewall {
        name: "demo-web".to_string(),
        rules: FirewallRules {
            rules_v4_in: Some(vec![FirewallRule {
                order: 1,
                action: "accept".to_string(),
                protocol: Some("tcp".to_string()),
                dst_port: Some("443".to_string()),
                comment: Some("https".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        },
        labels: Some(vec!["demo".to_string()]),
    };

    let created = match client.firewalls().create(&ctx, &firewall).await {
        Ok(created) => created,
        Err(e) if e.category() == ErrorCategory::Timeout => {
            eprintln!("firewall was accepted but is not active yet: {e}");
            return Err(e);
        }
        Err(e) => return Err(e),
    };
    println!("firewall {} is active", created.object_uuid);

    for event in client.firewalls().list_events(&ctx, &created.object_uuid).await? {
        println!("  {} {} ({})", event.timestamp, event.change, event.request_status);
    }

    client.firewalls().delete(&ctx, &created.object_uuid).await?;
    println!("firewall {} deleted", created.object_uuid);

    Ok(())
}
