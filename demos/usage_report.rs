//! Prints last week's usage of the current project: servers per day, then
//! every resource type.
//!
//! Needs `GRIDSCALE_UUID` and `GRIDSCALE_TOKEN`; `GRIDSCALE_URL` is optional.
//!
//! Run with: `cargo run --example usage_report`

use gsclient::resources::usage::{UsageCategory, UsageQuery, UsageScope};
use gsclient::types::UsageInterval;
use gsclient::{Client, Config, Context, Error, Timestamp};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("gsclient=info,usage_report=info")
        .init();

    let config = Config::from_env()?
        .max_number_of_retries(3)
        .exponential_backoff(Duration::from_secs(8), true)
        .build()?;
    let client = Client::new(config);

    let ctx = Context::background().with_timeout(Duration::from_secs(60));
    let query = UsageQuery {
        from_time: Timestamp::new(chrono::Utc::now() - chrono::Duration::days(7)),
        interval_variable: Some(UsageInterval::Day),
        ..Default::default()
    };

    let report = client
        .usage(&ctx, UsageScope::Project, UsageCategory::Servers, &query)
        .await?;
    println!("{report:#}");

    let all = client
        .usage(&ctx, UsageScope::Project, UsageCategory::All, &query)
        .await?;
    println!("{all:#}");

    Ok(())
}
