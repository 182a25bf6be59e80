//! # gsclient - a client for the gridscale cloud API
//!
//! `gsclient` lets application code create, inspect, update and delete
//! gridscale resources (servers, storages, networks, IPs, firewalls, load
//! balancers, SSH keys, certificates, ISO images, templates, snapshots and
//! their schedules, PaaS services, marketplace applications, object-storage
//! keys, labels) and query usage, without handling HTTP or JSON itself.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gsclient::{Client, Config, Context};
//! use gsclient::resources::firewall::{CreateFirewall, FirewallRules};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gsclient::Error> {
//!     let config = Config::builder("user-uuid", "api-token").sync(true).build()?;
//!     let client = Client::new(config);
//!     let ctx = Context::background();
//!
//!     // Returns once the firewall is active, because sync mode is on.
//!     let created = client
//!         .firewalls()
//!         .create(&ctx, &CreateFirewall {
//!             name: "web".to_string(),
//!             rules: FirewallRules::default(),
//!             labels: None,
//!         })
//!         .await?;
//!     println!("firewall {} (request {})", created.object_uuid, created.request_uuid);
//!
//!     for server in client.servers().list(&ctx).await? {
//!         println!("{} is {}", server.name, server.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## How calls complete
//!
//! The API applies mutations asynchronously: a successful `POST`, `PATCH` or
//! `DELETE` only returns a request UUID. With [`ConfigBuilder::sync`]
//! enabled, every mutating call blocks until the effect is observable, by
//! polling the request-status endpoint, the resource itself (until it is
//! `active`), or the resource URL (until it answers 404). Polls are spaced
//! by the configured delay interval and bounded by the request-check
//! timeout.
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`] exposing an [`ErrorCategory`], the HTTP
//! status and the server request UUID:
//!
//! ```no_run
//! use gsclient::{Client, Context, ErrorCategory};
//!
//! # async fn example(client: Client) -> Result<(), gsclient::Error> {
//! let ctx = Context::background();
//! match client.servers().get(&ctx, "690de890-13c0-4e76-8a01-e10ba8786e53").await {
//!     Ok(server) => println!("{}", server.name),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) if e.category() == ErrorCategory::Transport => {
//!         eprintln!("network trouble: {e}");
//!     }
//!     Err(e) => eprintln!("request {:?} failed: {e}", e.request_uuid()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! Transport failures and 5xx responses are retried up to
//! `max_number_of_retries` times, `delay_interval` apart; 4xx responses are
//! never retried. Retries include `POST` and `PATCH`: the API deduplicates
//! in-flight mutations by its own request UUID.

macro_rules! log_event {
    ($config:expr, $level:ident, $($arg:tt)+) => {
        if tracing::Level::$level <= $config.log_level() {
            tracing::event!(tracing::Level::$level, $($arg)+);
        }
    };
}

mod client;
pub mod codec;
pub mod config;
mod context;
mod error;
pub mod poll;
pub mod rate_limit;
pub mod request;
pub mod resource;
pub mod resources;
mod response;
pub mod retry;
pub mod types;
mod waiter;

pub use client::{Client, REQUEST_UUID_HEADER};
pub use codec::Timestamp;
pub use config::{Config, ConfigBuilder};
pub use context::Context;
pub use error::{Error, ErrorCategory, Result};
pub use resource::{CreateResponse, Resources};
pub use response::Response;
pub use retry::{RetryPredicate, RetryStrategy};
pub use waiter::{RequestStatus, Waiter};
