//! Models and operations for each resource type.
//!
//! Each module declares its table entry through [`Resource`](crate::resource::Resource)
//! and adds an accessor to [`Client`](crate::Client), e.g. `client.servers()`.
//! Operations beyond plain CRUD (power, relations, metrics, actions) are
//! inherent methods on the matching [`Resources`](crate::Resources) handle.

pub mod certificate;
pub mod event;
pub mod firewall;
pub mod ip;
pub mod isoimage;
pub mod label;
pub mod loadbalancer;
pub mod location;
pub mod marketplace;
pub mod network;
pub mod objectstorage;
pub mod paas;
pub mod schedule;
pub mod server;
pub mod snapshot;
pub mod sshkey;
pub mod storage;
pub mod template;
pub mod usage;
