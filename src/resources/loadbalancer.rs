//! Layer 4/7 load balancers.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, HasEvents, Resource, ResourceKind, Updatable};
use crate::types::LoadbalancerAlgorithm;
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardingRule {
    /// Hostname for the Let's Encrypt certificate, when terminating TLS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letsencrypt_ssl: Option<String>,
    /// UUID of an uploaded certificate, when terminating TLS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_uuid: Option<String>,
    /// `http` or `tcp`.
    pub mode: String,
    pub listen_port: u16,
    pub target_port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendServer {
    pub weight: u32,
    /// IP address or hostname.
    pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadbalancer {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    /// A [`LoadbalancerAlgorithm`] name; values this client does not know
    /// are kept as sent.
    pub algorithm: String,
    pub redirect_http_to_https: bool,
    pub listen_ipv4_uuid: String,
    pub listen_ipv6_uuid: String,
    pub forwarding_rules: Vec<ForwardingRule>,
    pub backend_servers: Vec<BackendServer>,
    pub location_uuid: String,
    pub location_name: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLoadbalancer {
    pub name: String,
    pub algorithm: LoadbalancerAlgorithm,
    pub listen_ipv4_uuid: String,
    pub listen_ipv6_uuid: String,
    pub redirect_http_to_https: bool,
    pub forwarding_rules: Vec<ForwardingRule>,
    pub backend_servers: Vec<BackendServer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateLoadbalancer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<LoadbalancerAlgorithm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_ipv4_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_ipv6_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_http_to_https: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding_rules: Option<Vec<ForwardingRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_servers: Option<Vec<BackendServer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Loadbalancer {
    const KIND: ResourceKind =
        ResourceKind::object("/objects/loadbalancers", "loadbalancers", "loadbalancer");
}

impl Creatable for Loadbalancer {
    type Create = CreateLoadbalancer;
}

impl Updatable for Loadbalancer {
    type Update = UpdateLoadbalancer;
}

impl Deletable for Loadbalancer {}
impl HasEvents for Loadbalancer {}

impl Client {
    pub fn loadbalancers(&self) -> Resources<'_, Loadbalancer> {
        Resources::new(self)
    }
}
