//! Platform services (databases, caches, ...), their templates and
//! security zones.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::resource::{
    Creatable, Deletable, ListDeleted, Listing, Relation, Resource, ResourceKind, Updatable,
};
use crate::resources::server::Measurement;
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimit {
    pub resource: String,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaaSService {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub credentials: Vec<Credential>,
    /// Ports per network, keyed by network UUID.
    pub listen_ports: Map<String, Value>,
    pub security_zone_uuid: String,
    pub service_template_uuid: String,
    pub parameters: Map<String, Value>,
    pub resource_limits: Vec<ResourceLimit>,
    pub labels: Vec<String>,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreatePaaSService {
    pub name: String,
    pub paas_service_template_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paas_security_zone_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<Vec<ResourceLimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePaaSService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_limits: Option<Vec<ResourceLimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaaSServiceMetric {
    pub begin_time: Timestamp,
    pub end_time: Timestamp,
    pub paas_service_uuid: String,
    pub core_usage: Measurement,
    pub storage_size: Measurement,
}

/// A service flavour that PaaS services are created from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaaSTemplate {
    pub object_uuid: String,
    pub name: String,
    pub category: String,
    pub product_no: u64,
    pub flavour: String,
    pub version: String,
    pub release: String,
    /// Accepted parameters and their schema.
    pub parameters_schema: Map<String, Value>,
    pub labels: Vec<String>,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaaSSecurityZone {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub location_uuid: String,
    pub location_name: String,
    pub labels: Vec<String>,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreatePaaSSecurityZone {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePaaSSecurityZone {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

const METRICS: Relation = Relation {
    path: "metrics",
    list_key: "paas_service_metrics",
    item_key: "paas_service_metric",
};

impl Resource for PaaSService {
    const KIND: ResourceKind =
        ResourceKind::object("/objects/paas/services", "paas_services", "paas_service");
}

impl Creatable for PaaSService {
    type Create = CreatePaaSService;
}

impl Updatable for PaaSService {
    type Update = UpdatePaaSService;
}

impl Deletable for PaaSService {}

impl ListDeleted for PaaSService {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/paas_services",
        list_key: "deleted_paas_services",
    };
}

impl Resource for PaaSTemplate {
    const KIND: ResourceKind = ResourceKind::object(
        "/objects/paas/service_templates",
        "paas_service_templates",
        "paas_service_template",
    );
}

impl Resource for PaaSSecurityZone {
    const KIND: ResourceKind = ResourceKind::object(
        "/objects/paas/security_zones",
        "paas_security_zones",
        "paas_security_zone",
    )
    .without_status();
}

impl Creatable for PaaSSecurityZone {
    type Create = CreatePaaSSecurityZone;
}

impl Updatable for PaaSSecurityZone {
    type Update = UpdatePaaSSecurityZone;
}

impl Deletable for PaaSSecurityZone {}

impl Client {
    pub fn paas_services(&self) -> Resources<'_, PaaSService> {
        Resources::new(self)
    }

    pub fn paas_templates(&self) -> Resources<'_, PaaSTemplate> {
        Resources::new(self)
    }

    pub fn paas_security_zones(&self) -> Resources<'_, PaaSSecurityZone> {
        Resources::new(self)
    }
}

impl Resources<'_, PaaSService> {
    pub async fn list_metrics(&self, ctx: &Context, id: &str) -> Result<Vec<PaaSServiceMetric>> {
        self.list_related(ctx, id, &METRICS).await
    }

    /// Issues new credentials for the service, invalidating the old ones.
    pub async fn renew_credentials(&self, ctx: &Context, id: &str) -> Result<()> {
        let path = self.object_path(id)?;
        let request = Request::patch(format!("{path}/renew_credentials"), &serde_json::json!({}))?;
        self.client().act(ctx, request).await.map(drop)
    }
}
