//! Servers, their power state, their relations to storages, networks, IPs
//! and ISO images, and their metrics.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::resource::{
    validate_id, Creatable, Deletable, HasEvents, IdKind, ListDeleted, Listing, Located, Relation,
    Resource, ResourceKind, Updatable,
};
use crate::types::ServerHardwareProfile;
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub cores: u32,
    /// Memory in GB.
    pub memory: u32,
    pub power: bool,
    /// A [`ServerHardwareProfile`] name; values this client does not know
    /// are kept as sent.
    pub hardware_profile: String,
    pub availability_zone: Option<String>,
    pub auto_recovery: bool,
    pub legacy: bool,
    pub console_token: String,
    pub location_uuid: String,
    pub location_name: String,
    pub location_country: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub usage_in_minutes_memory: u64,
    pub usage_in_minutes_cores: u64,
    pub current_price: f64,
    pub relations: ServerRelations,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerRelations {
    pub storages: Vec<ServerStorage>,
    pub networks: Vec<ServerNetwork>,
    pub public_ips: Vec<ServerIp>,
    pub isoimages: Vec<ServerIsoImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStorage {
    pub object_uuid: String,
    pub object_name: String,
    pub capacity: u64,
    pub storage_type: String,
    pub bootdevice: bool,
    pub bus: u32,
    pub controller: u32,
    pub target: u32,
    pub lun: u32,
    pub last_used_template: String,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerNetwork {
    pub object_uuid: String,
    pub network_uuid: String,
    pub object_name: String,
    pub mac: String,
    pub bootdevice: bool,
    pub ordering: u32,
    pub public_net: bool,
    pub l2security: bool,
    pub l3security: Vec<String>,
    pub firewall_template_uuid: String,
    pub network_type: String,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerIp {
    pub ip: String,
    pub ipaddr_uuid: String,
    pub object_uuid: String,
    pub prefix: String,
    pub family: u8,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerIsoImage {
    pub object_uuid: String,
    pub object_name: String,
    pub bootdevice: bool,
    pub private: bool,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateServer {
    pub name: String,
    pub cores: u32,
    pub memory: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<ServerHardwareProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_recovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateServer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<ServerHardwareProfile>,
    /// `Some(None)` moves the server back to automatic placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_recovery: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// A value with its unit, as reported in metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerMetric {
    pub begin_time: Timestamp,
    pub end_time: Timestamp,
    pub object_uuid: String,
    pub core_usage: Measurement,
    pub storage_size: Measurement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkStorage {
    pub object_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootdevice: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateStorageLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootdevice: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkNetwork {
    pub object_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootdevice: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l3security: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_template_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateNetworkLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootdevice: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l3security: Option<Vec<String>>,
    /// `Some(None)` removes the firewall template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall_template_uuid: Option<Option<String>>,
}

#[derive(Serialize)]
struct LinkObject<'a> {
    object_uuid: &'a str,
}

#[derive(Serialize)]
struct Power {
    power: bool,
}

const STORAGES: Relation = Relation {
    path: "storages",
    list_key: "server_relations",
    item_key: "server_relation",
};

const NETWORKS: Relation = Relation {
    path: "networks",
    list_key: "server_relations",
    item_key: "server_relation",
};

const IPS: Relation = Relation {
    path: "ips",
    list_key: "server_relations",
    item_key: "server_relation",
};

const ISOIMAGES: Relation = Relation {
    path: "isoimages",
    list_key: "server_relations",
    item_key: "server_relation",
};

const METRICS: Relation = Relation {
    path: "metrics",
    list_key: "server_metrics",
    item_key: "server_metric",
};

impl Resource for Server {
    const KIND: ResourceKind = ResourceKind::object("/objects/servers", "servers", "server");
}

impl Creatable for Server {
    type Create = CreateServer;
}

impl Updatable for Server {
    type Update = UpdateServer;
}

impl Deletable for Server {}
impl HasEvents for Server {}
impl Located for Server {}

impl ListDeleted for Server {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/servers",
        list_key: "deleted_servers",
    };
}

impl Client {
    pub fn servers(&self) -> Resources<'_, Server> {
        Resources::new(self)
    }
}

impl Resources<'_, Server> {
    /// Starts the server. Does nothing if it is already running.
    ///
    /// In sync mode, returns once the server reports `power: true`.
    pub async fn power_on(&self, ctx: &Context, id: &str) -> Result<()> {
        self.set_power(ctx, id, true).await
    }

    /// Cuts the power of the server. Does nothing if it is already off.
    pub async fn power_off(&self, ctx: &Context, id: &str) -> Result<()> {
        self.set_power(ctx, id, false).await
    }

    async fn set_power(&self, ctx: &Context, id: &str, power: bool) -> Result<()> {
        if self.get(ctx, id).await?.power == power {
            return Ok(());
        }
        let path = self.object_path(id)?;
        let request = Request::patch(format!("{path}/power"), &Power { power })?.skip_checking_request();
        self.client().act(ctx, request).await?;
        self.wait_for_power(ctx, &path, power).await
    }

    /// Asks the operating system to shut down (ACPI). Does nothing if the
    /// server is already off.
    ///
    /// In sync mode, returns once the server reports `power: false`.
    pub async fn shutdown(&self, ctx: &Context, id: &str) -> Result<()> {
        if !self.get(ctx, id).await?.power {
            return Ok(());
        }
        let path = self.object_path(id)?;
        let request = Request::patch(format!("{path}/shutdown"), &serde_json::json!({}))?
            .skip_checking_request();
        self.client().act(ctx, request).await?;
        self.wait_for_power(ctx, &path, false).await
    }

    async fn wait_for_power(&self, ctx: &Context, path: &str, power: bool) -> Result<()> {
        let client = self.client();
        if !client.config().sync() {
            return Ok(());
        }
        client
            .wait_for_property(ctx, path, Server::KIND.item_key, "power", power)
            .await
    }

    pub async fn list_metrics(&self, ctx: &Context, id: &str) -> Result<Vec<ServerMetric>> {
        self.list_related(ctx, id, &METRICS).await
    }

    pub async fn list_storages(&self, ctx: &Context, id: &str) -> Result<Vec<ServerStorage>> {
        self.list_related(ctx, id, &STORAGES).await
    }

    pub async fn get_storage(&self, ctx: &Context, id: &str, storage_id: &str) -> Result<ServerStorage> {
        self.get_related(ctx, id, &STORAGES, storage_id).await
    }

    pub async fn link_storage(&self, ctx: &Context, id: &str, link: &LinkStorage) -> Result<()> {
        validate_id(IdKind::Uuid, &link.object_uuid)?;
        self.create_related(ctx, id, &STORAGES, link).await
    }

    pub async fn update_storage(
        &self,
        ctx: &Context,
        id: &str,
        storage_id: &str,
        update: &UpdateStorageLink,
    ) -> Result<()> {
        self.update_related(ctx, id, &STORAGES, storage_id, update).await
    }

    pub async fn unlink_storage(&self, ctx: &Context, id: &str, storage_id: &str) -> Result<()> {
        self.delete_related(ctx, id, &STORAGES, storage_id).await
    }

    pub async fn list_networks(&self, ctx: &Context, id: &str) -> Result<Vec<ServerNetwork>> {
        self.list_related(ctx, id, &NETWORKS).await
    }

    pub async fn get_network(&self, ctx: &Context, id: &str, network_id: &str) -> Result<ServerNetwork> {
        self.get_related(ctx, id, &NETWORKS, network_id).await
    }

    pub async fn link_network(&self, ctx: &Context, id: &str, link: &LinkNetwork) -> Result<()> {
        validate_id(IdKind::Uuid, &link.object_uuid)?;
        self.create_related(ctx, id, &NETWORKS, link).await
    }

    pub async fn update_network(
        &self,
        ctx: &Context,
        id: &str,
        network_id: &str,
        update: &UpdateNetworkLink,
    ) -> Result<()> {
        self.update_related(ctx, id, &NETWORKS, network_id, update).await
    }

    pub async fn unlink_network(&self, ctx: &Context, id: &str, network_id: &str) -> Result<()> {
        self.delete_related(ctx, id, &NETWORKS, network_id).await
    }

    pub async fn list_ips(&self, ctx: &Context, id: &str) -> Result<Vec<ServerIp>> {
        self.list_related(ctx, id, &IPS).await
    }

    pub async fn get_ip(&self, ctx: &Context, id: &str, ip_id: &str) -> Result<ServerIp> {
        self.get_related(ctx, id, &IPS, ip_id).await
    }

    pub async fn link_ip(&self, ctx: &Context, id: &str, ip_id: &str) -> Result<()> {
        validate_id(IdKind::Uuid, ip_id)?;
        self.create_related(ctx, id, &IPS, &LinkObject { object_uuid: ip_id })
            .await
    }

    pub async fn unlink_ip(&self, ctx: &Context, id: &str, ip_id: &str) -> Result<()> {
        self.delete_related(ctx, id, &IPS, ip_id).await
    }

    pub async fn list_isoimages(&self, ctx: &Context, id: &str) -> Result<Vec<ServerIsoImage>> {
        self.list_related(ctx, id, &ISOIMAGES).await
    }

    pub async fn get_isoimage(&self, ctx: &Context, id: &str, isoimage_id: &str) -> Result<ServerIsoImage> {
        self.get_related(ctx, id, &ISOIMAGES, isoimage_id).await
    }

    pub async fn link_isoimage(&self, ctx: &Context, id: &str, isoimage_id: &str) -> Result<()> {
        validate_id(IdKind::Uuid, isoimage_id)?;
        self.create_related(ctx, id, &ISOIMAGES, &LinkObject { object_uuid: isoimage_id })
            .await
    }

    pub async fn unlink_isoimage(&self, ctx: &Context, id: &str, isoimage_id: &str) -> Result<()> {
        self.delete_related(ctx, id, &ISOIMAGES, isoimage_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_decodes_partial_body() {
        let server: Server = serde_json::from_value(json!({
            "object_uuid": "690de890-13c0-4e76-8a01-e10ba8786e53",
            "name": "web-1",
            "power": true,
            "hardware_profile": "q35",
            "relations": {"storages": [{"object_uuid": "s1", "bootdevice": true}]}
        }))
        .unwrap();

        assert!(server.power);
        assert_eq!(
            server.hardware_profile.parse::<ServerHardwareProfile>().unwrap(),
            ServerHardwareProfile::Q35
        );
        assert!(server.relations.storages[0].bootdevice);
        assert!(server.create_time.is_zero());
    }

    #[test]
    fn test_update_clears_availability_zone_with_null() {
        let update = UpdateServer {
            availability_zone: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"availability_zone": null})
        );
    }
}
