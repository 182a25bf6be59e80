//! Private and public networks.

use crate::codec::Timestamp;
use crate::resource::{
    Creatable, Deletable, HasEvents, ListDeleted, Listing, Located, Relation, Resource,
    ResourceKind, Updatable,
};
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub l2security: bool,
    /// `true` for the provider's shared internet uplink.
    pub public_net: bool,
    pub network_type: String,
    pub delete_block: bool,
    pub location_uuid: String,
    pub location_name: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub dhcp_active: bool,
    pub dhcp_range: Option<String>,
    pub dhcp_gateway: Option<String>,
    pub dhcp_dns: Option<String>,
    pub relations: NetworkRelations,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRelations {
    pub servers: Vec<NetworkServer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkServer {
    pub object_uuid: String,
    pub object_name: String,
    pub mac: String,
    pub bootdevice: bool,
    pub ordering: u32,
    pub l3security: Vec<String>,
    pub create_time: Timestamp,
}

/// A server given a fixed DHCP address in a network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinnedServer {
    pub server_uuid: String,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateNetwork {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2security: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateNetwork {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2security: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_active: Option<bool>,
    /// `Some(None)` removes the range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dhcp_range: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Serialize)]
struct PinIp<'a> {
    ip: &'a str,
}

const PINNED_SERVERS: Relation = Relation {
    path: "pinned_servers",
    list_key: "pin_servers",
    item_key: "pin_server",
};

impl Resource for Network {
    const KIND: ResourceKind = ResourceKind::object("/objects/networks", "networks", "network");
}

impl Creatable for Network {
    type Create = CreateNetwork;
}

impl Updatable for Network {
    type Update = UpdateNetwork;
}

impl Deletable for Network {}
impl HasEvents for Network {}
impl Located for Network {}

impl ListDeleted for Network {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/networks",
        list_key: "deleted_networks",
    };
}

impl Client {
    pub fn networks(&self) -> Resources<'_, Network> {
        Resources::new(self)
    }
}

impl Resources<'_, Network> {
    /// Returns the public network, if the project has access to one.
    pub async fn get_public(&self, ctx: &Context) -> Result<Option<Network>> {
        Ok(self
            .list(ctx)
            .await?
            .into_iter()
            .find(|network| network.public_net))
    }

    pub async fn list_pinned_servers(&self, ctx: &Context, id: &str) -> Result<Vec<PinnedServer>> {
        self.list_related(ctx, id, &PINNED_SERVERS).await
    }

    /// Pins `server_id` to `ip` in the network's DHCP range.
    pub async fn pin_server(&self, ctx: &Context, id: &str, server_id: &str, ip: &str) -> Result<()> {
        self.update_related(ctx, id, &PINNED_SERVERS, server_id, &PinIp { ip })
            .await
    }

    pub async fn unpin_server(&self, ctx: &Context, id: &str, server_id: &str) -> Result<()> {
        self.delete_related(ctx, id, &PINNED_SERVERS, server_id).await
    }
}
