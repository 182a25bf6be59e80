//! IPv4 and IPv6 addresses.

use crate::codec::Timestamp;
use crate::resource::{
    Creatable, Deletable, HasEvents, ListDeleted, Listing, Located, Resource, ResourceKind,
    Updatable,
};
use crate::types::IpAddressFamily;
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ip {
    pub object_uuid: String,
    pub name: String,
    pub ip: String,
    pub prefix: String,
    /// 4 or 6; convert with [`IpAddressFamily::try_from`].
    pub family: u8,
    pub status: String,
    pub failover: bool,
    pub reverse_dns: String,
    pub delete_block: bool,
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
pub struct CreateIp {
    pub family: IpAddressFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_dns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateIp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover: Option<bool>,
    /// `Some(None)` restores the provider's default reverse DNS name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_dns: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Ip {
    const KIND: ResourceKind = ResourceKind::object("/objects/ips", "ips", "ip");
}

impl Creatable for Ip {
    type Create = CreateIp;
}

impl Updatable for Ip {
    type Update = UpdateIp;
}

impl Deletable for Ip {}
impl HasEvents for Ip {}
impl Located for Ip {}

impl ListDeleted for Ip {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/ips",
        list_key: "deleted_ips",
    };
}

impl Client {
    pub fn ips(&self) -> Resources<'_, Ip> {
        Resources::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_sends_family_as_integer() {
        let body = CreateIp {
            family: IpAddressFamily::V6,
            name: None,
            location_uuid: None,
            failover: Some(true),
            reverse_dns: None,
            labels: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"family": 6, "failover": true})
        );
    }
}
