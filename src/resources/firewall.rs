//! Firewalls and their rule sets.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, HasEvents, Resource, ResourceKind, Updatable};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

/// A single packet filter rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    /// Evaluation order; lower runs first.
    pub order: i32,
    /// `accept` or `drop`.
    pub action: String,
    /// `tcp` or `udp`; all protocols when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dst_cidr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Rules per direction and address family. A direction left `None` is not
/// sent; `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_v4_in: Option<Vec<FirewallRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_v4_out: Option<Vec<FirewallRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_v6_in: Option<Vec<FirewallRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_v6_out: Option<Vec<FirewallRule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallNetwork {
    pub network_uuid: String,
    pub network_name: String,
    pub object_uuid: String,
    pub object_name: String,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRelations {
    pub networks: Vec<FirewallNetwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Firewall {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    /// `false` for the provider's predefined templates.
    pub private: bool,
    pub rules: FirewallRules,
    pub labels: Vec<String>,
    pub location_name: String,
    pub description: String,
    pub relations: FirewallRelations,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateFirewall {
    pub name: String,
    pub rules: FirewallRules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateFirewall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<FirewallRules>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Firewall {
    const KIND: ResourceKind = ResourceKind::object("/objects/firewalls", "firewalls", "firewall");
}

impl Creatable for Firewall {
    type Create = CreateFirewall;
}

impl Updatable for Firewall {
    type Update = UpdateFirewall;
}

impl Deletable for Firewall {}
impl HasEvents for Firewall {}

impl Client {
    pub fn firewalls(&self) -> Resources<'_, Firewall> {
        Resources::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_omits_unset_directions() {
        let body = CreateFirewall {
            name: "web".into(),
            rules: FirewallRules {
                rules_v4_in: Some(vec![FirewallRule {
                    order: 1,
                    action: "accept".into(),
                    protocol: Some("tcp".into()),
                    dst_port: Some("443".into()),
                    ..Default::default()
                }]),
                rules_v6_in: Some(vec![]),
                ..Default::default()
            },
            labels: None,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "web",
                "rules": {
                    "rules_v4_in": [{"order": 1, "action": "accept", "protocol": "tcp", "dst_port": "443"}],
                    "rules_v6_in": []
                }
            })
        );
    }
}
