//! SSH public keys for template installs.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, HasEvents, Resource, ResourceKind, Updatable};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    /// The public key in OpenSSH format.
    pub sshkey: String,
    pub labels: Vec<String>,
    pub user_uuid: String,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateSshKey {
    pub name: String,
    pub sshkey: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSshKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sshkey: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for SshKey {
    const KIND: ResourceKind = ResourceKind::object("/objects/sshkeys", "sshkeys", "sshkey");
}

impl Creatable for SshKey {
    type Create = CreateSshKey;
}

impl Updatable for SshKey {
    type Update = UpdateSshKey;
}

impl Deletable for SshKey {}
impl HasEvents for SshKey {}

impl Client {
    pub fn sshkeys(&self) -> Resources<'_, SshKey> {
        Resources::new(self)
    }
}
