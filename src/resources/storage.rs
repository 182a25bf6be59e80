//! Block storages.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::resource::{
    Creatable, CreateResponse, Deletable, HasEvents, ListDeleted, Listing, Located, Resource,
    ResourceKind, Updatable,
};
use crate::types::{PasswordType, StorageType};
use crate::waiter::Waiter;
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    /// Size in GB.
    pub capacity: u64,
    /// A [`StorageType`] name; values this client does not know are kept as sent.
    pub storage_type: String,
    pub location_uuid: String,
    pub location_name: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub last_used_template: String,
    /// Storage this one was cloned from, if any.
    pub parent_uuid: String,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

/// Installs an operating system template on a new storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StorageTemplate {
    pub template_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_type: Option<PasswordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// UUIDs of SSH keys to install.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sshkeys: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateStorage {
    pub name: String,
    pub capacity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<StorageTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateStorage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Storages can only grow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<StorageType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Storage {
    const KIND: ResourceKind = ResourceKind::object("/objects/storages", "storages", "storage");
}

impl Creatable for Storage {
    type Create = CreateStorage;
}

impl Updatable for Storage {
    type Update = UpdateStorage;
}

impl Deletable for Storage {}
impl HasEvents for Storage {}
impl Located for Storage {}

impl ListDeleted for Storage {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/storages",
        list_key: "deleted_storages",
    };
}

impl Client {
    pub fn storages(&self) -> Resources<'_, Storage> {
        Resources::new(self)
    }
}

impl Resources<'_, Storage> {
    /// Creates a copy of a storage.
    ///
    /// In sync mode, returns once the copy is active.
    pub async fn clone_storage(&self, ctx: &Context, id: &str) -> Result<CreateResponse> {
        let path = self.object_path(id)?;
        let request = Request::post(format!("{path}/clone"), &serde_json::json!({}))?;
        self.client()
            .create_at(
                ctx,
                request,
                Waiter::RequestThenActive,
                Storage::KIND.path,
                Storage::KIND.item_key,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_with_template() {
        let body = CreateStorage {
            name: "root".into(),
            capacity: 10,
            storage_type: Some(StorageType::StorageHigh),
            template: Some(StorageTemplate {
                template_uuid: "4db64bfc-9fb2-4976-80b5-94ff43b1233a".into(),
                password_type: Some(PasswordType::Plain),
                password: Some("s3cret".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "root",
                "capacity": 10,
                "storage_type": "storage_high",
                "template": {
                    "template_uuid": "4db64bfc-9fb2-4976-80b5-94ff43b1233a",
                    "password": "s3cret",
                    "password_type": "plain"
                }
            })
        );
    }
}
