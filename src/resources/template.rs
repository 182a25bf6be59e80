//! Operating system templates, public or made from snapshots.

use crate::codec::Timestamp;
use crate::resource::{
    Creatable, Deletable, HasEvents, ListDeleted, Listing, Located, Resource, ResourceKind,
    Updatable,
};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub ostype: String,
    pub version: String,
    pub distro: String,
    pub description: String,
    /// Size in GB.
    pub capacity: u64,
    pub private: bool,
    pub license_product_no: u64,
    pub location_uuid: String,
    pub location_name: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

/// A private template made from a storage snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTemplate {
    pub name: String,
    pub snapshot_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Template {
    const KIND: ResourceKind = ResourceKind::object("/objects/templates", "templates", "template");
}

impl Creatable for Template {
    type Create = CreateTemplate;
}

impl Updatable for Template {
    type Update = UpdateTemplate;
}

impl Deletable for Template {}
impl HasEvents for Template {}
impl Located for Template {}

impl ListDeleted for Template {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/templates",
        list_key: "deleted_templates",
    };
}

impl Client {
    pub fn templates(&self) -> Resources<'_, Template> {
        Resources::new(self)
    }
}
