//! ISO images, downloaded from a URL and attachable to servers.

use crate::codec::Timestamp;
use crate::resource::{
    Creatable, Deletable, HasEvents, ListDeleted, Listing, Located, Resource, ResourceKind,
    Updatable,
};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoImage {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub source_url: String,
    pub description: String,
    pub version: String,
    /// Size in GB.
    pub capacity: u64,
    pub private: bool,
    pub location_uuid: String,
    pub location_name: String,
    pub location_iata: String,
    pub labels: Vec<String>,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateIsoImage {
    pub name: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateIsoImage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for IsoImage {
    const KIND: ResourceKind = ResourceKind::object("/objects/isoimages", "isoimages", "isoimage");
}

impl Creatable for IsoImage {
    type Create = CreateIsoImage;
}

impl Updatable for IsoImage {
    type Update = UpdateIsoImage;
}

impl Deletable for IsoImage {}
impl HasEvents for IsoImage {}
impl Located for IsoImage {}

impl ListDeleted for IsoImage {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/isoimages",
        list_key: "deleted_isoimages",
    };
}

impl Client {
    pub fn isoimages(&self) -> Resources<'_, IsoImage> {
        Resources::new(self)
    }
}
