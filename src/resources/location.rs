//! Data-center locations. Read-only.

use crate::codec::Timestamp;
use crate::resource::{Resource, ResourceKind};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub object_uuid: String,
    pub name: String,
    /// Airport code of the nearest city, e.g. `fra`.
    pub iata: String,
    pub country: String,
    pub status: String,
    pub labels: Vec<String>,
    pub product_no: u64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

impl Resource for Location {
    const KIND: ResourceKind = ResourceKind::object("/objects/locations", "locations", "location");
}

impl Client {
    pub fn locations(&self) -> Resources<'_, Location> {
        Resources::new(self)
    }
}
