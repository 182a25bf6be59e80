//! Labels, identified by their text rather than a UUID.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, Resource, ResourceKind};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub label: String,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
    /// Objects carrying this label, grouped by type.
    pub relations: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLabel {
    pub label: String,
}

impl Resource for Label {
    const KIND: ResourceKind = ResourceKind::object("/objects/labels", "labels", "label")
        .freeform()
        .without_status();
}

impl Creatable for Label {
    type Create = CreateLabel;
}

impl Deletable for Label {}

impl Client {
    pub fn labels(&self) -> Resources<'_, Label> {
        Resources::new(self)
    }
}
