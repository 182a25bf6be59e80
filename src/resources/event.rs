//! Account-wide and per-object event log.

use crate::codec::Timestamp;
use crate::resource::{Resource, ResourceKind};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

/// One entry of the event log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub object_type: String,
    pub request_uuid: String,
    pub object_uuid: String,
    pub activity: String,
    pub request_type: String,
    pub request_status: String,
    /// Free-text description of what changed.
    pub change: String,
    pub timestamp: Timestamp,
    pub user_uuid: String,
    pub initiator: String,
}

impl Resource for Event {
    const KIND: ResourceKind = ResourceKind::object("/objects/events", "events", "event");
}

impl Client {
    /// Events of all objects in the project.
    pub fn events(&self) -> Resources<'_, Event> {
        Resources::new(self)
    }
}
