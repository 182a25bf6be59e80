//! Storage snapshots, nested under their storage.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::resource::{
    Creatable, Deletable, ListDeleted, Listing, Resource, ResourceKind, Updatable,
};
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    /// Size in GB.
    pub capacity: u64,
    pub parent_uuid: String,
    pub location_uuid: String,
    pub location_name: String,
    pub labels: Vec<String>,
    pub usage_in_minutes: u64,
    pub current_price: f64,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Credentials of the S3 endpoint a snapshot is exported to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct S3Auth {
    pub host: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Where the exported image is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct S3Data {
    pub host: String,
    pub bucket: String,
    pub filename: String,
    pub private: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportSnapshot {
    pub s3auth: S3Auth,
    pub s3data: S3Data,
}

#[derive(Serialize)]
struct Rollback {
    rollback: bool,
}

impl Resource for Snapshot {
    const KIND: ResourceKind = ResourceKind::object("snapshots", "snapshots", "snapshot")
        .nested_under("/objects/storages");
}

impl Creatable for Snapshot {
    type Create = CreateSnapshot;
}

impl Updatable for Snapshot {
    type Update = UpdateSnapshot;
}

impl Deletable for Snapshot {}

impl ListDeleted for Snapshot {
    const DELETED: Listing = Listing {
        path: "/objects/deleted/snapshots",
        list_key: "deleted_snapshots",
    };
}

impl Client {
    /// Snapshots of one storage.
    pub fn snapshots(&self, storage_id: &str) -> Resources<'_, Snapshot> {
        Resources::nested(self, storage_id)
    }
}

impl Resources<'_, Snapshot> {
    /// Resets the storage to the state captured in the snapshot.
    pub async fn rollback(&self, ctx: &Context, id: &str) -> Result<()> {
        let path = self.object_path(id)?;
        let request = Request::patch(format!("{path}/rollback"), &Rollback { rollback: true })?;
        self.client().act(ctx, request).await.map(drop)
    }

    /// Writes the snapshot as an image to an S3 bucket.
    pub async fn export_to_s3(&self, ctx: &Context, id: &str, export: &ExportSnapshot) -> Result<()> {
        let path = self.object_path(id)?;
        let request = Request::patch(format!("{path}/export_to_s3"), export)?;
        self.client().act(ctx, request).await.map(drop)
    }
}
