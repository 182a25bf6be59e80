//! Recurring snapshot and backup schedules of a storage.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, Resource, ResourceKind, Updatable};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSchedule {
    pub object_uuid: String,
    pub name: String,
    pub storage_uuid: String,
    /// Minutes between runs.
    pub run_interval: u32,
    pub keep_snapshots: u32,
    pub next_runtime: Timestamp,
    pub labels: Vec<String>,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateSnapshotSchedule {
    pub name: String,
    pub run_interval: u32,
    pub keep_snapshots: u32,
    /// First run; the server picks one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_runtime: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateSnapshotSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_snapshots: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_runtime: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSchedule {
    pub object_uuid: String,
    pub name: String,
    pub storage_uuid: String,
    pub active: bool,
    /// Minutes between runs.
    pub run_interval: u32,
    pub keep_backups: u32,
    pub next_runtime: Timestamp,
    pub backup_location_uuid: String,
    pub backup_location_name: String,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateBackupSchedule {
    pub name: String,
    pub run_interval: u32,
    pub keep_backups: u32,
    pub next_runtime: Timestamp,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_location_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateBackupSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_backups: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_runtime: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for SnapshotSchedule {
    const KIND: ResourceKind =
        ResourceKind::object("snapshot_schedules", "snapshot_schedules", "snapshot_schedule")
            .nested_under("/objects/storages")
            .without_status();
}

impl Creatable for SnapshotSchedule {
    type Create = CreateSnapshotSchedule;
}

impl Updatable for SnapshotSchedule {
    type Update = UpdateSnapshotSchedule;
}

impl Deletable for SnapshotSchedule {}

impl Resource for BackupSchedule {
    const KIND: ResourceKind = ResourceKind::object(
        "backup_schedules",
        "schedule_storage_backups",
        "schedule_storage_backup",
    )
    .nested_under("/objects/storages")
    .without_status();
}

impl Creatable for BackupSchedule {
    type Create = CreateBackupSchedule;
}

impl Updatable for BackupSchedule {
    type Update = UpdateBackupSchedule;
}

impl Deletable for BackupSchedule {}

impl Client {
    /// Snapshot schedules of one storage.
    pub fn snapshot_schedules(&self, storage_id: &str) -> Resources<'_, SnapshotSchedule> {
        Resources::nested(self, storage_id)
    }

    /// Backup schedules of one storage.
    pub fn backup_schedules(&self, storage_id: &str) -> Resources<'_, BackupSchedule> {
        Resources::nested(self, storage_id)
    }
}
