//! Object-storage access keys and buckets.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, Resource, ResourceKind};
use crate::{Client, Context, Error, Resources, Result};
use http::StatusCode;
use serde::{Deserialize, Serialize};

const BUCKETS_PATH: &str = "/objects/objectstorages/buckets";

/// S3 credentials. Identified by the access key itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessKey {
    pub access_key: String,
    /// Only returned when the key is created.
    pub secret_key: String,
    pub user_uuid: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateAccessKey {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketUsage {
    pub current_usage_bytes: u64,
    pub number_of_objects: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bucket {
    pub name: String,
    pub usage: BucketUsage,
    pub create_time: Timestamp,
}

impl Resource for AccessKey {
    const KIND: ResourceKind = ResourceKind::object(
        "/objects/objectstorages/access_keys",
        "access_keys",
        "access_key",
    )
    .freeform()
    .without_status();
}

impl Creatable for AccessKey {
    type Create = CreateAccessKey;
}

impl Deletable for AccessKey {}

impl Client {
    pub fn access_keys(&self) -> Resources<'_, AccessKey> {
        Resources::new(self)
    }
}

impl Resources<'_, AccessKey> {
    /// Creates a key pair and returns it, secret included.
    pub async fn create_access_key(&self, ctx: &Context, body: &CreateAccessKey) -> Result<AccessKey> {
        let created = self.create(ctx, body).await?;
        let key = created
            .extra
            .get(AccessKey::KIND.item_key)
            .cloned()
            .unwrap_or_default();
        serde_json::from_value(key).map_err(|e| Error::Decode {
            url: AccessKey::KIND.path.to_string(),
            status: StatusCode::OK,
            serde_error: e.to_string(),
            body_prefix: String::new(),
            request_uuid: Some(created.request_uuid.clone()),
        })
    }

    /// Lists the buckets reachable with the account's keys.
    pub async fn list_buckets(&self, ctx: &Context) -> Result<Vec<Bucket>> {
        self.client().get_list(ctx, BUCKETS_PATH, "buckets").await
    }
}
