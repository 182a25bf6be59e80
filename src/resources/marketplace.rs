//! Marketplace applications: server images published by vendors or by the
//! account itself.

use crate::codec::Timestamp;
use crate::request::Request;
use crate::resource::{Creatable, CreateResponse, Deletable, Resource, ResourceKind, Updatable};
use crate::waiter::Waiter;
use crate::{Client, Context, Resources, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Minimum server size an application needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSetup {
    pub cores: u32,
    pub memory: u32,
    pub capacity: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceApplication {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub category: String,
    pub application_type: String,
    /// Location of the image in object storage.
    pub object_storage_path: String,
    pub setup: ApplicationSetup,
    pub published: bool,
    pub is_application_owner: bool,
    /// Hash other accounts use to import the application.
    pub unique_hash: String,
    pub metadata: Value,
    pub labels: Vec<String>,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateMarketplaceApplication {
    pub name: String,
    pub object_storage_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<ApplicationSetup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateMarketplaceApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_storage_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<ApplicationSetup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Serialize)]
struct Import<'a> {
    name: &'a str,
    unique_hash: &'a str,
}

impl Resource for MarketplaceApplication {
    const KIND: ResourceKind = ResourceKind::object(
        "/objects/marketplace/applications",
        "applications",
        "application",
    );
}

impl Creatable for MarketplaceApplication {
    type Create = CreateMarketplaceApplication;
}

impl Updatable for MarketplaceApplication {
    type Update = UpdateMarketplaceApplication;
}

impl Deletable for MarketplaceApplication {}

impl Client {
    pub fn marketplace_applications(&self) -> Resources<'_, MarketplaceApplication> {
        Resources::new(self)
    }
}

impl Resources<'_, MarketplaceApplication> {
    /// Copies an application published by another account into this one.
    pub async fn import(&self, ctx: &Context, name: &str, unique_hash: &str) -> Result<CreateResponse> {
        let collection = MarketplaceApplication::KIND.path;
        let request = Request::post(format!("{collection}/import"), &Import { name, unique_hash })?;
        self.client()
            .create_at(
                ctx,
                request,
                Waiter::RequestThenActive,
                collection,
                MarketplaceApplication::KIND.item_key,
            )
            .await
    }
}
