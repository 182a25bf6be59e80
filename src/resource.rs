//! Table-driven resource operations.
//!
//! Every resource type describes itself with a [`ResourceKind`]: where it
//! lives, how its list and item envelopes are keyed, what identifies it and
//! which [`Waiter`] confirms each mutation. [`Resources`] turns that table
//! entry into list/get/create/update/delete calls.

use crate::client::Client;
use crate::request::Request;
use crate::resources::event::Event;
use crate::waiter::{Target, Waiter};
use crate::{Context, Error, Response, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// What an object identifier looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// An RFC 4122 UUID, validated before any request is sent.
    Uuid,
    /// A human readable name, such as a label or an access key ID.
    Freeform,
}

/// Table entry describing one resource type.
#[derive(Debug, Clone, Copy)]
pub struct ResourceKind {
    /// Collection path. Relative to the parent object when `parent` is set.
    pub path: &'static str,
    /// Collection path of the parent resource, for nested resources.
    pub parent: Option<&'static str>,
    /// Key of the list envelope, e.g. `servers`.
    pub list_key: &'static str,
    /// Key of the item envelope, e.g. `server`.
    pub item_key: &'static str,
    /// How object identifiers are validated.
    pub id: IdKind,
    /// Waiter run after a create in sync mode.
    pub create: Waiter,
    /// Waiter run after an update in sync mode.
    pub update: Waiter,
    /// Waiter run after a delete in sync mode.
    pub delete: Waiter,
}

impl ResourceKind {
    /// A top-level resource with UUID identifiers, confirmed by the
    /// request-status and active waiters on create, the active waiter on
    /// update and the absence waiter on delete.
    pub const fn object(path: &'static str, list_key: &'static str, item_key: &'static str) -> Self {
        Self {
            path,
            parent: None,
            list_key,
            item_key,
            id: IdKind::Uuid,
            create: Waiter::RequestThenActive,
            update: Waiter::Active,
            delete: Waiter::Absent,
        }
    }

    /// A resource without a `status` property: create and update are
    /// confirmed by the request-status waiter only.
    pub const fn without_status(self) -> Self {
        Self {
            create: Waiter::Request,
            update: Waiter::Request,
            ..self
        }
    }

    /// Places the collection below objects of `parent`.
    pub const fn nested_under(self, parent: &'static str) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    /// Identifies objects by name instead of UUID.
    pub const fn freeform(self) -> Self {
        Self {
            id: IdKind::Freeform,
            ..self
        }
    }

    /// Last segment of the collection path, as used under `/objects/locations/{uuid}/`.
    fn segment(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }
}

/// A sub-collection hanging off an object, such as a server's storages.
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    /// Path below the object, e.g. `storages`.
    pub path: &'static str,
    /// Key of the list envelope, e.g. `server_relations`.
    pub list_key: &'static str,
    /// Key of the item envelope, e.g. `server_relation`.
    pub item_key: &'static str,
}

/// A collection outside the object's own path, such as its deleted list.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    /// Absolute path, e.g. `/objects/deleted/servers`.
    pub path: &'static str,
    /// Key of the list envelope, e.g. `deleted_servers`.
    pub list_key: &'static str,
}

/// A resource type the API serves.
pub trait Resource: DeserializeOwned + Send {
    const KIND: ResourceKind;
}

/// A resource that can be created.
pub trait Creatable: Resource {
    type Create: Serialize + Sync;
}

/// A resource that can be changed after creation.
pub trait Updatable: Resource {
    type Update: Serialize + Sync;
}

/// A resource that can be deleted.
pub trait Deletable: Resource {}

/// A resource whose deleted objects remain listable.
pub trait ListDeleted: Resource {
    const DELETED: Listing;
}

/// A resource with a per-object event log at `{object}/events`.
pub trait HasEvents: Resource {}

/// A resource that can be listed per location.
pub trait Located: Resource {}

/// Response of a create call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse {
    /// UUID of the new object. Empty for resources identified by name.
    #[serde(default)]
    pub object_uuid: String,
    /// UUID of the asynchronous request that creates it.
    #[serde(default)]
    pub request_uuid: String,
    /// Any further fields the server returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Operations on one resource type.
///
/// Obtained from the accessors on [`Client`], e.g. [`Client::servers`].
///
/// # Examples
///
/// ```no_run
/// use gsclient::{Client, Context};
/// use gsclient::resources::ip::UpdateIp;
///
/// # async fn example(client: Client, ip_uuid: &str) -> Result<(), gsclient::Error> {
/// let ctx = Context::background();
/// let ips = client.ips();
///
/// let ip = ips.get(&ctx, ip_uuid).await?;
/// // Clears the labels but leaves the name alone.
/// ips.update(&ctx, ip_uuid, &UpdateIp { labels: Some(vec![]), ..Default::default() }).await?;
/// println!("{} was labelled {:?}", ip.ip, ip.labels);
/// # Ok(())
/// # }
/// ```
pub struct Resources<'c, R> {
    client: &'c Client,
    parent: Option<String>,
    marker: PhantomData<fn() -> R>,
}

impl<'c, R: Resource> Resources<'c, R> {
    pub(crate) fn new(client: &'c Client) -> Self {
        Self {
            client,
            parent: None,
            marker: PhantomData,
        }
    }

    pub(crate) fn nested(client: &'c Client, parent: &str) -> Self {
        Self {
            client,
            parent: Some(parent.to_string()),
            marker: PhantomData,
        }
    }

    pub fn client(&self) -> &'c Client {
        self.client
    }

    pub(crate) fn collection_path(&self) -> Result<String> {
        match (R::KIND.parent, &self.parent) {
            (Some(parent_path), Some(parent_id)) => {
                validate_id(IdKind::Uuid, parent_id)?;
                Ok(format!("{parent_path}/{parent_id}/{}", R::KIND.path))
            }
            _ => Ok(R::KIND.path.to_string()),
        }
    }

    pub(crate) fn object_path(&self, id: &str) -> Result<String> {
        validate_id(R::KIND.id, id)?;
        Ok(format!("{}/{id}", self.collection_path()?))
    }

    /// Lists all objects, in the order the server returned them.
    pub async fn list(&self, ctx: &Context) -> Result<Vec<R>> {
        let path = self.collection_path()?;
        self.client.get_list(ctx, &path, R::KIND.list_key).await
    }

    /// Fetches one object.
    pub async fn get(&self, ctx: &Context, id: &str) -> Result<R> {
        let path = self.object_path(id)?;
        self.client.get_item(ctx, &path, R::KIND.item_key).await
    }

    pub(crate) async fn list_related<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        id: &str,
        relation: &Relation,
    ) -> Result<Vec<T>> {
        let path = format!("{}/{}", self.object_path(id)?, relation.path);
        self.client.get_list(ctx, &path, relation.list_key).await
    }

    pub(crate) async fn get_related<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        id: &str,
        relation: &Relation,
        related_id: &str,
    ) -> Result<T> {
        validate_id(IdKind::Uuid, related_id)?;
        let path = format!("{}/{}/{related_id}", self.object_path(id)?, relation.path);
        self.client.get_item(ctx, &path, relation.item_key).await
    }

    pub(crate) async fn create_related<B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        id: &str,
        relation: &Relation,
        body: &B,
    ) -> Result<()> {
        let path = format!("{}/{}", self.object_path(id)?, relation.path);
        self.client.act(ctx, Request::post(path, body)?).await.map(drop)
    }

    pub(crate) async fn update_related<B: Serialize + ?Sized>(
        &self,
        ctx: &Context,
        id: &str,
        relation: &Relation,
        related_id: &str,
        body: &B,
    ) -> Result<()> {
        validate_id(IdKind::Uuid, related_id)?;
        let path = format!("{}/{}/{related_id}", self.object_path(id)?, relation.path);
        self.client.act(ctx, Request::patch(path, body)?).await.map(drop)
    }

    pub(crate) async fn delete_related(
        &self,
        ctx: &Context,
        id: &str,
        relation: &Relation,
        related_id: &str,
    ) -> Result<()> {
        validate_id(IdKind::Uuid, related_id)?;
        let path = format!("{}/{}/{related_id}", self.object_path(id)?, relation.path);
        self.client.act(ctx, Request::delete(path)).await.map(drop)
    }
}

impl<R: Creatable> Resources<'_, R> {
    /// Creates an object.
    ///
    /// In sync mode, returns once the creation is confirmed.
    pub async fn create(&self, ctx: &Context, body: &R::Create) -> Result<CreateResponse> {
        let path = self.collection_path()?;
        let request = Request::post(path.as_str(), body)?;
        self.client
            .create_at(ctx, request, R::KIND.create, &path, R::KIND.item_key)
            .await
    }
}

impl<R: Updatable> Resources<'_, R> {
    /// Changes an object. Fields left `None` are not touched.
    ///
    /// In sync mode, returns once the change is confirmed.
    pub async fn update(&self, ctx: &Context, id: &str, body: &R::Update) -> Result<()> {
        let path = self.object_path(id)?;
        let response = self
            .client
            .execute_discard(ctx, Request::patch(path.as_str(), body)?)
            .await?;
        let target = Target {
            path: &path,
            item_key: R::KIND.item_key,
        };
        self.client
            .complete(ctx, R::KIND.update, &response, None, Some(target))
            .await
    }
}

impl<R: Deletable> Resources<'_, R> {
    /// Deletes an object.
    ///
    /// In sync mode, returns once the object is gone.
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        let path = self.object_path(id)?;
        let response = self
            .client
            .execute_discard(ctx, Request::delete(path.as_str()))
            .await?;
        let target = Target {
            path: &path,
            item_key: R::KIND.item_key,
        };
        self.client
            .complete(ctx, R::KIND.delete, &response, None, Some(target))
            .await
    }
}

impl<R: ListDeleted> Resources<'_, R> {
    /// Lists deleted objects.
    pub async fn list_deleted(&self, ctx: &Context) -> Result<Vec<R>> {
        self.client
            .get_list(ctx, R::DELETED.path, R::DELETED.list_key)
            .await
    }
}

impl<R: HasEvents> Resources<'_, R> {
    /// Lists the events recorded for one object.
    pub async fn list_events(&self, ctx: &Context, id: &str) -> Result<Vec<Event>> {
        let path = format!("{}/events", self.object_path(id)?);
        self.client.get_list(ctx, &path, "events").await
    }
}

impl<R: Located> Resources<'_, R> {
    /// Lists the objects placed in one location.
    pub async fn list_by_location(&self, ctx: &Context, location_id: &str) -> Result<Vec<R>> {
        validate_id(IdKind::Uuid, location_id)?;
        let path = format!("/objects/locations/{location_id}/{}", R::KIND.segment());
        self.client.get_list(ctx, &path, R::KIND.list_key).await
    }
}

impl Client {
    /// Fetches `path` and decodes the objects under `list_key`.
    ///
    /// The envelope may map UUIDs to objects or hold an array.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        list_key: &str,
    ) -> Result<Vec<T>> {
        let mut response = self.execute::<Map<String, Value>>(ctx, Request::get(path)).await?;
        let items = match response.data.remove(list_key) {
            Some(Value::Object(map)) => map.into_iter().map(|(_, item)| item).collect(),
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(_) => return Err(envelope_error(&response, path, format!("{list_key:?} is not a list"))),
            None => return Err(envelope_error(&response, path, format!("missing envelope key {list_key:?}"))),
        };
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| envelope_error(&response, path, e)))
            .collect()
    }

    /// Fetches `path` and decodes the object under `item_key`.
    pub(crate) async fn get_item<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        item_key: &str,
    ) -> Result<T> {
        let mut response = self.execute::<Map<String, Value>>(ctx, Request::get(path)).await?;
        match response.data.remove(item_key) {
            Some(item) => serde_json::from_value(item).map_err(|e| envelope_error(&response, path, e)),
            None => Err(envelope_error(&response, path, format!("missing envelope key {item_key:?}"))),
        }
    }

    /// Sends a create request and runs `waiter` on the new object, which
    /// lives under `collection`.
    pub(crate) async fn create_at(
        &self,
        ctx: &Context,
        request: Request,
        waiter: Waiter,
        collection: &str,
        item_key: &str,
    ) -> Result<CreateResponse> {
        let waiter = if request.skip_checking_request {
            waiter.skipping_request_check()
        } else {
            waiter
        };
        let mut response = self.execute::<CreateResponse>(ctx, request).await?;
        if response.data.request_uuid.is_empty() {
            if let Some(uuid) = &response.request_uuid {
                response.data.request_uuid = uuid.clone();
            }
        }

        let object_path = format!("{collection}/{}", response.data.object_uuid);
        let target = (!response.data.object_uuid.is_empty()).then_some(Target {
            path: &object_path,
            item_key,
        });
        let body_uuid = response.data.request_uuid.clone();
        self.complete(ctx, waiter, &response, Some(body_uuid.as_str()), target)
            .await?;
        Ok(response.into_data())
    }

    /// Sends a relation or action request and, in sync mode, waits for its
    /// request to complete.
    ///
    /// Returns the response body, or `Value::Null` when it was empty.
    pub(crate) async fn act(&self, ctx: &Context, request: Request) -> Result<Value> {
        let path = request.uri.clone();
        let waiter = if request.skip_checking_request {
            Waiter::None
        } else {
            Waiter::Request
        };
        let response = self.execute_discard(ctx, request).await?;
        let body = if response.raw_body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.raw_body).map_err(|e| envelope_error(&response, &path, e))?
        };
        let body_uuid = body.get("request_uuid").and_then(Value::as_str);
        self.complete(ctx, waiter, &response, body_uuid, None).await?;
        Ok(body)
    }
}

fn envelope_error<T>(response: &Response<T>, path: &str, error: impl ToString) -> Error {
    Error::Decode {
        url: path.to_string(),
        status: response.status,
        serde_error: error.to_string(),
        body_prefix: response.raw_body.chars().take(200).collect(),
        request_uuid: response.request_uuid.clone(),
    }
}

/// Rejects identifiers that cannot name an object, before any I/O.
pub fn validate_id(kind: IdKind, id: &str) -> Result<()> {
    match kind {
        IdKind::Uuid => uuid::Uuid::parse_str(id)
            .map(drop)
            .map_err(|e| Error::Validation(format!("{id:?} is not a valid UUID: {e}"))),
        IdKind::Freeform if id.is_empty() => Err(Error::Validation("identifier is empty".to_string())),
        IdKind::Freeform if id.contains(['/', '?', '#']) => Err(Error::Validation(format!(
            "{id:?} contains characters not allowed in an identifier"
        ))),
        IdKind::Freeform => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_validation() {
        assert!(validate_id(IdKind::Uuid, "690de890-13c0-4e76-8a01-e10ba8786e53").is_ok());
        assert!(matches!(validate_id(IdKind::Uuid, "abc-123"), Err(Error::Validation(_))));
        assert!(validate_id(IdKind::Uuid, "").is_err());
    }

    #[test]
    fn test_freeform_validation() {
        assert!(validate_id(IdKind::Freeform, "production").is_ok());
        assert!(validate_id(IdKind::Freeform, "").is_err());
        assert!(validate_id(IdKind::Freeform, "a/b").is_err());
    }

    #[test]
    fn test_kind_builders() {
        const SNAPSHOTS: ResourceKind = ResourceKind::object("snapshots", "snapshots", "snapshot")
            .nested_under("/objects/storages")
            .without_status();
        assert_eq!(SNAPSHOTS.parent, Some("/objects/storages"));
        assert_eq!(SNAPSHOTS.create, Waiter::Request);
        assert_eq!(SNAPSHOTS.delete, Waiter::Absent);
        assert_eq!(ResourceKind::object("/objects/servers", "servers", "server").segment(), "servers");
    }

    #[test]
    fn test_create_response_keeps_extra_fields() {
        let body = r#"{"object_uuid":"o","request_uuid":"r","server_uuid":"s"}"#;
        let response: CreateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.object_uuid, "o");
        assert_eq!(response.extra.get("server_uuid").unwrap(), "s");
    }
}
