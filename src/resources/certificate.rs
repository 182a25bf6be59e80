//! TLS certificates uploaded for load balancers. Immutable once created.

use crate::codec::Timestamp;
use crate::resource::{Creatable, Deletable, Resource, ResourceKind};
use crate::{Client, Resources};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub object_uuid: String,
    pub name: String,
    pub status: String,
    pub common_name: String,
    pub fingerprints: Fingerprints,
    pub not_valid_after: Timestamp,
    pub labels: Vec<String>,
    pub create_time: Timestamp,
    pub change_time: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fingerprints {
    pub md5: String,
    pub sha1: String,
    pub sha256: String,
}

/// PEM-encoded material for a new certificate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateCertificate {
    pub name: String,
    pub private_key: String,
    pub leaf_certificate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_chain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Resource for Certificate {
    const KIND: ResourceKind =
        ResourceKind::object("/objects/certificates", "certificates", "certificate");
}

impl Creatable for Certificate {
    type Create = CreateCertificate;
}

impl Deletable for Certificate {}

impl Client {
    pub fn certificates(&self) -> Resources<'_, Certificate> {
        Resources::new(self)
    }
}
