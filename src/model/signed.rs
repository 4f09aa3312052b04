use serde::{Deserialize, Serialize};

use crate::model::collection::Collection;

/// A package collection together with its detached signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedCollection {
    /// The signed package collection.
    pub collection: Collection,

    /// The signature over the collection.
    pub signature: Signature,
}

/// A signature over a collection, with the identity of the certificate that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The signature value.
    pub signature: String,

    /// The certificate used for signing.
    pub certificate: Certificate,
}

/// Identity fields of the signing certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// The certificate's subject.
    pub subject: CertificateName,

    /// The certificate's issuer.
    pub issuer: CertificateName,
}

/// A distinguished name, reduced to the fields the collection format displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CertificateName {
    /// The userID attribute.
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// The common name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// The organizational unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,

    /// The organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}
