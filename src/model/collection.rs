use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::model::input::Author;

/// A generated package collection document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// The package collection's name.
    pub name: String,

    /// An overview or description of the package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Keywords associated with the package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// The aggregated package list, in input order.
    pub packages: Vec<Package>,

    /// The schema version this document conforms to.
    pub format_version: FormatVersion,

    /// The revision number of this package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,

    /// When this package collection was generated.
    pub generated_at: DateTime<Utc>,

    /// Who generated this package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<Author>,
}

impl Collection {
    /// Compare two collections for semantic equality.
    ///
    /// The generation timestamp is deliberately excluded: two collections built from
    /// the same inputs at different times are considered the same. Every other field,
    /// including the revision number, counts as a real difference.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
            && self.overview == other.overview
            && self.keywords == other.keywords
            && self.packages == other.packages
            && self.format_version == other.format_version
            && self.revision == other.revision
            && self.generated_by == other.generated_by
    }
}

/// Schema version of the collection document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatVersion {
    /// Version 1.0 of the collection format.
    #[serde(rename = "1.0")]
    V1_0,
}

/// One repository's aggregated metadata across its selected versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// URL of the package's git repository.
    pub url: Url,

    /// Package identity, if the input supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// A summary of what the package does.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Keywords associated with the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Selected package versions, in selection order.
    pub versions: Vec<Version>,

    /// URL of the package's README.
    #[serde(rename = "readmeURL", skip_serializing_if = "Option::is_none")]
    pub readme_url: Option<Url>,

    /// The package's license.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// Metadata for a single version of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// The version string, as spelled by the source tag or the input document.
    pub version: String,

    /// Human-readable summary for this version, taken from the tag annotation when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Manifests keyed by tool version. Currently exactly one entry is populated,
    /// but the map shape is part of the wire format and must be preserved.
    pub manifests: BTreeMap<String, Manifest>,

    /// The key into `manifests` to use by default.
    pub default_tools_version: String,

    /// Verified platform/language-version compatibility. Never populated by the
    /// generator; filled in by external verification tooling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_compatibility: Option<Vec<Compatibility>>,

    /// License in effect for this version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    /// Who authored this version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    /// Expected signer identity, for verification display purposes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<Signer>,

    /// When this version was created, from the annotated tag's date when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A package version's manifest for one tool version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// The tool version this manifest was authored against.
    pub tools_version: String,

    /// The package name declared by the manifest.
    pub package_name: String,

    /// Targets reachable from at least one non-excluded product, sorted by name.
    pub targets: Vec<Target>,

    /// Products surviving exclusion, sorted by name.
    pub products: Vec<Product>,

    /// Minimum platform requirements. `None` when the manifest declares no platforms;
    /// an empty declaration is different from no declaration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_platform_versions: Option<Vec<PlatformVersion>>,
}

/// A buildable unit inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Target name.
    pub name: String,

    /// The module name if this target can be imported as a module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

/// A named, externally consumable artifact composed of one or more targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product name.
    pub name: String,

    /// Product type.
    pub r#type: ProductType,

    /// Names of the targets this product is composed of. This is the declaration as
    /// written in the manifest; it is not pruned when targets are excluded.
    pub targets: Vec<String>,
}

/// The kind of artifact a product builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductType {
    /// A library product, with its linking mode.
    Library(LibraryType),
    /// An executable product.
    Executable,
    /// A build-tool plugin product.
    Plugin,
    /// A code snippet product.
    Snippet,
    /// A test product.
    Test,
}

/// How a library product is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LibraryType {
    /// Statically linked.
    Static,
    /// Dynamically linked.
    Dynamic,
    /// Linking mode chosen by the build tool.
    Automatic,
}

/// A platform and the minimum version of it a package version supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVersion {
    /// Platform name.
    pub name: String,

    /// Minimum supported version.
    pub version: String,
}

/// A platform a package version has been verified against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Platform name.
    pub name: String,
}

/// A verified platform/language-version pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    /// The verified platform.
    pub platform: Platform,

    /// The verified language version.
    pub language_version: String,
}

/// A package's license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// License name, e.g. an SPDX identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL of the license file.
    pub url: Url,
}

/// Identity of the party expected to sign a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    /// Signer type, e.g. the trust root the identity chains to.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Common name of the signing certificate's subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Organizational unit of the signing certificate's subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizational_unit: Option<String>,

    /// Organization of the signing certificate's subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}
