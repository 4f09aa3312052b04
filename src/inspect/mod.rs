//! Package manifest inspection.
//!
//! The generator never parses package manifests itself; it invokes the
//! package tool inside a checked-out working copy and consumes the JSON it
//! dumps. The [`PackageInspector`] trait isolates that subprocess dependency
//! so the resolution pipeline can be tested with canned dumps.

mod dump_tool;

pub use dump_tool::DumpToolInspector;

use crate::Result;
use crate::model::{LibraryType, ProductType};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Produces the manifest and build description of the package checked out at a directory.
#[async_trait]
pub trait PackageInspector: Send + Sync {
    /// Inspect the package at `package_dir`.
    async fn inspect(&self, package_dir: &Path) -> Result<PackageDump>;
}

/// The combined output of a package inspection.
#[derive(Debug, Clone)]
pub struct PackageDump {
    /// The dumped manifest.
    pub manifest: ManifestDump,

    /// The dumped build description.
    pub description: DescriptionDump,
}

/// JSON shape of the dumped package manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDump {
    /// Declared package name.
    pub name: String,

    /// Declared targets.
    pub targets: Vec<TargetDump>,

    /// Declared products.
    pub products: Vec<ProductDump>,

    /// The tool version the manifest was authored against.
    #[serde(rename = "toolsVersion")]
    pub tools_version: ToolsVersionDump,

    /// Declared platform requirements, absent when the manifest declares none.
    pub platforms: Option<Vec<PlatformDump>>,
}

/// A target as it appears in the dumped manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDump {
    /// Target name.
    pub name: String,
}

/// A product as it appears in the dumped manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDump {
    /// Product name.
    pub name: String,

    /// Product type.
    pub r#type: DumpProductType,

    /// Names of the targets the product is composed of.
    pub targets: Vec<String>,
}

/// Tool version wrapper as dumped by the package tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsVersionDump {
    /// The version string.
    #[serde(rename = "_version")]
    pub version: String,
}

/// A platform requirement as it appears in the dumped manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformDump {
    /// Platform name.
    #[serde(rename = "platformName")]
    pub name: String,

    /// Minimum supported version.
    pub version: String,
}

/// Product type in the dump format. Library linking modes arrive as a list,
/// non-library variants carry a null payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DumpProductType {
    /// A library product with its linking modes.
    Library(Vec<LibraryType>),
    /// An executable product.
    Executable(serde_json::Value),
    /// A build-tool plugin product.
    Plugin(serde_json::Value),
    /// A code snippet product.
    Snippet(serde_json::Value),
    /// A test product.
    Test(serde_json::Value),
}

impl From<&DumpProductType> for ProductType {
    fn from(dump: &DumpProductType) -> Self {
        match dump {
            DumpProductType::Library(modes) => Self::Library(modes.first().copied().unwrap_or(LibraryType::Automatic)),
            DumpProductType::Executable(_) => Self::Executable,
            DumpProductType::Plugin(_) => Self::Plugin,
            DumpProductType::Snippet(_) => Self::Snippet,
            DumpProductType::Test(_) => Self::Test,
        }
    }
}

/// JSON shape of the dumped build description.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionDump {
    /// Package name.
    pub name: String,

    /// Described targets, including derived module names.
    pub targets: Vec<DescriptionTargetDump>,
}

/// A target as it appears in the build description.
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionTargetDump {
    /// Target name.
    pub name: String,

    /// The module name this target can be imported as.
    #[serde(rename = "c99name")]
    pub module_name: Option<String>,
}
