//! Business-rule validation of collection documents.
//!
//! Validation is exhaustive, not fail-fast: every rule runs and every finding
//! is collected, so a single run reports all problems at once. Warnings flag
//! things a consumer will tolerate; errors flag documents that violate the
//! format's invariants.

use crate::model::Collection;
use core::fmt::{Display, Formatter};
use std::collections::HashSet;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    /// Tolerable problem; reported but not fatal unless escalated.
    Warning,

    /// Violation of a format invariant.
    Error,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    /// Severity of the finding.
    pub level: ValidationLevel,

    /// Path of the offending property, when one can be named.
    pub property: Option<String>,

    /// Description of the problem.
    pub message: String,
}

impl ValidationMessage {
    fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Error,
            property: Some(property.into()),
            message: message.into(),
        }
    }

    fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Warning,
            property: Some(property.into()),
            message: message.into(),
        }
    }
}

impl Display for ValidationMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match &self.property {
            Some(property) => write!(f, "{property}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Evaluates the full rule set against a collection document.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionValidator;

impl CollectionValidator {
    /// Create a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate `collection`, returning every finding.
    #[must_use]
    pub fn validate(&self, collection: &Collection) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();

        if collection.name.trim().is_empty() {
            messages.push(ValidationMessage::error("name", "collection name must not be empty"));
        }

        if collection.packages.is_empty() {
            messages.push(ValidationMessage::error("packages", "collection must contain at least one package"));
        }

        let mut seen_urls = HashSet::new();
        for (package_index, package) in collection.packages.iter().enumerate() {
            let package_path = format!("packages[{package_index}]");

            if !seen_urls.insert(package.url.as_str()) {
                messages.push(ValidationMessage::warning(
                    format!("{package_path}.url"),
                    format!("duplicate package URL '{}'", package.url),
                ));
            }

            if package.versions.is_empty() {
                messages.push(ValidationMessage::error(
                    format!("{package_path}.versions"),
                    "package must contain at least one version",
                ));
            }

            for (version_index, version) in package.versions.iter().enumerate() {
                let version_path = format!("{package_path}.versions[{version_index}]");
                Self::validate_version(version, &version_path, &mut messages);
            }
        }

        messages
    }

    fn validate_version(version: &crate::model::Version, version_path: &str, messages: &mut Vec<ValidationMessage>) {
        let spelled = version.version.trim();
        if semver::Version::parse(spelled.strip_prefix('v').unwrap_or(spelled)).is_err() {
            messages.push(ValidationMessage::warning(
                format!("{version_path}.version"),
                format!("version '{}' is not a semantic version", version.version),
            ));
        }

        if version.manifests.is_empty() {
            messages.push(ValidationMessage::error(
                format!("{version_path}.manifests"),
                "version must contain at least one manifest",
            ));
        }

        if !version.manifests.contains_key(&version.default_tools_version) {
            messages.push(ValidationMessage::error(
                format!("{version_path}.defaultToolsVersion"),
                format!("default tools version '{}' has no matching manifest", version.default_tools_version),
            ));
        }

        for (tools_version, manifest) in &version.manifests {
            let manifest_path = format!("{version_path}.manifests[{tools_version}]");

            if manifest.products.is_empty() {
                messages.push(ValidationMessage::error(
                    format!("{manifest_path}.products"),
                    "manifest must contain at least one product",
                ));
            }

            if manifest.targets.is_empty() {
                messages.push(ValidationMessage::error(
                    format!("{manifest_path}.targets"),
                    "manifest must contain at least one target",
                ));
            }

            let target_names: HashSet<&str> = manifest.targets.iter().map(|target| target.name.as_str()).collect();
            for product in &manifest.products {
                for target in &product.targets {
                    if !target_names.contains(target.as_str()) {
                        messages.push(ValidationMessage::warning(
                            format!("{manifest_path}.products[{}]", product.name),
                            format!("product references target '{target}' which has no target entry"),
                        ));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormatVersion, LibraryType, Manifest, Package, Product, ProductType, Target, Version};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use url::Url;

    fn valid_version() -> Version {
        let manifest = Manifest {
            tools_version: "5.5.0".to_string(),
            package_name: "Widget".to_string(),
            targets: vec![Target {
                name: "Widget".to_string(),
                module_name: None,
            }],
            products: vec![Product {
                name: "Widget".to_string(),
                r#type: ProductType::Library(LibraryType::Automatic),
                targets: vec!["Widget".to_string()],
            }],
            minimum_platform_versions: None,
        };

        let mut manifests = BTreeMap::new();
        let _ = manifests.insert("5.5.0".to_string(), manifest);

        Version {
            version: "1.0.0".to_string(),
            summary: None,
            manifests,
            default_tools_version: "5.5.0".to_string(),
            verified_compatibility: None,
            license: None,
            author: None,
            signer: None,
            created_at: None,
        }
    }

    fn valid_collection() -> Collection {
        Collection {
            name: "Test".to_string(),
            overview: None,
            keywords: None,
            packages: vec![Package {
                url: Url::parse("https://github.com/octo/widget.git").expect("valid url"),
                identity: None,
                summary: None,
                keywords: None,
                versions: vec![valid_version()],
                readme_url: None,
                license: None,
            }],
            format_version: FormatVersion::V1_0,
            revision: None,
            generated_at: Utc::now(),
            generated_by: None,
        }
    }

    fn errors(messages: &[ValidationMessage]) -> usize {
        messages.iter().filter(|m| m.level == ValidationLevel::Error).count()
    }

    #[test]
    fn test_valid_collection_has_no_findings() {
        let messages = CollectionValidator::new().validate(&valid_collection());
        assert!(messages.is_empty(), "unexpected findings: {messages:?}");
    }

    #[test]
    fn test_empty_name_and_packages_are_errors() {
        let mut collection = valid_collection();
        collection.name = "  ".to_string();
        collection.packages.clear();

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 2);
    }

    #[test]
    fn test_package_without_versions_is_an_error() {
        let mut collection = valid_collection();
        collection.packages[0].versions.clear();

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 1);
    }

    #[test]
    fn test_duplicate_package_urls_are_a_warning() {
        let mut collection = valid_collection();
        let duplicate = collection.packages[0].clone();
        collection.packages.push(duplicate);

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 0);
        assert!(messages.iter().any(|m| m.level == ValidationLevel::Warning && m.message.contains("duplicate")));
    }

    #[test]
    fn test_non_semver_version_is_a_warning() {
        let mut collection = valid_collection();
        collection.packages[0].versions[0].version = "release-2020".to_string();

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 0);
        assert!(messages.iter().any(|m| m.message.contains("semantic version")));
    }

    #[test]
    fn test_mismatched_default_tools_version_is_an_error() {
        let mut collection = valid_collection();
        collection.packages[0].versions[0].default_tools_version = "9.9.9".to_string();

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 1);
    }

    #[test]
    fn test_dangling_product_target_reference_is_a_warning() {
        let mut collection = valid_collection();
        let manifest = collection.packages[0].versions[0]
            .manifests
            .get_mut("5.5.0")
            .expect("manifest present");
        manifest.products[0].targets.push("Ghost".to_string());

        let messages = CollectionValidator::new().validate(&collection);
        assert_eq!(errors(&messages), 0);
        assert!(messages.iter().any(|m| m.message.contains("Ghost")));
    }

    #[test]
    fn test_validation_is_exhaustive() {
        let mut collection = valid_collection();
        collection.name = String::new();
        collection.packages[0].versions[0].version = "not-semver".to_string();
        collection.packages[0].versions[0].default_tools_version = "9.9.9".to_string();

        let messages = CollectionValidator::new().validate(&collection);
        assert!(messages.len() >= 3, "expected every rule to report, got: {messages:?}");
    }
}
