use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::collection::Signer;

/// The user-supplied specification of a collection to generate.
///
/// Loaded once from the input document and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInput {
    /// The package collection's name.
    pub name: String,

    /// An overview or description of the package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// Keywords associated with the package collection, kept in input order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Who is generating the package collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    /// The packages to process, in the order they should appear in the output.
    pub packages: Vec<PackageInput>,
}

/// One requested package.
///
/// The repository URL uniquely identifies the package within the collection. Optional
/// fields are overrides: when present they win over anything derived from the
/// repository or fetched from the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    /// URL of the package's git repository.
    pub url: Url,

    /// Package identity string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// Summary override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Keywords override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Explicit versions to include. When absent, versions are selected from the
    /// repository's semver tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<String>>,

    /// Versions to exclude from whichever version list is in effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_versions: Option<Vec<String>>,

    /// Product names to exclude from every version's manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_products: Option<Vec<String>>,

    /// Target names to exclude from every version's manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_targets: Option<Vec<String>>,

    /// README URL override.
    #[serde(rename = "readmeURL", skip_serializing_if = "Option::is_none")]
    pub readme_url: Option<Url>,

    /// Expected signer identity, carried through for verification display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer: Option<Signer>,
}

/// Attribution for a generated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// The author's name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_round_trip_preserves_optional_absence() {
        let json = r#"{
            "name": "My Collection",
            "packages": [
                {
                    "url": "https://github.com/octo/widget.git",
                    "excludedProducts": ["WidgetTests"],
                    "readmeURL": "https://example.com/README.md"
                }
            ]
        }"#;

        let input: CollectionInput = serde_json::from_str(json).expect("parseable input");
        assert_eq!(input.name, "My Collection");
        assert!(input.overview.is_none());
        assert!(input.keywords.is_none());

        let package = &input.packages[0];
        assert!(package.versions.is_none());
        assert_eq!(package.excluded_products.as_deref(), Some(&["WidgetTests".to_string()][..]));
        assert!(package.readme_url.is_some());

        let back = serde_json::to_string(&input).expect("serializable");
        assert!(!back.contains("\"summary\""));
        assert!(back.contains("readmeURL"));
    }
}
