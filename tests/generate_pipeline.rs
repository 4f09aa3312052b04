//! End-to-end tests of the generation pipeline, driven by stub collaborators.
//!
//! No network, git, or package tool is involved: the stubs supply tags,
//! manifest dumps, and hosting metadata, and the tests assert on the shape of
//! the assembled collection.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use collection_gen::Result;
use collection_gen::generate::{CollectionAssembler, PackageAggregator};
use collection_gen::inspect::{
    DescriptionDump, DescriptionTargetDump, DumpProductType, ManifestDump, PackageDump, PackageInspector, ProductDump, TargetDump,
    ToolsVersionDump,
};
use collection_gen::metadata::{MetadataProvider, PackageBasicMetadata, ProviderError, ProviderRegistry};
use collection_gen::model::{CollectionInput, LibraryType, License, PackageInput, ProductType, Signer};
use collection_gen::vcs::{TagAnnotation, VersionControlProvider};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use url::Url;

fn repo_name(path: &Path) -> String {
    path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_string()
}

#[derive(Default)]
struct StubVcs {
    tags: HashMap<String, Vec<String>>,
    annotations: HashMap<(String, String), TagAnnotation>,
}

impl StubVcs {
    fn with_tags(mut self, repo: &str, tags: &[&str]) -> Self {
        let _ = self.tags.insert(repo.to_string(), tags.iter().map(ToString::to_string).collect());
        self
    }

    fn with_annotation(mut self, repo: &str, tag: &str, annotation: TagAnnotation) -> Self {
        let _ = self.annotations.insert((repo.to_string(), tag.to_string()), annotation);
        self
    }
}

#[async_trait]
impl VersionControlProvider for StubVcs {
    async fn clone_repo(&self, _url: &Url, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    async fn fetch(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    async fn checkout(&self, _path: &Path, _reference: &str) -> Result<()> {
        Ok(())
    }

    async fn list_tags(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.tags.get(&repo_name(path)).cloned().unwrap_or_default())
    }

    async fn tag_annotation(&self, path: &Path, tag: &str) -> Result<TagAnnotation> {
        Ok(self
            .annotations
            .get(&(repo_name(path), tag.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct StubInspector {
    dumps: HashMap<String, PackageDump>,
}

impl StubInspector {
    fn with_dump(mut self, repo: &str, dump: PackageDump) -> Self {
        let _ = self.dumps.insert(repo.to_string(), dump);
        self
    }
}

#[async_trait]
impl PackageInspector for StubInspector {
    async fn inspect(&self, package_dir: &Path) -> Result<PackageDump> {
        self.dumps
            .get(&repo_name(package_dir))
            .cloned()
            .ok_or_else(|| ohno::app_err!("no dump for '{}'", package_dir.display()))
    }
}

enum StubOutcome {
    Found(PackageBasicMetadata),
    NotFound,
}

struct StubProvider {
    outcome: StubOutcome,
}

#[async_trait]
impl MetadataProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn handles(&self, _host: &str) -> bool {
        true
    }

    async fn get(&self, url: &Url) -> Result<PackageBasicMetadata, ProviderError> {
        match &self.outcome {
            StubOutcome::Found(metadata) => Ok(metadata.clone()),
            StubOutcome::NotFound => Err(ProviderError::NotFound(url.clone())),
        }
    }
}

fn registry(outcome: StubOutcome) -> ProviderRegistry {
    ProviderRegistry::with_providers(vec![Box::new(StubProvider { outcome })])
}

fn not_found_registry() -> ProviderRegistry {
    registry(StubOutcome::NotFound)
}

/// A dump with the given products (name, member targets) over the given targets.
fn dump(package_name: &str, targets: &[&str], products: &[(&str, &[&str])]) -> PackageDump {
    PackageDump {
        manifest: ManifestDump {
            name: package_name.to_string(),
            targets: targets
                .iter()
                .map(|name| TargetDump { name: (*name).to_string() })
                .collect(),
            products: products
                .iter()
                .map(|(name, members)| ProductDump {
                    name: (*name).to_string(),
                    r#type: DumpProductType::Library(vec![LibraryType::Automatic]),
                    targets: members.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            tools_version: ToolsVersionDump {
                version: "5.5.0".to_string(),
            },
            platforms: None,
        },
        description: DescriptionDump {
            name: package_name.to_string(),
            targets: targets
                .iter()
                .map(|name| DescriptionTargetDump {
                    name: (*name).to_string(),
                    module_name: Some((*name).to_string()),
                })
                .collect(),
        },
    }
}

fn package_input(url: &str) -> PackageInput {
    PackageInput {
        url: Url::parse(url).expect("valid url"),
        identity: None,
        summary: None,
        keywords: None,
        versions: None,
        excluded_versions: None,
        excluded_products: None,
        excluded_targets: None,
        readme_url: None,
        signer: None,
    }
}

fn collection_input(packages: Vec<PackageInput>) -> CollectionInput {
    CollectionInput {
        name: "Test Collection".to_string(),
        overview: None,
        keywords: None,
        author: None,
        packages,
    }
}

async fn assemble(
    vcs: &StubVcs,
    inspector: &StubInspector,
    registry: &ProviderRegistry,
    input: &CollectionInput,
) -> Result<collection_gen::model::Collection> {
    let working_dir = tempfile::tempdir().expect("temp dir");
    let aggregator = PackageAggregator::new(vcs, inspector, registry, working_dir.path());
    CollectionAssembler::new(aggregator).assemble(input, None).await
}

#[tokio::test]
async fn test_packages_without_versions_are_dropped_in_order() {
    let vcs = StubVcs::default()
        .with_tags("alpha", &["1.0.0"])
        .with_tags("beta", &["latest", "unversioned"])
        .with_tags("gamma", &["2.0.0"]);
    let inspector = StubInspector::default()
        .with_dump("alpha", dump("Alpha", &["A"], &[("A", &["A"])]))
        .with_dump("gamma", dump("Gamma", &["G"], &[("G", &["G"])]));
    let registry = not_found_registry();

    let input = collection_input(vec![
        package_input("https://github.com/octo/alpha.git"),
        package_input("https://github.com/octo/beta.git"),
        package_input("https://github.com/octo/gamma.git"),
    ]);

    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");

    assert_eq!(collection.packages.len(), 2);
    assert_eq!(collection.packages[0].url.as_str(), "https://github.com/octo/alpha.git");
    assert_eq!(collection.packages[1].url.as_str(), "https://github.com/octo/gamma.git");
}

#[tokio::test]
async fn test_all_packages_failing_fails_the_run() {
    let vcs = StubVcs::default().with_tags("alpha", &["not-semver"]);
    let inspector = StubInspector::default();
    let registry = not_found_registry();

    let input = collection_input(vec![package_input("https://github.com/octo/alpha.git")]);

    let result = assemble(&vcs, &inspector, &registry, &input).await;
    assert!(result.is_err(), "an empty collection must fail the run");
}

#[tokio::test]
async fn test_remote_metadata_failure_degrades_to_local_data() {
    let vcs = StubVcs::default().with_tags("alpha", &["1.0.0"]);
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["A"], &[("A", &["A"])]));
    let registry = not_found_registry();

    let input = collection_input(vec![package_input("https://github.com/octo/alpha.git")]);

    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");
    let package = &collection.packages[0];

    assert!(package.summary.is_none());
    assert!(package.keywords.is_none());
    assert!(package.readme_url.is_none());
    assert!(package.license.is_none());
    assert_eq!(package.versions.len(), 1);

    let manifest = package.versions[0].manifests.get("5.5.0").expect("manifest present");
    assert_eq!(manifest.package_name, "Alpha");
}

#[tokio::test]
async fn test_explicit_overrides_win_over_remote_metadata() {
    let vcs = StubVcs::default().with_tags("alpha", &["1.0.0"]);
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["A"], &[("A", &["A"])]));

    let license = License {
        name: Some("MIT".to_string()),
        url: Url::parse("https://example.com/LICENSE").expect("valid url"),
    };
    let registry = registry(StubOutcome::Found(PackageBasicMetadata {
        summary: Some("remote summary".to_string()),
        keywords: Some(vec!["remote".to_string()]),
        readme_url: Some(Url::parse("https://example.com/README.md").expect("valid url")),
        license: Some(license.clone()),
    }));

    let mut overridden = package_input("https://github.com/octo/alpha.git");
    overridden.summary = Some("local summary".to_string());
    overridden.keywords = Some(vec!["local".to_string()]);
    overridden.signer = Some(Signer {
        common_name: Some("Jane Appleseed".to_string()),
        ..Signer::default()
    });

    let input = collection_input(vec![overridden]);
    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");
    let package = &collection.packages[0];

    // explicit input wins
    assert_eq!(package.summary.as_deref(), Some("local summary"));
    assert_eq!(package.keywords.as_deref(), Some(&["local".to_string()][..]));

    // no override given, so remote values fill in
    assert_eq!(package.readme_url.as_ref().map(Url::as_str), Some("https://example.com/README.md"));
    assert_eq!(package.license.as_ref(), Some(&license));

    // provider license and input signer are stamped onto each version
    assert_eq!(package.versions[0].license.as_ref(), Some(&license));
    assert_eq!(
        package.versions[0].signer.as_ref().and_then(|s| s.common_name.as_deref()),
        Some("Jane Appleseed")
    );
}

#[tokio::test]
async fn test_excluded_targets_prune_target_list_but_not_product_declarations() {
    let vcs = StubVcs::default().with_tags("alpha", &["1.0.0"]);
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["t1", "t2", "t3"], &[("A", &["t1"]), ("B", &["t2", "t3"])]));
    let registry = not_found_registry();

    let mut filtered = package_input("https://github.com/octo/alpha.git");
    filtered.excluded_targets = Some(vec!["t2".to_string()]);

    let input = collection_input(vec![filtered]);
    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");

    let manifest = collection.packages[0].versions[0].manifests.get("5.5.0").expect("manifest present");

    let target_names: Vec<&str> = manifest.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(target_names, vec!["t1", "t3"]);

    // product B survives and its declared target list is untouched
    let product_b = manifest.products.iter().find(|p| p.name == "B").expect("product B present");
    assert_eq!(product_b.targets, vec!["t2".to_string(), "t3".to_string()]);
    assert_eq!(product_b.r#type, ProductType::Library(LibraryType::Automatic));
}

#[tokio::test]
async fn test_excluded_products_and_versions_are_strictly_subtractive() {
    let vcs = StubVcs::default().with_tags("alpha", &["1.0.0", "1.1.0", "1.2.0"]);
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["t1", "t2"], &[("A", &["t1"]), ("B", &["t2"])]));
    let registry = not_found_registry();

    let mut filtered = package_input("https://github.com/octo/alpha.git");
    filtered.excluded_versions = Some(vec!["1.1.0".to_string(), "9.9.9".to_string()]);
    filtered.excluded_products = Some(vec!["B".to_string(), "NoSuchProduct".to_string()]);

    let input = collection_input(vec![filtered]);
    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");
    let package = &collection.packages[0];

    let versions: Vec<&str> = package.versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(versions, vec!["1.2.0", "1.0.0"]);

    let manifest = package.versions[0].manifests.get("5.5.0").expect("manifest present");
    let product_names: Vec<&str> = manifest.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(product_names, vec!["A"]);

    // t2 is no longer reachable from any product
    let target_names: Vec<&str> = manifest.targets.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(target_names, vec!["t1"]);
}

#[tokio::test]
async fn test_excluding_every_product_drops_the_version() {
    let vcs = StubVcs::default().with_tags("alpha", &["1.0.0"]);
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["t1"], &[("A", &["t1"])]));
    let registry = not_found_registry();

    let mut filtered = package_input("https://github.com/octo/alpha.git");
    filtered.excluded_products = Some(vec!["A".to_string()]);

    let input = collection_input(vec![filtered]);
    let result = assemble(&vcs, &inspector, &registry, &input).await;

    // The only version loses all products, so the package and collection collapse.
    assert!(result.is_err());
}

#[tokio::test]
async fn test_explicit_version_list_order_and_annotations() {
    let created_at = Utc.with_ymd_and_hms(2023, 4, 1, 12, 0, 0).single().expect("valid timestamp");
    let vcs = StubVcs::default()
        .with_tags("alpha", &["0.9.0", "1.0.0", "1.1.0"])
        .with_annotation(
            "alpha",
            "1.0.0",
            TagAnnotation {
                message: Some("first stable release".to_string()),
                created_at: Some(created_at),
            },
        );
    let inspector = StubInspector::default().with_dump("alpha", dump("Alpha", &["A"], &[("A", &["A"])]));
    let registry = not_found_registry();

    let mut pinned = package_input("https://github.com/octo/alpha.git");
    pinned.versions = Some(vec!["1.0.0".to_string(), "0.9.0".to_string()]);

    let input = collection_input(vec![pinned]);
    let collection = assemble(&vcs, &inspector, &registry, &input).await.expect("collection assembles");
    let package = &collection.packages[0];

    // explicit order wins over descending-version order
    let versions: Vec<&str> = package.versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(versions, vec!["1.0.0", "0.9.0"]);

    assert_eq!(package.versions[0].summary.as_deref(), Some("first stable release"));
    assert_eq!(package.versions[0].created_at, Some(created_at));
    assert!(package.versions[1].summary.is_none());
    assert!(package.versions[1].created_at.is_none());
}
