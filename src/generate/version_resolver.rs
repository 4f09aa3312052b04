use crate::Result;
use crate::inspect::PackageInspector;
use crate::model::{Manifest, PlatformVersion, Product, Target, Version};
use crate::vcs::{TagAnnotation, VersionControlProvider};
use ohno::bail;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

const LOG_TARGET: &str = "  resolver";

/// Resolves one tag of one package into a version record.
pub struct VersionResolver<'a> {
    vcs: &'a dyn VersionControlProvider,
    inspector: &'a dyn PackageInspector,
}

impl core::fmt::Debug for VersionResolver<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VersionResolver").finish_non_exhaustive()
    }
}

impl<'a> VersionResolver<'a> {
    /// Create a resolver over the given collaborators.
    #[must_use]
    pub const fn new(vcs: &'a dyn VersionControlProvider, inspector: &'a dyn PackageInspector) -> Self {
        Self { vcs, inspector }
    }

    /// Resolve `version` in the working copy at `checkout`.
    ///
    /// A failure here is fatal to this one version only; the aggregator logs it
    /// and moves on to the next version. A version whose manifest ends up with
    /// no products or no targets after exclusions is reported as an error for
    /// the same reason: it must be dropped, never emitted empty.
    pub async fn resolve(
        &self,
        checkout: &Path,
        version: &str,
        excluded_products: &HashSet<String>,
        excluded_targets: &HashSet<String>,
    ) -> Result<Version> {
        self.vcs.checkout(checkout, version).await?;

        // Missing annotation data is not an error; lightweight tags simply
        // produce a version without summary or creation date.
        let annotation = match self.vcs.tag_annotation(checkout, version).await {
            Ok(annotation) => annotation,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Could not read annotation for tag '{version}': {e}");
                TagAnnotation::default()
            }
        };

        let dump = self.inspector.inspect(checkout).await?;

        let mut products: Vec<Product> = dump
            .manifest
            .products
            .iter()
            .filter(|product| !excluded_products.contains(&product.name))
            .map(|product| Product {
                name: product.name.clone(),
                r#type: (&product.r#type).into(),
                targets: product.targets.clone(),
            })
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));

        // A target is public when at least one surviving product references it
        // and it is not itself excluded. Product target lists pass through
        // unchanged; exclusion only prunes the manifest's target entries.
        let public_targets: HashSet<&str> = products
            .iter()
            .flat_map(|product| product.targets.iter())
            .filter(|target| !excluded_targets.contains(*target))
            .map(String::as_str)
            .collect();

        let module_names: HashMap<&str, Option<&str>> = dump
            .description
            .targets
            .iter()
            .map(|target| (target.name.as_str(), target.module_name.as_deref()))
            .collect();

        let mut targets: Vec<Target> = dump
            .manifest
            .targets
            .iter()
            .filter(|target| public_targets.contains(target.name.as_str()))
            .map(|target| Target {
                name: target.name.clone(),
                module_name: module_names.get(target.name.as_str()).copied().flatten().map(ToString::to_string),
            })
            .collect();
        targets.sort_by(|a, b| a.name.cmp(&b.name));

        if products.is_empty() {
            bail!("version '{version}' has no products left after exclusions");
        }
        if targets.is_empty() {
            bail!("version '{version}' has no targets left after exclusions");
        }

        // An absent platform declaration is different from an empty one; only a
        // non-empty declaration produces a requirements list.
        let minimum_platform_versions = dump.manifest.platforms.as_ref().filter(|platforms| !platforms.is_empty()).map(|platforms| {
            platforms
                .iter()
                .map(|platform| PlatformVersion {
                    name: platform.name.clone(),
                    version: platform.version.clone(),
                })
                .collect()
        });

        let tools_version = dump.manifest.tools_version.version.clone();
        let manifest = Manifest {
            tools_version: tools_version.clone(),
            package_name: dump.manifest.name.clone(),
            targets,
            products,
            minimum_platform_versions,
        };

        let mut manifests = BTreeMap::new();
        let _ = manifests.insert(tools_version.clone(), manifest);

        Ok(Version {
            version: version.to_string(),
            summary: annotation.message,
            manifests,
            default_tools_version: tools_version,
            verified_compatibility: None,
            license: None,
            author: None,
            signer: None,
            created_at: annotation.created_at,
        })
    }
}
