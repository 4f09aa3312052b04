use crate::Result;
use crate::generate::version_resolver::VersionResolver;
use crate::generate::version_selector::select_default_versions;
use crate::inspect::PackageInspector;
use crate::metadata::{GitUrl, PackageBasicMetadata, ProviderRegistry};
use crate::model::{Package, PackageInput, Version};
use crate::vcs::VersionControlProvider;
use ohno::bail;
use std::collections::HashSet;
use std::path::Path;

const LOG_TARGET: &str = "aggregator";

/// Aggregates one package: local repository state, per-version manifests, and
/// hosting metadata, merged into a single package record.
pub struct PackageAggregator<'a> {
    vcs: &'a dyn VersionControlProvider,
    inspector: &'a dyn PackageInspector,
    registry: &'a ProviderRegistry,
    working_dir: &'a Path,
}

impl core::fmt::Debug for PackageAggregator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackageAggregator").field("working_dir", &self.working_dir).finish_non_exhaustive()
    }
}

impl<'a> PackageAggregator<'a> {
    /// Create an aggregator over the given collaborators.
    ///
    /// `working_dir` hosts one working copy per repository, keyed by the
    /// repository name extracted from the URL. Two different remote URLs that
    /// share a name will share a working tree; callers opting into a persistent
    /// working directory accept that collision.
    #[must_use]
    pub const fn new(
        vcs: &'a dyn VersionControlProvider,
        inspector: &'a dyn PackageInspector,
        registry: &'a ProviderRegistry,
        working_dir: &'a Path,
    ) -> Self {
        Self {
            vcs,
            inspector,
            registry,
            working_dir,
        }
    }

    /// Aggregate one requested package into a package record.
    ///
    /// Hosting metadata failures degrade to "no supplementary metadata". The
    /// package itself fails only when it ends up with no valid versions.
    pub async fn aggregate(&self, input: &PackageInput) -> Result<Package> {
        let git_url = GitUrl::parse(input.url.as_str())?;
        let checkout_path = self.working_dir.join(git_url.repository());

        // The hosting API fetch and the local git work are independent until
        // the merge, so they run concurrently and join here.
        let (metadata, versions) = tokio::join!(self.fetch_metadata(input, &git_url), self.resolve_versions(input, &checkout_path));

        let mut versions = versions?;
        if versions.is_empty() {
            bail!("package '{}' has no valid versions", input.url);
        }

        let metadata = metadata.unwrap_or_default();
        for version in &mut versions {
            version.license = metadata.license.clone();
            version.signer = input.signer.clone();
        }

        Ok(Package {
            url: input.url.clone(),
            identity: input.identity.clone(),
            summary: input.summary.clone().or(metadata.summary),
            keywords: input.keywords.clone().or(metadata.keywords),
            versions,
            readme_url: input.readme_url.clone().or(metadata.readme_url),
            license: metadata.license,
        })
    }

    async fn fetch_metadata(&self, input: &PackageInput, git_url: &GitUrl) -> Option<PackageBasicMetadata> {
        let Some(provider) = self.registry.lookup(git_url.host()) else {
            log::info!(target: LOG_TARGET, "No metadata provider for host '{}'", git_url.host());
            return None;
        };

        match provider.get(&input.url).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch {} metadata for '{}': {e}", provider.name(), input.url);
                None
            }
        }
    }

    async fn resolve_versions(&self, input: &PackageInput, checkout_path: &Path) -> Result<Vec<Version>> {
        if checkout_path.exists() {
            // A prior working copy at the expected path is assumed to be a
            // clone of this repository; update it rather than cloning again.
            self.vcs.fetch(checkout_path).await?;
        } else {
            self.vcs.clone_repo(&input.url, checkout_path).await?;
        }

        let candidates = match &input.versions {
            Some(explicit) => explicit.clone(),
            None => select_default_versions(&self.vcs.list_tags(checkout_path).await?),
        };

        let excluded_versions: HashSet<&String> = input.excluded_versions.iter().flatten().collect();
        let candidates: Vec<String> = candidates.into_iter().filter(|version| !excluded_versions.contains(version)).collect();

        let excluded_products: HashSet<String> = input.excluded_products.iter().flatten().cloned().collect();
        let excluded_targets: HashSet<String> = input.excluded_targets.iter().flatten().cloned().collect();

        // Checkouts share one working tree, so versions resolve sequentially;
        // the candidate order is the output order.
        let resolver = VersionResolver::new(self.vcs, self.inspector);
        let mut resolved = Vec::new();
        for version in &candidates {
            match resolver.resolve(checkout_path, version, &excluded_products, &excluded_targets).await {
                Ok(record) => resolved.push(record),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Skipping version '{version}' of '{}': {e}", input.url);
                }
            }
        }

        Ok(resolved)
    }
}
