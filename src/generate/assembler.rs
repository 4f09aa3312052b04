use crate::Result;
use crate::generate::aggregator::PackageAggregator;
use crate::model::{Collection, CollectionInput, FormatVersion};
use chrono::Utc;
use ohno::bail;

const LOG_TARGET: &str = " assembler";

/// Top-level orchestration: walks the input package list and produces the
/// final collection document.
#[derive(Debug)]
pub struct CollectionAssembler<'a> {
    aggregator: PackageAggregator<'a>,
}

impl<'a> CollectionAssembler<'a> {
    /// Create an assembler over the given aggregator.
    #[must_use]
    pub const fn new(aggregator: PackageAggregator<'a>) -> Self {
        Self { aggregator }
    }

    /// Assemble the collection described by `input`.
    ///
    /// Packages are processed sequentially in input order, which is also the
    /// output order. A package that cannot be aggregated is logged and omitted;
    /// the run fails only when no package survives.
    pub async fn assemble(&self, input: &CollectionInput, revision: Option<i64>) -> Result<Collection> {
        let mut packages = Vec::with_capacity(input.packages.len());

        for package_input in &input.packages {
            log::info!(target: LOG_TARGET, "Processing package '{}'", package_input.url);
            match self.aggregator.aggregate(package_input).await {
                Ok(package) => packages.push(package),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Skipping package '{}': {e:#}", package_input.url);
                }
            }
        }

        if packages.is_empty() {
            bail!("collection '{}' contains no valid packages", input.name);
        }

        Ok(Collection {
            name: input.name.clone(),
            overview: input.overview.clone(),
            keywords: input.keywords.clone(),
            packages,
            format_version: FormatVersion::V1_0,
            revision,
            generated_at: Utc::now(),
            generated_by: input.author.clone(),
        })
    }
}
