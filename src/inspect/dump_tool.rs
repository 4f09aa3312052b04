use crate::Result;
use crate::inspect::{DescriptionDump, ManifestDump, PackageDump, PackageInspector};
use async_trait::async_trait;
use core::time::Duration;
use ohno::{IntoAppError, bail};
use std::path::Path;
use tokio::process::Command;

const LOG_TARGET: &str = " inspector";

const INSPECT_TIMEOUT: Duration = Duration::from_secs(300);

/// [`PackageInspector`] that shells out to the package tool.
///
/// Runs `<tool> package dump-package` for the manifest and
/// `<tool> package describe --type json` for the build description, both in
/// the checkout directory.
#[derive(Debug, Clone)]
pub struct DumpToolInspector {
    tool: String,
}

impl Default for DumpToolInspector {
    fn default() -> Self {
        Self::new("swift")
    }
}

impl DumpToolInspector {
    /// Create an inspector that invokes `tool`.
    #[must_use]
    pub fn new(tool: &str) -> Self {
        Self { tool: tool.to_string() }
    }

    async fn run(&self, package_dir: &Path, args: &[&str]) -> Result<Vec<u8>> {
        let child = Command::new(&self.tool)
            .args(args)
            .current_dir(package_dir)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .into_app_err_with(|| format!("could not spawn '{} {}'", self.tool, args.join(" ")))?;

        let output = match tokio::time::timeout(INSPECT_TIMEOUT, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(e).into_app_err_with(|| format!("'{} {}' failed to run", self.tool, args.join(" "))),
            Err(_) => {
                bail!("'{} {}' timed out after {} seconds", self.tool, args.join(" "), INSPECT_TIMEOUT.as_secs());
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("'{} {}' failed: {}", self.tool, args.join(" "), stderr.trim());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl PackageInspector for DumpToolInspector {
    async fn inspect(&self, package_dir: &Path) -> Result<PackageDump> {
        log::debug!(target: LOG_TARGET, "Dumping package manifest in '{}'", package_dir.display());
        let manifest_json = self.run(package_dir, &["package", "dump-package"]).await?;
        let manifest: ManifestDump = serde_json::from_slice(&manifest_json)
            .into_app_err_with(|| format!("could not parse manifest dump from '{}'", package_dir.display()))?;

        log::debug!(target: LOG_TARGET, "Describing package in '{}'", package_dir.display());
        let description_json = self.run(package_dir, &["package", "describe", "--type", "json"]).await?;
        let description: DescriptionDump = serde_json::from_slice(&description_json)
            .into_app_err_with(|| format!("could not parse package description from '{}'", package_dir.display()))?;

        Ok(PackageDump { manifest, description })
    }
}
