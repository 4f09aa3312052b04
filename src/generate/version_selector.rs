//! Default version selection over a repository's tags.

use semver::Version;

/// Most versions to keep per distinct major version.
const MAX_VERSIONS_PER_MAJOR: usize = 3;

/// Most distinct major versions to keep.
const MAX_MAJORS: usize = 2;

/// Pick a bounded, representative subset of a repository's tags.
///
/// Tags that do not parse as semantic versions (tolerating a leading `v`) are
/// discarded. The rest are considered in descending version order, keeping at
/// most [`MAX_VERSIONS_PER_MAJOR`] versions per major and stopping entirely
/// once a third distinct major would be started.
///
/// The returned strings are the original tag spellings, in selection order.
/// This function is pure; for the same tag list it always produces the same
/// answer, which keeps collections reproducible.
#[must_use]
pub fn select_default_versions(tags: &[String]) -> Vec<String> {
    let mut parsed: Vec<(Version, &String)> = tags.iter().filter_map(|tag| parse_tag(tag).map(|version| (version, tag))).collect();
    parsed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut selected = Vec::new();
    let mut current_major = None;
    let mut major_count = 0;
    let mut minor_count = 0;

    for (version, tag) in parsed {
        if current_major != Some(version.major) {
            current_major = Some(version.major);
            major_count += 1;
            minor_count = 0;
        }

        if major_count > MAX_MAJORS {
            break;
        }
        if minor_count >= MAX_VERSIONS_PER_MAJOR {
            continue;
        }

        selected.push(tag.clone());
        minor_count += 1;
    }

    selected
}

fn parse_tag(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    Version::parse(trimmed.strip_prefix('v').unwrap_or(trimmed)).ok()
}
