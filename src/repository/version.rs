//! Name and version helpers shared by the repository variants.
//!
//! These are deliberately shallow: the pool treats versions as opaque
//! strings and only needs enough structure to normalize project names,
//! reject names a backend cannot query and spot prereleases.

/// Alphabetic version segments that mark a prerelease.
const PRERELEASE_MARKERS: &[&str] = &["a", "b", "c", "rc", "alpha", "beta", "pre", "preview", "dev"];

/// Normalize a project name: lowercase, with runs of `-`, `_` and `.`
/// collapsed into a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
                in_separator = true;
            }
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    normalized
}

/// Check that a project name is well formed: ASCII alphanumerics at both
/// ends, alphanumerics or `.`, `_`, `-` in between.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Whether a version string denotes a prerelease (alpha, beta, release
/// candidate or development release). The local part after `+` is ignored.
pub fn is_prerelease(version: &str) -> bool {
    let public = version.split('+').next().unwrap_or_default();
    let lower = public.to_ascii_lowercase();

    lower
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|segment| !segment.is_empty())
        .any(|segment| PRERELEASE_MARKERS.contains(&segment))
}
