//! Semantic version comparison for the client/service compatibility check
//!
//! Input is lenient the way service version strings are: a leading `v`,
//! fewer or more than three numeric segments, and a prerelease without a
//! `-` separator (`1.2beta`) are all accepted before `semver` takes over.

use std::cmp::Ordering;

/// A `semver::Version` plus any numeric segments past the patch number
#[derive(Debug)]
struct LenientVersion {
    version: semver::Version,
    extra: Vec<u64>,
}

impl LenientVersion {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('v').unwrap_or(text);
        let (text, build) = match text.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (text, None),
        };

        let numeric_end = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (numbers, rest) = text.split_at(numeric_end);

        let mut segments = numbers
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let extra = if segments.len() > 3 {
            segments.split_off(3)
        } else {
            segments.resize(3, 0);
            Vec::new()
        };

        let mut normalized = format!("{}.{}.{}", segments[0], segments[1], segments[2]);
        if !rest.is_empty() {
            normalized.push('-');
            normalized.push_str(rest.strip_prefix('-').unwrap_or(rest));
        }
        if let Some(build) = build {
            normalized.push('+');
            normalized.push_str(build);
        }

        let version = semver::Version::parse(&normalized).ok()?;
        Some(Self { version, extra })
    }

    fn extra_segment(&self, i: usize) -> u64 {
        self.extra.get(i).copied().unwrap_or(0)
    }
}

impl Ord for LenientVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (&self.version, &other.version);
        let release = (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch));
        if release != Ordering::Equal {
            return release;
        }

        let len = self.extra.len().max(other.extra.len());
        for i in 0..len {
            match self.extra_segment(i).cmp(&other.extra_segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        // Build metadata never affects compatibility
        a.pre.cmp(&b.pre)
    }
}

impl PartialEq for LenientVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LenientVersion {}

impl PartialOrd for LenientVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Whether `user_version` satisfies `min_version`
///
/// Missing trailing segments count as zero, and a prerelease is older than
/// its release. Unparseable input on either side is never compatible.
pub fn is_version_at_least(user_version: &str, min_version: &str) -> bool {
    match (
        LenientVersion::parse(user_version),
        LenientVersion::parse(min_version),
    ) {
        (Some(user), Some(min)) => user >= min,
        _ => false,
    }
}
