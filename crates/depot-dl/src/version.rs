//! Lenient ordering of Python release versions.

use std::{cmp::Ordering, fmt, sync::LazyLock};

use regex::Regex;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>[0-9]+)?)?
        (?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        $",
    )
    .expect("unable to compile version regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Parsed {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// A release version as published on an index.
///
/// Versions following PEP 440 are ordered by epoch, release segments (zero
/// padded, so `1.0 == 1.0.0`), pre, post and dev parts. Anything else is kept
/// verbatim and sorts before every well-formed version.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    raw: String,
    parsed: Option<Parsed>,
}

fn number(value: Option<regex::Match<'_>>) -> Option<Option<u64>> {
    match value {
        Some(m) => m.as_str().parse().ok().map(Some),
        None => Some(None),
    }
}

impl ReleaseVersion {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        Self {
            raw: raw.trim().to_string(),
            parsed: Self::parse_pep440(&normalized),
        }
    }

    fn parse_pep440(input: &str) -> Option<Parsed> {
        let caps = VERSION_RE.captures(input)?;

        let epoch = number(caps.name("epoch"))?.unwrap_or(0);
        let release = caps
            .name("release")?
            .as_str()
            .split('.')
            .map(|part| part.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let kind = match label.as_str() {
                    "a" | "alpha" => PreKind::Alpha,
                    "b" | "beta" => PreKind::Beta,
                    _ => PreKind::Rc,
                };
                Some((kind, number(caps.name("pre_n"))?.unwrap_or(0)))
            }
            None => None,
        };

        let post = if caps.name("post_n1").is_some() {
            number(caps.name("post_n1"))?
        } else if caps.name("post_l").is_some() {
            Some(number(caps.name("post_n2"))?.unwrap_or(0))
        } else {
            None
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(number(caps.name("dev_n"))?.unwrap_or(0)),
            None => None,
        };

        Some(Parsed {
            epoch,
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    /// Pre-releases and development releases.
    pub fn is_prerelease(&self) -> bool {
        self.parsed
            .as_ref()
            .is_some_and(|p| p.pre.is_some() || p.dev.is_some())
    }

    pub fn epoch(&self) -> u64 {
        self.parsed.as_ref().map_or(0, |p| p.epoch)
    }

    /// Release segments, empty for unparsable versions.
    pub fn release(&self) -> &[u64] {
        self.parsed.as_ref().map_or(&[], |p| p.release.as_slice())
    }

    /// Copy of this version with the local label dropped.
    pub fn public(&self) -> Self {
        let mut public = self.clone();
        if let Some(parsed) = public.parsed.as_mut() {
            parsed.local = None;
        }
        public
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            a.get(i)
                .copied()
                .unwrap_or(0)
                .cmp(&b.get(i).copied().unwrap_or(0))
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort key for the pre-release part: a bare dev release sorts before any
/// pre-release of the same version, a final release after all of them.
fn pre_key(p: &Parsed) -> (u8, Option<(PreKind, u64)>) {
    match (p.pre, p.post, p.dev) {
        (None, None, Some(_)) => (0, None),
        (Some(pre), _, _) => (1, Some(pre)),
        (None, _, _) => (2, None),
    }
}

fn cmp_parsed(a: &Parsed, b: &Parsed) -> Ordering {
    a.epoch
        .cmp(&b.epoch)
        .then_with(|| cmp_release(&a.release, &b.release))
        .then_with(|| pre_key(a).cmp(&pre_key(b)))
        .then_with(|| a.post.map_or(-1, |n| n as i128).cmp(&b.post.map_or(-1, |n| n as i128)))
        .then_with(|| {
            a.dev
                .map_or(i128::MAX, |n| n as i128)
                .cmp(&b.dev.map_or(i128::MAX, |n| n as i128))
        })
        .then_with(|| a.local.cmp(&b.local))
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => cmp_parsed(a, b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => self.raw.cmp(&other.raw),
        }
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ReleaseVersion {}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> ReleaseVersion {
        ReleaseVersion::parse(s)
    }

    #[test]
    fn test_zero_padding() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("v2.1"), v("2.1.0"));
        assert!(v("1.0.1") > v("1.0"));
        assert!(v("1.10") > v("1.9"));
    }

    #[test]
    fn test_prerelease_ordering() {
        let mut versions: Vec<_> = [
            "1.0", "1.0rc1", "1.0a1", "1.0.dev0", "1.0b2", "1.0.post1", "0.9", "1.0a1.dev1",
        ]
        .into_iter()
        .map(v)
        .collect();
        versions.sort();

        let ordered: Vec<_> = versions.iter().map(ReleaseVersion::as_str).collect();
        assert_eq!(
            ordered,
            ["0.9", "1.0.dev0", "1.0a1.dev1", "1.0a1", "1.0b2", "1.0rc1", "1.0", "1.0.post1"]
        );
    }

    #[test]
    fn test_alternate_spellings() {
        assert_eq!(v("1.0alpha1"), v("1.0a1"));
        assert_eq!(v("1.0-beta.2"), v("1.0b2"));
        assert_eq!(v("1.0c1"), v("1.0rc1"));
        assert_eq!(v("1.0-1"), v("1.0.post1"));
        assert_eq!(v("1.0.POST"), v("1.0.post0"));
    }

    #[test]
    fn test_epoch_wins() {
        assert!(v("1!0.1") > v("2024.1"));
        assert_eq!(v("1!0.1").epoch(), 1);
    }

    #[test]
    fn test_is_prerelease() {
        assert!(v("2.0b1").is_prerelease());
        assert!(v("2.0.dev3").is_prerelease());
        assert!(!v("2.0").is_prerelease());
        assert!(!v("2.0.post1").is_prerelease());
    }

    #[test]
    fn test_invalid_versions_sort_first() {
        let odd = v("nightly-2024");
        assert!(!odd.is_valid());
        assert!(odd < v("0.0.1"));
        assert_eq!(odd.as_str(), "nightly-2024");
        assert!(odd.release().is_empty());
    }

    #[test]
    fn test_local_labels() {
        assert!(v("1.0+local.1") > v("1.0"));
        assert_eq!(v("1.0+local.1").public(), v("1.0"));
    }
}
