//! Requirement labels such as `requests>=2,<3` or `foo==1.0.*`.

use std::{fmt, str::FromStr};

use crate::{error::DownloadError, utils::normalize_name, version::ReleaseVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `===`, verbatim string comparison.
    Arbitrary,
    /// `==`
    Equal,
    /// `==` with a trailing `.*`.
    EqualPrefix,
    /// `!=`
    NotEqual,
    /// `!=` with a trailing `.*`.
    NotEqualPrefix,
    /// `~=`
    Compatible,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
}

impl Operator {
    fn as_str(&self) -> &'static str {
        match self {
            Operator::Arbitrary => "===",
            Operator::Equal | Operator::EqualPrefix => "==",
            Operator::NotEqual | Operator::NotEqualPrefix => "!=",
            Operator::Compatible => "~=",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
        }
    }
}

const OPERATORS: [(&str, Operator); 8] = [
    ("===", Operator::Arbitrary),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("~=", Operator::Compatible),
    (">=", Operator::GreaterEqual),
    ("<=", Operator::LessEqual),
    (">", Operator::Greater),
    ("<", Operator::Less),
];

#[derive(Debug, Clone)]
pub struct Specifier {
    pub operator: Operator,
    pub version: ReleaseVersion,
}

impl Specifier {
    fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let (symbol, mut operator) = OPERATORS
            .iter()
            .find(|(symbol, _)| input.starts_with(symbol))
            .copied()
            .ok_or_else(|| format!("missing comparison operator in '{input}'"))?;

        let mut version = input[symbol.len()..].trim();
        if version.is_empty() {
            return Err(format!("missing version after '{symbol}'"));
        }

        if let Some(prefix) = version.strip_suffix(".*") {
            operator = match operator {
                Operator::Equal => Operator::EqualPrefix,
                Operator::NotEqual => Operator::NotEqualPrefix,
                _ => return Err(format!("'.*' is not allowed with '{symbol}'")),
            };
            version = prefix;
        }

        let parsed = ReleaseVersion::parse(version);
        if operator != Operator::Arbitrary && !parsed.is_valid() {
            return Err(format!("invalid version '{version}'"));
        }
        if operator == Operator::Compatible && parsed.release().len() < 2 {
            return Err(format!("'~=' needs at least two release segments, got '{version}'"));
        }

        Ok(Self {
            operator,
            version: parsed,
        })
    }

    fn prefix_matches(&self, candidate: &ReleaseVersion, prefix: &[u64]) -> bool {
        candidate.epoch() == self.version.epoch()
            && prefix
                .iter()
                .enumerate()
                .all(|(i, segment)| candidate.release().get(i).copied().unwrap_or(0) == *segment)
    }

    pub fn matches(&self, candidate: &ReleaseVersion) -> bool {
        let public = candidate.public();
        match self.operator {
            Operator::Arbitrary => {
                candidate.as_str().eq_ignore_ascii_case(self.version.as_str())
            }
            Operator::Equal => public == self.version,
            Operator::NotEqual => public != self.version,
            Operator::EqualPrefix => self.prefix_matches(candidate, self.version.release()),
            Operator::NotEqualPrefix => !self.prefix_matches(candidate, self.version.release()),
            Operator::Compatible => {
                let release = self.version.release();
                public >= self.version
                    && self.prefix_matches(candidate, &release[..release.len() - 1])
            }
            Operator::GreaterEqual => public >= self.version,
            Operator::LessEqual => public <= self.version,
            Operator::Greater => public > self.version,
            Operator::Less => public < self.version,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)?;
        if matches!(
            self.operator,
            Operator::EqualPrefix | Operator::NotEqualPrefix
        ) {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// A project name with optional version specifiers.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<Specifier>,
}

impl Requirement {
    /// Parses `name[extras] spec, spec ; marker`. Extras and environment
    /// markers are accepted and otherwise ignored.
    pub fn parse(label: &str) -> Result<Self, DownloadError> {
        let invalid = |reason: String| DownloadError::InvalidRequirement {
            label: label.to_string(),
            reason,
        };

        let input = label.split(';').next().unwrap_or_default().trim();

        let name_end = input
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(input.len());
        let name = &input[..name_end];

        if name.is_empty() {
            return Err(invalid("missing project name".into()));
        }
        if !name.starts_with(|c: char| c.is_ascii_alphanumeric())
            || !name.ends_with(|c: char| c.is_ascii_alphanumeric())
        {
            return Err(invalid(format!("invalid project name '{name}'")));
        }

        let mut rest = input[name_end..].trim_start();

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let (inner, tail) = after
                .split_once(']')
                .ok_or_else(|| invalid("unclosed extras".into()))?;
            extras = inner
                .split(',')
                .map(str::trim)
                .filter(|extra| !extra.is_empty())
                .map(String::from)
                .collect();
            rest = tail.trim_start();
        }

        if let Some(inner) = rest.strip_prefix('(') {
            rest = inner
                .strip_suffix(')')
                .ok_or_else(|| invalid("unclosed parenthesis".into()))?;
        }

        let specifiers = if rest.trim().is_empty() {
            Vec::new()
        } else {
            rest.split(',')
                .map(Specifier::parse)
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?
        };

        Ok(Self {
            name: name.to_string(),
            extras,
            specifiers,
        })
    }

    /// Name used in index URLs.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// True when every specifier accepts `version`.
    pub fn contains(&self, version: &ReleaseVersion) -> bool {
        self.specifiers.iter().all(|spec| spec.matches(version))
    }

    /// Pre-releases are only candidates when a specifier names one.
    pub fn allows_prereleases(&self) -> bool {
        self.specifiers
            .iter()
            .any(|spec| spec.version.is_prerelease())
    }
}

impl FromStr for Requirement {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let specs: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        f.write_str(&specs.join(","))
    }
}
