//! Zone Selection
//!
//! The user's subset of zones. Order is kept for display, duplicates are
//! dropped, and names are only checked against a dataset on [`ZoneSelection::resolve`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ZoneSelection {
    zones: Vec<String>,
}

impl ZoneSelection {
    /// Build from names, keeping the first occurrence of each; blank names are skipped
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut zones: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !zones.contains(&name) {
                zones.push(name);
            }
        }
        Self { zones }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.zones.iter().any(|z| z == name)
    }

    pub fn first(&self) -> Option<&str> {
        self.zones.first().map(String::as_str)
    }

    /// Keep only names present in `available`, logging the ones dropped
    pub fn resolve(&self, available: &[String]) -> ZoneSelection {
        let (known, unknown): (Vec<&String>, Vec<&String>) =
            self.zones.iter().partition(|z| available.contains(*z));
        if !unknown.is_empty() {
            warn!("Ignoring unknown zones in selection: {:?}", unknown);
        }
        ZoneSelection {
            zones: known.into_iter().cloned().collect(),
        }
    }
}

impl From<Vec<String>> for ZoneSelection {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<ZoneSelection> for Vec<String> {
    fn from(selection: ZoneSelection) -> Self {
        selection.zones
    }
}

impl FromStr for ZoneSelection {
    type Err = ModelError;

    /// Comma-separated list, e.g. `pjm_rto, dom`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            crate::validation::validate_zone_name(name)?;
        }
        Ok(Self::new(s.split(',')))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let selection = ZoneSelection::new(["dom", "pjm_rto", "dom", " ", "aep"]);
        assert_eq!(selection.zones(), &["dom", "pjm_rto", "aep"]);
        assert_eq!(selection.first(), Some("dom"));
    }

    #[test]
    fn test_parse_comma_list() {
        let selection: ZoneSelection = " pjm_rto, dom ,,aep ".parse().unwrap();
        assert_eq!(selection.zones(), &["pjm_rto", "dom", "aep"]);
        assert!("".parse::<ZoneSelection>().unwrap().is_empty());
    }

    #[traced_test]
    #[test]
    fn test_resolve_drops_unknown_names() {
        let selection = ZoneSelection::new(["east", "mars", "west"]);
        let resolved = selection.resolve(&names(&["west", "east", "total"]));
        assert_eq!(resolved.zones(), &["east", "west"]);
        assert!(logs_contain("Ignoring unknown zones"));
    }

    #[test]
    fn test_serde_as_plain_list() {
        let selection: ZoneSelection = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(selection.len(), 2);
        assert_eq!(serde_json::to_string(&selection).unwrap(), r#"["a","b"]"#);
    }
}
