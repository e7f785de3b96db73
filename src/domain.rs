use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;

use crate::error::GannotError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GeneId(String);

impl GeneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GeneId {
    type Err = GannotError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GannotError::InvalidGeneId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

pub fn normalize_go_id(value: &str) -> Option<String> {
    let candidate = value.trim().to_uppercase();
    let shape = Regex::new(r"^GO:\d+$").unwrap();
    shape.is_match(&candidate).then_some(candidate)
}

#[derive(Debug, Clone, Serialize)]
pub struct GoTerm {
    pub id: String,
    pub description: String,
}

impl GoTerm {
    pub fn parse(id: &str, description: &str) -> Option<Self> {
        let id = normalize_go_id(id)?;
        Some(Self {
            id,
            description: description.to_string(),
        })
    }
}

// Two GO terms are the same term when their ids match, whatever each
// provider put in the description.
impl PartialEq for GoTerm {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GoTerm {}

impl Hash for GoTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderRecord {
    pub native_id: Option<String>,
    pub symbol: Option<String>,
    pub full_name: Option<String>,
    pub organism: Option<String>,
    pub go_terms: Vec<GoTerm>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_gene_id_trims() {
        let id: GeneId = " ENSG00000141510 ".parse().unwrap();
        assert_eq!(id.as_str(), "ENSG00000141510");
    }

    #[test]
    fn parse_gene_id_blank() {
        let err = "   ".parse::<GeneId>().unwrap_err();
        assert_matches!(err, GannotError::InvalidGeneId(_));
    }

    #[test]
    fn go_id_shape_gate() {
        assert_eq!(normalize_go_id("go:0006915").as_deref(), Some("GO:0006915"));
        assert_eq!(normalize_go_id(" GO:0008150 ").as_deref(), Some("GO:0008150"));
        assert_eq!(normalize_go_id("GO_0006915"), None);
        assert_eq!(normalize_go_id("GO:"), None);
        assert_eq!(normalize_go_id("0006915"), None);
    }
}
