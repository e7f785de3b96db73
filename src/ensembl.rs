use serde_json::Value;

use crate::domain::{GeneId, GoTerm};
use crate::error::GannotError;
use crate::fetch::{FetchClient, encode_path_segment};
use crate::json_util::first_string;

const ENSEMBL_BASE: &str = "https://rest.ensembl.org";

const SYMBOL_KEYS: &[&str] = &["display_name", "external_name"];
const FULL_NAME_KEYS: &[&str] = &["description"];
const ORGANISM_KEYS: &[&str] = &["species"];
const XREF_DB_KEYS: &[&str] = &["dbname", "db_display_name"];
const XREF_ID_KEYS: &[&str] = &["primary_id", "id", "display_id"];
const XREF_DESC_KEYS: &[&str] = &["description", "display_id"];

// Recognized by exact (case-insensitive) match, not substring, so that
// goslim_goa and friends stay out.
const GO_MARKERS: &[&str] = &["GO", "GENE_ONTOLOGY"];

#[derive(Debug, Clone, Default)]
pub struct GeneIdentity {
    pub symbol: Option<String>,
    pub full_name: Option<String>,
    pub organism: Option<String>,
}

pub trait EnsemblClient: Send + Sync {
    fn lookup_identity(&self, id: &GeneId) -> Result<Option<GeneIdentity>, GannotError>;
    fn go_xrefs(&self, id: &GeneId) -> Result<Vec<GoTerm>, GannotError>;
}

#[derive(Clone)]
pub struct EnsemblHttpClient {
    fetch: FetchClient,
    base_url: String,
}

impl EnsemblHttpClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            base_url: ENSEMBL_BASE.to_string(),
        }
    }

    fn lookup_url(&self, id: &GeneId) -> String {
        format!(
            "{}/lookup/id/{}",
            self.base_url,
            encode_path_segment(id.as_str())
        )
    }

    fn xrefs_url(&self, id: &GeneId) -> String {
        format!(
            "{}/xrefs/id/{}",
            self.base_url,
            encode_path_segment(id.as_str())
        )
    }
}

impl EnsemblClient for EnsemblHttpClient {
    fn lookup_identity(&self, id: &GeneId) -> Result<Option<GeneIdentity>, GannotError> {
        let response = self.fetch.get(&self.lookup_url(id), &[])?;
        if !response.status().is_success() {
            tracing::debug!(id = %id, status = response.status().as_u16(), "ensembl lookup miss");
            return Ok(None);
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        Ok(Some(parse_identity(&payload)))
    }

    fn go_xrefs(&self, id: &GeneId) -> Result<Vec<GoTerm>, GannotError> {
        let response = self.fetch.get(&self.xrefs_url(id), &[])?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(parse_go_xrefs(&payload))
    }
}

pub fn parse_identity(payload: &Value) -> GeneIdentity {
    GeneIdentity {
        symbol: first_string(payload, SYMBOL_KEYS),
        full_name: first_string(payload, FULL_NAME_KEYS),
        organism: first_string(payload, ORGANISM_KEYS),
    }
}

pub fn parse_go_xrefs(payload: &Value) -> Vec<GoTerm> {
    let Some(entries) = payload.as_array() else {
        return Vec::new();
    };
    let mut terms: Vec<GoTerm> = Vec::new();
    for entry in entries {
        if !is_go_source(entry) {
            continue;
        }
        let Some(id) = first_string(entry, XREF_ID_KEYS) else {
            continue;
        };
        let description = first_string(entry, XREF_DESC_KEYS).unwrap_or_default();
        if let Some(term) = GoTerm::parse(&id, &description) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

fn is_go_source(entry: &Value) -> bool {
    XREF_DB_KEYS.iter().any(|key| {
        entry
            .get(key)
            .and_then(|v| v.as_str())
            .map(|db| GO_MARKERS.iter().any(|marker| db.eq_ignore_ascii_case(marker)))
            .unwrap_or(false)
    })
}
