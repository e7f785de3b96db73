use serde_json::Value;

use crate::domain::{GeneId, GoTerm};
use crate::error::GannotError;
use crate::fetch::FetchClient;
use crate::json_util::first_string;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

const SYMBOL_KEYS: &[&str] = &["nomenclature_symbol", "name"];
const GO_FIELD_KEYS: &[&str] = &["go_component", "go_function", "go_process"];

pub trait NcbiClient: Send + Sync {
    fn cross_reference(&self, id: &GeneId) -> Result<Option<String>, GannotError>;
    fn gene_symbol(&self, gene_uid: &str) -> Result<Option<String>, GannotError>;
    fn go_terms(&self, gene_uid: &str) -> Result<Vec<GoTerm>, GannotError>;
}

#[derive(Clone)]
pub struct NcbiHttpClient {
    fetch: FetchClient,
    base_url: String,
}

impl NcbiHttpClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            base_url: EUTILS_BASE.to_string(),
        }
    }

    fn summary(&self, gene_uid: &str) -> Result<Option<Value>, GannotError> {
        let url = format!("{}/esummary.fcgi", self.base_url);
        let response = self
            .fetch
            .get(&url, &[("db", "gene"), ("id", gene_uid), ("retmode", "json")])?;
        if !response.status().is_success() {
            return Ok(None);
        }
        match response.json() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        }
    }
}

impl NcbiClient for NcbiHttpClient {
    fn cross_reference(&self, id: &GeneId) -> Result<Option<String>, GannotError> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let term = format!("{}[Ensembl]", id.as_str());
        let response = self.fetch.get(
            &url,
            &[
                ("db", "gene"),
                ("term", term.as_str()),
                ("retmode", "json"),
                ("retmax", "1"),
            ],
        )?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        Ok(parse_search_ids(&payload).into_iter().next())
    }

    fn gene_symbol(&self, gene_uid: &str) -> Result<Option<String>, GannotError> {
        Ok(self
            .summary(gene_uid)?
            .as_ref()
            .and_then(|payload| parse_summary_symbol(payload, gene_uid)))
    }

    fn go_terms(&self, gene_uid: &str) -> Result<Vec<GoTerm>, GannotError> {
        Ok(self
            .summary(gene_uid)?
            .as_ref()
            .map(|payload| parse_summary_go_terms(payload, gene_uid))
            .unwrap_or_default())
    }
}

pub fn parse_search_ids(payload: &Value) -> Vec<String> {
    payload["esearchresult"]["idlist"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_str().map(|uid| uid.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_summary_symbol(payload: &Value, gene_uid: &str) -> Option<String> {
    first_string(&payload["result"][gene_uid], SYMBOL_KEYS)
}

pub fn parse_summary_go_terms(payload: &Value, gene_uid: &str) -> Vec<GoTerm> {
    let document = &payload["result"][gene_uid];
    let mut terms: Vec<GoTerm> = Vec::new();
    for field in GO_FIELD_KEYS {
        let Some(entries) = document.get(*field).and_then(|v| v.as_array()) else {
            continue;
        };
        for entry in entries {
            let Some(id) = first_string(entry, &["value"]) else {
                continue;
            };
            let description = first_string(entry, &["label"]).unwrap_or_default();
            if let Some(term) = GoTerm::parse(&id, &description) {
                if !terms.contains(&term) {
                    terms.push(term);
                }
            }
        }
    }
    terms
}
