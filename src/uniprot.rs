use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::domain::{GeneId, GoTerm};
use crate::error::GannotError;
use crate::fetch::{FetchClient, encode_path_segment};
use crate::json_util::{first_array, first_string, string_at};

const UNIPROT_BASE: &str = "https://rest.uniprot.org";

// How long to keep polling an id-mapping job before giving up on it and
// falling back to the symbol search.
const MAPPING_POLL_DEADLINE: Duration = Duration::from_secs(12);

const JOB_ID_KEYS: &[&str] = &["jobId", "job_id", "id"];
const JOB_STATUS_KEYS: &[&str] = &["jobStatus", "status", "job_status"];
const MAPPING_RESULT_KEYS: &[&str] = &["results", "mappedResults", "data", "records"];
const ACCESSION_KEYS: &[&str] = &["primaryAccession", "accession", "id"];
const SEARCH_RESULT_KEYS: &[&str] = &["results", "entries"];
const XREF_LIST_KEYS: &[&str] = &["uniProtKBCrossReferences", "dbReferences"];
const XREF_DB_KEYS: &[&str] = &["database", "type"];
const GO_PROPERTY_KEYS: &[&str] = &["GoTerm", "term"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Finished,
    Failed,
}

pub trait UniprotClient: Send + Sync {
    fn cross_reference(
        &self,
        id: &GeneId,
        symbol: Option<&str>,
        organism: Option<&str>,
    ) -> Result<Option<String>, GannotError>;
    fn gene_symbol(&self, accession: &str) -> Result<Option<String>, GannotError>;
    fn go_terms(&self, accession: &str) -> Result<Vec<GoTerm>, GannotError>;
}

#[derive(Clone)]
pub struct UniprotHttpClient {
    fetch: FetchClient,
    base_url: String,
}

impl UniprotHttpClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self {
            fetch,
            base_url: UNIPROT_BASE.to_string(),
        }
    }

    fn map_via_job(&self, id: &GeneId) -> Result<Option<String>, GannotError> {
        let run_url = format!("{}/idmapping/run", self.base_url);
        let body = json!({ "from": "Ensembl", "to": "UniProtKB", "ids": id.as_str() });
        let response = self.fetch.post_json(&run_url, &body)?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        let Some(job_id) = first_string(&payload, JOB_ID_KEYS) else {
            return Ok(None);
        };
        if !self.poll_job(&job_id)? {
            return Ok(None);
        }
        self.mapping_result(&job_id)
    }

    fn poll_job(&self, job_id: &str) -> Result<bool, GannotError> {
        let status_url = format!(
            "{}/idmapping/status/{}",
            self.base_url,
            encode_path_segment(job_id)
        );
        let deadline = Instant::now() + MAPPING_POLL_DEADLINE;
        while Instant::now() < deadline {
            let response = self.fetch.get(&status_url, &[])?;
            if !response.status().is_success() {
                continue;
            }
            let payload: Value = match response.json() {
                Ok(value) => value,
                Err(_) => continue,
            };
            match parse_job_status(&payload) {
                Some(JobStatus::Finished) => return Ok(true),
                Some(JobStatus::Failed) => return Ok(false),
                None => {}
            }
        }
        tracing::debug!(job_id, "uniprot id-mapping job did not finish in time");
        Ok(false)
    }

    fn mapping_result(&self, job_id: &str) -> Result<Option<String>, GannotError> {
        let results_url = format!(
            "{}/idmapping/results/{}",
            self.base_url,
            encode_path_segment(job_id)
        );
        let response = self
            .fetch
            .get(&results_url, &[("format", "json"), ("size", "5")])?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        Ok(parse_mapping_accession(&payload))
    }

    fn search_by_symbol(
        &self,
        symbol: &str,
        organism: Option<&str>,
    ) -> Result<Option<String>, GannotError> {
        let query = match organism {
            Some(organism) => format!(
                "gene:{} AND organism_name:\"{}\"",
                symbol,
                organism.replace('_', " ")
            ),
            None => format!("gene:{symbol}"),
        };
        let url = format!("{}/uniprotkb/search", self.base_url);
        let response = self.fetch.get(
            &url,
            &[("query", query.as_str()), ("format", "json"), ("size", "1")],
        )?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let payload: Value = match response.json() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        Ok(parse_search_accession(&payload))
    }

    fn entry(&self, accession: &str, params: &[(&str, &str)]) -> Result<Option<Value>, GannotError> {
        let url = format!(
            "{}/uniprotkb/{}",
            self.base_url,
            encode_path_segment(accession)
        );
        let response = self.fetch.get(&url, params)?;
        if !response.status().is_success() {
            return Ok(None);
        }
        match response.json() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        }
    }
}

impl UniprotClient for UniprotHttpClient {
    fn cross_reference(
        &self,
        id: &GeneId,
        symbol: Option<&str>,
        organism: Option<&str>,
    ) -> Result<Option<String>, GannotError> {
        let mapped = match self.map_via_job(id) {
            Ok(accession) => accession,
            Err(err) => {
                tracing::warn!(id = %id, error = %err, "uniprot id-mapping failed, trying search");
                None
            }
        };
        if let Some(accession) = mapped {
            return Ok(Some(accession));
        }
        let Some(symbol) = symbol else {
            return Ok(None);
        };
        self.search_by_symbol(symbol, organism)
    }

    fn gene_symbol(&self, accession: &str) -> Result<Option<String>, GannotError> {
        Ok(self
            .entry(accession, &[("fields", "genes")])?
            .as_ref()
            .and_then(parse_gene_symbol))
    }

    fn go_terms(&self, accession: &str) -> Result<Vec<GoTerm>, GannotError> {
        Ok(self
            .entry(accession, &[])?
            .as_ref()
            .map(parse_go_terms)
            .unwrap_or_default())
    }
}

pub fn parse_job_status(payload: &Value) -> Option<JobStatus> {
    let status = first_string(payload, JOB_STATUS_KEYS)?.to_lowercase();
    match status.as_str() {
        "finished" | "complete" | "success" => Some(JobStatus::Finished),
        "failed" | "error" => Some(JobStatus::Failed),
        _ => None,
    }
}

pub fn parse_mapping_accession(payload: &Value) -> Option<String> {
    let results = first_array(payload, MAPPING_RESULT_KEYS).or_else(|| payload.as_array())?;
    let item = results.first()?;
    if let Some(to) = item.get("to") {
        if let Some(accession) = to
            .as_str()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
        {
            return Some(accession.to_string());
        }
        if let Some(accession) = string_at(to, &["primaryAccession"]) {
            return Some(accession);
        }
    }
    first_string(item, ACCESSION_KEYS)
}

pub fn parse_search_accession(payload: &Value) -> Option<String> {
    let results = first_array(payload, SEARCH_RESULT_KEYS)?;
    first_string(results.first()?, ACCESSION_KEYS)
}

pub fn parse_gene_symbol(payload: &Value) -> Option<String> {
    let genes = payload.get("genes").and_then(|v| v.as_array())?;
    string_at(genes.first()?, &["geneName", "value"])
}

pub fn parse_go_terms(payload: &Value) -> Vec<GoTerm> {
    let Some(xrefs) = first_array(payload, XREF_LIST_KEYS) else {
        return Vec::new();
    };
    let mut terms: Vec<GoTerm> = Vec::new();
    for xref in xrefs {
        let Some(db) = first_string(xref, XREF_DB_KEYS) else {
            continue;
        };
        if !db.eq_ignore_ascii_case("GO") {
            continue;
        }
        let Some(id) = first_string(xref, &["id"]) else {
            continue;
        };
        let description = go_description(xref).unwrap_or_default();
        if let Some(term) = GoTerm::parse(&id, &description) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
    }
    terms
}

fn go_description(xref: &Value) -> Option<String> {
    match xref.get("properties") {
        Some(Value::Array(properties)) => properties.iter().find_map(|property| {
            let key = property.get("key").and_then(|v| v.as_str())?;
            if GO_PROPERTY_KEYS.contains(&key) {
                first_string(property, &["value"])
            } else {
                None
            }
        }),
        Some(properties @ Value::Object(_)) => first_string(properties, GO_PROPERTY_KEYS),
        _ => None,
    }
}
