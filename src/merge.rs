use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{ProviderRecord, normalize_go_id};

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergedView {
    pub go_ids: Vec<String>,
    pub go_descriptions: BTreeMap<String, String>,
}

pub fn merge_records(
    ensembl: &ProviderRecord,
    uniprot: &ProviderRecord,
    ncbi: &ProviderRecord,
) -> MergedView {
    let mut descriptions: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in [ensembl, uniprot, ncbi] {
        for term in &record.go_terms {
            let Some(id) = normalize_go_id(&term.id) else {
                continue;
            };
            let entry = descriptions.entry(id).or_default();
            let description = term.description.trim();
            if !description.is_empty() {
                entry.insert(description.to_string());
            }
        }
    }

    let go_ids = descriptions.keys().cloned().collect();
    let go_descriptions = descriptions
        .into_iter()
        .map(|(id, variants)| {
            let joined = variants.into_iter().collect::<Vec<_>>().join("; ");
            (id, joined)
        })
        .collect();

    MergedView {
        go_ids,
        go_descriptions,
    }
}

pub fn preferred_symbol(
    ensembl: &ProviderRecord,
    uniprot: &ProviderRecord,
    ncbi: &ProviderRecord,
) -> String {
    [ensembl, uniprot, ncbi]
        .into_iter()
        .find_map(|record| {
            record
                .symbol
                .as_deref()
                .map(|symbol| symbol.trim())
                .filter(|symbol| !symbol.is_empty())
        })
        .map(|symbol| symbol.to_string())
        .unwrap_or_default()
}
