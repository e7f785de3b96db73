use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::domain::GeneId;
use crate::ensembl::EnsemblClient;
use crate::error::GannotError;
use crate::merge::{MergedView, merge_records, preferred_symbol};
use crate::ncbi::NcbiClient;
use crate::resolver::{Resolver, SourceRecords};
use crate::uniprot::UniprotClient;

#[derive(Debug, Clone, Serialize)]
pub struct GeneAnnotation {
    pub ensembl_id: GeneId,
    pub sources: SourceRecords,
    pub merged: MergedView,
    pub gene_symbol: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationBatch {
    pub annotations: Vec<GeneAnnotation>,
    pub gene_symbols: Vec<String>,
    pub go_ids: Vec<String>,
    pub meta: BatchMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchMeta {
    pub version: String,
    pub count_input: usize,
    pub count_processed: usize,
    pub timestamp: String,
    pub uniprot: ProviderUsage,
    pub ncbi: ProviderUsage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderUsage {
    pub enabled: bool,
    pub fetch_count: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<E, U, N> {
    resolver: Resolver<E, U, N>,
    settings: ResolvedConfig,
}

impl<E: EnsemblClient, U: UniprotClient, N: NcbiClient> App<E, U, N> {
    pub fn new(settings: ResolvedConfig, ensembl: E, uniprot: U, ncbi: N) -> Self {
        let resolver = Resolver::new(
            ensembl,
            uniprot,
            ncbi,
            settings.uniprot_enabled,
            settings.ncbi_enabled,
        );
        Self { resolver, settings }
    }

    // Oversize check for callers that can push back on the user; batch
    // inputs go through annotate's silent truncation instead.
    pub fn validate_batch_size(&self, supplied: usize) -> Result<(), GannotError> {
        if supplied > self.settings.max_batch_size {
            return Err(GannotError::BatchTooLarge {
                supplied,
                limit: self.settings.max_batch_size,
            });
        }
        Ok(())
    }

    pub fn annotate(
        &self,
        ids: &[String],
        sink: &dyn ProgressSink,
    ) -> Result<AnnotationBatch, GannotError> {
        let count_input = ids.len();
        let mut cleaned: Vec<GeneId> = ids
            .iter()
            .filter_map(|raw| raw.parse::<GeneId>().ok())
            .collect();
        if cleaned.is_empty() {
            return Err(GannotError::EmptyBatch);
        }
        if cleaned.len() > self.settings.max_batch_size {
            tracing::warn!(
                supplied = cleaned.len(),
                limit = self.settings.max_batch_size,
                "truncating oversized batch"
            );
            cleaned.truncate(self.settings.max_batch_size);
        }

        let deadline = self
            .settings
            .batch_deadline
            .map(|budget| Instant::now() + budget);
        let mut annotations = Vec::with_capacity(cleaned.len());
        let mut gene_symbols = BTreeSet::new();
        let mut go_ids = BTreeSet::new();
        let mut uniprot_fetches = 0usize;
        let mut ncbi_fetches = 0usize;

        for id in &cleaned {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    tracing::warn!(
                        remaining = cleaned.len() - annotations.len(),
                        "batch deadline reached, skipping remaining identifiers"
                    );
                    break;
                }
            }
            sink.event(ProgressEvent {
                message: format!("phase=Resolve; annotating {id}"),
            });

            let start = Instant::now();
            let sources = self.resolver.resolve(id);
            let latency = start.elapsed().as_millis();
            sink.event(ProgressEvent {
                message: format!("resolve.response latency_ms={latency}"),
            });

            if sources.uniprot.native_id.is_some() {
                uniprot_fetches += 1;
            }
            if sources.ncbi.native_id.is_some() {
                ncbi_fetches += 1;
            }

            let merged = merge_records(&sources.ensembl, &sources.uniprot, &sources.ncbi);
            let gene_symbol = preferred_symbol(&sources.ensembl, &sources.uniprot, &sources.ncbi);

            for symbol in [
                &sources.ensembl.symbol,
                &sources.uniprot.symbol,
                &sources.ncbi.symbol,
            ]
            .into_iter()
            .flatten()
            {
                let trimmed = symbol.trim();
                if !trimmed.is_empty() {
                    gene_symbols.insert(trimmed.to_string());
                }
            }
            go_ids.extend(merged.go_ids.iter().cloned());

            annotations.push(GeneAnnotation {
                ensembl_id: id.clone(),
                sources,
                merged,
                gene_symbol,
            });
        }

        sink.event(ProgressEvent {
            message: format!("phase=Assemble; merged {} annotations", annotations.len()),
        });

        Ok(AnnotationBatch {
            meta: BatchMeta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                count_input,
                count_processed: annotations.len(),
                timestamp: iso_timestamp(),
                uniprot: ProviderUsage {
                    enabled: self.settings.uniprot_enabled,
                    fetch_count: uniprot_fetches,
                },
                ncbi: ProviderUsage {
                    enabled: self.settings.ncbi_enabled,
                    fetch_count: ncbi_fetches,
                },
            },
            gene_symbols: gene_symbols.into_iter().collect(),
            go_ids: go_ids.into_iter().collect(),
            annotations,
        })
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
