use serde::Serialize;

use crate::domain::{GeneId, ProviderRecord};
use crate::ensembl::EnsemblClient;
use crate::ncbi::NcbiClient;
use crate::uniprot::UniprotClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceRecords {
    pub ensembl: ProviderRecord,
    pub uniprot: ProviderRecord,
    pub ncbi: ProviderRecord,
}

pub struct Resolver<E, U, N> {
    ensembl: E,
    uniprot: U,
    ncbi: N,
    uniprot_enabled: bool,
    ncbi_enabled: bool,
}

impl<E, U, N> Resolver<E, U, N>
where
    E: EnsemblClient,
    U: UniprotClient,
    N: NcbiClient,
{
    pub fn new(ensembl: E, uniprot: U, ncbi: N, uniprot_enabled: bool, ncbi_enabled: bool) -> Self {
        Self {
            ensembl,
            uniprot,
            ncbi,
            uniprot_enabled,
            ncbi_enabled,
        }
    }

    // A provider failure never fails the identifier; the record for that
    // provider just stays empty.
    pub fn resolve(&self, id: &GeneId) -> SourceRecords {
        let mut records = SourceRecords::default();

        let identity = self
            .ensembl
            .lookup_identity(id)
            .unwrap_or_else(|err| {
                tracing::warn!(id = %id, error = %err, "ensembl identity lookup degraded");
                None
            })
            .unwrap_or_default();
        records.ensembl = ProviderRecord {
            native_id: None,
            symbol: identity.symbol.clone(),
            full_name: identity.full_name.clone(),
            organism: identity.organism.clone(),
            go_terms: self.ensembl.go_xrefs(id).unwrap_or_else(|err| {
                tracing::warn!(id = %id, error = %err, "ensembl GO xref lookup degraded");
                Vec::new()
            }),
        };

        if self.uniprot_enabled {
            let accession = self
                .uniprot
                .cross_reference(id, identity.symbol.as_deref(), identity.organism.as_deref())
                .unwrap_or_else(|err| {
                    tracing::warn!(id = %id, error = %err, "uniprot cross-reference degraded");
                    None
                });
            if let Some(accession) = accession {
                records.uniprot.symbol =
                    self.uniprot.gene_symbol(&accession).unwrap_or_else(|err| {
                        tracing::warn!(id = %id, %accession, error = %err, "uniprot symbol lookup degraded");
                        None
                    });
                records.uniprot.go_terms =
                    self.uniprot.go_terms(&accession).unwrap_or_else(|err| {
                        tracing::warn!(id = %id, %accession, error = %err, "uniprot GO lookup degraded");
                        Vec::new()
                    });
                records.uniprot.native_id = Some(accession);
            }
        }

        if self.ncbi_enabled {
            let gene_uid = self.ncbi.cross_reference(id).unwrap_or_else(|err| {
                tracing::warn!(id = %id, error = %err, "ncbi cross-reference degraded");
                None
            });
            if let Some(gene_uid) = gene_uid {
                records.ncbi.symbol = self.ncbi.gene_symbol(&gene_uid).unwrap_or_else(|err| {
                    tracing::warn!(id = %id, %gene_uid, error = %err, "ncbi symbol lookup degraded");
                    None
                });
                records.ncbi.go_terms = self.ncbi.go_terms(&gene_uid).unwrap_or_else(|err| {
                    tracing::warn!(id = %id, %gene_uid, error = %err, "ncbi GO lookup degraded");
                    Vec::new()
                });
                records.ncbi.native_id = Some(gene_uid);
            }
        }

        records
    }
}
