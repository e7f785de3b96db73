use gene_annotator::ensembl::{parse_go_xrefs, parse_identity};
use serde_json::json;

#[test]
fn identity_prefers_display_name() {
    let payload = json!({
        "display_name": "TP53",
        "external_name": "TP53-201",
        "description": "tumor protein p53 [Source:HGNC Symbol;Acc:HGNC:11998]",
        "species": "homo_sapiens",
        "biotype": "protein_coding"
    });
    let identity = parse_identity(&payload);
    assert_eq!(identity.symbol.as_deref(), Some("TP53"));
    assert_eq!(identity.organism.as_deref(), Some("homo_sapiens"));
    assert!(identity.full_name.unwrap().starts_with("tumor protein p53"));
}

#[test]
fn identity_falls_back_to_external_name() {
    let payload = json!({ "external_name": "BRCA2" });
    let identity = parse_identity(&payload);
    assert_eq!(identity.symbol.as_deref(), Some("BRCA2"));
    assert_eq!(identity.full_name, None);
    assert_eq!(identity.organism, None);
}

#[test]
fn identity_of_empty_payload_is_empty() {
    let identity = parse_identity(&json!({}));
    assert_eq!(identity.symbol, None);
    assert_eq!(identity.full_name, None);
    assert_eq!(identity.organism, None);
}

#[test]
fn xrefs_keep_only_gene_ontology_sources() {
    let payload = json!([
        { "dbname": "GO", "primary_id": "GO:0006915", "description": "apoptotic process" },
        { "dbname": "goslim_goa", "primary_id": "GO:0008150", "description": "biological process" },
        { "db_display_name": "gene_ontology", "id": "GO:0005634", "description": "nucleus" },
        { "dbname": "HGNC", "primary_id": "HGNC:11998", "description": "tumor protein p53" }
    ]);
    let terms = parse_go_xrefs(&payload);
    let ids: Vec<&str> = terms.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["GO:0006915", "GO:0005634"]);
}

#[test]
fn xrefs_probe_id_and_description_keys() {
    let payload = json!([
        { "dbname": "GO", "primary_id": "GO_0006915" },
        { "dbname": "GO", "display_id": "GO:0006915" },
        { "dbname": "GO" }
    ]);
    let terms = parse_go_xrefs(&payload);
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].id, "GO:0006915");
    assert_eq!(terms[0].description, "GO:0006915");
}

#[test]
fn xrefs_dedupe_by_normalized_id() {
    let payload = json!([
        { "dbname": "GO", "primary_id": "GO:0006915", "description": "apoptotic process" },
        { "dbname": "GO", "primary_id": "go:0006915", "description": "another wording" }
    ]);
    let terms = parse_go_xrefs(&payload);
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].description, "apoptotic process");
}

#[test]
fn xrefs_of_non_array_payload_are_empty() {
    assert!(parse_go_xrefs(&json!({ "error": "ID not found" })).is_empty());
}
