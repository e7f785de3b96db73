pub mod app;
pub mod config;
pub mod domain;
pub mod ensembl;
pub mod error;
pub mod fetch;
pub mod json_util;
pub mod merge;
pub mod ncbi;
pub mod output;
pub mod resolver;
pub mod uniprot;
