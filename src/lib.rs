pub mod app;
pub mod config;
pub mod domain;
pub mod entrez;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod genbank;
pub mod metadata;
pub mod output;
pub mod report;
pub mod segment;
pub mod stats;
pub mod writer;
