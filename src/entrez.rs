use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::RawRecord;
use crate::error::LassaError;
use crate::genbank;

pub const LASSA_SEARCH_TERM: &str = "Mammarenavirus lassaense[Organism]";

/// Continuation handle for a completed search: total hit count plus the
/// Entrez history server coordinates that make windowed efetch calls stable
/// and repeatable.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub count: usize,
    pub web_env: String,
    pub query_key: String,
}

pub trait RecordSource: Send + Sync {
    fn search(&self, term: &str) -> Result<SearchSession, LassaError>;
    fn fetch_window(
        &self,
        session: &SearchSession,
        start: usize,
        size: usize,
    ) -> Result<Vec<RawRecord>, LassaError>;
}

#[derive(Clone)]
pub struct EntrezHttpClient {
    client: Client,
    base_url: String,
}

impl EntrezHttpClient {
    pub fn new() -> Result<Self, LassaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("lassaseq/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| LassaError::EntrezHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| LassaError::EntrezHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ESearchEnvelope {
    esearchresult: ESearchResult,
}

#[derive(Deserialize)]
struct ESearchResult {
    count: String,
    webenv: Option<String>,
    querykey: Option<String>,
}

impl RecordSource for EntrezHttpClient {
    fn search(&self, term: &str) -> Result<SearchSession, LassaError> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("db", "nucleotide"),
                ("term", term),
                ("usehistory", "y"),
                ("retmode", "json"),
            ])
            .send()
            .map_err(|err| LassaError::EntrezHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Entrez request failed".to_string());
            return Err(LassaError::EntrezStatus { status, message });
        }
        let payload: ESearchEnvelope = response
            .json()
            .map_err(|err| LassaError::EntrezHttp(err.to_string()))?;
        let count = payload
            .esearchresult
            .count
            .parse::<usize>()
            .map_err(|err| LassaError::EntrezHttp(format!("bad esearch count: {err}")))?;
        let web_env = payload
            .esearchresult
            .webenv
            .ok_or_else(|| LassaError::EntrezHttp("esearch response missing WebEnv".to_string()))?;
        let query_key = payload.esearchresult.querykey.ok_or_else(|| {
            LassaError::EntrezHttp("esearch response missing QueryKey".to_string())
        })?;
        Ok(SearchSession {
            count,
            web_env,
            query_key,
        })
    }

    fn fetch_window(
        &self,
        session: &SearchSession,
        start: usize,
        size: usize,
    ) -> Result<Vec<RawRecord>, LassaError> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("db", "nucleotide"),
                ("rettype", "gb"),
                ("retmode", "text"),
                ("retstart", start.to_string().as_str()),
                ("retmax", size.to_string().as_str()),
                ("WebEnv", session.web_env.as_str()),
                ("query_key", session.query_key.as_str()),
            ])
            .send()
            .map_err(|err| LassaError::EntrezHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Entrez request failed".to_string());
            return Err(LassaError::EntrezStatus { status, message });
        }
        let text = response
            .text()
            .map_err(|err| LassaError::EntrezHttp(err.to_string()))?;
        let records = genbank::parse_flatfile(&text);
        // A truncated or HTML error payload parses to nothing; surface it so
        // the retry policy can take another attempt.
        if records.is_empty() && size > 0 {
            return Err(LassaError::GenbankParse(format!(
                "window [{start}, {}) contained no records",
                start + size
            )));
        }
        Ok(records)
    }
}
