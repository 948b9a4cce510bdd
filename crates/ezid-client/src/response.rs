//! Parsing of EZID's line-oriented responses.
//!
//! A successful operation answers `success: doi:<DOI> | ark:/<ARK>`; anything
//! else (`error: ...`) is a failure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::http::TransportError;

static DOI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"doi:([0-9A-Z./]+)").expect("invalid DOI regex"));

/// What the adapter was doing when it called EZID; used in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Mint,
    Register,
    Update,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint => f.write_str("mint"),
            Self::Register => f.write_str("register"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// The DOI reported by a `success:` response, if any.
pub fn extract_doi(response: &str) -> Option<String> {
    if !response.starts_with("success:") {
        return None;
    }
    DOI_PATTERN
        .captures(response)
        .map(|caps| caps[1].to_string())
}

/// Interpret the outcome of [`send_request`](crate::EzidClient::send_request).
///
/// Returns the DOI on success. Every failure is logged against `item` and
/// yields `None`.
pub fn process_ezid_result(
    item: &dyn fmt::Display,
    action: Action,
    result: &Result<String, TransportError>,
) -> Option<String> {
    match result {
        Ok(response) if response.starts_with("success:") => match extract_doi(response) {
            Some(doi) => {
                debug!(action = %action, doi = %doi, "DOI success");
                Some(doi)
            }
            None => {
                error!(action = %action, item = %item, response = %response, "EZID reported success without a DOI");
                None
            }
        },
        Ok(response) => {
            error!(action = %action, item = %item, response = %response.trim_end(), "EZID DOI request failed");
            None
        }
        Err(err) => {
            error!(action = %action, item = %item, error = %err, "EZID DOI request failed");
            None
        }
    }
}
