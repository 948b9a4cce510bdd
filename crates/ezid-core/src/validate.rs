//! Identifier validation and text normalisation for EZID payloads.
//!
//! # Conventions
//!
//! - ORCID iDs are stored by the platform either bare (`0000-0001-8549-9354`)
//!   or as a URL; Crossref wants the URL form.
//! - ISSNs are `NNNN-NNNC` where the check character may be `X`. The
//!   platform uses `0000-0000` as a "no ISSN" sentinel.
//! - EZID percent-decodes the whole request body, so literal `%` in free
//!   text must be sent as `%25`.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use reqwest::Url;

static ORCID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://orcid\.org/[0-9]{4}-[0-9]{4}-[0-9]{4}-[0-9]{3}[X0-9]$")
        .expect("invalid ORCID regex")
});

static ISSN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{3}[0-9X]$").expect("invalid ISSN regex"));

/// Placeholder ISSN the platform stores when a journal has none.
pub const PLACEHOLDER_ISSN: &str = "0000-0000";

/// Characters left literal by [`encode`]: unreserved marks plus `:` and `/`.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

/// Return the canonical `https://orcid.org/...` form of an ORCID iD, or
/// `None` if the input is empty or malformed.
///
/// A value not starting with `http` is treated as a bare iD and prefixed.
/// An explicit `http://` URL is kept as given.
pub fn get_valid_orcid(orcid: &str) -> Option<String> {
    let orcid = orcid.trim();
    if orcid.is_empty() {
        return None;
    }
    let candidate = if orcid.starts_with("http") {
        orcid.to_string()
    } else {
        format!("https://orcid.org/{orcid}")
    };
    ORCID_PATTERN.is_match(&candidate).then_some(candidate)
}

/// Whether `issn` is a well-formed, non-placeholder ISSN.
pub fn is_valid_issn(issn: &str) -> bool {
    if issn.is_empty() || issn == PLACEHOLDER_ISSN {
        return false;
    }
    ISSN_PATTERN.is_match(issn)
}

/// Whether `url` is an absolute http(s)/ftp(s) URL with a host.
pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https" | "ftp" | "ftps")
                && parsed.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Escape literal `%` so it survives EZID's percent-decoding of the payload.
pub fn escape_str(s: &str) -> String {
    s.replace('%', "%25")
}

/// Percent-encode an identifier for use in an EZID URL path.
///
/// `doi:10.1234/abc def` → `doi:10.1234/abc%20def`
pub fn encode(txt: &str) -> String {
    utf8_percent_encode(txt, PATH_SAFE).to_string()
}
