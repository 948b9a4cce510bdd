//! Metadata bags assembled from platform records before rendering.
//!
//! Builders never fail: bad optional data (unnamed authors, malformed
//! ORCIDs, a published DOI that is not a URL) is logged and left out.

use chrono::{DateTime, Datelike, Utc};
use tracing::{error, info, warn};

use crate::records::{Article, Author, Preprint};
use crate::settings::JournalSettings;
use crate::validate::{escape_str, get_valid_orcid, is_valid_url};

/// A calendar date split the way Crossref's `<publication_date>` wants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub month: u32,
    pub day: u32,
    pub year: i32,
}

impl DateParts {
    pub fn from_date(d: &impl Datelike) -> Self {
        Self {
            month: d.month(),
            day: d.day(),
            year: d.year(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub given_name: Option<String>,
    pub surname: String,
    /// Canonical `https://orcid.org/...` URL.
    pub orcid: Option<String>,
}

/// Metadata for a journal article or book chapter.
#[derive(Debug, Clone)]
pub struct JournalMetadata {
    pub now: DateTime<Utc>,
    pub target_url: Option<String>,
    pub title: String,
    pub abstract_text: Option<String>,
    pub doi: Option<String>,
    /// Set when the deposit replaces the metadata of an existing DOI.
    pub update_id: Option<String>,
    pub depositor_name: Option<String>,
    pub depositor_email: Option<String>,
    pub registrant: Option<String>,
    pub journal_title: String,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub contributors: Vec<Contributor>,
    pub published_date: Option<DateParts>,
}

/// Metadata for a preprint deposited as Crossref posted content.
#[derive(Debug, Clone)]
pub struct PreprintMetadata {
    pub now: DateTime<Utc>,
    pub target_url: String,
    pub group_title: Option<String>,
    pub contributors: Vec<Contributor>,
    pub title: String,
    pub abstract_text: Option<String>,
    pub published_date: Option<DateParts>,
    pub accepted_date: Option<DateParts>,
    /// DOI URL of the version of record, when the preprint has been published.
    pub published_doi: Option<String>,
    /// The preprint's own DOI, known only when updating.
    pub doi: Option<String>,
}

/// Turn author records into Crossref contributors.
///
/// Authors without an account or without any name are dropped. An author
/// with only a first name is listed under that name as surname.
pub fn normalize_contributors(authors: &[Author]) -> Vec<Contributor> {
    let mut contributors = Vec::with_capacity(authors.len());
    for author in authors {
        let Some(account) = &author.account else {
            warn!("no author account found");
            continue;
        };
        let first = account.first_name.as_deref().filter(|s| !s.is_empty());
        let last = account.last_name.as_deref().filter(|s| !s.is_empty());

        let (given_name, surname) = match (first, last) {
            (None, None) => {
                warn!("no names given for author");
                continue;
            }
            (first, Some(last)) => (first.map(str::to_string), last.to_string()),
            (Some(first), None) => {
                info!(contributor = %account, "no last name found, using first name as surname");
                (None, first.to_string())
            }
        };

        let raw_orcid = account.orcid.as_deref().unwrap_or_default();
        let orcid = get_valid_orcid(raw_orcid);
        if orcid.is_none() {
            warn!(orcid = raw_orcid, contributor = %account, "invalid ORCID omitted");
        }

        contributors.push(Contributor {
            given_name,
            surname,
            orcid,
        });
    }
    contributors
}

/// Assemble the metadata bag for a journal article.
pub fn journal_metadata(
    article: &Article,
    settings: &JournalSettings,
    now: DateTime<Utc>,
) -> JournalMetadata {
    JournalMetadata {
        now,
        target_url: article.remote_url.clone().filter(|u| !u.is_empty()),
        title: escape_str(&article.title),
        abstract_text: article.abstract_text.as_deref().map(escape_str),
        doi: article.doi.clone().filter(|d| !d.is_empty()),
        update_id: None,
        depositor_name: settings.crossref_name.clone().filter(|v| !v.trim().is_empty()),
        depositor_email: settings.crossref_email.clone().filter(|v| !v.trim().is_empty()),
        registrant: settings.crossref_registrant.clone().filter(|v| !v.trim().is_empty()),
        journal_title: article.journal.name.clone(),
        issn: article.journal.issn.clone(),
        publisher: article.journal.publisher.clone(),
        contributors: normalize_contributors(&article.authors),
        published_date: article.date_published.as_ref().map(DateParts::from_date),
    }
}

/// Assemble the metadata bag for a preprint.
pub fn preprint_metadata(preprint: &Preprint, now: DateTime<Utc>) -> PreprintMetadata {
    let published_doi = match preprint.doi.as_deref().filter(|d| !d.is_empty()) {
        Some(doi) if is_valid_url(doi) => Some(doi.to_string()),
        Some(doi) => {
            error!(doi, preprint = %preprint, "published DOI is not a valid URL");
            None
        }
        None => None,
    };

    PreprintMetadata {
        now,
        target_url: preprint.url.clone(),
        group_title: preprint.subjects.first().cloned(),
        contributors: normalize_contributors(&preprint.authors),
        title: escape_str(&preprint.title),
        abstract_text: preprint.abstract_text.as_deref().map(escape_str),
        published_date: preprint.date_published.as_ref().map(DateParts::from_date),
        accepted_date: preprint.date_accepted.as_ref().map(DateParts::from_date),
        published_doi,
        doi: preprint.preprint_doi.clone().filter(|d| !d.is_empty()),
    }
}
