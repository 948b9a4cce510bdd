//! Publication records handed to the adapter by the host platform.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user account attached to an author or contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Either a bare ORCID iD or an `https://orcid.org/...` URL, unvalidated.
    #[serde(default)]
    pub orcid: Option<String>,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => write!(f, "{first} {last}"),
            (false, true) => f.write_str(first),
            (true, false) => f.write_str(last),
            (true, true) => f.write_str(self.email.as_deref().unwrap_or("unnamed account")),
        }
    }
}

/// An author slot on a preprint. The account may be missing when the
/// author record was created without a linked user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub account: Option<Account>,
}

impl From<Account> for Author {
    fn from(account: Account) -> Self {
        Self {
            account: Some(account),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub issn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}

impl fmt::Display for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A journal article registered under a DOI the journal assigned itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Landing page the DOI resolves to.
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    pub journal: Journal,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub date_published: Option<NaiveDate>,
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Article {}: {}", self.id, self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub short_name: String,
    pub name: String,
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A preprint hosted in a repository.
///
/// `doi` is the DOI URL of the published version of the work (if any);
/// `preprint_doi` is the DOI minted for the preprint itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preprint {
    pub id: u64,
    pub repository: Repository,
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    pub url: String,
    /// Subject names, first one is used as the Crossref group title.
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_accepted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub preprint_doi: Option<String>,
}

impl Preprint {
    /// A preprint is published once its publication date has passed.
    pub fn is_published(&self) -> bool {
        self.date_published.is_some_and(|d| d <= Utc::now())
    }
}

impl fmt::Display for Preprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.title)
    }
}

/// Lifecycle event fired by the host platform when a preprint goes live.
#[derive(Debug)]
pub struct PreprintPublished<'a> {
    pub preprint: &'a mut Preprint,
}
