//! JSON-file store for records and EZID settings.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use ezid_core::{
    Article, Author, Journal, JournalSettings, Preprint, Repository, RepositorySettings,
    SettingsProvider,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::StoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    journals: Vec<JournalRow>,
    #[serde(default)]
    articles: Vec<ArticleRow>,
    #[serde(default)]
    repositories: Vec<RepositoryRow>,
    #[serde(default)]
    preprints: Vec<PreprintRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JournalRow {
    #[serde(flatten)]
    journal: Journal,
    #[serde(default)]
    settings: JournalSettings,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArticleRow {
    id: u64,
    /// Journal code.
    journal: String,
    title: String,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    remote_url: Option<String>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default)]
    date_published: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RepositoryRow {
    #[serde(flatten)]
    repository: Repository,
    /// Absent when EZID is not enabled for the repository.
    #[serde(default)]
    ezid: Option<RepositorySettings>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PreprintRow {
    id: u64,
    /// Repository short name.
    repository: String,
    title: String,
    #[serde(default, rename = "abstract")]
    abstract_text: Option<String>,
    url: String,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    authors: Vec<Author>,
    #[serde(default)]
    date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    date_accepted: Option<DateTime<Utc>>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    preprint_doi: Option<String>,
}

/// Records and settings loaded from a single JSON file.
///
/// Lookups return owned records; [`save_preprint_doi`](Self::save_preprint_doi)
/// is the only write and rewrites the whole file through a temp file in the
/// same directory.
pub struct JsonStore {
    path: PathBuf,
    doc: Document,
}

impl JsonStore {
    /// Load the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::FileNotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let doc: Document = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            journals = doc.journals.len(),
            articles = doc.articles.len(),
            repositories = doc.repositories.len(),
            preprints = doc.preprints.len(),
            "loaded record store"
        );
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn article(&self, id: u64) -> Result<Article, StoreError> {
        let row = self
            .doc
            .articles
            .iter()
            .find(|a| a.id == id)
            .ok_or(StoreError::ArticleNotFound(id))?;
        let journal = self
            .journal_row(&row.journal)
            .ok_or_else(|| StoreError::JournalNotFound {
                article: id,
                journal: row.journal.clone(),
            })?;
        Ok(Article {
            id: row.id,
            title: row.title.clone(),
            abstract_text: row.abstract_text.clone(),
            remote_url: row.remote_url.clone(),
            doi: row.doi.clone(),
            journal: journal.journal.clone(),
            authors: row.authors.clone(),
            date_published: row.date_published,
        })
    }

    pub fn repository(&self, short_name: &str) -> Result<Repository, StoreError> {
        self.repository_row(short_name)
            .map(|r| r.repository.clone())
            .ok_or_else(|| StoreError::RepositoryNotFound(short_name.to_string()))
    }

    pub fn preprint(&self, repository: &Repository, id: u64) -> Result<Preprint, StoreError> {
        let row = self
            .doc
            .preprints
            .iter()
            .find(|p| p.repository == repository.short_name && p.id == id)
            .ok_or_else(|| StoreError::PreprintNotFound {
                repository: repository.short_name.clone(),
                id,
            })?;
        Ok(to_preprint(row, repository))
    }

    /// Reverse lookup by the preprint's own DOI.
    pub fn preprint_by_doi(&self, repository: &Repository, doi: &str) -> Result<Preprint, StoreError> {
        let row = self
            .doc
            .preprints
            .iter()
            .find(|p| p.repository == repository.short_name && p.preprint_doi.as_deref() == Some(doi))
            .ok_or_else(|| StoreError::PreprintDoiNotFound {
                repository: repository.short_name.clone(),
                doi: doi.to_string(),
            })?;
        Ok(to_preprint(row, repository))
    }

    /// Record a minted DOI on a preprint and write the store back to disk.
    pub fn save_preprint_doi(&mut self, preprint: &Preprint) -> Result<(), StoreError> {
        let row = self
            .doc
            .preprints
            .iter_mut()
            .find(|p| p.repository == preprint.repository.short_name && p.id == preprint.id)
            .ok_or_else(|| StoreError::PreprintNotFound {
                repository: preprint.repository.short_name.clone(),
                id: preprint.id,
            })?;
        row.preprint_doi = preprint.preprint_doi.clone();
        self.flush()?;
        info!(preprint = preprint.id, doi = ?preprint.preprint_doi, "saved preprint DOI");
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &self.doc)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    fn journal_row(&self, code: &str) -> Option<&JournalRow> {
        self.doc.journals.iter().find(|j| j.journal.code == code)
    }

    fn repository_row(&self, short_name: &str) -> Option<&RepositoryRow> {
        self.doc
            .repositories
            .iter()
            .find(|r| r.repository.short_name == short_name)
    }
}

impl SettingsProvider for JsonStore {
    fn journal_settings(&self, journal: &Journal) -> JournalSettings {
        self.journal_row(&journal.code)
            .map(|j| j.settings.clone())
            .unwrap_or_default()
    }

    fn repository_settings(&self, repository: &Repository) -> Option<RepositorySettings> {
        self.repository_row(&repository.short_name)
            .and_then(|r| r.ezid.clone())
    }
}

fn to_preprint(row: &PreprintRow, repository: &Repository) -> Preprint {
    Preprint {
        id: row.id,
        repository: repository.clone(),
        title: row.title.clone(),
        abstract_text: row.abstract_text.clone(),
        url: row.url.clone(),
        subjects: row.subjects.clone(),
        authors: row.authors.clone(),
        date_published: row.date_published,
        date_accepted: row.date_accepted,
        doi: row.doi.clone(),
        preprint_doi: row.preprint_doi.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "journals": [
            {
                "code": "tst",
                "name": "Journal One",
                "issn": "2049-3630",
                "settings": {
                    "ezid_plugin_enable": true,
                    "ezid_plugin_username": "apitest",
                    "ezid_plugin_password": "secret",
                    "ezid_plugin_endpoint_url": "https://ezid.example.org",
                    "crossref_registrant": "crossref_registrant"
                }
            },
            { "code": "off", "name": "Journal Two" }
        ],
        "articles": [
            {
                "id": 1,
                "journal": "tst",
                "title": "An Article",
                "remote_url": "https://test.org/qtXXXXXX",
                "doi": "10.9999/TEST",
                "date_published": "2023-01-01"
            },
            { "id": 2, "journal": "missing", "title": "Orphan" }
        ],
        "repositories": [
            {
                "short_name": "testrepo",
                "name": "Test Repository",
                "ezid": {
                    "ezid_shoulder": "doi:10.5072/FK2",
                    "ezid_owner": "owner",
                    "ezid_username": "username",
                    "ezid_password": "password",
                    "ezid_endpoint_url": "https://ezid.example.org"
                }
            },
            { "short_name": "plain", "name": "Plain Repository" }
        ],
        "preprints": [
            {
                "id": 1,
                "repository": "testrepo",
                "title": "A Preprint",
                "url": "http://localhost/testrepo/repository/view/1/",
                "subjects": ["Test Subject"],
                "authors": [{"account": {"first_name": "User", "last_name": "One"}}],
                "date_published": "2023-01-01T00:00:00Z"
            },
            {
                "id": 2,
                "repository": "testrepo",
                "title": "Minted",
                "url": "http://localhost/testrepo/repository/view/2/",
                "preprint_doi": "10.5072/FK2MINTED"
            }
        ]
    }"#;

    fn store() -> (tempfile::TempDir, JsonStore) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ezid.json");
        std::fs::write(&path, FIXTURE).unwrap();
        let store = JsonStore::open(&path).unwrap();
        (tmp, store)
    }

    #[test]
    fn open_missing_file_errors() {
        let result = JsonStore::open(Path::new("/nonexistent/ezid.json"));
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[test]
    fn open_invalid_json_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ezid.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn article_resolves_journal() {
        let (_tmp, store) = store();
        let article = store.article(1).unwrap();
        assert_eq!(article.journal.name, "Journal One");
        assert_eq!(article.doi.as_deref(), Some("10.9999/TEST"));
        assert_eq!(
            article.date_published,
            Some(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );
    }

    #[test]
    fn article_lookup_errors() {
        let (_tmp, store) = store();
        assert!(matches!(store.article(99), Err(StoreError::ArticleNotFound(99))));
        assert!(matches!(
            store.article(2),
            Err(StoreError::JournalNotFound { article: 2, .. })
        ));
    }

    #[test]
    fn preprint_lookup_by_id_and_doi() {
        let (_tmp, store) = store();
        let repo = store.repository("testrepo").unwrap();
        let preprint = store.preprint(&repo, 1).unwrap();
        assert_eq!(preprint.title, "A Preprint");
        assert_eq!(preprint.repository.name, "Test Repository");
        assert_eq!(preprint.authors.len(), 1);

        let minted = store.preprint_by_doi(&repo, "10.5072/FK2MINTED").unwrap();
        assert_eq!(minted.id, 2);

        assert!(matches!(
            store.preprint(&repo, 42),
            Err(StoreError::PreprintNotFound { id: 42, .. })
        ));
        assert!(matches!(
            store.preprint_by_doi(&repo, "10.5072/NOPE"),
            Err(StoreError::PreprintDoiNotFound { .. })
        ));
    }

    #[test]
    fn preprint_scoped_to_repository() {
        let (_tmp, store) = store();
        let plain = store.repository("plain").unwrap();
        assert!(store.preprint(&plain, 1).is_err());
        assert!(matches!(
            store.repository("nope"),
            Err(StoreError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn settings_provider_views() {
        let (_tmp, store) = store();
        let article = store.article(1).unwrap();
        let settings = store.journal_settings(&article.journal);
        assert!(settings.ezid_plugin_enable);
        assert!(settings.service_config().is_some());

        let off = Journal {
            code: "off".into(),
            name: "Journal Two".into(),
            ..Default::default()
        };
        assert!(!store.journal_settings(&off).ezid_plugin_enable);

        let repo = store.repository("testrepo").unwrap();
        assert_eq!(
            store.repository_settings(&repo).unwrap().ezid_shoulder,
            "doi:10.5072/FK2"
        );
        let plain = store.repository("plain").unwrap();
        assert!(store.repository_settings(&plain).is_none());
    }

    #[test]
    fn save_preprint_doi_persists() {
        let (tmp, mut store) = store();
        let repo = store.repository("testrepo").unwrap();
        let mut preprint = store.preprint(&repo, 1).unwrap();
        preprint.preprint_doi = Some("10.5072/FK2NEW".into());
        store.save_preprint_doi(&preprint).unwrap();

        let reopened = JsonStore::open(&tmp.path().join("ezid.json")).unwrap();
        let repo = reopened.repository("testrepo").unwrap();
        assert_eq!(
            reopened.preprint(&repo, 1).unwrap().preprint_doi.as_deref(),
            Some("10.5072/FK2NEW")
        );
        assert_eq!(reopened.preprint_by_doi(&repo, "10.5072/FK2NEW").unwrap().id, 1);
        // Untouched records survive the rewrite.
        assert_eq!(reopened.article(1).unwrap().title, "An Article");
        assert!(reopened.repository_settings(&repo).is_some());
    }
}
