//! Registration settings read from the host platform's configuration store.

use serde::{Deserialize, Serialize};

use crate::records::{Journal, Repository};

/// Per-journal plugin settings plus the journal's shared Crossref identity.
///
/// Every field is optional in the store; a missing journal reads as the
/// default (disabled).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    pub ezid_plugin_enable: bool,
    pub ezid_plugin_username: Option<String>,
    pub ezid_plugin_password: Option<String>,
    pub ezid_plugin_endpoint_url: Option<String>,
    pub ezid_book_chapter: bool,
    pub crossref_name: Option<String>,
    pub crossref_email: Option<String>,
    pub crossref_registrant: Option<String>,
}

/// Everything needed to talk to EZID on behalf of one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub username: String,
    pub password: String,
    pub endpoint_url: String,
    pub owner: String,
}

impl JournalSettings {
    /// Credentials for the journal, or `None` when any of username,
    /// password, endpoint or registrant is missing or blank. The Crossref
    /// registrant doubles as the EZID owner.
    pub fn service_config(&self) -> Option<ServiceConfig> {
        Some(ServiceConfig {
            username: non_blank(&self.ezid_plugin_username)?,
            password: non_blank(&self.ezid_plugin_password)?,
            endpoint_url: non_blank(&self.ezid_plugin_endpoint_url)?,
            owner: non_blank(&self.crossref_registrant)?,
        })
    }
}

/// Per-repository EZID settings. A repository without a row is not enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySettings {
    pub ezid_shoulder: String,
    pub ezid_owner: String,
    pub ezid_username: String,
    pub ezid_password: String,
    pub ezid_endpoint_url: String,
}

impl RepositorySettings {
    /// Credentials for the repository, or `None` if any field is blank.
    /// The shoulder is checked too since minting needs it.
    pub fn service_config(&self) -> Option<ServiceConfig> {
        let fields = [
            &self.ezid_shoulder,
            &self.ezid_owner,
            &self.ezid_username,
            &self.ezid_password,
            &self.ezid_endpoint_url,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return None;
        }
        Some(ServiceConfig {
            username: self.ezid_username.clone(),
            password: self.ezid_password.clone(),
            endpoint_url: self.ezid_endpoint_url.clone(),
            owner: self.ezid_owner.clone(),
        })
    }
}

/// Read-only view of the host platform's settings store.
pub trait SettingsProvider {
    fn journal_settings(&self, journal: &Journal) -> JournalSettings;

    fn repository_settings(&self, repository: &Repository) -> Option<RepositorySettings>;
}

impl<P: SettingsProvider + ?Sized> SettingsProvider for &P {
    fn journal_settings(&self, journal: &Journal) -> JournalSettings {
        (**self).journal_settings(journal)
    }

    fn repository_settings(&self, repository: &Repository) -> Option<RepositorySettings> {
        (**self).repository_settings(repository)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
