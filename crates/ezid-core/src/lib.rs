pub mod crossref;
pub mod metadata;
pub mod payload;
pub mod records;
pub mod settings;
pub mod validate;

pub use crossref::{JournalTemplate, RenderError, render_journal, render_posted_content};
pub use metadata::{
    Contributor, DateParts, JournalMetadata, PreprintMetadata, journal_metadata,
    normalize_contributors, preprint_metadata,
};
pub use payload::prepare_payload;
pub use records::{Account, Article, Author, Journal, Preprint, PreprintPublished, Repository};
pub use settings::{JournalSettings, RepositorySettings, ServiceConfig, SettingsProvider};
pub use validate::{encode, escape_str, get_valid_orcid, is_valid_issn, is_valid_url};
