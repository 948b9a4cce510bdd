use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    #[error("no repository found with short_name={0}")]
    RepositoryNotFound(String),

    #[error("no preprint found with preprint_id={id} in {repository}")]
    PreprintNotFound { repository: String, id: u64 },

    #[error("no preprint found with preprint_doi={doi} in {repository}")]
    PreprintDoiNotFound { repository: String, doi: String },

    #[error("article {0} does not exist")]
    ArticleNotFound(u64),

    #[error("article {article} references unknown journal {journal}")]
    JournalNotFound { article: u64, journal: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not replace store file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
