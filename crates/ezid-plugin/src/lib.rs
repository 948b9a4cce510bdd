//! DOI registration entry points for preprints and journal articles.
//!
//! Every entry point runs the same linear pipeline: configuration gate,
//! preconditions, metadata, Crossref XML, EZID envelope, one HTTP request,
//! response parsing. Nothing is retried and nothing is raised past this
//! boundary; the caller always gets an [`Outcome`].

mod outcome;

pub use outcome::Outcome;

use chrono::Utc;
use ezid_client::{
    Action, EzidRequest, Method, Transport, TransportError, process_ezid_result,
};
use ezid_core::{
    Article, JournalTemplate, Preprint, PreprintPublished, SettingsProvider, encode,
    is_valid_issn, is_valid_url, journal_metadata, prepare_payload, preprint_metadata,
    render_journal, render_posted_content,
};
use tracing::{debug, error, info};

/// The EZID adapter, wired to a settings store and an HTTP transport.
pub struct EzidPlugin<S, T> {
    settings: S,
    transport: T,
}

impl<S: SettingsProvider, T: Transport> EzidPlugin<S, T> {
    pub fn new(settings: S, transport: T) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Hook for the platform's `preprint_publication` event.
    pub async fn preprint_publication(&self, event: PreprintPublished<'_>) -> Outcome {
        debug!(preprint = %event.preprint, "preprint published, minting an EZID DOI");
        self.mint_preprint_doi(event.preprint).await
    }

    /// Mint a new DOI on the repository's shoulder. On success the DOI is
    /// written to `preprint.preprint_doi`; persisting it is up to the caller.
    pub async fn mint_preprint_doi(&self, preprint: &mut Preprint) -> Outcome {
        if let Some(doi) = preprint.preprint_doi.as_deref().filter(|d| !d.is_empty()) {
            let msg = format!("{preprint} already has a DOI: {doi}");
            info!("{msg}");
            return Outcome::PreconditionFailed(msg);
        }
        self.preprint_doi(preprint, Action::Mint).await
    }

    /// Push refreshed metadata for a preprint's existing DOI.
    pub async fn update_preprint_doi(&self, preprint: &mut Preprint) -> Outcome {
        if preprint.preprint_doi.as_deref().is_none_or(str::is_empty) {
            let msg = format!("{preprint} does not have a DOI");
            info!("{msg}");
            return Outcome::PreconditionFailed(msg);
        }
        self.preprint_doi(preprint, Action::Update).await
    }

    /// Register an article's journal-assigned DOI with EZID.
    pub async fn register_journal_doi(&self, article: &Article) -> Outcome {
        self.journal_article_doi(article, Action::Register).await
    }

    /// Replace the metadata behind an article's registered DOI.
    pub async fn update_journal_doi(&self, article: &Article) -> Outcome {
        self.journal_article_doi(article, Action::Update).await
    }

    async fn preprint_doi(&self, preprint: &mut Preprint, action: Action) -> Outcome {
        let repository = &preprint.repository;
        let Some(settings) = self.settings.repository_settings(repository) else {
            return Outcome::Disabled(format!("EZID not enabled for {repository}"));
        };
        let Some(service) = settings.service_config() else {
            return Outcome::PreconditionFailed(format!(
                "EZID not fully configured for {repository}"
            ));
        };

        let metadata = preprint_metadata(preprint, Utc::now());
        let xml = match render_posted_content(&metadata) {
            Ok(xml) => xml,
            Err(e) => {
                error!(preprint = %preprint, error = %e, "failed to render posted content");
                return Outcome::Failed(format!("could not render Crossref metadata for {preprint}: {e}"));
            }
        };
        let payload = prepare_payload(&xml, &metadata.target_url, &service.owner);

        let path = match (action, preprint.preprint_doi.as_deref()) {
            (Action::Update, Some(doi)) => format!("id/doi:{}", encode(doi)),
            _ => format!("shoulder/{}", encode(&settings.ezid_shoulder)),
        };
        let request = EzidRequest {
            method: Method::Post,
            path,
            body: payload,
            service,
        };

        let result = self.transport.send(&request).await;
        let doi = process_ezid_result(&*preprint, action, &result);
        if let Some(doi) = &doi {
            preprint.preprint_doi = Some(doi.clone());
        }
        outcome_from(doi, result)
    }

    async fn journal_article_doi(&self, article: &Article, action: Action) -> Outcome {
        let journal = &article.journal;
        let settings = self.settings.journal_settings(journal);
        if !settings.ezid_plugin_enable {
            return Outcome::Disabled(format!("EZID not enabled for {journal}"));
        }

        let issn = journal.issn.as_deref().unwrap_or_default();
        if !is_valid_issn(issn) && !is_valid_url(issn) {
            let shown = if issn.is_empty() { "(none)" } else { issn };
            return Outcome::PreconditionFailed(format!("Invalid ISSN {shown} for {journal}"));
        }

        let mut metadata = journal_metadata(article, &settings, Utc::now());
        let Some(doi) = metadata.doi.clone() else {
            return Outcome::PreconditionFailed(format!("{article} not assigned a DOI"));
        };
        let Some(target_url) = metadata.target_url.clone() else {
            return Outcome::PreconditionFailed(format!("{article} has no target URL"));
        };

        let template = JournalTemplate::for_settings(&settings);
        let method = match action {
            Action::Update => {
                metadata.update_id = Some(doi.clone());
                Method::Post
            }
            Action::Register | Action::Mint => Method::Put,
        };

        let Some(service) = settings.service_config() else {
            return Outcome::PreconditionFailed(format!("EZID not fully configured for {journal}"));
        };

        let xml = match render_journal(template, &metadata) {
            Ok(xml) => xml,
            Err(e) => {
                error!(article = %article, template = %template, error = %e, "failed to render journal metadata");
                return Outcome::Failed(format!("could not render Crossref metadata for {article}: {e}"));
            }
        };
        let payload = prepare_payload(&xml, &target_url, &service.owner);
        let request = EzidRequest {
            method,
            path: format!("id/doi:{}", encode(&doi)),
            body: payload,
            service,
        };

        info!(article = %article, template = %template, action = %action, "submitting article metadata to EZID");
        let result = self.transport.send(&request).await;
        let doi = process_ezid_result(article, action, &result);
        outcome_from(doi, result)
    }
}

fn outcome_from(doi: Option<String>, result: Result<String, TransportError>) -> Outcome {
    match (doi, result) {
        (Some(doi), Ok(response)) => Outcome::Succeeded { doi, response },
        (_, Ok(response)) => Outcome::Failed(response),
        (_, Err(e)) => Outcome::Failed(e.to_string()),
    }
}
