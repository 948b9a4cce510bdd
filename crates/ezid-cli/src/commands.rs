//! The administrative commands: preprint mint/update, article register/update.

use std::process::ExitCode;

use anyhow::{Context, bail};
use ezid_client::EzidClient;
use ezid_plugin::EzidPlugin;
use ezid_store::JsonStore;
use reqwest::Url;

use crate::display::report;

/// How `update-ezid-doi` identifies a preprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreprintRef {
    Id(u64),
    /// The preprint's own DOI, taken from a DOI URL.
    Doi(String),
}

impl PreprintRef {
    /// A value starting with `http` is a DOI URL whose path (without the
    /// leading `/`) is the DOI; anything else must be a numeric id.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        if value.starts_with("http") {
            let url = Url::parse(value).with_context(|| format!("invalid DOI URL {value}"))?;
            let doi = url.path().trim_start_matches('/');
            if doi.is_empty() {
                bail!("DOI URL {value} has no DOI path");
            }
            return Ok(Self::Doi(doi.to_string()));
        }
        value
            .parse()
            .map(Self::Id)
            .with_context(|| format!("preprint_id must be a number or a DOI URL, got {value}"))
    }
}

pub async fn register_preprint(
    store: &mut JsonStore,
    short_name: &str,
    preprint_id: u64,
) -> anyhow::Result<ExitCode> {
    let repository = store.repository(short_name)?;
    let mut preprint = store.preprint(&repository, preprint_id)?;

    if preprint.preprint_doi.as_deref().is_some_and(|d| !d.is_empty()) {
        bail!(
            "{preprint} already has a DOI, if you wish to update the DOI metadata for this preprint, try the update-ezid-doi command instead."
        );
    }
    if !preprint.is_published() {
        bail!("{preprint} is not yet published, cannot mint a DOI for an unpublished preprint.");
    }

    println!("Attempting to mint a DOI for {preprint}");
    let outcome = {
        let plugin = EzidPlugin::new(&*store, EzidClient::new());
        plugin.mint_preprint_doi(&mut preprint).await
    };
    if outcome.success() {
        store
            .save_preprint_doi(&preprint)
            .context("saving minted DOI")?;
    }
    Ok(report(&outcome, &format!("DOI minted with EZID for {preprint}")))
}

pub async fn update_preprint(
    store: &mut JsonStore,
    short_name: &str,
    preprint: &str,
) -> anyhow::Result<ExitCode> {
    let repository = store.repository(short_name)?;
    let mut record = match PreprintRef::parse(preprint)? {
        PreprintRef::Id(id) => store.preprint(&repository, id)?,
        PreprintRef::Doi(doi) => store.preprint_by_doi(&repository, &doi)?,
    };

    if !record.is_published() {
        bail!("{record} is not yet published, cannot update a DOI for an unpublished preprint.");
    }

    println!("Attempting to update DOI metadata for preprint {preprint}");
    let outcome = {
        let plugin = EzidPlugin::new(&*store, EzidClient::new());
        plugin.update_preprint_doi(&mut record).await
    };
    if outcome.success() {
        store
            .save_preprint_doi(&record)
            .context("saving updated DOI")?;
    }
    Ok(report(&outcome, &format!("DOI updated with EZID for {record}")))
}

pub async fn register_article(store: &JsonStore, article_id: u64) -> anyhow::Result<ExitCode> {
    let article = store.article(article_id)?;
    println!("Attempting to register DOI for {article}");
    let plugin = EzidPlugin::new(store, EzidClient::new());
    let outcome = plugin.register_journal_doi(&article).await;
    Ok(report(&outcome, &format!("DOI registered with EZID for {article}")))
}

pub async fn update_article(store: &JsonStore, article_id: u64) -> anyhow::Result<ExitCode> {
    let article = store.article(article_id)?;
    println!("Attempting to update a DOI for {article}");
    let plugin = EzidPlugin::new(store, EzidClient::new());
    let outcome = plugin.update_journal_doi(&article).await;
    Ok(report(&outcome, &format!("DOI updated with EZID for {article}")))
}
