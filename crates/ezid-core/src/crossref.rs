//! Crossref deposit XML for EZID's `crossref` profile.
//!
//! Three renderings are supported: journal articles, book chapters (for
//! journals flagged as book series) and posted content (preprints). Each
//! produces a complete `doi_batch` document whose whitespace has been
//! collapsed to single spaces, since EZID's envelope parser treats embedded
//! newlines as field separators.

use std::fmt;
use std::sync::LazyLock;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use regex::Regex;
use reqwest::Url;
use thiserror::Error;

use crate::metadata::{Contributor, DateParts, JournalMetadata, PreprintMetadata};
use crate::settings::JournalSettings;
use crate::validate::is_valid_issn;

const SCHEMA_VERSION: &str = "4.4.2";
const SCHEMA_NS: &str = "http://www.crossref.org/schema/4.4.2";
const SCHEMA_LOCATION: &str =
    "http://www.crossref.org/schema/4.4.2 http://www.crossref.org/schema/deposit/crossref4.4.2.xsd";
const JATS_NS: &str = "http://www.ncbi.nlm.nih.gov/JATS1";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const RELATIONS_NS: &str = "http://www.crossref.org/relations.xsd";

/// DOI placeholder EZID substitutes when minting on a shoulder.
pub const TBA_DOI: &str = "(:tba)";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("xml write failed: {0}")]
    Xml(String),
    #[error("rendered xml is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Which Crossref work type a journal deposits its articles as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalTemplate {
    Article,
    BookChapter,
}

impl JournalTemplate {
    pub fn for_settings(settings: &JournalSettings) -> Self {
        if settings.ezid_book_chapter {
            Self::BookChapter
        } else {
            Self::Article
        }
    }
}

impl fmt::Display for JournalTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Article => f.write_str("journal_content"),
            Self::BookChapter => f.write_str("book_chapter"),
        }
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(xml: &str) -> String {
    WHITESPACE.replace_all(xml, " ").trim().to_string()
}

/// Render a journal article or book chapter deposit.
pub fn render_journal(
    template: JournalTemplate,
    metadata: &JournalMetadata,
) -> Result<String, RenderError> {
    let mut xml = XmlWriter::new();
    xml.batch_start(
        metadata.now,
        metadata.depositor_name.as_deref(),
        metadata.depositor_email.as_deref(),
        metadata.registrant.as_deref(),
    )?;

    let doi = metadata
        .update_id
        .as_deref()
        .or(metadata.doi.as_deref())
        .unwrap_or(TBA_DOI);
    let target = metadata.target_url.as_deref().unwrap_or_default();
    let issn = metadata.issn.as_deref().filter(|i| is_valid_issn(i));

    match template {
        JournalTemplate::Article => {
            xml.open("journal", &[])?;
            xml.open("journal_metadata", &[("language", "en")])?;
            xml.leaf("full_title", &metadata.journal_title)?;
            if let Some(issn) = issn {
                xml.leaf_with("issn", &[("media_type", "electronic")], issn)?;
            }
            xml.close("journal_metadata")?;

            xml.open("journal_article", &[("publication_type", "full_text")])?;
            xml.titles(&metadata.title)?;
            xml.contributors(&metadata.contributors)?;
            xml.abstract_block(metadata.abstract_text.as_deref())?;
            if let Some(date) = &metadata.published_date {
                xml.date("publication_date", &[("media_type", "online")], date)?;
            }
            xml.doi_data(doi, target)?;
            xml.close("journal_article")?;
            xml.close("journal")?;
        }
        JournalTemplate::BookChapter => {
            let volume_date = metadata
                .published_date
                .unwrap_or_else(|| DateParts::from_date(&metadata.now));
            let publisher = metadata
                .publisher
                .as_deref()
                .or(metadata.registrant.as_deref())
                .unwrap_or(&metadata.journal_title);

            xml.open("book", &[("book_type", "edited_book")])?;
            xml.open("book_series_metadata", &[("language", "en")])?;
            xml.open("series_metadata", &[])?;
            xml.titles(&metadata.journal_title)?;
            if let Some(issn) = issn {
                xml.leaf("issn", issn)?;
            }
            xml.close("series_metadata")?;
            xml.titles(&metadata.journal_title)?;
            xml.date("publication_date", &[("media_type", "online")], &volume_date)?;
            xml.empty("noisbn", &[("reason", "archive_volume")])?;
            xml.open("publisher", &[])?;
            xml.leaf("publisher_name", publisher)?;
            xml.close("publisher")?;
            xml.close("book_series_metadata")?;

            xml.open(
                "content_item",
                &[("component_type", "chapter"), ("publication_type", "full_text")],
            )?;
            xml.contributors(&metadata.contributors)?;
            xml.titles(&metadata.title)?;
            xml.abstract_block(metadata.abstract_text.as_deref())?;
            if let Some(date) = &metadata.published_date {
                xml.date("publication_date", &[("media_type", "online")], date)?;
            }
            xml.doi_data(doi, target)?;
            xml.close("content_item")?;
            xml.close("book")?;
        }
    }

    xml.batch_end()?;
    xml.finish()
}

/// Render a preprint as Crossref posted content.
///
/// Without a DOI on the metadata the EZID `(:tba)` placeholder is used.
pub fn render_posted_content(metadata: &PreprintMetadata) -> Result<String, RenderError> {
    let mut xml = XmlWriter::new();
    xml.batch_start(metadata.now, None, None, None)?;

    xml.open("posted_content", &[("type", "preprint"), ("language", "en")])?;
    if let Some(group) = &metadata.group_title {
        xml.leaf("group_title", group)?;
    }
    xml.contributors(&metadata.contributors)?;
    xml.titles(&metadata.title)?;
    let posted = metadata
        .published_date
        .unwrap_or_else(|| DateParts::from_date(&metadata.now));
    xml.date("posted_date", &[], &posted)?;
    if let Some(accepted) = &metadata.accepted_date {
        xml.date("acceptance_date", &[], accepted)?;
    }
    xml.abstract_block(metadata.abstract_text.as_deref())?;

    if let Some(published) = &metadata.published_doi {
        let (kind, identifier) = relation_identifier(published);
        xml.open("program", &[("xmlns", RELATIONS_NS)])?;
        xml.open("related_item", &[])?;
        xml.leaf_with(
            "intra_work_relation",
            &[("relationship-type", "isPreprintOf"), ("identifier-type", kind)],
            &identifier,
        )?;
        xml.close("related_item")?;
        xml.close("program")?;
    }

    let doi = metadata.doi.as_deref().unwrap_or(TBA_DOI);
    xml.doi_data(doi, &metadata.target_url)?;
    xml.close("posted_content")?;

    xml.batch_end()?;
    xml.finish()
}

/// Split a published-version link into a Crossref identifier type and value.
/// `https://doi.org/10.1/x` becomes a bare `doi`; anything else stays a `uri`.
fn relation_identifier(url: &str) -> (&'static str, String) {
    let Ok(parsed) = Url::parse(url) else {
        return ("uri", url.to_string());
    };
    let path = parsed.path().trim_start_matches('/');
    match parsed.host_str() {
        Some("doi.org" | "dx.doi.org") if path.starts_with("10.") => ("doi", path.to_string()),
        _ => ("uri", url.to_string()),
    }
}

struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .write_event(event)
            .map_err(|e| RenderError::Xml(e.to_string()))
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<(), RenderError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), RenderError> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.event(Event::Empty(start))
    }

    fn leaf(&mut self, name: &str, text: &str) -> Result<(), RenderError> {
        self.leaf_with(name, &[], text)
    }

    fn leaf_with(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), RenderError> {
        self.open(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn batch_start(
        &mut self,
        now: chrono::DateTime<chrono::Utc>,
        depositor_name: Option<&str>,
        depositor_email: Option<&str>,
        registrant: Option<&str>,
    ) -> Result<(), RenderError> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.open(
            "doi_batch",
            &[
                ("version", SCHEMA_VERSION),
                ("xmlns", SCHEMA_NS),
                ("xmlns:xsi", XSI_NS),
                ("xmlns:jats", JATS_NS),
                ("xsi:schemaLocation", SCHEMA_LOCATION),
            ],
        )?;

        let stamp = now.format("%Y%m%d%H%M%S").to_string();
        self.open("head", &[])?;
        self.leaf("doi_batch_id", &format!("ezid_{stamp}"))?;
        self.leaf("timestamp", &stamp)?;
        if depositor_name.is_some() || depositor_email.is_some() {
            self.open("depositor", &[])?;
            if let Some(name) = depositor_name {
                self.leaf("depositor_name", name)?;
            }
            if let Some(email) = depositor_email {
                self.leaf("email_address", email)?;
            }
            self.close("depositor")?;
        }
        if let Some(registrant) = registrant {
            self.leaf("registrant", registrant)?;
        }
        self.close("head")?;
        self.open("body", &[])
    }

    fn batch_end(&mut self) -> Result<(), RenderError> {
        self.close("body")?;
        self.close("doi_batch")
    }

    fn titles(&mut self, title: &str) -> Result<(), RenderError> {
        self.open("titles", &[])?;
        self.leaf("title", title)?;
        self.close("titles")
    }

    fn contributors(&mut self, contributors: &[Contributor]) -> Result<(), RenderError> {
        if contributors.is_empty() {
            return Ok(());
        }
        self.open("contributors", &[])?;
        for (i, contributor) in contributors.iter().enumerate() {
            let sequence = if i == 0 { "first" } else { "additional" };
            self.open(
                "person_name",
                &[("sequence", sequence), ("contributor_role", "author")],
            )?;
            if let Some(given) = &contributor.given_name {
                self.leaf("given_name", given)?;
            }
            self.leaf("surname", &contributor.surname)?;
            if let Some(orcid) = &contributor.orcid {
                self.leaf("ORCID", orcid)?;
            }
            self.close("person_name")?;
        }
        self.close("contributors")
    }

    fn abstract_block(&mut self, text: Option<&str>) -> Result<(), RenderError> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(());
        };
        self.open("jats:abstract", &[])?;
        self.leaf("jats:p", text)?;
        self.close("jats:abstract")
    }

    fn date(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        date: &DateParts,
    ) -> Result<(), RenderError> {
        self.open(name, attrs)?;
        self.leaf("month", &format!("{:02}", date.month))?;
        self.leaf("day", &format!("{:02}", date.day))?;
        self.leaf("year", &date.year.to_string())?;
        self.close(name)
    }

    fn doi_data(&mut self, doi: &str, resource: &str) -> Result<(), RenderError> {
        self.open("doi_data", &[])?;
        self.leaf("doi", doi)?;
        self.leaf("resource", resource)?;
        self.close("doi_data")
    }

    fn finish(self) -> Result<String, RenderError> {
        let raw = String::from_utf8(self.writer.into_inner())?;
        Ok(collapse_whitespace(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn journal_metadata() -> JournalMetadata {
        JournalMetadata {
            now: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            target_url: Some("https://test.org/qtXXXXXX".into()),
            title: "This is the test title".into(),
            abstract_text: None,
            doi: Some("10.9999/TEST".into()),
            update_id: None,
            depositor_name: Some("crossref_test".into()),
            depositor_email: Some("user1@test.edu".into()),
            registrant: Some("crossref_registrant".into()),
            journal_title: "Journal One".into(),
            issn: Some("2049-3630".into()),
            publisher: None,
            contributors: vec![
                Contributor {
                    given_name: Some("Hardy".into()),
                    surname: "Pottinger".into(),
                    orcid: Some("https://orcid.org/0000-0001-8549-9354".into()),
                },
                Contributor {
                    given_name: None,
                    surname: "Mononym".into(),
                    orcid: None,
                },
            ],
            published_date: Some(DateParts {
                month: 3,
                day: 4,
                year: 2022,
            }),
        }
    }

    fn preprint_metadata() -> PreprintMetadata {
        PreprintMetadata {
            now: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            target_url: "http://localhost/testrepo/repository/view/1/".into(),
            group_title: Some("Test Subject".into()),
            contributors: vec![],
            title: "A Preprint".into(),
            abstract_text: Some("This is the abstract\nover two lines".into()),
            published_date: None,
            accepted_date: None,
            published_doi: None,
            doi: None,
        }
    }

    #[test]
    fn journal_article_contains_core_fields() {
        let xml = render_journal(JournalTemplate::Article, &journal_metadata()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<title>This is the test title</title>"));
        assert!(xml.contains("<full_title>Journal One</full_title>"));
        assert!(xml.contains(r#"<issn media_type="electronic">2049-3630</issn>"#));
        assert!(xml.contains("<doi>10.9999/TEST</doi>"));
        assert!(xml.contains("<resource>https://test.org/qtXXXXXX</resource>"));
        assert!(xml.contains("<depositor_name>crossref_test</depositor_name>"));
        assert!(xml.contains("<registrant>crossref_registrant</registrant>"));
        assert!(xml.contains("<doi_batch_id>ezid_20230101000000</doi_batch_id>"));
        assert!(xml.contains("<month>03</month>"));
    }

    #[test]
    fn missing_abstract_is_omitted() {
        let xml = render_journal(JournalTemplate::Article, &journal_metadata()).unwrap();
        assert!(!xml.contains("abstract"));
    }

    #[test]
    fn contributors_sequence_and_orcid() {
        let xml = render_journal(JournalTemplate::Article, &journal_metadata()).unwrap();
        assert!(xml.contains(r#"<person_name sequence="first" contributor_role="author">"#));
        assert!(xml.contains(r#"<person_name sequence="additional" contributor_role="author">"#));
        assert!(xml.contains("<ORCID>https://orcid.org/0000-0001-8549-9354</ORCID>"));
        assert_eq!(xml.matches("<ORCID>").count(), 1);
    }

    #[test]
    fn update_id_wins_over_doi() {
        let mut metadata = journal_metadata();
        metadata.update_id = Some("10.9999/UPDATED".into());
        let xml = render_journal(JournalTemplate::Article, &metadata).unwrap();
        assert!(xml.contains("<doi>10.9999/UPDATED</doi>"));
    }

    #[test]
    fn placeholder_issn_not_rendered() {
        let mut metadata = journal_metadata();
        metadata.issn = Some("0000-0000".into());
        let xml = render_journal(JournalTemplate::Article, &metadata).unwrap();
        assert!(!xml.contains("<issn"));
    }

    #[test]
    fn book_chapter_layout() {
        let xml = render_journal(JournalTemplate::BookChapter, &journal_metadata()).unwrap();
        assert!(xml.contains(r#"<book book_type="edited_book">"#));
        assert!(xml.contains(r#"<content_item component_type="chapter""#));
        assert!(xml.contains(r#"<noisbn reason="archive_volume"/>"#));
        assert!(xml.contains("<publisher_name>crossref_registrant</publisher_name>"));
        assert!(!xml.contains("<journal>"));
    }

    #[test]
    fn text_is_xml_escaped() {
        let mut metadata = journal_metadata();
        metadata.title = "Salt & <Pepper>".into();
        let xml = render_journal(JournalTemplate::Article, &metadata).unwrap();
        assert!(xml.contains("<title>Salt &amp; &lt;Pepper&gt;</title>"));
    }

    #[test]
    fn rendered_xml_has_no_newlines() {
        let xml = render_posted_content(&preprint_metadata()).unwrap();
        assert!(!xml.contains('\n'));
        assert!(!xml.contains('\r'));
        assert!(!xml.contains("  "));
        assert!(xml.contains("<jats:p>This is the abstract over two lines</jats:p>"));
    }

    #[test]
    fn posted_content_mint_uses_placeholder_doi() {
        let xml = render_posted_content(&preprint_metadata()).unwrap();
        assert!(xml.contains(r#"<posted_content type="preprint" language="en">"#));
        assert!(xml.contains("<group_title>Test Subject</group_title>"));
        assert!(xml.contains("<doi>(:tba)</doi>"));
        assert!(xml.contains("<posted_date> <month>01</month>"));
        assert!(!xml.contains("intra_work_relation"));
    }

    #[test]
    fn posted_content_update_and_relation() {
        let mut metadata = preprint_metadata();
        metadata.doi = Some("10.5072/FK2PREPRINT".into());
        metadata.published_doi = Some("https://doi.org/10.50505/preprint_sample_doi_2".into());
        let xml = render_posted_content(&metadata).unwrap();
        assert!(xml.contains("<doi>10.5072/FK2PREPRINT</doi>"));
        assert!(xml.contains(
            r#"<intra_work_relation relationship-type="isPreprintOf" identifier-type="doi">10.50505/preprint_sample_doi_2</intra_work_relation>"#
        ));
    }

    #[test]
    fn non_doi_relation_kept_as_uri() {
        assert_eq!(
            relation_identifier("https://example.org/article/1"),
            ("uri", "https://example.org/article/1".to_string())
        );
        assert_eq!(
            relation_identifier("https://dx.doi.org/10.1/abc"),
            ("doi", "10.1/abc".to_string())
        );
    }

    #[test]
    fn collapse_whitespace_runs() {
        assert_eq!(collapse_whitespace("  <a>\n\t <b>x\r\ny</b>\n</a>\n"), "<a> <b>x y</b> </a>");
    }

    #[test]
    fn template_follows_book_chapter_setting() {
        let mut settings = JournalSettings::default();
        assert_eq!(JournalTemplate::for_settings(&settings), JournalTemplate::Article);
        settings.ezid_book_chapter = true;
        assert_eq!(JournalTemplate::for_settings(&settings), JournalTemplate::BookChapter);
    }
}
