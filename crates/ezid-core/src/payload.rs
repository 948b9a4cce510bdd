//! EZID's plain-text envelope around a Crossref deposit.

/// Wrap rendered Crossref XML in the EZID `crossref` profile envelope.
///
/// The XML must already be on a single line; see
/// [`collapse_whitespace`](crate::crossref::collapse_whitespace).
pub fn prepare_payload(crossref_xml: &str, target_url: &str, owner: &str) -> String {
    format!(
        "crossref: {crossref_xml}\n_crossref: yes\n_profile: crossref\n_target: {target_url}\n_owner: {owner}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_layout() {
        let payload = prepare_payload(
            "<doi_batch> <body/> </doi_batch>",
            "https://test.org/qtXXXXXX",
            "owner",
        );
        assert_eq!(
            payload,
            "crossref: <doi_batch> <body/> </doi_batch>\n\
             _crossref: yes\n\
             _profile: crossref\n\
             _target: https://test.org/qtXXXXXX\n\
             _owner: owner"
        );
    }

    #[test]
    fn envelope_has_five_lines() {
        let payload = prepare_payload("<x/>", "https://a.example", "o");
        let keys: Vec<&str> = payload
            .lines()
            .map(|l| l.split(':').next().unwrap_or_default())
            .collect();
        assert_eq!(keys, ["crossref", "_crossref", "_profile", "_target", "_owner"]);
    }
}
