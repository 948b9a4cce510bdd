//! The adapter's result contract.

use std::fmt;

/// Result of a DOI operation, as reported back to event hooks and commands.
///
/// Maps onto the `(enabled, success, message)` triple via [`Outcome::into_tuple`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// EZID is not enabled for the journal or repository.
    Disabled(String),
    /// EZID is enabled but the record or configuration rules out a request.
    PreconditionFailed(String),
    /// A request was attempted and did not yield a DOI.
    Failed(String),
    /// EZID confirmed the DOI; `response` is its raw answer.
    Succeeded { doi: String, response: String },
}

impl Outcome {
    pub fn enabled(&self) -> bool {
        !matches!(self, Self::Disabled(_))
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Disabled(msg) | Self::PreconditionFailed(msg) | Self::Failed(msg) => msg,
            Self::Succeeded { response, .. } => response,
        }
    }

    pub fn doi(&self) -> Option<&str> {
        match self {
            Self::Succeeded { doi, .. } => Some(doi),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> (bool, bool, String) {
        let (enabled, success) = (self.enabled(), self.success());
        let message = match self {
            Self::Disabled(msg) | Self::PreconditionFailed(msg) | Self::Failed(msg) => msg,
            Self::Succeeded { response, .. } => response,
        };
        (enabled, success, message)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_mapping() {
        assert_eq!(
            Outcome::Disabled("off".into()).into_tuple(),
            (false, false, "off".to_string())
        );
        assert_eq!(
            Outcome::PreconditionFailed("no".into()).into_tuple(),
            (true, false, "no".to_string())
        );
        assert_eq!(
            Outcome::Failed("error: x\n".into()).into_tuple(),
            (true, false, "error: x\n".to_string())
        );
        assert_eq!(
            Outcome::Succeeded {
                doi: "10.9999/TEST".into(),
                response: "success: doi:10.9999/TEST".into(),
            }
            .into_tuple(),
            (true, true, "success: doi:10.9999/TEST".to_string())
        );
    }

    #[test]
    fn display_trims_trailing_newline() {
        assert_eq!(Outcome::Failed("error: x\n".into()).to_string(), "error: x");
    }
}
