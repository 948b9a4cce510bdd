//! EZID client: request transport and response interpretation.

pub mod http;
pub mod response;

pub use http::{ACCEPTED_STATUSES, EzidClient, EzidRequest, Method, Transport, TransportError};
pub use response::{Action, extract_doi, process_ezid_result};
