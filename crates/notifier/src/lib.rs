//! Output sinks for a finished weekly comparison: console summary, HTML
//! e-mail body, JSON document and the Resend delivery client.

pub mod document;
pub mod error;
pub mod html;
pub mod labels;
pub mod sample;
pub mod sender;
pub mod summary;

pub use error::NotifyError;
pub use labels::Labels;
pub use sender::{EmailMessage, ReportSender, ResendSender};
