//! # CV Mailer Domain Models
//!
//! Plain data types shared by the mailer service and its utilities.
//!
//! ## Key Models
//!
//! - **SenderProfile**: the applicant sending the batch, with a redacted credential
//! - **Recipient**: one destination address with an optional company name
//! - **Attachment**: decoded CV bytes and the filename they travel under
//! - **SendOutcome** / **BatchSummary**: per-recipient results and their counts
//! - **StatusBoard**: the `pending → sending → success|error` machine per recipient

pub mod sender;
pub mod recipient;
pub mod attachment;
pub mod outcome;
pub mod status;


pub use sender::*;
pub use recipient::*;
pub use attachment::*;
pub use outcome::*;
pub use status::*;
