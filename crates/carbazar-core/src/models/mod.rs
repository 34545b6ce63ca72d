//! Domain models shared across Carbazar components.

pub mod attachment;
pub mod listing;
pub mod submission;

pub use attachment::StagedAttachment;
pub use listing::CarListing;
pub use submission::{
    ChannelKind, ChannelOutcome, DispatchReport, DispatchStatus, SubmissionForm,
};
