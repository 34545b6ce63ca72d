//! Multi-channel notification fan-out
//!
//! Takes one user submission plus its staged attachments and delivers it
//! to every configured channel. Each channel renders its own body from the
//! same form, sends independently, and reports a single outcome; the
//! dispatcher aggregates outcomes into a `DispatchReport` and cleans up
//! the staged files when every channel has finished.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod render;
pub mod whatsapp;

pub use channel::{Capabilities, ChannelSender};
pub use dispatcher::{ConfiguredChannel, SubmissionDispatcher};
pub use email::EmailSender;
pub use whatsapp::WhatsAppSender;
