//! Terminal front end for the booking enquiry wizard.

pub mod app;
pub mod cli;
pub mod draft;
pub mod input;
pub mod render;
pub mod terminal;
pub mod worker;

pub use app::{App, InputResult};
pub use draft::{load_draft, submit_draft, DraftReport};
pub use terminal::SessionEnd;
pub use worker::SubmitWorker;
