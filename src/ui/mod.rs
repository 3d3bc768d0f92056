//! # User Interface
//!
//! Colored terminal output, pagination, prompts and spinners.

pub mod format;
pub mod log;
pub mod pager;
pub mod prompt;
pub mod spinner;

pub use log::{debug, error, header, info, print_logo, success, warn, Log};
pub use pager::{PageOutcome, Pager};
pub use spinner::Spinner;
