//! Campus Square Portal Client
//!
//! This library automates a Campus Square university web portal that has no
//! public API: it walks the session-based login form flow, then scrapes the
//! grades report and the calendar export page by pattern-matching HTML and
//! ICS text.

pub mod calendar;
pub mod client;
pub mod error;
pub mod extract;
pub mod grades;
pub mod login;
pub mod notify;
pub mod service;
pub mod types;

mod step;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        calendar::*, client::*, grades::*, login::*, notify::*, service::*, types::*,
    };
}
