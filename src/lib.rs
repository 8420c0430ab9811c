//! another-elm-init - install another-elm from a local checkout
//!
//! Keeps customised copies of the std packages another-elm depends on in sync
//! with the checkout, unpins resolved versions that pointed at rebuilt
//! copies, and writes the `another-elm` executable from its template.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod store;
pub mod ui;

pub use error::{InitError, InitResult};
