//! Installing the another-elm executable
//!
//! [`driver::install`] sequences a run: it syncs the customised package cache
//! and then renders the executable from its template with this run's suffix
//! and version.

pub mod driver;
pub mod suffix;
pub mod template;
pub mod version;

pub use driver::{install, InstallOutcome, Phase};
pub use suffix::Suffix;
pub use template::{materialize, MaterializeReport, Placeholder, PlaceholderValues};
