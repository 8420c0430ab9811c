//! Terminal output for the installer
//!
//! Uses `cliclack` framing and spinners on an interactive terminal and falls
//! back to plain prefixed lines when piped or running in CI.
//!
//! ```rust,ignore
//! use another_elm_init::ui::{self, TaskSpinner, UiContext};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "Installing another-elm");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Synchronizing std packages...");
//! spinner.stop("Rebuilt 2 std packages");
//!
//! ui::outro_success(&ctx, "Installed another-elm");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, note, outro_success, step_info, step_ok, step_ok_detail,
    step_warn_hint,
};
pub use progress::TaskSpinner;
