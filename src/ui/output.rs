//! Output functions for consistent CLI formatting
//!
//! Interactive output goes through cliclack's log framing; plain output
//! uses bracketed tags so logs stay greppable in CI.

use super::context::UiContext;
use console::{style, Style};

/// Severity of a single step line
#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Info,
    Warn,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Self::Ok => "[OK]",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::Ok => Style::new().green(),
            Self::Info => Style::new().cyan(),
            Self::Warn => Style::new().yellow(),
        }
    }
}

fn step(ctx: &UiContext, level: Level, message: String) {
    if ctx.use_fancy_output() {
        let _ = match level {
            Level::Ok => cliclack::log::success(message),
            Level::Info => cliclack::log::info(message),
            Level::Warn => cliclack::log::warning(message),
        };
    } else {
        println!("  {} {}", level.style().apply_to(level.tag()), message);
    }
}

/// Display intro banner
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}\n", style(title).cyan().bold());
    }
}

/// Display success outro
pub fn outro_success(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(style(message).green().bold()).ok();
    } else {
        println!("\n{} {}", Level::Ok.style().apply_to(Level::Ok.tag()), message);
    }
}

/// Display a note box
pub fn note(ctx: &UiContext, title: &str, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::note(title, message).ok();
    } else {
        println!("{}: {}", style(title).bold(), message);
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message.to_string());
}

/// Success step with a dimmed detail in parentheses
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Level::Ok, format!("{} ({})", message, detail));
}

/// Warning step followed by what to do about it
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    let hint = if ctx.use_fancy_output() {
        style(hint).dim().to_string()
    } else {
        hint.to_string()
    };
    step(ctx, Level::Warn, format!("{} - {}", message, hint));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Level::Info, message.to_string());
}

/// Print an indented `key: value` line
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// `key: value` colored by whether the value is in a good state
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let level = if ok { Level::Ok } else { Level::Warn };
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), level.style().apply_to(value));
    } else {
        println!("  {} {}: {}", level.tag(), key, value);
    }
}
