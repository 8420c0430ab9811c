//! Interactive vs plain output detection

use std::io::IsTerminal;

/// Variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TF_BUILD",
];

/// Decides whether output uses spinners and cliclack framing
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self::from_env(std::io::stdout().is_terminal(), |var| {
            std::env::var_os(var).is_some()
        })
    }

    /// Plain output regardless of the terminal (tests, piped output)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    fn from_env(stdout_is_tty: bool, is_set: impl Fn(&str) -> bool) -> Self {
        let in_ci = CI_VARS.iter().any(|var| is_set(*var));
        Self {
            interactive: stdout_is_tty && !in_ci && !is_set("NO_COLOR"),
        }
    }

    /// Use spinners, colors and cliclack framing
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}
