// Host Profile
// Host-specific execution quirks, isolated from the orchestration core

use std::path::PathBuf;

/// Environment variable holding a command prefix for every tool invocation
pub const WRAPPER_ENV: &str = "RECIPE_TEST_WRAPPER";

/// What the current host needs in order to run the build tool
pub trait HostProfile: Send + Sync {
    /// Command prefix every invocation must be run through (may be empty)
    fn wrapper(&self) -> &[String];

    /// Locate a program on this host, for launch diagnostics
    fn locate(&self, _program: &str) -> Option<PathBuf> {
        None
    }
}

/// A host with no quirks and no lookup
#[derive(Debug, Clone, Default)]
pub struct PlainHost;

impl HostProfile for PlainHost {
    fn wrapper(&self) -> &[String] {
        &[]
    }
}

/// The machine the orchestrator runs on.
///
/// The environment is inspected once, when the profile is created.
#[derive(Debug, Clone, Default)]
pub struct SystemHost {
    wrapper: Vec<String>,
}

impl SystemHost {
    /// Read `RECIPE_TEST_WRAPPER` from the environment
    pub fn detect() -> Self {
        let wrapper = std::env::var(WRAPPER_ENV)
            .map(|value| parse_wrapper(&value))
            .unwrap_or_default();
        if !wrapper.is_empty() {
            tracing::debug!(?wrapper, "using command wrapper from {}", WRAPPER_ENV);
        }
        Self { wrapper }
    }

    pub fn with_wrapper(wrapper: Vec<String>) -> Self {
        Self { wrapper }
    }
}

impl HostProfile for SystemHost {
    fn wrapper(&self) -> &[String] {
        &self.wrapper
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

fn parse_wrapper(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapper() {
        assert_eq!(parse_wrapper("  nice -n   10 "), vec!["nice", "-n", "10"]);
        assert!(parse_wrapper("   ").is_empty());
    }

    #[test]
    fn test_plain_host_has_no_wrapper() {
        let host = PlainHost;
        assert!(host.wrapper().is_empty());
        assert!(host.locate("sh").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_host_locates_shell() {
        let host = SystemHost::with_wrapper(vec![]);
        assert!(host.locate("sh").is_some());
        assert!(host.locate("definitely-not-a-build-tool-7c1f").is_none());
    }
}
