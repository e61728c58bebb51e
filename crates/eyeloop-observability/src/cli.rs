// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-eyeloop-agent`, `--debug-eyeloop-transports`,
//! etc. to raise individual crates to debug level.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Environment variable listing crates to debug (comma-separated, or `all`)
pub const DEBUG_ENV: &str = "EYELOOP_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use eyeloop_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-eyeloop-agent".to_string()]);
/// assert!(flags.is_enabled("eyeloop-agent"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Enable debug for one crate
    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Merge a list of crate names (e.g. from the `[logging]` config section)
    pub fn with_crates<'a>(mut self, crate_names: impl IntoIterator<Item = &'a str>) -> Self {
        for crate_name in crate_names {
            if crate_name == "all" {
                self.enable_all();
            } else {
                self.enable(crate_name);
            }
        }
        self
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Create a tracing filter from debug flags
    ///
    /// Tracing targets are module paths, so crate names are written with
    /// underscores: `eyeloop_agent=debug,info`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `EYELOOP_DEBUG`
///
/// Environment variable format: comma-separated crate names, e.g.
/// "eyeloop-agent,eyeloop-transports", or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let flags = CrateDebugFlags::from_args(env::args());
    match env::var(DEBUG_ENV) {
        Ok(value) => flags.with_crates(value.split(',')),
        Err(_) => flags,
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {}=all                               Enable debug for all crates
  RUST_LOG=<filter>                              Replaces the flag-derived filter
"#,
        KNOWN_CRATES.join(", "),
        DEBUG_ENV,
        DEBUG_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-eyeloop-agent".to_string()]);
        assert!(flags.is_enabled("eyeloop-agent"));
        assert!(!flags.is_enabled("eyeloop-transports"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "face_everloop".to_string(),
            "--host".to_string(),
            "10.0.0.2".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-eyeloop-agent".to_string()]);
        assert_eq!(flags.to_filter_string("info"), "eyeloop_agent=debug,info");
        assert_eq!(CrateDebugFlags::default().to_filter_string("warn"), "warn");
    }

    #[test]
    fn test_with_crates_from_config() {
        let flags = CrateDebugFlags::default().with_crates(["eyeloop-config", " ", ""]);
        assert_eq!(flags.enabled_crates.len(), 1);
        assert!(flags.is_enabled("eyeloop-config"));
        assert!(!flags.is_enabled("eyeloop-agent"));
    }
}
