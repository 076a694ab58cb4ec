//! CLI argument definitions.
//!
//! The probe takes no positional arguments: the probe directory is always
//! the directory containing the executable (see [`crate::config`] for the
//! test-only environment override). The flags only shape reporting and, for
//! testing the heuristics in isolation, force a branch.

use clap::{Parser, ValueEnum};

use crate::prober::Strategy;
use crate::report::ReportFormat;

/// hostprobe - Host privilege and file-ownership diagnostic probe.
#[derive(Debug, Parser)]
#[command(name = "hostprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit [#] debug lines and enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,

    /// Force an ownership heuristic instead of selecting one from the
    /// capability matrix
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,
}

/// `--format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Human,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => ReportFormat::Human,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// `--strategy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Select from the capability matrix.
    Auto,
    /// Branch A: POSIX identity comparison.
    Posix,
    /// Branch B: reversible chmod probe.
    Chmod,
    /// Branch C: temporary-file write test.
    WriteTest,
}

impl StrategyArg {
    /// The forced strategy, or `None` for automatic selection.
    pub fn forced(self) -> Option<Strategy> {
        match self {
            StrategyArg::Auto => None,
            StrategyArg::Posix => Some(Strategy::PosixIdentity),
            StrategyArg::Chmod => Some(Strategy::ChmodProbe),
            StrategyArg::WriteTest => Some(Strategy::WriteTest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_are_human_and_auto() {
        let cli = Cli::parse_from(["hostprobe"]);
        assert_eq!(cli.format, FormatArg::Human);
        assert_eq!(cli.strategy, StrategyArg::Auto);
        assert!(!cli.debug);
    }

    #[test]
    fn strategy_flag_parses_kebab_case() {
        let cli = Cli::parse_from(["hostprobe", "--strategy", "write-test"]);
        assert_eq!(cli.strategy.forced(), Some(Strategy::WriteTest));
    }

    #[test]
    fn auto_strategy_forces_nothing() {
        assert_eq!(StrategyArg::Auto.forced(), None);
    }

    #[test]
    fn format_converts_to_report_format() {
        assert_eq!(ReportFormat::from(FormatArg::Json), ReportFormat::Json);
        assert_eq!(ReportFormat::from(FormatArg::Human), ReportFormat::Human);
    }
}
