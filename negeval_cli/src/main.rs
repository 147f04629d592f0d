//! Command line scorer: evaluates one or more system files against a gold file and prints the
//! report of each.

use anyhow::{Context, Result};
use clap::Parser;
use negeval::{evaluate_files, readme, EvalConfig, EvalConfigBuilder, EvalMode, ScopeScoring};
use std::path::PathBuf;

/// Evaluates negation (or speculation) cues, scopes and events against a gold annotation.
#[derive(Debug, Parser)]
#[command(name = "negeval", version, about)]
struct Args {
    /// Gold annotation file
    #[arg(value_name = "GOLD", required_unless_present = "readme")]
    gold: Option<PathBuf>,

    /// System annotation files
    #[arg(value_name = "SYSTEM", num_args = 1.., required_unless_present = "readme")]
    systems: Vec<PathBuf>,

    /// Evaluation procedure: instance, extended or starsem
    #[arg(short, long, default_value = "extended")]
    mode: EvalMode,

    /// Count scope tokens over the whole corpus instead of normalizing per instance (instance
    /// mode only)
    #[arg(short, long)]
    token_eval: bool,

    /// Reproduce the historical scorer, known mistakes included
    #[arg(short, long)]
    exact: bool,

    /// Print the explanation of the selected mode's output and exit
    #[arg(short, long)]
    readme: bool,

    /// Name of the annotated phenomenon, used in row labels
    #[arg(long, default_value = negeval::DEFAULT_TASK)]
    task: String,

    /// Number of decimals of the printed percentages
    #[arg(short = 'o', long, default_value_t = negeval::DEFAULT_ROUNDING)]
    rounding: usize,

    /// Score sentences on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Fixed-column tables
    Text,
    /// One JSON document
    Json,
}

impl Args {
    fn config(&self) -> EvalConfig {
        let scope_scoring = if self.token_eval {
            ScopeScoring::Tokens
        } else {
            ScopeScoring::Normalized
        };
        EvalConfigBuilder::new()
            .mode(self.mode)
            .scope_scoring(scope_scoring)
            .exact(self.exact)
            .task(self.task.as_str())
            .rounding(self.rounding)
            .parallel(self.parallel)
            .build()
    }

    fn init_logging(&self) {
        let log_level = match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }

    fn execute(&self) -> Result<()> {
        self.init_logging();
        if self.readme {
            print!("{}", readme(self.mode, &self.task));
            return Ok(());
        }
        let config = self.config();
        log::debug!("{}", config);
        let gold = self.gold.as_ref().context("missing gold file")?;
        let evaluation = evaluate_files(gold, &self.systems, &config)
            .with_context(|| format!("evaluation against {} failed", gold.display()))?;
        match self.format {
            OutputFormat::Text => print!("{}", evaluation),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string_pretty(&evaluation).context("could not serialize report")?
            ),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    Args::parse().execute()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_reach_the_config() {
        let args = Args::parse_from([
            "negeval", "-m", "instance", "-t", "--task", "speculation", "-o", "1", "gold.txt",
            "a.txt", "b.txt",
        ]);
        let config = args.config();
        assert_eq!(config.mode(), EvalMode::InstanceBased);
        assert_eq!(config.scope_scoring(), ScopeScoring::Tokens);
        assert_eq!(config.task(), "speculation");
        assert_eq!(config.rounding(), 1);
        assert_eq!(args.systems.len(), 2);
    }

    #[test]
    fn test_readme_needs_no_files() {
        let args = Args::try_parse_from(["negeval", "-r", "-m", "starsem"]).unwrap();
        assert!(args.readme);
        assert!(args.gold.is_none());
        assert!(Args::try_parse_from(["negeval"]).is_err());
    }
}
