// Copyright (c) The jobstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError, JobstatExitCode, Result,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jobstat_report::{
    aggregate::{AnalysisOptions, Aggregator},
    bad_run::BadRunThreshold,
    config::{ConfigLocation, JobstatConfig, validate_report_file_name},
    date_range::{DateBound, DateRange},
    display::NameStyle,
    events::LogAnalysisEvents,
    rank::RankedSummary,
    store::RunStore,
};
use std::io::Write;
use tracing::{debug, info};

/// Tabulate per-test failure rates across the run history of CI jobs.
///
/// jobstat reads the cached result reports of each build of a job, folds them
/// into per-test counters, and prints every test that ran at least once,
/// ordered by ascending failure percentage.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style(), max_term_width = 100)]
pub struct JobstatApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    config_opts: ConfigOpts,

    #[clap(subcommand)]
    command: Command,
}

impl JobstatApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Analyze(opts) => opts.exec(&self.config_opts, output, output_writer),
            Command::ShowConfig(opts) => opts.exec(&self.config_opts, output_writer),
        }
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file [default: STORE_DIR/jobstat.toml, or "none" to skip]
    #[arg(long, global = true, value_name = "PATH", env = "JOBSTAT_CONFIG_FILE")]
    config_file: Option<String>,
}

impl ConfigOpts {
    fn make_config(&self, store: &StoreOpts) -> Result<JobstatConfig> {
        let location = ConfigLocation::from_cli(self.config_file.as_deref(), &store.store_dir);
        let mut config = JobstatConfig::from_location(location)?;

        if let Some(report_file_name) = &store.report_file_name {
            validate_report_file_name(report_file_name)?;
            config.store.report_file_name = report_file_name.clone();
        }

        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze the run history of one or more jobs
    ///
    /// Each job is analyzed independently and reported in the order given.
    /// Builds are read from STORE_DIR/JOB/BUILD_NUMBER/output.html.
    Analyze(AnalyzeOpts),

    /// Print the resolved configuration as TOML
    ShowConfig(ShowConfigOpts),
}

#[derive(Debug, Args)]
struct StoreOpts {
    /// Directory containing cached job histories
    #[arg(long, default_value = ".", value_name = "DIR", env = "JOBSTAT_STORE_DIR")]
    store_dir: Utf8PathBuf,

    /// File name of the report in each build directory [default: output.html]
    #[arg(long, value_name = "NAME")]
    report_file_name: Option<String>,
}

#[derive(Debug, Args)]
struct AnalyzeOpts {
    /// Names of the jobs to analyze
    #[arg(value_name = "JOB", required = true)]
    jobs: Vec<String>,

    #[clap(flatten)]
    store: StoreOpts,

    /// Only include runs generated on or after this date
    #[arg(long, value_name = "DATE", help_heading = "FILTER OPTIONS")]
    from: Option<DateBound>,

    /// Only include runs generated on or before this date
    #[arg(long, value_name = "DATE", help_heading = "FILTER OPTIONS")]
    to: Option<DateBound>,

    /// Error fraction above which a run is considered bad [default: 0.25]
    #[arg(
        long,
        value_name = "FRACTION",
        value_parser = parse_bad_run_threshold,
        help_heading = "FILTER OPTIONS"
    )]
    bad_run_threshold: Option<BadRunThreshold>,

    /// Show full test identities rather than method names
    #[arg(long, help_heading = "OUTPUT OPTIONS")]
    full_names: bool,

    /// Output format
    #[arg(
        short = 'T',
        long,
        value_enum,
        default_value_t,
        help_heading = "OUTPUT OPTIONS",
        value_name = "FMT"
    )]
    message_format: MessageFormat,
}

fn parse_bad_run_threshold(s: &str) -> Result<BadRunThreshold, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    BadRunThreshold::new(value).map_err(|error| error.to_string())
}

/// The format in which reports are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum MessageFormat {
    /// A human-readable table
    #[default]
    Human,
    /// One JSON object per job, on its own line
    Json,
}

impl AnalyzeOpts {
    fn exec(
        self,
        config_opts: &ConfigOpts,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let mut config = config_opts.make_config(&self.store)?;
        if let Some(threshold) = self.bad_run_threshold {
            config.analysis.bad_run_threshold = threshold;
        }
        debug!(
            "analyzing {} jobs with bad-run threshold {}",
            self.jobs.len(),
            config.analysis.bad_run_threshold,
        );

        let options = AnalysisOptions {
            date_range: DateRange::new(self.from, self.to),
            bad_run_threshold: config.analysis.bad_run_threshold,
        };
        let name_style = if self.full_names {
            NameStyle::Full
        } else {
            NameStyle::Abbreviated
        };
        let styles = output.report_styles();
        let store = RunStore::new(&self.store.store_dir, config.store.report_file_name);

        let mut writer = output_writer.stdout_writer();
        let mut total_runs = 0;
        for (index, job) in self.jobs.iter().enumerate() {
            let runs = store.runs(job)?;

            let mut aggregator = Aggregator::new(job.as_str(), options, LogAnalysisEvents);
            aggregator.add_runs(runs.iter().map(|run| &run.document));
            let summary = RankedSummary::new(aggregator.finish());
            total_runs += summary.runs_processed;

            match self.message_format {
                MessageFormat::Human => {
                    if index > 0 {
                        writeln!(writer).map_err(ExpectedError::write_output)?;
                    }
                    write!(
                        writer,
                        "{}",
                        summary.display(&options.date_range, name_style, &styles)
                    )
                    .map_err(ExpectedError::write_output)?;
                }
                MessageFormat::Json => {
                    serde_json::to_writer(&mut writer, &summary)
                        .map_err(ExpectedError::write_output)?;
                    writeln!(writer).map_err(ExpectedError::write_output)?;
                }
            }
        }
        writer.flush().map_err(ExpectedError::write_output)?;

        if total_runs == 0 {
            info!("no runs were processed for any job");
            Ok(JobstatExitCode::NO_RUNS_PROCESSED)
        } else {
            Ok(JobstatExitCode::OK)
        }
    }
}

#[derive(Debug, Args)]
struct ShowConfigOpts {
    #[clap(flatten)]
    store: StoreOpts,
}

impl ShowConfigOpts {
    fn exec(self, config_opts: &ConfigOpts, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = config_opts.make_config(&self.store)?;
        let toml = config.to_toml()?;

        let mut writer = output_writer.stdout_writer();
        writer
            .write_all(toml.as_bytes())
            .map_err(ExpectedError::write_output)?;
        writer.flush().map_err(ExpectedError::write_output)?;
        Ok(JobstatExitCode::OK)
    }
}
