//! `sns-tool`: find SNS subscriptions that deliver to Lambda functions in
//! other AWS accounts.

mod output;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use sns_tool_discovery::{
    audit_account, render, AuditConfig, ClientConfig, ReportTarget, DEFAULT_REGION,
    LAMBDA_PROTOCOL,
};

#[derive(Parser, Debug)]
#[command(
    name = "sns-tool",
    version,
    about = "AWS SNS Cross-Account Subscription Checker",
    long_about = "A CLI tool to check cross-account SNS subscriptions across different AWS accounts.\n\
                  This tool helps identify Lambda subscriptions that are connected across different AWS accounts."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cross-account SNS subscriptions
    #[command(after_help = "Examples:\n  \
        sns-tool list -a 123456789012\n  \
        sns-tool list -a 123456789012 -p dev\n  \
        sns-tool list -a 123456789012 -p prod -r us-west-2\n  \
        sns-tool list -a 123456789012 -e csv -o subscriptions.csv")]
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    /// AWS account number to check
    #[arg(short, long)]
    account: String,

    /// AWS region to check
    #[arg(short, long, default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to use
    #[arg(short, long)]
    profile: Option<String>,

    /// Export format
    #[arg(short, long, value_enum)]
    export: Option<ExportFormat>,

    /// Output file name (CSV export only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file mapping account numbers to friendly names
    #[arg(long, value_name = "FILE")]
    accounts_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Csv,
}

impl ListArgs {
    fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            account_id: self.account.clone(),
            client: ClientConfig {
                region: self.region.clone(),
                profile: self.profile.clone(),
            },
            protocol: LAMBDA_PROTOCOL.to_string(),
            accounts_file: self.accounts_file.clone(),
        }
    }

    fn report_target(&self) -> ReportTarget {
        match self.export {
            Some(ExportFormat::Csv) => ReportTarget::Csv {
                path: self.output.clone(),
            },
            None => ReportTarget::Console,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn run_list(args: &ListArgs) -> Result<()> {
    if args.output.is_some() && args.export.is_none() {
        output::warn("--output is ignored without --export csv");
    }

    let config = args.audit_config();
    debug!("Running audit with {config:?}");

    let outcome = audit_account(&config)
        .await
        .context("failed to list subscriptions")?;
    output::print_skipped_topics(&outcome);

    let stdout = io::stdout();
    render(&outcome.findings, &args.report_target(), &mut stdout.lock())
        .context("failed to write report")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::List(args) => run_list(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            ExitCode::FAILURE
        }
    }
}
