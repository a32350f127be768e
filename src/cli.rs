use crate::demo::{run_demo, run_policy, run_screen, DemoArgs, ScreenArgs};
use clap::{Parser, Subcommand, ValueEnum};
use talent_ai::config::AppConfig;
use talent_ai::error::AppError;
use talent_ai::telemetry;
use talent_ai::workflows::screening::SelectionStrategy;

#[derive(Parser, Debug)]
#[command(
    name = "talent-ai",
    about = "Screen candidate batches against a job description and rank the results",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Screen a directory or JSON file of resumes against a job description
    Screen(ScreenArgs),
    /// Run the built-in sample batch through the offline oracles (default command)
    Demo(DemoArgs),
    /// Print the validated scoring policy and batch settings
    Policy,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub(crate) enum StrategyArg {
    #[default]
    AllQualified,
    StrongFirst,
}

impl From<StrategyArg> for SelectionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::AllQualified => SelectionStrategy::AllQualified,
            StrategyArg::StrongFirst => SelectionStrategy::StrongFirst,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Screen(args) => run_screen(args, &config).await,
        Command::Demo(args) => run_demo(args, &config).await,
        Command::Policy => run_policy(&config),
    }
}
