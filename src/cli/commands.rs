//! Command handlers
//!
//! Each subcommand loads the layered settings, wires a container and drives
//! a session the way the page's buttons would.

use std::io;
use std::str::FromStr;

use clap::CommandFactory;
use itertools::Itertools;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

use crate::application::services::{SessionController, SortReport};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{Algorithm, Dataset};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub async fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Generate { seed }) => cmd_generate(cli, *seed),
        Some(Commands::Run {
            algorithm,
            seed,
            values,
            speed,
            headless,
        }) => cmd_run(cli, algorithm, *seed, values.as_deref(), *speed, *headless).await,
        Some(Commands::Session { seed }) => cmd_session(cli, *seed).await,
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(cli),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "sortvis", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `sortvis --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

// ============================================================
// generate / run
// ============================================================

#[instrument(skip(cli))]
fn cmd_generate(cli: &Cli, seed: Option<u64>) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli)?, true);
    let session = container.session(seed)?;
    output::info(session.dataset());
    Ok(())
}

#[instrument(skip(cli))]
async fn cmd_run(
    cli: &Cli,
    algorithm: &str,
    seed: Option<u64>,
    values: Option<&str>,
    speed: Option<f64>,
    headless: bool,
) -> CliResult<()> {
    let mut settings = load_settings(cli)?;
    if let Some(speed) = speed {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(CliError::InvalidArgs(format!(
                "speed must be a positive number, got {speed}"
            )));
        }
        settings.timing.time_scale /= speed;
    }
    if headless {
        settings.timing.time_scale = 0.0;
    }
    let algorithm = Algorithm::from_str(algorithm)?;
    debug!(%algorithm, time_scale = settings.timing.time_scale, "run configured");

    let container = ServiceContainer::new(settings, headless);
    let mut session = container.session(seed)?;
    if let Some(values) = values {
        session.load(Dataset::from_str(values)?)?;
    }
    session.select(algorithm)?;

    let before = session.dataset().clone();
    let report = session.start().await?;
    print_report(&before, report);
    Ok(())
}

fn print_report(before: &Dataset, report: &SortReport) {
    output::header(&format!("{} sort", report.algorithm()));
    output::action("before", before);
    output::action("after", &report.output().iter().join(", "));
    match report {
        SortReport::Bubble(bubble) => {
            output::detail(&format!(
                "{} comparisons, {} swaps",
                bubble.comparisons.len(),
                bubble.swaps()
            ));
        }
        SortReport::Tree(tree) => {
            output::detail(&format!("structure: {}", tree.structure));
            output::detail(&format!("depth {}, {} steps", tree.depth, tree.steps));
        }
    }
}

// ============================================================
// config
// ============================================================

#[instrument(skip(cli))]
fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config_path(cli: &Cli) -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            let state = if path.exists() { "exists" } else { "not found" };
            output::action("global", &format!("{} ({state})", path.display()));
        }
        None => output::warning("no home directory, global config disabled"),
    }
    if let Some(path) = &cli.config {
        let state = if path.exists() { "exists" } else { "not found" };
        output::action("explicit", &format!("{} ({state})", path.display()));
    }
    Ok(())
}

// ============================================================
// interactive session
// ============================================================

/// One line typed into an interactive session.
#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Generate,
    Load(Dataset),
    Mode(Algorithm),
    Start,
    Reset,
    Show,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let command = match word.to_lowercase().as_str() {
            "generate" | "g" => SessionCommand::Generate,
            "load" => SessionCommand::Load(Dataset::from_str(rest)?),
            "mode" | "m" => SessionCommand::Mode(Algorithm::from_str(rest)?),
            "start" | "s" => SessionCommand::Start,
            "reset" | "r" => SessionCommand::Reset,
            "show" => SessionCommand::Show,
            "help" | "?" => SessionCommand::Help,
            "quit" | "q" | "exit" => SessionCommand::Quit,
            other => return Err(CliError::Usage(format!("unknown command: {other}"))),
        };
        Ok(command)
    }
}

const SESSION_HELP: &str = "\
generate          new random dataset
load 5,3,8,1      explicit dataset
mode bubble|tree  select the algorithm
start             run the selected sort (type reset or quit to interrupt)
reset             stop and start over
show              current state
quit              leave";

type InputLines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

async fn next_line(lines: &mut InputLines) -> CliResult<Option<String>> {
    lines
        .next_line()
        .await
        .map_err(|e| InfraError::io("read stdin", e).into())
}

#[instrument(skip(cli))]
async fn cmd_session(cli: &Cli, seed: Option<u64>) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli)?, false);
    let mut session = container.session(seed)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    output::detail("type `help` for commands");

    loop {
        output::prompt(&format!("[{}]>", session.algorithm()));
        let Some(line) = next_line(&mut lines).await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match SessionCommand::from_str(&line) {
            Ok(command) => command,
            Err(e) => {
                output::warning(&e);
                continue;
            }
        };
        debug!(?command, "session command");
        let keep_going = match command {
            SessionCommand::Quit => false,
            SessionCommand::Start => start_interruptible(&mut session, &mut lines).await?,
            other => {
                if let Err(e) = apply_command(&mut session, other) {
                    output::error(&e);
                }
                true
            }
        };
        if !keep_going {
            break;
        }
    }
    info!("session ended");
    Ok(())
}

fn apply_command(session: &mut SessionController, command: SessionCommand) -> CliResult<()> {
    match command {
        SessionCommand::Generate => session.generate()?,
        SessionCommand::Load(dataset) => session.load(dataset)?,
        SessionCommand::Mode(algorithm) => {
            session.select(algorithm)?;
            output::action("mode", &algorithm);
        }
        SessionCommand::Reset => {
            session.reset()?;
            output::success("reset");
        }
        SessionCommand::Show => {
            output::action("dataset", session.dataset());
            output::action("mode", &session.algorithm());
            output::action("phase", &format!("{:?}", session.phase()));
            if let Some(report) = session.last_report() {
                output::action("after", &report.output().iter().join(", "));
            }
        }
        SessionCommand::Help => output::info(SESSION_HELP),
        SessionCommand::Start | SessionCommand::Quit => {}
    }
    Ok(())
}

/// Run the sort while still listening for `reset` and `quit`.
/// Returns false when the session should end.
async fn start_interruptible(
    session: &mut SessionController,
    lines: &mut InputLines,
) -> CliResult<bool> {
    let scheduler = session.scheduler();
    let mut interrupt: Option<SessionCommand> = None;

    let result = {
        let run = session.start();
        tokio::pin!(run);
        loop {
            tokio::select! {
                result = &mut run => break result.map(|report| report.output().to_vec()),
                line = next_line(lines), if interrupt.is_none() => {
                    match line?.as_deref().map(SessionCommand::from_str) {
                        None | Some(Ok(SessionCommand::Quit)) => {
                            interrupt = Some(SessionCommand::Quit);
                            scheduler.cancel();
                        }
                        Some(Ok(SessionCommand::Reset)) => {
                            interrupt = Some(SessionCommand::Reset);
                            scheduler.cancel();
                        }
                        Some(_) => output::warning("sort running, only reset or quit are accepted"),
                    }
                }
            }
        }
    };

    match result {
        Ok(sorted) => output::action("after", &sorted.iter().join(", ")),
        Err(ApplicationError::Cancelled) => debug!("sort interrupted"),
        Err(e) => output::error(&e),
    }

    match interrupt {
        Some(SessionCommand::Quit) => Ok(false),
        Some(SessionCommand::Reset) => {
            session.reset()?;
            output::success("reset");
            Ok(true)
        }
        _ => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("generate", SessionCommand::Generate)]
    #[case("  start ", SessionCommand::Start)]
    #[case("mode tree", SessionCommand::Mode(Algorithm::Tree))]
    #[case("m bst", SessionCommand::Mode(Algorithm::Tree))]
    #[case("load 5,3,8,1", SessionCommand::Load(Dataset::new(vec![5, 3, 8, 1])))]
    #[case("Quit", SessionCommand::Quit)]
    fn given_session_line_when_parsed_then_yields_command(
        #[case] line: &str,
        #[case] expected: SessionCommand,
    ) {
        assert_eq!(SessionCommand::from_str(line).unwrap(), expected);
    }

    #[rstest]
    #[case("dance")]
    #[case("mode quick")]
    #[case("load 5,x")]
    fn given_bad_session_line_when_parsed_then_fails(#[case] line: &str) {
        assert!(SessionCommand::from_str(line).is_err());
    }
}
