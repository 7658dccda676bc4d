//! Daily Tasks
//!
//! Interactive terminal front-end. Reads one command per line and redraws
//! the screen after every command and every change-feed event.

use anyhow::{Context, Result};
use clap::Parser;
use daily_tasks::config::{init_logging, Config};
use daily_tasks::render::render_shell;
use daily_tasks::{store, AppShell, Category, EntryStore, Field, SubmitOutcome};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "daily-tasks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Update your daily work from the terminal")]
struct Args {
    /// Config file (default: search the usual locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep entries in memory instead of using the hosted backend
    #[arg(long)]
    offline: bool,

    /// Tab to open first (vishnu, krishna)
    #[arg(short, long, default_value = "vishnu")]
    tab: Category,
}

const HELP: &str = "\
Commands:
  tab <vishnu|krishna|1|2>   switch tab (discards the current draft)
  date <YYYY-MM-DD>          set the date
  link <url>                 set the referral link
  comment <text>             set the comment (\\n starts a new line)
  submit                     validate and submit the draft
  show                       redraw the screen
  help                       show this help
  quit                       exit";

#[derive(Debug, PartialEq)]
enum Command {
    Tab(Category),
    Set(Field, String),
    Submit,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word.to_ascii_lowercase().as_str() {
        "tab" => parse_tab(rest).map(Command::Tab),
        "date" => Ok(Command::Set(Field::Date, rest.to_string())),
        "link" => Ok(Command::Set(Field::ReferralLink, rest.to_string())),
        "comment" => Ok(Command::Set(Field::Comment, rest.replace("\\n", "\n"))),
        "submit" => Ok(Command::Submit),
        "" | "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command {:?}; type \"help\"", other)),
    }
}

fn parse_tab(arg: &str) -> Result<Category, String> {
    if let Ok(n) = arg.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| Category::all().get(i).copied())
            .ok_or_else(|| format!("No tab {}", n));
    }
    arg.parse().map_err(|e: daily_tasks::CategoryParseError| e.to_string())
}

/// Run one command; returns whether the screen should be redrawn
async fn execute(shell: &mut AppShell, command: Command) -> bool {
    match command {
        Command::Tab(category) => {
            shell.switch_to(category).await;
            true
        }
        Command::Set(field, value) => {
            shell.panel_mut().set_field(field, value);
            true
        }
        Command::Submit => {
            let outcome = match shell.panel_mut().begin_submit() {
                Ok(draft) => {
                    draw(shell);
                    let result = shell.panel().store().insert_entry(draft).await;
                    shell.panel_mut().finish_submit(result)
                }
                Err(outcome) => outcome,
            };
            match outcome {
                SubmitOutcome::Submitted => println!("Submitted."),
                SubmitOutcome::Invalid => println!("Please fix the highlighted fields."),
                SubmitOutcome::Failed => println!("Submission failed."),
                SubmitOutcome::Busy => println!("A submission is already in progress."),
            }
            true
        }
        Command::Show => true,
        Command::Help => {
            println!("{}", HELP);
            false
        }
        Command::Quit => false,
    }
}

fn draw(shell: &AppShell) {
    println!();
    print!("{}", render_shell(shell));
    println!();
    println!("(type \"help\" for commands)");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::resolve(args.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    tracing::info!("Daily Tasks v{}", env!("CARGO_PKG_VERSION"));

    let store = store::open(&config.backend, &config.realtime, args.offline)
        .context("opening entry store")?;
    let mut shell = AppShell::start_on(store, args.tab).await;
    draw(&shell);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if execute(&mut shell, command).await {
                            draw(&shell);
                        }
                    }
                    Err(message) => println!("{}", message),
                }
            }
            _ = shell.panel_mut().recv_change() => draw(&shell),
        }
    }

    shell.shutdown();
    tracing::info!("Goodbye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("tab krishna"), Ok(Command::Tab(Category::Krishna)));
        assert_eq!(parse_command("tab 1"), Ok(Command::Tab(Category::Vishnu)));
        assert_eq!(parse_command("TAB 2"), Ok(Command::Tab(Category::Krishna)));
        assert!(parse_command("tab 3").is_err());
        assert!(parse_command("tab rama").is_err());

        assert_eq!(
            parse_command("date 2024-06-01"),
            Ok(Command::Set(Field::Date, "2024-06-01".to_string()))
        );
        assert_eq!(
            parse_command("comment  line one\\nline two "),
            Ok(Command::Set(Field::Comment, "line one\nline two".to_string()))
        );
        assert_eq!(parse_command("link"), Ok(Command::Set(Field::ReferralLink, String::new())));
        assert_eq!(parse_command(""), Ok(Command::Show));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert!(parse_command("delete 1").is_err());
    }
}
