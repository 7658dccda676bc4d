//! Daily Tasks CLI
//!
//! Command-line interface for scripting against the entry store:
//! - List a category's entries
//! - Add an entry
//! - Watch a category's change feed
//! - Generate a config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daily_tasks::config::{generate_default_config, init_logging, Config};
use daily_tasks::render::{render_table, DISPLAY_DATE_FORMAT};
use daily_tasks::{store, Category, ChangeEvent, EntryList, EntryStore, Field, FormFields};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daily-tasks-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Script the daily entry log")]
#[command(long_about = "Daily Tasks keeps dated referral links and comments in two categories.\nList, add and watch entries from scripts.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep entries in memory instead of using the hosted backend
    #[arg(long, global = true)]
    pub offline: bool,

    /// Category to work on (vishnu, krishna)
    #[arg(short = 'C', long, default_value = "vishnu", global = true)]
    pub category: Category,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries, newest first
    List,

    /// Add an entry
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(short, long, default_value = "")]
        date: String,
        /// Referral link (YouTube/GitHub URL)
        #[arg(short, long, default_value = "")]
        link: String,
        /// Comment
        #[arg(short = 'm', long, default_value = "")]
        comment: String,
    },

    /// Print change events until interrupted
    Watch,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Config { output } => return write_config(output),
        command => command,
    };

    let config = Config::resolve(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging)?;

    let store = store::open(&config.backend, &config.realtime, cli.offline)
        .context("opening entry store")?;
    let json = cli.format == "json";

    match command {
        Commands::List => {
            let entries = store.fetch_entries(cli.category).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                let mut list = EntryList::new();
                list.replace_all(entries);
                print!("{}", render_table(&list));
            }
        }

        Commands::Add {
            date,
            link,
            comment,
        } => {
            let mut fields = FormFields::default();
            fields.set(Field::Date, date);
            fields.set(Field::ReferralLink, link);
            fields.set(Field::Comment, comment);

            let draft = match fields.validate(cli.category) {
                Ok(draft) => draft,
                Err(errors) => {
                    for (field, message) in errors.iter() {
                        eprintln!("{}: {}", field.label(), message);
                    }
                    std::process::exit(1);
                }
            };

            store.insert_entry(draft.clone()).await?;
            println!(
                "Added {} entry for {}",
                cli.category.title(),
                draft.date.format(DISPLAY_DATE_FORMAT)
            );
        }

        Commands::Watch => {
            let mut subscription = store.subscribe(cli.category).await?;
            eprintln!("Watching {} (Ctrl+C to stop)", cli.category.title());

            loop {
                tokio::select! {
                    event = subscription.recv() => {
                        let Some(event) = event else {
                            eprintln!("Change feed ended");
                            break;
                        };
                        print_event(&event, json)?;
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            subscription.unsubscribe();
        }

        Commands::Config { output } => write_config(output)?,
    }

    Ok(())
}

fn write_config(output: Option<PathBuf>) -> Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(&path, content).with_context(|| format!("writing {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn print_event(event: &ChangeEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }

    match event {
        ChangeEvent::Inserted { entry } | ChangeEvent::Updated { entry } => println!(
            "{:<8} {} {} {}",
            event.kind(),
            entry.date.format(DISPLAY_DATE_FORMAT),
            entry.referral_link,
            entry.comment
        ),
        ChangeEvent::Deleted { id } => println!("{:<8} {}", event.kind(), id),
    }
    Ok(())
}
