use clap::Parser;
use kvsearch::cli::{Cli, Commands};
use kvsearch::commands;
use kvsearch::config::Config;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::parse_from(["kvsearch", "--help"]);
        return Ok(());
    };

    let config = Config::load()?;
    init_logging(&config);
    let engine = commands::open_engine(&config, cli.db)?;

    match command {
        Commands::Add { content, file } => {
            let content = commands::read_content(content, file.as_deref())?;
            let id = commands::add(&engine, &content)?;
            println!("Added document {id}");
        }
        Commands::Search { term, limit, json } => {
            let hits = commands::search(&engine, &term, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No matches found for '{term}'");
            } else {
                for hit in &hits {
                    println!("{hit}");
                }
                println!("\n{} result(s) found", hits.len());
            }
        }
        Commands::Delete { id } => {
            commands::delete(&engine, id)?;
            println!("Deleted document {id}");
        }
        Commands::Get { id } => {
            print!("{}", commands::get(&engine, id)?);
        }
    }

    Ok(())
}
