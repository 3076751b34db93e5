use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oxide_launcher::config::{self, ShortcutStore};
use oxide_launcher::{IconResolver, launcher};

#[derive(Parser, Debug)]
#[command(name = "oxide-launcher")]
#[command(about = "Register executable shortcuts and launch them")]
struct Args {
    /// Shortcut data file (defaults to apps.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List shortcuts, optionally filtered by a name substring
    List {
        #[arg(short, long, default_value = "")]
        filter: String,
    },
    /// Register a new shortcut
    Add {
        name: String,
        app_path: String,
        /// Working directory for the launched program
        #[arg(long, default_value = "")]
        env_path: String,
    },
    /// Delete a shortcut
    Remove { name: String },
    /// Start the program behind a shortcut
    Launch { name: String },
    /// Write a shortcut's 32x32 icon as PNG
    Icon { name: String, output: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.debug);

    let data_file = config::find_data_file(args.data);
    info!("Loading shortcuts from {:?}", data_file);
    let mut store = ShortcutStore::load(&data_file)?;

    match args.command {
        Command::List { filter } => {
            let mut resolver: IconResolver = IconResolver::default();
            for (name, shortcut) in store.filter(&filter) {
                let icon = resolver.resolve(&shortcut.app_path);
                let source = if resolver.is_default(&icon) {
                    "placeholder"
                } else {
                    "extracted"
                };
                let env_path = if shortcut.env_path.is_empty() {
                    "(not set)"
                } else {
                    shortcut.env_path.as_str()
                };
                println!("{name}");
                println!("    app:  {}", shortcut.app_path);
                println!("    env:  {env_path}");
                println!("    icon: {source}");
            }
        }
        Command::Add {
            name,
            app_path,
            env_path,
        } => {
            store.add(&name, &env_path, &app_path)?;
            println!("Shortcut '{}' added", name.trim());
        }
        Command::Remove { name } => {
            store.remove(&name)?;
            println!("Shortcut '{name}' removed");
        }
        Command::Launch { name } => {
            let shortcut = store
                .get(&name)
                .with_context(|| format!("shortcut '{name}' not found"))?;
            launcher::launch(shortcut)?;
        }
        Command::Icon { name, output } => {
            let shortcut = store
                .get(&name)
                .with_context(|| format!("shortcut '{name}' not found"))?;
            let mut resolver: IconResolver = IconResolver::default();
            let icon = resolver.resolve(&shortcut.app_path);
            icon.as_rgb_image()
                .save(&output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Icon for '{name}' written to {}", output.display());
        }
    }

    Ok(())
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
