//! helpcmd - help-desk command runner
//!
//! Lists the support catalog for this OS and runs entries (or free-form
//! commands), elevating privileges when a command needs them.
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use helpcmd_cli::{logging, output, prompt};
use helpcmd_core::catalog::Catalog;
use helpcmd_core::config::{default_data_dir, ConfigStore};
use helpcmd_core::help::{category_description, HelpTopic};
use helpcmd_core::history::HistoryStore;
use helpcmd_core::platform::HostContext;
use helpcmd_core::{CommandExecutor, CommandSpec, ExecutionOutcome};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "helpcmd")]
#[command(about = "Help-desk command runner with privilege elevation", long_about = None)]
struct Cli {
    /// Directory holding config.json, history.json and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Load the command catalog from a YAML file instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the detected platform and privilege level
    Info,
    /// List catalog commands
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Case-insensitive search term
        #[arg(short, long)]
        search: Option<String>,
        /// Only favorites
        #[arg(short, long)]
        favorites: bool,
    },
    /// Describe one catalog command
    Show { key: String },
    /// Run a catalog command
    Run {
        key: String,
        /// Skip the confirmation of critical commands
        #[arg(short, long)]
        yes: bool,
    },
    /// Run a free-form command through the system shell
    Exec {
        /// Try to run with administrator privileges
        #[arg(short, long)]
        admin: bool,
        /// Command line handed to the shell unchanged; quote it as one argument
        #[arg(allow_hyphen_values = true)]
        command: String,
    },
    /// Show, export or clear the execution history
    History {
        /// Write a text report to this file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Delete every entry
        #[arg(long)]
        clear: bool,
    },
    /// Read the usage guide, troubleshooting notes or about text
    Guide {
        /// guide, troubleshooting or about; lists the topics when omitted
        topic: Option<String>,
    },
    /// Manage favorite commands
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    Add { key: String },
    Remove { key: String },
    List,
}

struct App {
    config: ConfigStore,
    host: HostContext,
    catalog: Catalog,
    history: Arc<HistoryStore>,
}

impl App {
    /// Expects the logger to be installed already so history and privilege
    /// warnings are not lost.
    fn open(config: ConfigStore, data_dir: &Path, catalog_path: Option<&Path>) -> Result<Self> {
        let host = HostContext::probe();
        let catalog = match catalog_path {
            Some(path) => Catalog::load_yaml(path)
                .with_context(|| format!("Failed to load catalog {:?}", path))?,
            None => Catalog::builtin(host.family()),
        };
        let history = Arc::new(HistoryStore::open(data_dir, config.config().history_limit));
        Ok(Self {
            config,
            host,
            catalog,
            history,
        })
    }

    fn executor(&self) -> CommandExecutor {
        CommandExecutor::for_host(self.host.clone(), &self.config.config().elevation_tool)
            .with_audit_sink(self.history.clone())
    }

    fn host(&self) -> &HostContext {
        &self.host
    }

    fn lookup(&self, key: &str) -> Result<&CommandSpec> {
        self.catalog
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("Command {} not found", key))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    // The log file location lives in the config, so it is read before the
    // logger exists; its load warning is replayed once logging is up.
    let config = ConfigStore::open(&data_dir);
    let log_file = if cli.log_stderr {
        None
    } else {
        Some(
            config
                .config()
                .log_file
                .clone()
                .unwrap_or_else(|| data_dir.join(logging::LOG_FILE)),
        )
    };
    logging::init_logging(log_file.as_deref())?;
    if let Some(warning) = config.load_warning() {
        log::warn!("[config] {}", warning);
    }

    let app = App::open(config, &data_dir, cli.catalog.as_deref())?;

    match cli.command {
        Commands::Info => {
            let executor = app.executor();
            print!(
                "{}",
                output::render_host(app.host(), &executor.elevation().describe())
            );
        }
        Commands::List {
            category,
            search,
            favorites,
        } => run_list(&app, category.as_deref(), search.as_deref(), favorites),
        Commands::Show { key } => {
            let spec = app.lookup(&key)?;
            print!("{}", output::render_details(spec, app.config.is_favorite(&spec.key)));
        }
        Commands::Run { key, yes } => {
            let outcome = run_catalog_command(&app, &key, yes)?;
            return Ok(ExitCode::from(output::exit_status(&outcome)));
        }
        Commands::Exec { admin, command } => {
            if command.trim().is_empty() {
                bail!("Empty command");
            }
            println!("\n[FREE COMMAND] {}\n", command);
            let outcome = app.executor().execute_free(&command, admin);
            print!("{}", output::render_outcome(&outcome));
            return Ok(ExitCode::from(output::exit_status(&outcome)));
        }
        Commands::History { export, clear } => run_history(&app, export.as_deref(), clear)?,
        Commands::Guide { topic } => {
            let topic = match topic {
                Some(name) => Some(
                    HelpTopic::from_name(&name)
                        .ok_or_else(|| anyhow::anyhow!("Unknown help topic {}", name))?,
                ),
                None => None,
            };
            print!("{}", output::render_topic(topic));
        }
        Commands::Favorite { action } => run_favorite(app, action)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn run_list(app: &App, category: Option<&str>, search: Option<&str>, favorites: bool) {
    let commands: Vec<&CommandSpec> = app
        .catalog
        .search(search.unwrap_or(""))
        .into_iter()
        .filter(|c| category.map_or(true, |cat| c.category.eq_ignore_ascii_case(cat)))
        .filter(|c| !favorites || app.config.is_favorite(&c.key))
        .collect();

    if let Some(description) = category.and_then(category_description) {
        println!("{}\n", description);
    }
    print!("{}", output::render_table(&commands, |k| app.config.is_favorite(k)));
    if category.is_none() && search.is_none() && !favorites {
        print!("\n{}", output::render_categories(&app.catalog));
    }
}

fn run_catalog_command(app: &App, key: &str, skip_confirm: bool) -> Result<ExecutionOutcome> {
    let spec = app.lookup(key)?;
    let settings = app.config.config();

    if spec.requires_admin && !app.host.elevated && settings.show_admin_warnings {
        println!("This command requires administrator privileges; elevation will be requested.");
    }
    println!("\n[EXECUTING] {} -> {}\n", spec.name, spec.command);

    let must_confirm = settings.confirm_critical && !skip_confirm;
    let outcome = app.executor().execute(spec, |spec| {
        if !must_confirm {
            return true;
        }
        let stdin = io::stdin();
        let mut input = stdin.lock();
        prompt::confirm_critical(spec, &mut input, &mut io::stdout())
    });

    print!("{}", output::render_outcome(&outcome));
    Ok(outcome)
}

fn run_history(app: &App, export: Option<&Path>, clear: bool) -> Result<()> {
    if let Some(target) = export {
        app.history.export_text(target)?;
        println!("History exported to {}", target.display());
    }
    if clear {
        app.history.clear()?;
        println!("History cleared.");
    }
    if export.is_none() && !clear {
        print!("{}", output::render_history(&app.history.entries()));
    }
    Ok(())
}

fn run_favorite(mut app: App, action: FavoriteAction) -> Result<()> {
    match action {
        FavoriteAction::Add { key } => {
            let key = app.lookup(&key)?.key.clone();
            if app.config.add_favorite(&key)? {
                println!("Added {} to favorites.", key);
            } else {
                println!("{} is already a favorite.", key);
            }
        }
        FavoriteAction::Remove { key } => {
            if app.config.remove_favorite(&key)? {
                println!("Removed {} from favorites.", key);
            } else {
                println!("{} is not a favorite.", key);
            }
        }
        FavoriteAction::List => {
            let favorites: Vec<&CommandSpec> = app
                .config
                .config()
                .favorites
                .iter()
                .filter_map(|k| app.catalog.get(k))
                .collect();
            print!("{}", output::render_table(&favorites, |_| true));
        }
    }
    Ok(())
}
