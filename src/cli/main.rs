use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use folder_icon::config;
use folder_icon::pipeline::{FolderStatus, InstallReport, Pipeline, UninstallReport};

#[derive(Parser, Debug)]
#[command(
    name = "folder-icon",
    version,
    about = "Set or remove a custom Windows folder icon (desktop.ini + attributes)"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install a custom icon on a folder
    Install {
        /// Folder to customize
        #[arg(value_name = "FOLDER_PATH")]
        folder: PathBuf,

        /// Image to use (.png, .jpg, .jpeg or .ico); defaults to folder.png/jpg/jpeg/ico inside the folder
        #[arg(value_name = "IMAGE_PATH")]
        image: Option<PathBuf>,

        /// Apply to every subfolder as well
        #[arg(short, long)]
        recursive: bool,
    },
    /// Remove the custom icon from a folder
    Uninstall {
        /// Folder to revert
        #[arg(value_name = "FOLDER_PATH")]
        folder: PathBuf,

        /// Revert every subfolder as well
        #[arg(short, long)]
        recursive: bool,
    },
    /// Show whether a folder has a custom icon
    Status {
        #[arg(value_name = "FOLDER_PATH")]
        folder: PathBuf,

        /// Report every subfolder as well
        #[arg(short, long)]
        recursive: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        eprintln!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    let config = config::Config::load(cli.config.as_deref())?;
    let pipeline = Pipeline::builder().from_config(&config).build();

    match command {
        Command::Install {
            folder,
            image,
            recursive,
        } => {
            let report = pipeline.install(&folder, image.as_deref(), recursive)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_install(&report);
            }
        }
        Command::Uninstall { folder, recursive } => {
            let report = pipeline.uninstall(&folder, recursive)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_uninstall(&report);
            }
        }
        Command::Status { folder, recursive } => {
            let statuses = pipeline.status(&folder, recursive)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                print_status(&statuses);
            }
        }
    }

    Ok(())
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

const REFRESH_HINT: &str = "You may need to press F5 in Explorer to refresh.";

/// Print the confirmation for a finished install.
fn print_install(report: &InstallReport) {
    print!("{}", install_summary(report));
}

/// Confirmation lines for a finished install.
fn install_summary(report: &InstallReport) -> String {
    let mut out = String::new();
    if let Some(ref converted) = report.converted {
        out.push_str(&format!(
            "{DIM}Converted {} -> {}{RESET}\n",
            report.image.display(),
            converted.display()
        ));
    }
    out.push_str(&format!(
        "{GREEN}Success!{RESET} Custom icon installed for '{}'.\n",
        report.root.display()
    ));
    if report.folders.len() > 1 {
        out.push_str(&format!(
            "  {} subfolder(s) customized as well.\n",
            report.folders.len() - 1
        ));
    }
    out.push_str(REFRESH_HINT);
    out.push('\n');
    out
}

/// Print the confirmation for a finished uninstall.
fn print_uninstall(report: &UninstallReport) {
    print!("{}", uninstall_summary(report));
}

/// Confirmation lines for a finished uninstall.
fn uninstall_summary(report: &UninstallReport) -> String {
    let mut out = String::new();
    if report.removed.is_empty() {
        out.push_str(&format!(
            "No custom icon found under '{}'.\n",
            report.root.display()
        ));
    } else {
        out.push_str(&format!(
            "Removed desktop.ini from {} of {} folder(s).\n",
            report.removed.len(),
            report.folders.len()
        ));
    }
    out.push_str(&format!(
        "{GREEN}Uninstallation complete.{RESET} Folder icon for '{}' will revert to default.\n",
        report.root.display()
    ));
    out.push_str(REFRESH_HINT);
    out.push('\n');
    out
}

/// Print one row per folder with its customization state.
fn print_status(statuses: &[FolderStatus]) {
    for status in statuses {
        let marker = if status.customized {
            format!("{GREEN}customized{RESET}")
        } else {
            format!("{DIM}default{RESET}   ")
        };
        println!("  {marker}  {BOLD}{}{RESET}", status.folder.display());
        if let Some(ref ini) = status.desktop_ini {
            println!("  {DIM}            icon: {},{}{RESET}", ini.icon_resource, ini.icon_index);
        }
    }
}
