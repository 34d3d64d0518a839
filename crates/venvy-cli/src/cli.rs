use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const VENVY_BEFORE_HELP: &str = concat!(
    "venvy ",
    env!("CARGO_PKG_VERSION"),
    " - Python virtual environment manager\n\n",
    "  pythons          List the interpreters found on this machine.\n",
    "  list             Show managed and discovered environments.\n",
    "  create / delete  Build a new environment or remove one (with a safety check).\n",
    "  manage           Track or untrack environments without touching them.\n",
    "  packages         Show what pip installed inside an environment.\n",
    "  install / remove / upgrade\n",
    "                   Drive the environment's own pip, one package at a time.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    disable_help_subcommand = true,
    before_help = VENVY_BEFORE_HELP
)]
pub struct VenvyCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    pub verbose: u8,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "Use an alternate config file",
        global = true
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    #[command(about = "List detected Python interpreters, newest first")]
    Pythons,
    #[command(about = "List managed and discovered virtual environments")]
    List(ListArgs),
    #[command(about = "Create a virtual environment and start managing it")]
    Create(CreateArgs),
    #[command(about = "Delete a virtual environment (pyvenv.cfg is re-checked first)")]
    Delete(DeleteArgs),
    #[command(subcommand, about = "Track or untrack environments in the managed list")]
    Manage(ManageCommand),
    #[command(about = "List installed packages in an environment")]
    Packages(EnvArgs),
    #[command(about = "pip install a package spec into an environment")]
    Install(InstallArgs),
    #[command(about = "pip uninstall packages from an environment")]
    Remove(PackageNamesArgs),
    #[command(about = "pip install --upgrade packages in an environment")]
    Upgrade(PackageNamesArgs),
    #[command(about = "Reveal an environment in the file manager")]
    Reveal(EnvArgs),
    #[command(about = "Open a terminal with the environment activated (macOS)")]
    Activate(EnvArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, help = "Skip the directory scan; show only managed environments")]
    pub managed_only: bool,
    #[arg(
        long,
        value_name = "DIR",
        help = "Scan these roots instead of the configured ones"
    )]
    pub root: Vec<PathBuf>,
    #[arg(long, value_name = "N", help = "Override the configured scan depth")]
    pub max_depth: Option<usize>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(
        value_name = "NAME|PATH",
        help = "Bare names land under the configured default location"
    )]
    pub target: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Interpreter to build with (default: newest detected)"
    )]
    pub python: Option<PathBuf>,
    #[arg(long, help = "Skip the pip bootstrap")]
    pub without_pip: bool,
    #[arg(long, help = "Give the environment access to system site-packages")]
    pub system_site_packages: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub path: PathBuf,
    #[arg(short, long, help = "Skip the confirmation prompt")]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum ManageCommand {
    #[command(about = "Add an existing environment to the managed list")]
    Add(PathArgs),
    #[command(about = "Remove an environment from the managed list (keeps it on disk)")]
    Remove(PathArgs),
}

#[derive(Args, Debug)]
pub struct PathArgs {
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct EnvArgs {
    #[arg(value_name = "ENV")]
    pub env: PathBuf,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[arg(value_name = "ENV")]
    pub env: PathBuf,
    #[arg(value_name = "SPEC", help = "Package name, optionally with a version constraint")]
    pub spec: String,
}

#[derive(Args, Debug)]
pub struct PackageNamesArgs {
    #[arg(value_name = "ENV")]
    pub env: PathBuf,
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}
