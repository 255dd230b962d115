use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jit",
    about = "jit — a minimal content-addressed version control store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize an empty repository
    Init(InitArgs),
    /// Record every file in the working directory as a new commit
    Commit(CommitArgs),
    /// Show the type or contents of a stored object
    CatFile(CatFileArgs),
    /// Show commit history from HEAD
    Log(LogArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (created if missing)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Full 40-character object id
    pub object: String,
    /// Print the object kind only
    #[arg(short = 't', conflicts_with = "pretty")]
    pub kind: bool,
    /// Pretty-print the object contents (default)
    #[arg(short = 'p')]
    pub pretty: bool,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}
