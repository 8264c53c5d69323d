use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(name = "build", about = "Build feeds and listings. [default]")]
    Build(ProjectArgs),
    #[command(name = "tags", about = "Print the tag index without writing anything.")]
    Tags(ProjectArgs),
}

#[derive(Parser, Debug)]
pub struct ProjectArgs {
    /// Path to the project directory.
    #[clap(default_value = ".")]
    pub path: PathBuf,
}

impl Default for ProjectArgs {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
        }
    }
}
