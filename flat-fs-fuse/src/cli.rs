use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build and inspect flat-fs volume images
#[derive(Parser)]
#[command(version)]
pub struct Cli {
    /// Volume image
    #[arg(long, short, global = true, default_value = "fs.img")]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a fresh volume, overwriting the image
    Format,

    /// Create a file; its content is read from stdin unless given
    Create {
        name: String,

        /// Literal content
        #[arg(long, short, conflicts_with = "file")]
        data: Option<String>,

        /// Host file whose bytes become the content
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Print a file's size and content
    Read { name: String },

    /// List files in inode table order
    List,

    /// Show free and total blocks and inodes
    Info,
}
