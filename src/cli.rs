use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "crefy-passport")]
#[command(about = "Upload, mint and register a Crefy passport", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Account to sign with when the node manages several
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Print the final flow state as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a profile photo, mint the passport and optionally register its name
    Issue {
        /// Profile photo (PNG, JPEG or WebP)
        #[arg(short, long)]
        photo: PathBuf,
        /// Passport name, e.g. `alice` for `alice.crefy.eth`
        #[arg(short, long)]
        name: Option<String>,
        /// Upload the rendered passport card instead of the raw photo
        #[arg(long)]
        card: bool,
    },
    /// Upload a file and print its content URL
    Upload {
        /// File to upload
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Register a passport name without minting (standalone registration)
    Register {
        /// Passport name
        #[arg(short, long)]
        name: String,
    },
    /// Render the passport card to a PNG file
    Card {
        /// Profile photo shown on the card
        #[arg(short, long)]
        photo: Option<PathBuf>,
        /// Passport name shown on the card
        #[arg(short, long)]
        name: Option<String>,
        /// Output file (defaults to `<name>-passport.png`)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print where the configuration file is read from
    ConfigPath,
}
