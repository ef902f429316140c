//! tlvdict CLI
//!
//! Inspect and edit a dictionary image file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tlvdict::{Config, Dictionary, FileMedium};
use tracing_subscriber::{fmt, EnvFilter};

/// tlvdict CLI
#[derive(Parser, Debug)]
#[command(name = "tlvdict-cli")]
#[command(about = "Inspect and edit tlvdict image files")]
#[command(version)]
struct Args {
    /// Image file (created and erased if missing)
    #[arg(short, long, default_value = "./eeprom.bin")]
    image: PathBuf,

    /// Image size in bytes
    #[arg(short, long, default_value = "4096")]
    capacity: usize,

    /// Expected format version; a mismatching image is reset
    #[arg(short = 'v', long, default_value = "1")]
    format_version: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value stored under a tag
    Get {
        /// The tag to read
        tag: String,
    },

    /// Store a string value (with trailing terminator)
    Set {
        /// The tag to write
        tag: String,

        /// The value to store
        value: String,
    },

    /// Delete a tag
    Del {
        /// The tag to delete
        tag: String,
    },

    /// List all tags with their sizes
    List,

    /// Show space usage and checksum
    Info,

    /// Erase all entries
    Reset,
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,tlvdict=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> tlvdict::Result<()> {
    let config = Config::builder()
        .capacity(args.capacity)
        .version(args.format_version)
        .build();
    config.validate()?;

    let medium = FileMedium::open(&args.image, config.capacity)?;
    let mut dict = Dictionary::open(medium, config)?;

    if !dict.load_outcome().is_valid() {
        tracing::info!("image {} was (re)initialized: {:?}", args.image.display(), dict.load_outcome());
    }

    match args.command {
        Commands::Get { tag } => match dict.get_vec(&tag) {
            Some(data) => println!("{}", render(&data)),
            None => {
                eprintln!("{}: not found", tag);
                process::exit(2);
            }
        },
        Commands::Set { tag, value } => {
            dict.set_str(&tag, &value)?;
            println!("OK");
        }
        Commands::Del { tag } => {
            if dict.remove(&tag)? {
                println!("OK");
            } else {
                eprintln!("{}: not found", tag);
                process::exit(2);
            }
        }
        Commands::List => {
            for entry in dict.iter() {
                println!(
                    "{:>6}  {:>3}  {}  {}",
                    entry.offset,
                    entry.data.len(),
                    String::from_utf8_lossy(entry.tag),
                    render(entry.data)
                );
            }
        }
        Commands::Info => {
            let used = dict.used();
            let crc = crc32fast::hash(&dict.data()[..used]);
            println!("version:   {}", dict.version());
            println!("entries:   {}", dict.len());
            println!("used:      {}", used);
            println!("remaining: {}", dict.remaining());
            println!("capacity:  {}", dict.capacity());
            println!("crc32:     {:08x}", crc);
        }
        Commands::Reset => {
            dict.reset()?;
            println!("OK");
        }
    }

    Ok(())
}

/// Text values print as text (minus the terminator), anything else as hex
fn render(data: &[u8]) -> String {
    let text = data.strip_suffix(&[0]).unwrap_or(data);
    match std::str::from_utf8(text) {
        Ok(s) if !s.chars().any(char::is_control) => s.to_string(),
        _ => data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "),
    }
}
