//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rsi::{Config, DEFAULT_CACHE_DIRECTORY, EntityId};

#[derive(Parser, Debug)]
#[command(
    name = "rsi-browser",
    version,
    about = "Browse the RSI ship catalog and import ship holograms"
)]
pub struct Args {
    /// Directory used to cache ship details, thumbnails and models.
    #[arg(long, env = "RSI_CACHE_DIR", default_value = DEFAULT_CACHE_DIRECTORY, global = true)]
    pub cache_dir: PathBuf,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, env = "RSI_DEBUG", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Client configuration selected by these arguments.
    #[must_use]
    pub fn config(&self) -> Config {
        Config::default()
            .with_cache_directory(&self.cache_dir)
            .with_debug_logging(self.debug)
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Search ships by name.
    Search {
        /// Name or part of a name.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Also download the thumbnail of every hit.
        #[arg(long)]
        thumbnails: bool,
    },
    /// Show the details of a ship.
    Info {
        /// Ship id.
        id: EntityId,
    },
    /// Download a ship's thumbnail and print its path.
    Thumbnail {
        /// Ship id.
        id: EntityId,
    },
    /// Download a ship's hologram and print its path.
    Model {
        /// Ship id.
        id: EntityId,
    },
    /// Download and decode a ship's hologram.
    Import {
        /// Ship id.
        id: EntityId,

        /// Write the decoded mesh as Wavefront OBJ.
        #[arg(long, value_name = "PATH")]
        obj: Option<PathBuf>,
    },
    /// Decode a local OpenCTM file.
    Decode {
        /// Path to the `.ctm` file.
        file: PathBuf,

        /// Keep the file's own axes instead of converting to Z up.
        #[arg(long)]
        source_axes: bool,

        /// Write the decoded mesh as Wavefront OBJ.
        #[arg(long, value_name = "PATH")]
        obj: Option<PathBuf>,
    },
    /// Delete the cache directory.
    ClearCache,
    /// Interactive session reading commands from stdin.
    Browse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("rsi-browser").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_search_joins_words() {
        let args = parse(&["search", "star", "runner", "--thumbnails"]);
        assert_eq!(
            args.command,
            Command::Search {
                query: vec!["star".into(), "runner".into()],
                thumbnails: true
            }
        );
    }

    #[test]
    fn test_global_options() {
        let args = parse(&["info", "116", "--cache-dir", "/tmp/rsi", "--debug"]);
        assert_eq!(
            args.command,
            Command::Info {
                id: EntityId::new("116").unwrap()
            }
        );
        let config = args.config();
        assert_eq!(config.cache_directory, PathBuf::from("/tmp/rsi"));
        assert!(config.debug_logging);
    }

    #[test]
    fn test_import_with_obj() {
        let args = parse(&["import", "7", "--obj", "out/aurora.obj"]);
        assert_eq!(
            args.command,
            Command::Import {
                id: EntityId::new("7").unwrap(),
                obj: Some(PathBuf::from("out/aurora.obj"))
            }
        );
    }

    #[test]
    fn test_rejects_path_like_id() {
        let result = Args::try_parse_from(["rsi-browser", "model", "../etc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Args::try_parse_from(["rsi-browser", "search"]).is_err());
    }
}
