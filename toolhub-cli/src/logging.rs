//! Tracing setup for the CLI
//!
//! `RUST_LOG` takes precedence over the verbosity flags. A server talking MCP
//! over stdio cannot log to stdout, so in that mode logs go to a file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the MCP log file inside `~/.toolhub`
pub const LOG_FILE_ENV: &str = "TOOLHUB_LOG_FILE";

const LOG_DIR: &str = ".toolhub";
const DEFAULT_LOG_FILE: &str = "mcp.log";

/// Writer that flushes and syncs the shared log file after every write
///
/// Log lines must be on disk when an MCP client kills the server.
pub struct FileWriterGuard {
    file: Arc<Mutex<File>>,
}

impl FileWriterGuard {
    /// Wrap a shared log file
    pub fn new(file: Arc<Mutex<File>>) -> Self {
        Self { file }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file mutex poisoned"))
    }
}

impl io::Write for FileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.lock()?;
        let written = file.write(buf)?;
        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.lock()?;
        file.flush()?;
        file.sync_all()
    }
}

/// Level selected by the verbosity flags; `quiet` wins over the others
pub fn log_level(verbose: bool, debug: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Filter from `RUST_LOG`, falling back to `level`
pub fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()))
}

/// Location of the MCP log file
pub fn mcp_log_path() -> PathBuf {
    let log_dir = dirs::home_dir()
        .map(|home| home.join(LOG_DIR))
        .unwrap_or_else(|| PathBuf::from(LOG_DIR));
    let file_name = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    log_dir.join(file_name)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber
///
/// With `mcp_mode` set, logs go to [`mcp_log_path`] at debug level unless
/// `RUST_LOG` says otherwise; stderr is the fallback when the file cannot be
/// opened.
pub fn init(level: Level, mcp_mode: bool) {
    if mcp_mode {
        let path = mcp_log_path();
        match open_log_file(&path) {
            Ok(file) => {
                let shared = Arc::new(Mutex::new(file));
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter(Level::DEBUG.max(level)))
                    .with_writer(move || FileWriterGuard::new(shared.clone()))
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => {
                eprintln!("Failed to open log file {}, using stderr: {}", path.display(), e);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(io::stderr)
        .init();
}
