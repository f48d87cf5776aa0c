use env_logger::Target;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const LOG_DIR_ENV: &str = "ENQUIRY_LOG_DIR";
pub const LOG_FILE_NAME: &str = "enquiry.log";

/// Initialise `env_logger` at `info` (overridable with `RUST_LOG`).
///
/// With `to_file`, logs go to `$ENQUIRY_LOG_DIR/enquiry.log` (default: the
/// system temp dir) so a full-screen terminal UI is not overwritten. If the
/// file cannot be opened, fall back to stderr.
pub fn init(to_file: bool) {
    let target = if to_file {
        open_log_file().unwrap_or(Target::Stderr)
    } else {
        Target::Stderr
    };

    // A second init (tests, embedding) keeps the first logger.
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(target)
        .try_init();
}

pub fn log_file_path() -> PathBuf {
    env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join(LOG_FILE_NAME)
}

fn open_log_file() -> io::Result<Target> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Target::Pipe(Box::new(file)))
}
