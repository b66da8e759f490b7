use std::io;
use std::path::{Path, PathBuf};
use tracing::{Subscriber, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "build_trigger";

/// Daily rolling log files under a directory, in addition to console output
pub struct FileLogger {
    log_directory: PathBuf,
    rotation: Rotation,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf) -> Self {
        Self {
            log_directory,
            rotation: Rotation::DAILY,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Create the log directory and a non-blocking writer into it.
    ///
    /// The returned guard flushes pending lines when dropped, so keep it alive until exit.
    pub fn setup_file_logging(&self) -> io::Result<(NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.log_directory)?;

        let file_appender =
            RollingFileAppender::new(self.rotation.clone(), &self.log_directory, LOG_FILE_PREFIX);

        Ok(tracing_appender::non_blocking(file_appender))
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// A subscriber that is built but not yet installed
pub struct Logging<S> {
    pub subscriber: S,
    /// Flushes the file writer when dropped; `None` when logging to console only.
    pub guard: Option<WorkerGuard>,
    /// Set when a log directory was requested but could not be created.
    pub file_error: Option<(PathBuf, io::Error)>,
}

/// Build the subscriber: console output through `console`, plus a file layer when
/// `log_dir` is given and can be created.
pub fn build_subscriber<W>(
    log_dir: Option<PathBuf>,
    console: W,
) -> Logging<impl Subscriber + Send + Sync + 'static>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let mut file_error = None;
    let file_writer = log_dir.and_then(|dir| match FileLogger::new(dir.clone()).setup_file_logging() {
        Ok(writer) => Some(writer),
        Err(e) => {
            file_error = Some((dir, e));
            None
        }
    });

    let (file_layer, guard) = match file_writer {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false), // Disable ANSI colors for file logs
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(console)) // Console output
        .with(file_layer);

    Logging {
        subscriber,
        guard,
        file_error,
    }
}

fn log_file_fallback(dir: &Path, e: &io::Error) {
    warn!("Could not create log directory {:?}, logging to console only: {}", dir, e);
}

/// Install the global subscriber, logging to stdout and optionally to `log_dir`.
///
/// Returns the file writer's guard, if any.
pub fn setup_logging(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let Logging {
        subscriber,
        guard,
        file_error,
    } = build_subscriber(log_dir, io::stdout);
    subscriber.init();
    if let Some((dir, e)) = file_error {
        log_file_fallback(&dir, &e);
    }
    guard
}
