use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default level: everything in debug builds, Info and above in release.
pub fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Writes log lines to stdout.
pub struct StdoutLogger {
    level: LevelFilter,
}

impl StdoutLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{}", format_record(record));
        }
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

/// Writes log lines to `<dir>/YYYY-MM-DD.log`, switching files when the UTC
/// date changes.
pub struct FileLogger {
    level: LevelFilter,
    state: Mutex<FileLoggerState>,
}

struct FileLoggerState {
    dir: PathBuf,
    current_date: String,
    file: File,
}

fn open_day_file(dir: &Path, date: &str) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(format!("{date}.log")))
}

impl FileLogger {
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        Self::with_level(dir, default_level())
    }

    pub fn with_level(dir: impl Into<PathBuf>, level: LevelFilter) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let current_date = format_today();
        let file = open_day_file(&dir, &current_date)?;

        Ok(FileLogger {
            level,
            state: Mutex::new(FileLoggerState {
                dir,
                current_date,
                file,
            }),
        })
    }
}

impl FileLoggerState {
    fn roll_over_if_needed(&mut self) {
        let today = format_today();
        if today == self.current_date {
            return;
        }
        match open_day_file(&self.dir, &today) {
            Ok(file) => {
                self.file = file;
                self.current_date = today;
            }
            // keep writing to the previous day's file
            Err(e) => eprintln!("failed to open log file for {today}: {e}"),
        }
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_record(record);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.roll_over_if_needed();

        if let Err(e) = writeln!(state.file, "{line}") {
            eprintln!("failed to write log file: {e}");
            eprintln!("{line}");
        }
    }

    fn flush(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.file.flush().ok();
    }
}

/// `TIMESTAMP [LEVEL] [thread:ID] file:line - message`
pub fn format_record(record: &Record) -> String {
    format!(
        "{} [{}] [thread:{:?}] {}:{} - {}",
        format_timestamp(),
        record.level(),
        std::thread::current().id(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS`.
pub fn format_timestamp() -> String {
    let secs = unix_secs();
    let (year, month, day) = civil_from_days((secs / 86400) as i64);
    let tod = secs % 86400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year,
        month,
        day,
        tod / 3600,
        (tod % 3600) / 60,
        tod % 60
    )
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn format_today() -> String {
    let (year, month, day) = civil_from_days((unix_secs() / 86400) as i64);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

// Howard Hinnant's days-to-civil algorithm.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Install a [`StdoutLogger`] as the global logger.
///
/// Only the first call per process takes effect.
pub fn init_stdout_logger() {
    static DEBUG_LOGGER: StdoutLogger = StdoutLogger::new(LevelFilter::Debug);
    static RELEASE_LOGGER: StdoutLogger = StdoutLogger::new(LevelFilter::Info);

    let logger = if cfg!(debug_assertions) {
        &DEBUG_LOGGER
    } else {
        &RELEASE_LOGGER
    };

    if log::set_logger(logger).is_ok() {
        log::set_max_level(default_level());
    }
}

/// Install a [`FileLogger`] writing into `dir` as the global logger.
///
/// Fails if the directory cannot be created. Only the first successful
/// install per process takes effect.
pub fn init_file_logger(dir: impl Into<PathBuf>) -> std::io::Result<()> {
    let logger = FileLogger::new(dir)?;

    // set_logger needs a 'static reference; this runs once at startup.
    if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
        log::set_max_level(default_level());
    }

    Ok(())
}

/// Log at error level, flush stdout and exit the process with status 1.
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
        {
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
        std::process::exit(1);
    }};
}
