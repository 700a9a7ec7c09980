//! Runtime configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dnd_sheet_core::roll::EngineConfig;

/// Ceiling for either animation delay setting.
pub const MAX_TICK_MS: u64 = 1_000;

/// Settings for one run of the sheet.
#[derive(Clone, Debug)]
pub struct SheetConfig {
    /// Directory holding character files.
    pub data_dir: PathBuf,
    /// Directory the log file is written to.
    pub log_dir: PathBuf,
    pub engine: EngineConfig,
    /// Longest the UI waits for input before checking for due ticks.
    pub poll_interval: Duration,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("characters"),
            log_dir: default_log_dir(),
            engine: EngineConfig::default(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl SheetConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DND_SHEET_DATA_DIR` - Character directory (default: `./characters`)
    /// - `DND_SHEET_LOG_DIR` - Log directory (default: platform cache dir)
    /// - `DND_SHEET_TICK_BASE_MS` - Delay before the first animation frame (default: 35, at most 1000)
    /// - `DND_SHEET_TICK_STEP_MS` - Extra delay per frame (default: 15, at most 1000)
    /// - `DND_SHEET_SEED` - Fixed seed for reproducible rolls
    /// - `DND_SHEET_POLL_MS` - Input poll ceiling (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = read_env::<PathBuf>("DND_SHEET_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Some(dir) = read_env::<PathBuf>("DND_SHEET_LOG_DIR") {
            config.log_dir = dir;
        }
        if let Some(ms) = read_env::<u64>("DND_SHEET_TICK_BASE_MS") {
            config.engine.tick_base = tick_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("DND_SHEET_TICK_STEP_MS") {
            config.engine.tick_step = tick_millis(ms);
        }
        if let Some(seed) = read_env::<u64>("DND_SHEET_SEED") {
            config.engine.seed = Some(seed);
        }
        if let Some(ms) = read_env::<u64>("DND_SHEET_POLL_MS") {
            config.poll_interval = Duration::from_millis(ms.max(1));
        }

        config
    }
}

fn tick_millis(ms: u64) -> Duration {
    Duration::from_millis(ms.min(MAX_TICK_MS))
}

/// Platform-specific log directory.
fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Caches/dnd-sheet/logs");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_cache) = env::var_os("XDG_CACHE_HOME") {
            return PathBuf::from(xdg_cache).join("dnd-sheet/logs");
        } else if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(".cache/dnd-sheet/logs");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(local_appdata) = env::var_os("LOCALAPPDATA") {
            return PathBuf::from(local_appdata).join("dnd-sheet").join("logs");
        }
    }

    env::temp_dir().join("dnd-sheet").join("logs")
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
