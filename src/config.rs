use std::str::FromStr;
use std::time::Duration;

use crate::ink::Point;

pub const DEFAULT_RECOGNIZER_URL: &str = "https://inputtools.google.com/request";
pub const DEFAULT_ITC: &str = "ko-t-i0-handwrit";
pub const DEFAULT_APP: &str = "mobilesearch";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    pub url: String,
    /// Input tool code, selects the recognition model.
    pub itc: String,
    pub app: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub recognizer: RecognizerConfig,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Screen position of the surface's top-left corner.
    pub surface_origin: Point,
}

impl Config {
    /// Reads `HANGUL_QUIZ_*` variables. Call `dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            recognizer: RecognizerConfig {
                url: text("HANGUL_QUIZ_RECOGNIZER_URL", DEFAULT_RECOGNIZER_URL),
                itc: text("HANGUL_QUIZ_ITC", DEFAULT_ITC),
                app: text("HANGUL_QUIZ_APP", DEFAULT_APP),
                timeout: Duration::from_secs(parsed(&lookup, "HANGUL_QUIZ_TIMEOUT_SECS", 15)?),
            },
            canvas_width: parsed(&lookup, "HANGUL_QUIZ_CANVAS_WIDTH", 300)?,
            canvas_height: parsed(&lookup, "HANGUL_QUIZ_CANVAS_HEIGHT", 150)?,
            surface_origin: Point::new(
                parsed(&lookup, "HANGUL_QUIZ_SURFACE_LEFT", 0.0)?,
                parsed(&lookup, "HANGUL_QUIZ_SURFACE_TOP", 0.0)?,
            ),
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
