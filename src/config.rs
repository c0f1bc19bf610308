use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.05;
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.05;
pub const DEFAULT_SCORE_COLUMN: &str = "sentiment_score";
pub const DEFAULT_LABEL_COLUMN: &str = "sentiment_label";

/// How the free-text column is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A fixed, pre-known column name must exist.
    Structured,
    /// The column is picked by the alias/keyword heuristic.
    Unstructured,
}

impl std::str::FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" => Ok(Mode::Structured),
            "unstructured" => Ok(Mode::Unstructured),
            other => Err(AppError::Config(format!(
                "unknown mode '{}', expected 'structured' or 'unstructured'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Worksheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    pub mode: Mode,
    /// Target column for structured mode, matched after normalization.
    pub text_column: String,
    pub positive_threshold: f64,
    pub negative_threshold: f64,
    pub score_column: String,
    pub label_column: String,
}

/// Overrides read from a YAML file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    sheet: Option<String>,
    mode: Option<Mode>,
    text_column: Option<String>,
    positive_threshold: Option<f64>,
    negative_threshold: Option<f64>,
    score_column: Option<String>,
    label_column: Option<String>,
}

impl Config {
    /// Defaults matching the survey spreadsheet and the review export.
    pub fn for_mode(mode: Mode) -> Self {
        let (input, output) = match mode {
            Mode::Structured => ("master.xlsx", "survey_with_sentiment.xlsx"),
            Mode::Unstructured => (
                "fb_reviews_translated(final).xlsx",
                "fb_reviews_with_sentiment.xlsx",
            ),
        };

        Config {
            input_path: PathBuf::from(input),
            output_path: PathBuf::from(output),
            sheet: None,
            mode,
            text_column: "FeedbackDescription".to_string(),
            positive_threshold: DEFAULT_POSITIVE_THRESHOLD,
            negative_threshold: DEFAULT_NEGATIVE_THRESHOLD,
            score_column: DEFAULT_SCORE_COLUMN.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }

    /// Builds the run configuration from `.env`, an optional YAML file named by
    /// `SENTIMENT_CONFIG`, and `SENTIMENT_*` environment overrides, in that order.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(None)
    }

    /// Like [`Config::load`], reading the given dotenv file instead of
    /// searching for `.env`. Variables already set in the environment win.
    pub fn load_from(env_file: Option<&Path>) -> Result<Self, AppError> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| {
                    AppError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
            }
            None => {
                dotenv().ok();
            }
        }

        let file = match std::env::var("SENTIMENT_CONFIG") {
            Ok(path) => Some(read_config_file(Path::new(&path))?),
            Err(_) => None,
        };

        let mode = match std::env::var("SENTIMENT_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => file.as_ref().and_then(|f| f.mode).unwrap_or(Mode::Unstructured),
        };

        let mut config = Config::for_mode(mode);
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.mode = mode;

        if let Ok(input) = std::env::var("SENTIMENT_INPUT") {
            config.input_path = PathBuf::from(input);
        }
        if let Ok(output) = std::env::var("SENTIMENT_OUTPUT") {
            config.output_path = PathBuf::from(output);
        }
        if let Ok(sheet) = std::env::var("SENTIMENT_SHEET") {
            config.sheet = Some(sheet);
        }
        if let Ok(column) = std::env::var("SENTIMENT_TEXT_COLUMN") {
            config.text_column = column;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses YAML overrides on top of the defaults for the mode they name.
    pub fn from_yaml(yaml: &str) -> Result<Self, AppError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        let mut config = Config::for_mode(file.mode.unwrap_or(Mode::Unstructured));
        config.apply_file(file);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(v) = file.input_path {
            self.input_path = v;
        }
        if let Some(v) = file.output_path {
            self.output_path = v;
        }
        if file.sheet.is_some() {
            self.sheet = file.sheet;
        }
        if let Some(v) = file.mode {
            self.mode = v;
        }
        if let Some(v) = file.text_column {
            self.text_column = v;
        }
        if let Some(v) = file.positive_threshold {
            self.positive_threshold = v;
        }
        if let Some(v) = file.negative_threshold {
            self.negative_threshold = v;
        }
        if let Some(v) = file.score_column {
            self.score_column = v;
        }
        if let Some(v) = file.label_column {
            self.label_column = v;
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.negative_threshold < self.positive_threshold) {
            return Err(AppError::Config(format!(
                "negative threshold {} must be below positive threshold {}",
                self.negative_threshold, self.positive_threshold
            )));
        }
        if self.input_path == self.output_path {
            return Err(AppError::Config(format!(
                "output path {} would overwrite the input",
                self.output_path.display()
            )));
        }
        if self.score_column.trim().is_empty() || self.label_column.trim().is_empty() {
            return Err(AppError::Config("output column names must not be empty".to_string()));
        }
        if self.score_column == self.label_column {
            return Err(AppError::Config(format!(
                "score and label columns are both named '{}'",
                self.score_column
            )));
        }
        if self.mode == Mode::Structured && self.text_column.trim().is_empty() {
            return Err(AppError::Config("structured mode needs a text column".to_string()));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(serde_yaml::from_str(&raw)?)
}
