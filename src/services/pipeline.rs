use polars::prelude::*;

use crate::config::{Config, Mode};
use crate::error::AppError;
use crate::models::{LabelCounts, RunSummary};
use crate::services::columns::{require_column, ColumnSelector, NormalizeStyle};
use crate::services::excel::{ExcelProcessor, ExcelWriter};
use crate::services::sentiment::{analyze, SentimentScorer, Thresholds};

/// load → normalize → select → score → save, once, in order.
pub struct SentimentPipeline<'a> {
    config: &'a Config,
    scorer: &'a dyn SentimentScorer,
    selector: ColumnSelector,
}

impl<'a> SentimentPipeline<'a> {
    pub fn new(config: &'a Config, scorer: &'a dyn SentimentScorer) -> Self {
        Self {
            config,
            scorer,
            selector: ColumnSelector::default(),
        }
    }

    pub fn with_selector(mut self, selector: ColumnSelector) -> Self {
        self.selector = selector;
        self
    }

    fn style(&self) -> NormalizeStyle {
        match self.config.mode {
            Mode::Structured => NormalizeStyle::Basic,
            Mode::Unstructured => NormalizeStyle::Separators,
        }
    }

    pub fn run(&self) -> Result<RunSummary, AppError> {
        let start = std::time::Instant::now();
        let config = self.config;
        config.validate()?;

        let mut sheet = ExcelProcessor::new(self.style())
            .load(&config.input_path, config.sheet.as_deref())?;
        let columns = sheet.columns();
        tracing::info!("Available (normalized) columns: {:?}", columns);

        let text_column = match config.mode {
            Mode::Structured => require_column(&columns, &config.text_column, self.style())?,
            Mode::Unstructured => {
                let chosen = self.selector.select(&columns)?;
                tracing::info!("Using column for sentiment: '{}'", chosen);
                chosen
            }
        };

        tracing::info!("Computing sentiment ({})...", self.scorer.name());
        let thresholds = Thresholds {
            positive: config.positive_threshold,
            negative: config.negative_threshold,
        };
        let string_cells = sheet.string_cells.get(&text_column).map(Vec::as_slice);
        let label_counts = score_dataframe(
            &mut sheet.dataframe,
            &text_column,
            string_cells,
            self.scorer,
            &thresholds,
            &config.score_column,
            &config.label_column,
        )?;

        ExcelWriter::new(sheet.sheet_name.clone()).save(&sheet.dataframe, &config.output_path)?;
        tracing::info!(
            "Done. Results saved to {} in {:?}",
            config.output_path.display(),
            start.elapsed()
        );

        Ok(RunSummary {
            text_column,
            columns: sheet.columns(),
            row_count: sheet.row_count(),
            label_counts,
            output_path: config.output_path.clone(),
        })
    }
}

/// Adds (or replaces) the score and label columns. Rows are scored
/// independently. Only string cells are text: missing cells, non-string
/// columns, and rows masked out by `string_cells` score as the empty string.
pub fn score_dataframe(
    df: &mut DataFrame,
    text_column: &str,
    string_cells: Option<&[bool]>,
    scorer: &dyn SentimentScorer,
    thresholds: &Thresholds,
    score_column: &str,
    label_column: &str,
) -> Result<LabelCounts, AppError> {
    let column = df.column(text_column)?;
    let texts: Vec<Option<&str>> = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row_idx, value)| match string_cells {
                Some(mask) if !mask.get(row_idx).copied().unwrap_or(false) => None,
                _ => value,
            })
            .collect(),
        other => {
            tracing::warn!(
                "Column '{}' holds {} values, not text; every row scores as empty",
                text_column,
                other
            );
            vec![None; column.len()]
        }
    };

    let mut scores: Vec<f64> = Vec::with_capacity(texts.len());
    let mut labels: Vec<&'static str> = Vec::with_capacity(texts.len());
    let mut counts = LabelCounts::default();

    for (row_idx, value) in texts.into_iter().enumerate() {
        let (score, label) = analyze(scorer, thresholds, value).map_err(|e| {
            tracing::error!("Scoring failed at row {}: {}", row_idx + 1, e);
            e
        })?;
        scores.push(score);
        labels.push(label.as_str());
        counts.record(label);
    }
    tracing::debug!("Scored {} rows from '{}'", scores.len(), text_column);

    df.with_column(Series::new(score_column, scores))?;
    df.with_column(Series::new(label_column, labels))?;
    Ok(counts)
}
