//! Scores the free-text column of a spreadsheet with VADER and writes the
//! sheet back with `sentiment_score` and `sentiment_label` columns.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::{Config, Mode};
pub use error::AppError;
pub use models::{LabelCounts, RunSummary, SentimentLabel};
pub use services::pipeline::SentimentPipeline;
pub use services::sentiment::{SentimentScorer, VaderScorer};
