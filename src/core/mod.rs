//! Core pace bias logic: corner parsing, classification, windowing, labeling and scoring

pub mod analyzer;
pub mod classifier;
pub mod corners;
pub mod labeler;
pub mod scorer;
pub mod window;

// Re-export commonly used types
pub use analyzer::{AnalyzerConfig, PaceBiasAnalyzer, RaceBiasReport};
pub use classifier::classify_run;
pub use labeler::label_horse;
pub use scorer::{
    score_field, score_labels, BiasState, LabelCounts, RaceBiasScore, NO_BIAS_THRESHOLD,
    NO_SIGNAL_SCORE,
};
pub use window::{
    select_window, window_from_records, HistoryWindow, WindowConfig, HISTORY_FETCH_LIMIT,
    QUALIFYING_RUN_LIMIT,
};
