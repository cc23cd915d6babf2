use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepperError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Step {step} is out of range, expected 1..={total}")]
    StepOutOfRange { step: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
