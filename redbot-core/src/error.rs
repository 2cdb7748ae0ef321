use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RedbotError>;
