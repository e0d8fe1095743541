use thiserror::Error;

pub mod lock;
pub mod project;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading snapshot toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid dependency coordinate `{0}`, expected group:artifact:version")]
    InvalidCoordinate(String),
    #[error("Module `{0}` is declared more than once")]
    DuplicateModule(String),
    #[error("Configuration `{1}` is declared more than once in module `{0}`")]
    DuplicateConfiguration(String, String),
}
