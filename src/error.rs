use std::fmt;

#[derive(Debug)]
pub enum PlacardError {
    /// Top margin plus footer strip leave no vertical budget for content.
    DegenerateCanvas(String),
    /// No usable font could be registered for a required role.
    MissingFontAsset(String),
    /// Content violates the caller contract (e.g. empty header title).
    MalformedContent(String),
    InvalidConfiguration(String),
    Asset(String),
    Io(std::io::Error),
}

impl fmt::Display for PlacardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacardError::DegenerateCanvas(message) => {
                write!(f, "degenerate canvas: {}", message)
            }
            PlacardError::MissingFontAsset(message) => {
                write!(f, "missing font asset: {}", message)
            }
            PlacardError::MalformedContent(message) => {
                write!(f, "malformed content: {}", message)
            }
            PlacardError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            PlacardError::Asset(message) => write!(f, "asset error: {}", message),
            PlacardError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for PlacardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacardError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlacardError {
    fn from(value: std::io::Error) -> Self {
        PlacardError::Io(value)
    }
}
