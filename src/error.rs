use std::fmt;

#[derive(Debug)]
pub enum PrintPrepError {
    LabelNotFound(String),
    InvalidSelector(String),
    InvalidStyle(String),
    InvalidConfiguration(String),
    Io(std::io::Error),
}

impl fmt::Display for PrintPrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintPrepError::LabelNotFound(selector) => {
                write!(f, "name label not found for selector {}", selector)
            }
            PrintPrepError::InvalidSelector(selector) => {
                write!(f, "invalid selector: {}", selector)
            }
            PrintPrepError::InvalidStyle(message) => {
                write!(f, "invalid inline style: {}", message)
            }
            PrintPrepError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            PrintPrepError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for PrintPrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrintPrepError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PrintPrepError {
    fn from(value: std::io::Error) -> Self {
        PrintPrepError::Io(value)
    }
}
