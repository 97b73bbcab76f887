use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("element file read error ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {0}: {1}")]
    Line(usize, String),
}

impl ParseError {
    /// 1-based line index of the offending record line, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Io { .. } => None,
            ParseError::Line(line, _) => Some(*line),
        }
    }
}
