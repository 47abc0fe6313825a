use std::fmt::Formatter;

#[derive(Debug)]
pub enum MetricsError {
    FormatError(std::fmt::Error),
    IoError(std::io::Error),
    ParseError(ttf_parser::FaceParsingError),
    /// A table the extraction cannot do without, e.g. `cmap` or `hmtx`.
    MissingTable(&'static str),
    /// The font produced no usable character records at all.
    NoGlyphs,
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            MetricsError::FormatError(e) => write!(f, "Formating error: {}", e),
            MetricsError::IoError(e) => write!(f, "IO error: {}", e),
            MetricsError::ParseError(e) => write!(f, "Font parsing error: {}", e),
            MetricsError::MissingTable(tag) => write!(f, "Font has no usable '{}' table", tag),
            MetricsError::NoGlyphs => write!(f, "Font yielded no usable character metrics"),
        }
    }
}

impl std::error::Error for MetricsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MetricsError::FormatError(e) => Some(e),
            MetricsError::IoError(e) => Some(e),
            MetricsError::ParseError(e) => Some(e),
            MetricsError::MissingTable(_) | MetricsError::NoGlyphs => None,
        }
    }
}

impl From<std::fmt::Error> for MetricsError {
    fn from(e: std::fmt::Error) -> Self {
        MetricsError::FormatError(e)
    }
}

impl From<std::io::Error> for MetricsError {
    fn from(e: std::io::Error) -> Self {
        MetricsError::IoError(e)
    }
}

impl From<ttf_parser::FaceParsingError> for MetricsError {
    fn from(e: ttf_parser::FaceParsingError) -> Self {
        MetricsError::ParseError(e)
    }
}
