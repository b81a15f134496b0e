use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    /// The request is malformed; the build never starts.
    #[error("invalid build request: {0}")]
    Validation(String),

    #[error(
        "table regions overlap: [{first_start}, {first_end}] and [{second_start}, {second_end}]"
    )]
    OverlappingTableRegions {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error(
        "table region [{start_index}, {end_index}] needs {needed} cells but a {num_rows}x{num_columns} grid holds only {capacity}"
    )]
    TableRegionTooSmall {
        start_index: usize,
        end_index: usize,
        num_rows: usize,
        num_columns: usize,
        needed: usize,
        capacity: usize,
    },

    #[error("no content block at index {index}")]
    MalformedContent { index: usize },

    #[error("picture '{0}' not found")]
    PictureNotFound(String),

    #[error("'{0}' is not a supported picture type")]
    UnsupportedPictureType(String),

    #[error("failed to build document: {context}")]
    DocumentBuild {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub(crate) fn build(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::DocumentBuild {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::build("I/O failure", e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::build("package error", e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::build("picture could not be decoded", e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::build("malformed XML part", e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Validation(e.to_string())
    }
}
