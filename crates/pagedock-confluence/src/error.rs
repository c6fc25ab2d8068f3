//! Error types for the Confluence import pipeline.

/// Error during archive extraction.
///
/// All variants are fatal for the import as a whole: a corrupt or unsafe
/// archive is never partially extracted.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ArchiveError {
    /// The ZIP file could not be read or is corrupt.
    #[error("corrupt archive")]
    Corrupt(#[from] zip::result::ZipError),

    /// An entry would resolve outside the extraction root (Zip Slip).
    #[error("unsafe path in archive entry: {entry}")]
    UnsafePath {
        /// Raw entry name as stored in the archive.
        entry: String,
    },

    /// I/O failure while creating the scratch directory or writing entries.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Error while parsing storage-format markup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parse error")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error during XML parsing.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// Neither the strict nor the lenient pass produced usable content.
    #[error("no usable content in fragment")]
    NoContent,
}

/// Error from Confluence REST API operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Unrecognized authentication scheme tag in configuration.
    #[error("unknown auth scheme: {0}")]
    UnknownAuthScheme(String),

    /// The requested attachment does not exist on the page.
    #[error("attachment not found: {filename}")]
    AttachmentNotFound {
        /// Requested attachment filename.
        filename: String,
    },
}

/// Error from a whole import run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Archive extraction failed; the import is aborted.
    #[error("archive extraction failed")]
    Archive(#[from] ArchiveError),

    /// REST API failure that prevented the run from continuing.
    #[error("Confluence API error")]
    Api(#[from] ApiError),

    /// The import was cancelled via its cancellation token.
    #[error("import cancelled")]
    Cancelled,
}
