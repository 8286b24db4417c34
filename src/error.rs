use thiserror::Error;

/// Unified error taxonomy for the storage-format reader and query evaluator.
///
/// Every fatal condition the engine can hit maps to exactly one of these
/// variants, whose `Display` impl is the single descriptive line the CLI
/// prints before exiting non-zero.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed database header: page size {0} is not a valid power of two")]
    MalformedHeader(u32),

    #[error("unknown page kind {0:#04x} at page {1}")]
    UnknownPageKind(u8, u32),

    #[error("unsupported page kind {0:#04x}: index b-trees are not supported")]
    UnsupportedPageKind(u8),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("no such table: {0}")]
    TableNotFound(String),

    #[error("no such column: {0}")]
    UnknownColumn(String),

    #[error("syntax error: {0}")]
    SyntaxError(String),

    #[error("keyword '{0}' cannot be used as an identifier")]
    KeywordAsIdentifier(String),
}

pub type DbResult<T> = Result<T, DbError>;
