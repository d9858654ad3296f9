use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClinoteError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Store is locked by another process: {0}")]
    StoreLocked(String),

    #[error("Corrupt record {bucket}/{key}: {reason}")]
    CorruptRecord {
        bucket: String,
        key: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no matching credential found")]
    NoMatchingCredentialFound,

    #[error("index negative")]
    NegativeIndex,

    #[error("index greater than the list")]
    IndexTooBig,

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("no notebook found")]
    NoNotebookFound,

    #[error("no note found")]
    NoNoteFound,

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Malformed note content: {0}")]
    Markup(String),

    #[error("no note to recover")]
    NoRecoveryPoint,

    #[error("no editor found")]
    NoEditorFound,

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("saving the note failed ({save}) and so did saving the recovery point ({recovery})")]
    RecoveryFailed {
        save: Box<ClinoteError>,
        recovery: Box<ClinoteError>,
    },
}

impl ClinoteError {
    /// Not-found conditions are reported to the user, never treated as fatal.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoMatchingCredentialFound
                | Self::NegativeIndex
                | Self::IndexTooBig
                | Self::IndexOutOfRange
                | Self::NoNotebookFound
                | Self::NoNoteFound
                | Self::NoRecoveryPoint
        )
    }
}

pub type Result<T> = std::result::Result<T, ClinoteError>;
