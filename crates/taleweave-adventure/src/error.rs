use taleweave_protocol::AdventureId;

/// Errors raised by the adventure catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No adventure with this id exists in the catalog.
    #[error("adventure {0} not found")]
    AdventureNotFound(AdventureId),

    /// A round index is outside the adventure's round list.
    #[error("adventure {adventure} has no round {round_index}")]
    RoundOutOfRange {
        adventure: AdventureId,
        round_index: usize,
    },

    /// A choice index is outside the round's choice list.
    #[error(
        "choice {choice_index} out of range for round {round_index} of {adventure}"
    )]
    ChoiceOutOfRange {
        adventure: AdventureId,
        round_index: usize,
        choice_index: usize,
    },

    /// Reading the catalog file failed.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file was not valid JSON of the expected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A loaded adventure violated a structural invariant.
    #[error("invalid adventure {adventure}: {reason}")]
    InvalidAdventure {
        adventure: AdventureId,
        reason: String,
    },
}
