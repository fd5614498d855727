use tripboard_core::{CoreError, PointId};
use tripboard_remote::RemoteError;

/// Errors from [`PointsStore`](crate::store::PointsStore) commands.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend call failed. Local state is untouched.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The command targeted a point that is not in the local collection.
    #[error("Point {0} is not in the local collection")]
    NotFound(PointId),
}

/// Errors surfaced by [`BoardController`](crate::board::BoardController).
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A draft failed validation, or a domain rule was broken.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No item for point {0}")]
    UnknownItem(PointId),

    #[error("Point {0} is not being edited")]
    NotEditing(PointId),

    #[error("A command is already pending for this form")]
    Busy,

    #[error("The new point form is not open")]
    NoOverlay,
}

/// Convenience type alias for board results.
pub type BoardResult<T> = Result<T, BoardError>;
