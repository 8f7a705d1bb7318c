use dispatch::error::DispatchError;

pub mod booking;
pub mod delivery;
pub mod driver;
pub mod request;
pub mod trip;

/// `sqlx::Error::RowNotFound` is treated as permanent (the caller asked for a
/// specific row that does not exist); everything else - connection loss,
/// pool exhaustion, serialization failures - is transient and should abort
/// the round rather than fail a single cluster silently.
pub(crate) fn convert_error(why: sqlx::Error) -> DispatchError {
    match why {
        sqlx::Error::RowNotFound => DispatchError::StorePermanent(Box::new(why)),
        other => DispatchError::StoreTransient(Box::new(other)),
    }
}
