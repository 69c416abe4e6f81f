use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("no async runtime available to schedule the notification")]
    NoRuntime,

    #[error("fire time is too far in the future")]
    OutOfRange,
}
