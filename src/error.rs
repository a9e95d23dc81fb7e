use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Every fallible [`Led4`](crate::Led4) operation validates its inputs before touching
/// hardware or the published frame, so an `Err` means nothing changed (the one
/// exception being [`Led4::set_float`](crate::Led4::set_float), which still shows `Err `).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[display("Required input is missing")]
    NullPointer,

    #[display("Pin number is outside the valid GPIO range")]
    InvalidPin,

    #[display("Invalid argument")]
    InvalidArgument,

    #[display("Display has not been started with begin()")]
    NotInitialized,

    #[display("Periodic timer could not be armed")]
    TimerInitFailed,

    #[cfg(feature = "pico1")]
    #[display("Embassy task could not be spawned")]
    TaskSpawn,
}

#[cfg(feature = "pico1")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(_: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn
    }
}
