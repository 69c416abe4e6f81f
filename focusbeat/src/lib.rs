//! FocusBeat: a focus/break interval timer that stays correct across suspension.

pub mod app;
pub mod clock;
pub mod companion;
pub mod config;
pub mod error;
pub mod ipc;
pub mod lifecycle;
pub mod notify;
pub mod persistence;
pub mod session;
pub mod settings;
