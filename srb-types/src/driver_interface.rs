use std::{fmt::Debug, ops::Deref, sync::Arc, time::Duration};

use thiserror::Error;

use crate::event::SpaceMouseState;

/**
 * The connection from a driver back to the device adapter
 */
#[derive(Debug, Clone)]
pub struct ListenerHandle(pub Arc<dyn DeviceListener>);

impl Deref for ListenerHandle {
    type Target = dyn DeviceListener;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Device Not Found")]
    NotFound,
    #[error("Device Disconnected")]
    Disconnected,
    #[error("Device IO Error `{0}`")]
    Io(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(err.to_string())
    }
}

/**
 * Receives device events
 *
 * Drivers call these synchronously from inside [`SpaceMouseDriver::read`], in the
 * order the hardware produced them.
 */
pub trait DeviceListener: Debug + Send + Sync {
    fn on_motion(&self, state: &SpaceMouseState);
    fn on_buttons(&self, state: &SpaceMouseState, buttons: &[bool]);
}

pub trait SpaceMouseDriver: Send {
    /// Returns `Ok(false)` if no device is present
    fn open(&mut self, listener: ListenerHandle) -> Result<bool, DriverError>;
    /// Blocks for at most `timeout`
    fn read(&mut self, timeout: Duration) -> Result<SpaceMouseState, DriverError>;
    fn close(&mut self) {}
}
