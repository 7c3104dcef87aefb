use std::{
    sync::Arc,
    thread::JoinHandle,
    time::Duration,
};

use flume::{Receiver, RecvTimeoutError};
use log::{debug, error, warn};
use srb_types::driver_interface::{DriverError, SpaceMouseDriver};

use super::spacemouse::{AdapterStatus, SpaceMouseShared};

/// Reads the driver until told to stop through `stop`, or until the device goes away
pub fn spawn_thread(
    mut driver: Box<dyn SpaceMouseDriver>,
    shared: Arc<SpaceMouseShared>,
    stop: Receiver<()>,
    interval: Duration,
    read_timeout: Duration,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("spacemouse-poll".into())
        .spawn(move || {
            let mut failing = false;

            loop {
                // Events reach the adapter through the listener, not the return value
                match driver.read(read_timeout) {
                    Ok(_) => failing = false,
                    Err(DriverError::Disconnected) => {
                        error!("SpaceMouse disconnected");
                        break;
                    }
                    Err(err) => {
                        if !failing {
                            warn!("SpaceMouse read failed: {err}");
                        }
                        failing = true;
                    }
                }

                match stop.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            driver.close();
            shared.set_status(AdapterStatus::Closed);
            debug!("SpaceMouse polling thread stopped");
        })
}
