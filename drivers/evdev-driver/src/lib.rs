use std::{
    io,
    os::unix::io::{AsRawFd, RawFd},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use evdev::{AbsoluteAxisType, Device, RelativeAxisType};
use log::{debug, info, warn};
use srb_types::{
    driver_interface::{DriverError, ListenerHandle, SpaceMouseDriver},
    event::SpaceMouseState,
};

mod frame;

pub use frame::{Dispatch, FrameDecoder, AXIS_SCALE};

pub const VENDOR_3DCONNEXION: u16 = 0x256f;
// Older SpaceNavigator / SpaceExplorer units ship under Logitech's id
pub const VENDOR_LOGITECH: u16 = 0x046d;

const NAME_HINTS: [&str; 3] = ["3Dconnexion", "SpaceMouse", "SpaceNavigator"];

/// Silence after which a deflected relative-axis device is taken to be released.
/// Deflected devices report at 60 Hz or faster.
pub const RELEASE_TIMEOUT: Duration = Duration::from_millis(50);

/**
 * 3Dconnexion SpaceMouse read through the Linux evdev interface
 *
 * The device node needs to be readable by the current user, usually through a udev rule
 * or membership of the `input` group.
 */
pub struct EvdevSpaceMouse {
    path: Option<PathBuf>,
    grab: bool,
    device: Option<Device>,
    listener: Option<ListenerHandle>,
    decoder: FrameDecoder,
    last_events: Instant,
}

impl EvdevSpaceMouse {
    /// Picks the first SpaceMouse found under /dev/input on open
    pub fn new() -> Self {
        Self {
            path: None,
            grab: false,
            device: None,
            listener: None,
            decoder: FrameDecoder::default(),
            last_events: Instant::now(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_owned()),
            ..Self::new()
        }
    }

    /// Take the device exclusively so the desktop does not also react to it
    pub fn grab(mut self, grab: bool) -> Self {
        self.grab = grab;
        self
    }

    fn dispatch(&self, dispatch: Dispatch) {
        let Some(listener) = &self.listener else {
            return;
        };
        let state = self.decoder.state();
        if dispatch.motion {
            listener.on_motion(state);
        }
        if dispatch.buttons {
            listener.on_buttons(state, &state.buttons);
        }
    }
}

impl Default for EvdevSpaceMouse {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_spacemouse(device: &Device) -> bool {
    let vendor = device.input_id().vendor();
    let has_rotation = device
        .supported_relative_axes()
        .map_or(false, |axes| axes.contains(RelativeAxisType::REL_RX))
        || device
            .supported_absolute_axes()
            .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_RX));
    let named = device
        .name()
        .map_or(false, |name| NAME_HINTS.iter().any(|hint| name.contains(hint)));

    has_rotation && (named || vendor == VENDOR_3DCONNEXION || vendor == VENDOR_LOGITECH)
}

pub fn find_spacemouse() -> Option<(PathBuf, Device)> {
    evdev::enumerate().find(|(_, device)| is_spacemouse(device))
}

impl SpaceMouseDriver for EvdevSpaceMouse {
    fn open(&mut self, listener: ListenerHandle) -> Result<bool, DriverError> {
        let (path, mut device) = match &self.path {
            Some(path) => (path.clone(), Device::open(path)?),
            None => match find_spacemouse() {
                Some(found) => found,
                None => return Ok(false),
            },
        };

        if self.grab {
            if let Err(err) = device.grab() {
                warn!("Could not grab {}: {err}", path.display());
            }
        }

        info!(
            "Opened {} at {}",
            device.name().unwrap_or("unnamed device"),
            path.display()
        );

        self.device = Some(device);
        self.listener = Some(listener);
        self.decoder = FrameDecoder::default();
        self.last_events = Instant::now();
        Ok(true)
    }

    fn read(&mut self, timeout: Duration) -> Result<SpaceMouseState, DriverError> {
        let device = self.device.as_mut().ok_or(DriverError::NotFound)?;

        if !wait_readable(device.as_raw_fd(), timeout)? {
            if self.last_events.elapsed() >= RELEASE_TIMEOUT {
                if let Some(dispatch) = self.decoder.center_relative() {
                    self.dispatch(dispatch);
                }
            }
            return Ok(self.decoder.state().clone());
        }

        let events = match device.fetch_events() {
            Ok(events) => events.collect::<Vec<_>>(),
            Err(err) if err.raw_os_error() == Some(libc::ENODEV) => {
                return Err(DriverError::Disconnected)
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        if !events.is_empty() {
            self.last_events = Instant::now();
        }
        for event in &events {
            if let Some(dispatch) = self.decoder.feed(event) {
                self.dispatch(dispatch);
            }
        }

        Ok(self.decoder.state().clone())
    }

    fn close(&mut self) {
        if self.device.take().is_some() {
            debug!("Closed SpaceMouse device");
        }
        self.listener = None;
    }
}

/// Waits up to `timeout` for `fd` to have events
fn wait_readable(fd: RawFd, timeout: Duration) -> Result<bool, DriverError> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
    if ready < 0 {
        let err = io::Error::last_os_error();
        return if err.kind() == io::ErrorKind::Interrupted {
            Ok(false)
        } else {
            Err(err.into())
        };
    }

    if pollfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0 {
        return Err(DriverError::Disconnected);
    }
    Ok(pollfd.revents & libc::POLLIN != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopened_driver_reports_not_found() {
        let mut driver = EvdevSpaceMouse::with_path("/dev/input/event-does-not-exist");
        assert!(matches!(
            driver.read(Duration::from_millis(1)),
            Err(DriverError::NotFound)
        ));
        driver.close();
    }

    #[test]
    fn missing_path_fails_to_open() {
        #[derive(Debug)]
        struct Ignore;
        impl srb_types::driver_interface::DeviceListener for Ignore {
            fn on_motion(&self, _state: &SpaceMouseState) {}
            fn on_buttons(&self, _state: &SpaceMouseState, _buttons: &[bool]) {}
        }

        let mut driver = EvdevSpaceMouse::with_path("/dev/input/event-does-not-exist");
        let result = driver.open(ListenerHandle(std::sync::Arc::new(Ignore)));
        assert!(matches!(result, Err(DriverError::Io(_))));
    }

    #[test]
    fn wait_readable_times_out() {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

        assert!(!wait_readable(fds[0], Duration::from_millis(5)).unwrap());

        assert_eq!(unsafe { libc::write(fds[1], [1u8].as_ptr().cast(), 1) }, 1);
        assert!(wait_readable(fds[0], Duration::from_millis(5)).unwrap());

        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
