use std::{
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
    thread::JoinHandle,
    time::Duration,
};

use flume::Sender;
use log::{debug, error, warn};
use nalgebra::{UnitQuaternion, Vector3, Vector6};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use srb_types::{
    driver_interface::{DeviceListener, ListenerHandle, SpaceMouseDriver},
    event::SpaceMouseState,
    ButtonCombo,
};

use super::{worker_thread, Action, TeleopDevice, TeleopError};

const DEFAULT_RATE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceMouseSettings {
    pub pos_sensitivity: f64,
    pub rot_sensitivity: f64,
    /// Polling rate in Hz
    pub rate: f64,
    /// Upper bound on a single blocking device read
    pub read_timeout: Duration,
}

impl Default for SpaceMouseSettings {
    fn default() -> Self {
        Self {
            pos_sensitivity: 0.4,
            rot_sensitivity: 0.8,
            rate: DEFAULT_RATE,
            read_timeout: Duration::from_millis(10),
        }
    }
}

impl SpaceMouseSettings {
    pub fn poll_interval(&self) -> Duration {
        let interval = if self.rate.is_finite() && self.rate > 0. {
            Duration::try_from_secs_f64(1. / self.rate).ok()
        } else {
            None
        };
        interval.unwrap_or_else(|| {
            warn!(
                "Invalid SpaceMouse polling rate {}, using {DEFAULT_RATE} Hz",
                self.rate
            );
            Duration::from_secs_f64(1. / DEFAULT_RATE)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterStatus {
    Uninitialized,
    Connected,
    Polling,
    Closed,
    FailedToConnect,
}

/// The latest command produced by the device
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeleopCommand {
    pub delta_position: Vector3<f64>,
    /// (roll, pitch, yaw)
    pub delta_rotation: Vector3<f64>,
    pub gripper_closed: bool,
}

/// State shared between the polling thread and the adapter's users
pub struct SpaceMouseShared {
    pos_sensitivity: f64,
    rot_sensitivity: f64,
    command: Mutex<TeleopCommand>,
    callbacks: RwLock<HashMap<ButtonCombo, Action>>,
    status: Mutex<AdapterStatus>,
}

impl SpaceMouseShared {
    fn new(settings: &SpaceMouseSettings) -> Self {
        Self {
            pos_sensitivity: settings.pos_sensitivity,
            rot_sensitivity: settings.rot_sensitivity,
            command: Mutex::default(),
            callbacks: RwLock::default(),
            status: Mutex::new(AdapterStatus::Uninitialized),
        }
    }

    pub(crate) fn set_status(&self, status: AdapterStatus) {
        *self.status.lock() = status;
    }

    fn reset(&self) {
        *self.command.lock() = TeleopCommand::default();
    }

    fn fire(&self, combo: ButtonCombo) {
        // Cloned out so the action may touch the registry itself
        let action = self.callbacks.read().get(&combo).cloned();
        if let Some(action) = action {
            action();
        }
    }
}

impl Debug for SpaceMouseShared {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceMouseShared")
            .field("pos_sensitivity", &self.pos_sensitivity)
            .field("rot_sensitivity", &self.rot_sensitivity)
            .field("command", &*self.command.lock())
            .field("callbacks", &self.callbacks.read().keys().collect::<Vec<_>>())
            .field("status", &*self.status.lock())
            .finish()
    }
}

impl DeviceListener for SpaceMouseShared {
    fn on_motion(&self, state: &SpaceMouseState) {
        let translation: Vector3<f64> = state.translation().into();
        let rotation: Vector3<f64> = state.rotation().into();

        let delta_position =
            Vector3::new(translation.y, -translation.x, translation.z) * self.pos_sensitivity;
        let delta_rotation = -rotation * self.rot_sensitivity;

        let mut command = self.command.lock();
        command.delta_position = delta_position;
        command.delta_rotation = delta_rotation;
    }

    fn on_buttons(&self, _state: &SpaceMouseState, buttons: &[bool]) {
        let left = buttons.first().copied().unwrap_or(false);
        let right = buttons.get(1).copied().unwrap_or(false);

        if left {
            self.reset();
            self.fire(ButtonCombo::Left);
        }
        if right {
            {
                let mut command = self.command.lock();
                command.gripper_closed = !command.gripper_closed;
            }
            self.fire(ButtonCombo::Right);
        }
        // Fires on top of the individual buttons above
        if buttons.len() >= 2 && buttons.iter().all(|pressed| *pressed) {
            self.fire(ButtonCombo::LeftRight);
        }
    }
}

#[derive(Debug)]
struct PollingThread {
    handle: JoinHandle<()>,
    stop: Sender<()>,
}

/**
 * 6-DoF SpaceMouse teleoperation device
 *
 * Translation is mapped to (y, -x, z) and rotation to (-roll, -pitch, -yaw) of the
 * device frame, scaled by the configured sensitivities.
 *
 * A device that fails to open is not an error: the adapter stays in
 * [`AdapterStatus::FailedToConnect`] and `advance` keeps returning a zero twist.
 */
#[derive(Debug)]
pub struct SpaceMouse {
    shared: Arc<SpaceMouseShared>,
    thread: Option<PollingThread>,
}

impl SpaceMouse {
    pub fn new<D: SpaceMouseDriver + 'static>(mut driver: D, settings: SpaceMouseSettings) -> Self {
        let shared = Arc::new(SpaceMouseShared::new(&settings));
        let mut mouse = Self {
            shared: shared.clone(),
            thread: None,
        };

        match driver.open(ListenerHandle(shared.clone())) {
            Ok(true) => shared.set_status(AdapterStatus::Connected),
            Ok(false) => {
                error!("Failed to open a SpaceMouse device. Is it connected?");
                shared.set_status(AdapterStatus::FailedToConnect);
                return mouse;
            }
            Err(err) => {
                error!("Failed to open a SpaceMouse device. Is it connected?\n{err}");
                shared.set_status(AdapterStatus::FailedToConnect);
                return mouse;
            }
        }

        let (stop_sender, stop_receiver) = flume::bounded(1);
        shared.set_status(AdapterStatus::Polling);
        match worker_thread::spawn_thread(
            Box::new(driver),
            shared.clone(),
            stop_receiver,
            settings.poll_interval(),
            settings.read_timeout,
        ) {
            Ok(handle) => {
                mouse.thread = Some(PollingThread {
                    handle,
                    stop: stop_sender,
                });
            }
            Err(err) => {
                error!("Failed to start the SpaceMouse polling thread: {err}");
                shared.set_status(AdapterStatus::FailedToConnect);
            }
        }

        mouse
    }

    pub fn status(&self) -> AdapterStatus {
        *self.shared.status.lock()
    }

    pub fn command(&self) -> TeleopCommand {
        *self.shared.command.lock()
    }

    pub fn reset(&self) {
        self.shared.reset();
    }

    pub fn add_callback<F>(&self, key: &str, action: F) -> Result<(), TeleopError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let combo = ButtonCombo::parse(key)?;
        self.shared.callbacks.write().insert(combo, Arc::new(action));
        Ok(())
    }

    pub fn advance(&self) -> (Vector6<f64>, bool) {
        let command = self.command();
        let p = command.delta_position;
        let r = rotation_vector_from_euler_xyz(&command.delta_rotation);

        (
            Vector6::new(p.x, p.y, p.z, r.x, r.y, r.z),
            command.gripper_closed,
        )
    }

    /// Stops and joins the polling thread
    ///
    /// When called from an action running on the polling thread itself, the thread is only
    /// signalled; it marks the adapter closed once the action returns.
    pub fn close(&mut self) {
        if let Some(thread) = self.thread.take() {
            // Fails if the thread already exited on its own
            let _ = thread.stop.send(());
            if thread.handle.thread().id() == std::thread::current().id() {
                debug!("SpaceMouse closed from its polling thread, not joining");
                return;
            }
            if thread.handle.join().is_err() {
                error!("SpaceMouse polling thread panicked");
            }
            self.shared.set_status(AdapterStatus::Closed);
        }
    }
}

impl Drop for SpaceMouse {
    fn drop(&mut self) {
        self.close();
    }
}

impl TeleopDevice for SpaceMouse {
    fn reset(&self) {
        SpaceMouse::reset(self);
    }

    fn add_callback(
        &self,
        key: &str,
        action: Box<dyn Fn() + Send + Sync>,
    ) -> Result<(), TeleopError> {
        SpaceMouse::add_callback(self, key, action)
    }

    fn advance(&self) -> (Vector6<f64>, bool) {
        SpaceMouse::advance(self)
    }
}

impl Display for SpaceMouse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SpaceMouse Controller ({:?})", self.status())?;
        writeln!(f, "\tToggle gripper (alternative): Right button")?;
        writeln!(f, "\tReset: Left button")
    }
}

/// Rotation vector of the intrinsic X-Y-Z rotation `Rx(e.x) * Ry(e.y) * Rz(e.z)`
pub fn rotation_vector_from_euler_xyz(euler: &Vector3<f64>) -> Vector3<f64> {
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), euler.x)
        * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler.y)
        * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler.z);
    rotation.scaled_axis()
}
