use std::sync::Arc;

use nalgebra::Vector6;
use srb_types::ParseButtonComboError;
use thiserror::Error;

pub mod spacemouse;
mod worker_thread;

/// Bound to a button combination, run on the device's polling thread
pub type Action = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Error)]
pub enum TeleopError {
    #[error("Invalid Argument: {0}")]
    InvalidArgument(#[from] ParseButtonComboError),
}

/**
 * A device a teleoperation loop can pull commands from
 *
 * `advance` returns the end-effector twist (dx, dy, dz, rx, ry, rz) with the rotation
 * as a rotation vector, and whether the gripper should be closed.
 */
pub trait TeleopDevice {
    fn reset(&self);
    fn add_callback(
        &self,
        key: &str,
        action: Box<dyn Fn() + Send + Sync>,
    ) -> Result<(), TeleopError>;
    fn advance(&self) -> (Vector6<f64>, bool);
}
