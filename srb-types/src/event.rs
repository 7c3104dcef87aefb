use mint::Vector3;

/**
 * Snapshot of a 6-DoF device as reported by its driver
 *
 * Axes are normalized to [-1, 1]. `t` is the driver timestamp in seconds of the
 * last change.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceMouseState {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub buttons: Vec<bool>,
}

impl SpaceMouseState {
    pub fn translation(&self) -> Vector3<f64> {
        Vector3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    /// (roll, pitch, yaw)
    pub fn rotation(&self) -> Vector3<f64> {
        Vector3 {
            x: self.roll,
            y: self.pitch,
            z: self.yaw,
        }
    }
}
