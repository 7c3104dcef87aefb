use std::time::UNIX_EPOCH;

use evdev::{InputEvent, InputEventKind, Key, Synchronization};
use srb_types::event::SpaceMouseState;

/// Full deflection reported by 3Dconnexion devices
pub const AXIS_SCALE: f64 = 350.0;

const BUTTONS: [Key; 2] = [Key::BTN_0, Key::BTN_1];

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
    Roll,
    Pitch,
    Yaw,
}

// Indexed by evdev code, REL_X..REL_RZ and ABS_X..ABS_RZ share 0..=5
const AXIS_MAP: [(Axis, f64); 6] = [
    (Axis::X, 1.),
    (Axis::Y, -1.),
    (Axis::Z, -1.),
    (Axis::Pitch, -1.),
    (Axis::Roll, -1.),
    (Axis::Yaw, 1.),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub motion: bool,
    pub buttons: bool,
}

/**
 * Folds raw evdev events into [`SpaceMouseState`] snapshots, one per SYN_REPORT
 *
 * Relative axes carry the current deflection rather than a delta, and the kernel drops
 * zero-valued relative events, so axes missing from a relative frame read as centered.
 * Releasing the puck entirely produces no frame at all; the driver calls
 * [`FrameDecoder::center_relative`] once the device has gone quiet.
 */
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: SpaceMouseState,
    touched: [bool; 6],
    relative_frame: bool,
    /// The last completed frame deflected relative axes
    relative_active: bool,
    pending: Dispatch,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self {
            state: SpaceMouseState {
                buttons: vec![false; BUTTONS.len()],
                ..Default::default()
            },
            touched: [false; 6],
            relative_frame: false,
            relative_active: false,
            pending: Dispatch::default(),
        }
    }
}

impl FrameDecoder {
    pub fn state(&self) -> &SpaceMouseState {
        &self.state
    }

    /// Returns what to report once a frame completes
    pub fn feed(&mut self, event: &InputEvent) -> Option<Dispatch> {
        match event.kind() {
            InputEventKind::RelAxis(axis) => {
                self.relative_frame = true;
                self.set_axis(axis.0, event.value());
            }
            InputEventKind::AbsAxis(axis) => self.set_axis(axis.0, event.value()),
            InputEventKind::Key(key) => {
                if let Some(idx) = BUTTONS.iter().position(|button| *button == key) {
                    let pressed = event.value() != 0;
                    if self.state.buttons[idx] != pressed {
                        self.state.buttons[idx] = pressed;
                        self.pending.buttons = true;
                    }
                }
            }
            InputEventKind::Synchronization(Synchronization::SYN_REPORT) => {
                return self.finish_frame(event);
            }
            _ => {}
        }
        None
    }

    /// Centers the axes of a device that stopped reporting relative motion
    pub fn center_relative(&mut self) -> Option<Dispatch> {
        if !std::mem::take(&mut self.relative_active) {
            return None;
        }
        for &(axis, _) in AXIS_MAP.iter() {
            *self.axis_mut(axis) = 0.;
        }
        Some(Dispatch {
            motion: true,
            buttons: false,
        })
    }

    fn set_axis(&mut self, code: u16, value: i32) {
        let Some(&(axis, sign)) = AXIS_MAP.get(code as usize) else {
            return;
        };
        self.touched[code as usize] = true;
        *self.axis_mut(axis) = (sign * value as f64 / AXIS_SCALE).clamp(-1., 1.);
        self.pending.motion = true;
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.state.x,
            Axis::Y => &mut self.state.y,
            Axis::Z => &mut self.state.z,
            Axis::Roll => &mut self.state.roll,
            Axis::Pitch => &mut self.state.pitch,
            Axis::Yaw => &mut self.state.yaw,
        }
    }

    fn finish_frame(&mut self, event: &InputEvent) -> Option<Dispatch> {
        if self.relative_frame {
            for (code, &(axis, _)) in AXIS_MAP.iter().enumerate() {
                if !self.touched[code] {
                    *self.axis_mut(axis) = 0.;
                }
            }
            self.relative_active = self.touched.iter().any(|touched| *touched);
        }
        self.touched = [false; 6];
        self.relative_frame = false;

        let dispatch = std::mem::take(&mut self.pending);
        if dispatch == Dispatch::default() {
            return None;
        }

        self.state.t = event
            .timestamp()
            .duration_since(UNIX_EPOCH)
            .map(|time| time.as_secs_f64())
            .unwrap_or_default();
        Some(dispatch)
    }
}
