use thiserror::Error;

pub mod driver_interface;
pub mod event;
pub mod scenario;

pub use scenario::Scenario;

/**
 * Button chords a teleoperation device can bind actions to
 *
 * String keys:
 *
 * left
 *
 * right
 *
 * left+right
 */
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::Display,
    strum_macros::IntoStaticStr,
)]
pub enum ButtonCombo {
    #[strum(serialize = "left")]
    Left,
    #[strum(serialize = "right")]
    Right,
    #[strum(serialize = "left+right")]
    LeftRight,
}

#[derive(Debug, Clone, Error)]
#[error("Unsupported button combination `{0}`, expected one of `left`, `right` or `left+right`")]
pub struct ParseButtonComboError(pub String);

impl ButtonCombo {
    pub fn parse(key: &str) -> Result<Self, ParseButtonComboError> {
        key.parse()
            .map_err(|_| ParseButtonComboError(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn button_combo_keys() {
        assert_eq!(ButtonCombo::parse("left").unwrap(), ButtonCombo::Left);
        assert_eq!(ButtonCombo::parse("right").unwrap(), ButtonCombo::Right);
        assert_eq!(
            ButtonCombo::parse("left+right").unwrap(),
            ButtonCombo::LeftRight
        );

        for combo in ButtonCombo::iter() {
            assert_eq!(ButtonCombo::parse(&combo.to_string()).unwrap(), combo);
        }
    }

    #[test]
    fn button_combo_rejects_unknown() {
        for key in ["L", "LR", "middle", "", "Left", "right+left"] {
            let err = ButtonCombo::parse(key).unwrap_err();
            assert_eq!(err.0, key);
        }
    }
}
