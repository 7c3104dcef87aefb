use serde::{Deserialize, Serialize};

/// The celestial setting a simulated environment is placed in
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scenario {
    Asteroid,
    Earth,
    Mars,
    #[default]
    Moon,
    Orbit,
}

impl Scenario {
    /// Solar irradiance at the scenario's location (W/m^2)
    pub fn light_intensity(self) -> f64 {
        match self {
            // Main belt, ~2.7 AU
            Scenario::Asteroid => 186.7,
            // Clear sky at sea level
            Scenario::Earth => 1000.0,
            Scenario::Mars => 586.2,
            Scenario::Moon | Scenario::Orbit => 1361.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn light_intensity_is_positive() {
        for scenario in Scenario::iter() {
            assert!(scenario.light_intensity() > 0., "{scenario}");
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("mars".parse::<Scenario>().unwrap(), Scenario::Mars);
        assert_eq!("ORBIT".parse::<Scenario>().unwrap(), Scenario::Orbit);
        assert!("venus".parse::<Scenario>().is_err());
    }
}
