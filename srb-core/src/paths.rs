use std::fmt::{Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PRIM_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(/[A-Za-z_][A-Za-z0-9_]*)+$"#).unwrap());

pub const DEFAULT_SKY_PRIM_PATH: &str = "/World/sky";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Bad Prim Path `{0}`")]
pub struct PrimPathError(pub String);

/**
 * Absolute scene-graph path of a spawned asset
 *
 * /<Identifier>[/<Identifier>...]
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrimPath(String);

impl PrimPath {
    pub fn new(path: &str) -> Result<Self, PrimPathError> {
        if PRIM_PATH_REGEX.is_match(path) {
            Ok(Self(path.to_owned()))
        } else {
            Err(PrimPathError(path.to_owned()))
        }
    }

    pub fn sky() -> Self {
        Self(DEFAULT_SKY_PRIM_PATH.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl Default for PrimPath {
    fn default() -> Self {
        Self::sky()
    }
}

impl TryFrom<String> for PrimPath {
    type Error = PrimPathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PrimPath> for String {
    fn from(path: PrimPath) -> Self {
        path.0
    }
}

impl Display for PrimPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_paths() {
        for path in ["/World", "/World/sky", "/World/_light_0/Dome"] {
            assert_eq!(PrimPath::new(path).unwrap().as_str(), path);
        }
        assert!(PRIM_PATH_REGEX.is_match(DEFAULT_SKY_PRIM_PATH));
        assert_eq!(PrimPath::sky().name(), "sky");
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in ["", "/", "World/sky", "/World/", "/World//sky", "/0sky", "/World/sky light"] {
            assert_eq!(PrimPath::new(path), Err(PrimPathError(path.to_owned())));
        }
    }

    #[test]
    fn deserialize_validates() {
        let path: PrimPath = serde_json::from_str(r#""/World/stars""#).unwrap();
        assert_eq!(path.name(), "stars");
        assert!(serde_json::from_str::<PrimPath>(r#""stars""#).is_err());
    }
}
