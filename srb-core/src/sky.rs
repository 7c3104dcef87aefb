use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use srb_types::Scenario;

use crate::{config::EnvironmentConfig, paths::PrimPath};

/// Dome lights are dimmer than the direct light of the scenario
pub const SKY_INTENSITY_SCALE: f64 = 0.25;

const EARTH_SKY: &str = "Materials/Textures/Skies/PolyHaven/kloofendal_43d_clear_puresky_4k.hdr";
const MARS_SKY: &str = "martian_sky_day.hdr";
const ORBIT_SKY: &str = "low_lunar_orbit.jpg";

pub type SpawnOverrides = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSource {
    Remote(String),
    Local(PathBuf),
}

impl TextureSource {
    fn from_reference(reference: &str) -> Self {
        if reference.contains("://") {
            TextureSource::Remote(reference.to_owned())
        } else {
            TextureSource::Local(reference.into())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomeLightConfig {
    pub intensity: f64,
    pub texture: TextureSource,
    /// Extra spawn parameters forwarded untouched to the spawner
    pub params: Map<String, Value>,
}

impl DomeLightConfig {
    fn apply_overrides(&mut self, overrides: &SpawnOverrides) {
        for (key, value) in overrides {
            match key.as_str() {
                "intensity" => match value.as_f64() {
                    Some(intensity) => self.intensity = intensity,
                    None => warn!("Ignoring non-numeric sky intensity override {value}"),
                },
                "texture_file" => match value.as_str() {
                    Some(reference) => self.texture = TextureSource::from_reference(reference),
                    None => warn!("Ignoring non-string sky texture override {value}"),
                },
                _ => {
                    self.params.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub prim_path: PrimPath,
    pub spawn: DomeLightConfig,
}

pub fn sky_texture(env: &EnvironmentConfig) -> Option<TextureSource> {
    let assets = &env.assets;
    match env.scenario {
        Scenario::Earth => Some(TextureSource::Remote(format!(
            "{}/{EARTH_SKY}",
            assets.nucleus_root.trim_end_matches('/')
        ))),
        Scenario::Mars => Some(TextureSource::Local(assets.hdri_dir.join(MARS_SKY))),
        Scenario::Orbit => Some(TextureSource::Local(assets.hdri_dir.join(ORBIT_SKY))),
        Scenario::Asteroid | Scenario::Moon => None,
    }
}

/// Dome light for the scenario of `env` at `/World/sky`, if the scenario has a sky
pub fn select_sky_light(
    env: &EnvironmentConfig,
    overrides: &SpawnOverrides,
) -> Option<AssetConfig> {
    select_sky_light_at(env, PrimPath::sky(), overrides)
}

pub fn select_sky_light_at(
    env: &EnvironmentConfig,
    prim_path: PrimPath,
    overrides: &SpawnOverrides,
) -> Option<AssetConfig> {
    let texture = sky_texture(env)?;

    let mut spawn = DomeLightConfig {
        intensity: SKY_INTENSITY_SCALE * env.scenario.light_intensity(),
        texture,
        params: Map::new(),
    };
    spawn.apply_overrides(overrides);

    Some(AssetConfig { prim_path, spawn })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::config::AssetPaths;

    fn env(scenario: Scenario) -> EnvironmentConfig {
        EnvironmentConfig {
            scenario,
            assets: AssetPaths {
                nucleus_root: "https://assets.example/Isaac/".into(),
                hdri_dir: "/srb/hdri".into(),
            },
        }
    }

    #[test]
    fn sky_per_scenario() {
        let earth = select_sky_light(&env(Scenario::Earth), &Map::new()).unwrap();
        assert_eq!(
            earth.spawn.texture,
            TextureSource::Remote(
                "https://assets.example/Isaac/Materials/Textures/Skies/PolyHaven/kloofendal_43d_clear_puresky_4k.hdr"
                    .into()
            )
        );

        let mars = select_sky_light(&env(Scenario::Mars), &Map::new()).unwrap();
        assert_eq!(
            mars.spawn.texture,
            TextureSource::Local(Path::new("/srb/hdri/martian_sky_day.hdr").into())
        );

        let orbit = select_sky_light(&env(Scenario::Orbit), &Map::new()).unwrap();
        assert_eq!(
            orbit.spawn.texture,
            TextureSource::Local(Path::new("/srb/hdri/low_lunar_orbit.jpg").into())
        );

        assert!(select_sky_light(&env(Scenario::Moon), &Map::new()).is_none());
        assert!(select_sky_light(&env(Scenario::Asteroid), &Map::new()).is_none());
    }

    #[test]
    fn intensity_is_scaled() {
        for scenario in Scenario::iter() {
            if let Some(sky) = select_sky_light(&env(scenario), &Map::new()) {
                assert_eq!(sky.spawn.intensity, 0.25 * scenario.light_intensity());
                assert_eq!(sky.prim_path.as_str(), "/World/sky");
                assert!(sky.spawn.params.is_empty());
            }
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = json!({
            "intensity": 42.0,
            "texture_file": "/tmp/custom.hdr",
            "visible_in_primary_ray": false,
        });
        let sky = select_sky_light_at(
            &env(Scenario::Mars),
            PrimPath::new("/World/env/sky").unwrap(),
            overrides.as_object().unwrap(),
        )
        .unwrap();

        assert_eq!(sky.prim_path.as_str(), "/World/env/sky");
        assert_eq!(sky.spawn.intensity, 42.0);
        assert_eq!(
            sky.spawn.texture,
            TextureSource::Local("/tmp/custom.hdr".into())
        );
        assert_eq!(sky.spawn.params.get("visible_in_primary_ray"), Some(&json!(false)));
    }

    #[test]
    fn mistyped_overrides_are_ignored() {
        let overrides = json!({ "intensity": "bright", "texture_file": 3 });
        let sky = select_sky_light(&env(Scenario::Earth), overrides.as_object().unwrap()).unwrap();

        assert_eq!(sky.spawn.intensity, 0.25 * Scenario::Earth.light_intensity());
        assert!(matches!(sky.spawn.texture, TextureSource::Remote(_)));
        assert!(sky.spawn.params.is_empty());
    }

    #[test]
    fn overrides_do_not_create_a_sky() {
        let overrides = json!({ "texture_file": "omniverse://host/sky.hdr" });
        assert!(select_sky_light(&env(Scenario::Moon), overrides.as_object().unwrap()).is_none());
    }
}
