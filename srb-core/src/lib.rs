pub mod config;
pub mod paths;
pub mod sky;
pub mod teleop;

pub use config::{AssetPaths, EnvironmentConfig, TeleopConfig};
pub use paths::PrimPath;
pub use sky::{select_sky_light, select_sky_light_at, AssetConfig, DomeLightConfig, TextureSource};
pub use teleop::{
    spacemouse::{AdapterStatus, SpaceMouse, SpaceMouseSettings, TeleopCommand},
    TeleopDevice, TeleopError,
};

pub use srb_types;
