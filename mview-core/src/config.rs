use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::display::DisplayState;

pub const DEFAULT_MODEL: &str = "assets/models/hero_statue.stl";
pub const DEFAULT_HDRI: &str = "assets/hdri/cyclorama_hard_light_2k.hdr";

/// Construction inputs of a viewer.
///
/// Fixed for the lifetime of a viewer; build a new viewer to change them.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
#[serde(default)]
pub struct ViewerConfig {
    /// Path or URL of the STL mesh
    #[default(DEFAULT_MODEL.to_owned())]
    pub model: String,

    /// Path or URL of the equirectangular `.hdr` environment map
    #[default(DEFAULT_HDRI.to_owned())]
    pub hdri: String,

    /// Initial display settings
    pub display: DisplayState,
}
