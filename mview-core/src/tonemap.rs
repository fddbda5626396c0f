/// Tone mapping operators and sRGB transfer functions
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMapping {
    None,
    Linear,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Maps a linear HDR colour to displayable linear `[0, 1]`.
    pub fn apply(&self, color: [f32; 3], exposure: f32) -> [f32; 3] {
        let c = Vector3::from(color);
        let mapped = match self {
            Self::None => c,
            Self::Linear => c * exposure,
            Self::AcesFilmic => aces_filmic(c * (exposure / 0.6)),
        };
        mapped.map(|v| v.clamp(0.0, 1.0)).into()
    }
}

// sRGB => XYZ => D65_2_D60 => AP1 => RRT_SAT
fn aces_input() -> Matrix3<f32> {
    Matrix3::new(
        0.59719, 0.35458, 0.04823, //
        0.07600, 0.90834, 0.01566, //
        0.02840, 0.13383, 0.83777,
    )
}

// ODT_SAT => XYZ => D60_2_D65 => sRGB
fn aces_output() -> Matrix3<f32> {
    Matrix3::new(
        1.60475, -0.53108, -0.07367, //
        -0.10208, 1.10813, -0.00605, //
        -0.00327, -0.07276, 1.07602,
    )
}

fn rrt_and_odt_fit(v: f32) -> f32 {
    let a = v * (v + 0.0245786) - 0.000090537;
    let b = v * (0.983729 * v + 0.4329510) + 0.238081;
    a / b
}

fn aces_filmic(color: Vector3<f32>) -> Vector3<f32> {
    let fitted = (aces_input() * color).map(rrt_and_odt_fit);
    aces_output() * fitted
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
