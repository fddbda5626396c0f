use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::material::Color;
use crate::params::{ParamValue, Parameter};

/// The UI-bound display settings.
///
/// This is the only copy of these values: camera, material, scene and
/// renderer properties are written from it and never read back.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, SmartDefault)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayState {
    #[default(45.0)]
    pub fov: f32,

    #[default(0.75)]
    pub render_scale: f32,

    #[default(1.0)]
    pub bg_blurriness: f32,

    #[default(0.5)]
    pub bg_intensity: f32,

    #[default(1.0)]
    pub tone_mapping_exposure: f32,

    #[default(Color::ALUMINIUM)]
    pub color: Color,

    #[default(1.0)]
    pub metalness: f32,

    #[default(0.4)]
    pub roughness: f32,

    #[default(false)]
    pub wireframe: bool,
}

impl DisplayState {
    pub fn get(&self, param: Parameter) -> ParamValue {
        match param {
            Parameter::RenderScale => ParamValue::Scalar(self.render_scale),
            Parameter::Fov => ParamValue::Scalar(self.fov),
            Parameter::Wireframe => ParamValue::Flag(self.wireframe),
            Parameter::Color => ParamValue::Color(self.color),
            Parameter::Metalness => ParamValue::Scalar(self.metalness),
            Parameter::Roughness => ParamValue::Scalar(self.roughness),
            Parameter::BackgroundBlurriness => ParamValue::Scalar(self.bg_blurriness),
            Parameter::BackgroundIntensity => ParamValue::Scalar(self.bg_intensity),
            Parameter::ToneMappingExposure => ParamValue::Scalar(self.tone_mapping_exposure),
        }
    }

    /// Stores a value that has already been through [`Parameter::check`].
    ///
    /// Returns whether the field changed. Values of the wrong kind are ignored.
    pub fn set(&mut self, param: Parameter, value: ParamValue) -> bool {
        let before = *self;

        match (param, value) {
            (Parameter::RenderScale, ParamValue::Scalar(v)) => self.render_scale = v,
            (Parameter::Fov, ParamValue::Scalar(v)) => self.fov = v,
            (Parameter::Wireframe, ParamValue::Flag(v)) => self.wireframe = v,
            (Parameter::Color, ParamValue::Color(v)) => self.color = v,
            (Parameter::Metalness, ParamValue::Scalar(v)) => self.metalness = v,
            (Parameter::Roughness, ParamValue::Scalar(v)) => self.roughness = v,
            (Parameter::BackgroundBlurriness, ParamValue::Scalar(v)) => self.bg_blurriness = v,
            (Parameter::BackgroundIntensity, ParamValue::Scalar(v)) => self.bg_intensity = v,
            (Parameter::ToneMappingExposure, ParamValue::Scalar(v)) => {
                self.tone_mapping_exposure = v
            }
            _ => return false,
        }

        *self != before
    }

    /// Runs every field through its parameter's clamp, e.g. after deserializing.
    pub fn sanitized(&self) -> Self {
        let mut state = Self::default();
        for param in Parameter::ALL {
            let value = param
                .check(self.get(param))
                .unwrap_or_else(|_| state.get(param));
            state.set(param, value);
        }
        state
    }
}
