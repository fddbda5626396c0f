/// UI-bound display parameters and their parse-and-clamp step
use log::warn;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ParamError;
use crate::material::Color;

/// One user-adjustable control of the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parameter {
    RenderScale,
    Fov,
    Wireframe,
    Color,
    Metalness,
    Roughness,
    BackgroundBlurriness,
    BackgroundIntensity,
    ToneMappingExposure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    Color,
    Flag,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f32),
    Color(Color),
    Flag(bool),
}

impl ParamValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{}", v),
            Self::Color(c) => write!(f, "{}", c),
            Self::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl Parameter {
    pub const ALL: [Parameter; 9] = [
        Parameter::RenderScale,
        Parameter::Fov,
        Parameter::Wireframe,
        Parameter::Color,
        Parameter::Metalness,
        Parameter::Roughness,
        Parameter::BackgroundBlurriness,
        Parameter::BackgroundIntensity,
        Parameter::ToneMappingExposure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::RenderScale => "render-scale",
            Self::Fov => "fov",
            Self::Wireframe => "wireframe",
            Self::Color => "color",
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
            Self::BackgroundBlurriness => "background-blurriness",
            Self::BackgroundIntensity => "background-intensity",
            Self::ToneMappingExposure => "tone-mapping-exposure",
        }
    }

    /// Name of the matching `DisplayState` field in its serialized form
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::RenderScale => "renderScale",
            Self::Fov => "fov",
            Self::Wireframe => "wireframe",
            Self::Color => "color",
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
            Self::BackgroundBlurriness => "bgBlurriness",
            Self::BackgroundIntensity => "bgIntensity",
            Self::ToneMappingExposure => "toneMappingExposure",
        }
    }

    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Wireframe => ParamKind::Flag,
            Self::Color => ParamKind::Color,
            _ => ParamKind::Scalar,
        }
    }

    /// Accepted range of scalar parameters
    pub fn range(&self) -> Option<RangeInclusive<f32>> {
        match self {
            Self::RenderScale => Some(0.1..=2.0),
            Self::Fov => Some(1.0..=179.0),
            Self::Metalness | Self::Roughness | Self::BackgroundBlurriness => Some(0.0..=1.0),
            Self::BackgroundIntensity | Self::ToneMappingExposure => Some(0.0..=10.0),
            Self::Wireframe | Self::Color => None,
        }
    }

    /// Parses a raw UI payload and clamps it into range.
    pub fn parse(&self, raw: &str) -> Result<ParamValue, ParamError> {
        let trimmed = raw.trim();
        let value = match self.kind() {
            ParamKind::Scalar => {
                let value = trimmed
                    .parse::<f32>()
                    .map_err(|_| ParamError::NotANumber {
                        param: *self,
                        raw: raw.to_owned(),
                    })?;
                if !value.is_finite() {
                    return Err(ParamError::NotFinite {
                        param: *self,
                        raw: raw.to_owned(),
                    });
                }
                ParamValue::Scalar(value)
            }
            ParamKind::Color => ParamValue::Color(trimmed.parse().map_err(|_| {
                ParamError::InvalidColor {
                    param: *self,
                    raw: raw.to_owned(),
                }
            })?),
            ParamKind::Flag => ParamValue::Flag(parse_flag(trimmed).ok_or_else(|| {
                ParamError::InvalidFlag {
                    param: *self,
                    raw: raw.to_owned(),
                }
            })?),
        };

        self.check(value)
    }

    /// Validates an already typed value: kind must match, scalars are clamped.
    pub fn check(&self, value: ParamValue) -> Result<ParamValue, ParamError> {
        match (self.kind(), value) {
            (ParamKind::Scalar, ParamValue::Scalar(v)) => {
                if !v.is_finite() {
                    return Err(ParamError::NotFinite {
                        param: *self,
                        raw: v.to_string(),
                    });
                }
                let clamped = match self.range() {
                    Some(range) => v.clamp(*range.start(), *range.end()),
                    None => v,
                };
                if clamped != v {
                    warn!("{}: {} is out of range, clamped to {}", self, v, clamped);
                }
                Ok(ParamValue::Scalar(clamped))
            }
            (ParamKind::Color, ParamValue::Color(_)) | (ParamKind::Flag, ParamValue::Flag(_)) => {
                Ok(value)
            }
            _ => Err(ParamError::WrongKind { param: *self }),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "checked" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ParamError;

    /// Accepts both the kebab-case name and the camelCase field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s || p.field_name() == s)
            .ok_or_else(|| ParamError::UnknownParameter(s.to_owned()))
    }
}
