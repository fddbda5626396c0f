/// Keyboard bindings of the terminal host
use crossterm::event::KeyCode;
use mview_core::{Color, Parameter};

/// Orbit angle per key press, in radians
pub const ORBIT_STEP: f32 = 0.1;

/// Dolly factor per key press
pub const DOLLY_STEP: f32 = 1.1;

/// Colours cycled by the colour key
pub const COLOR_PRESETS: [&str; 5] = ["#f5f6f6", "#ff0000", "#d4af37", "#b87333", "#3a6ea5"];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Quit,
    Orbit { left: f32, up: f32 },
    DollyIn,
    DollyOut,
    /// Move a scalar parameter by a number of steps
    Step { param: Parameter, steps: f32 },
    ToggleWireframe,
    NextColor,
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    let step = |param, steps| Some(Action::Step { param, steps });

    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('w') | KeyCode::Up => Some(Action::Orbit { left: 0.0, up: ORBIT_STEP }),
        KeyCode::Char('s') | KeyCode::Down => Some(Action::Orbit { left: 0.0, up: -ORBIT_STEP }),
        KeyCode::Char('a') | KeyCode::Left => Some(Action::Orbit { left: ORBIT_STEP, up: 0.0 }),
        KeyCode::Char('d') | KeyCode::Right => Some(Action::Orbit { left: -ORBIT_STEP, up: 0.0 }),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::DollyIn),
        KeyCode::Char('-') => Some(Action::DollyOut),
        KeyCode::Char('f') => step(Parameter::Fov, -1.0),
        KeyCode::Char('F') => step(Parameter::Fov, 1.0),
        KeyCode::Char('x') => step(Parameter::RenderScale, -1.0),
        KeyCode::Char('X') => step(Parameter::RenderScale, 1.0),
        KeyCode::Char('m') => step(Parameter::Metalness, -1.0),
        KeyCode::Char('M') => step(Parameter::Metalness, 1.0),
        KeyCode::Char('r') => step(Parameter::Roughness, -1.0),
        KeyCode::Char('R') => step(Parameter::Roughness, 1.0),
        KeyCode::Char('b') => step(Parameter::BackgroundBlurriness, -1.0),
        KeyCode::Char('B') => step(Parameter::BackgroundBlurriness, 1.0),
        KeyCode::Char('i') => step(Parameter::BackgroundIntensity, -1.0),
        KeyCode::Char('I') => step(Parameter::BackgroundIntensity, 1.0),
        KeyCode::Char('e') => step(Parameter::ToneMappingExposure, -1.0),
        KeyCode::Char('E') => step(Parameter::ToneMappingExposure, 1.0),
        KeyCode::Char('g') => Some(Action::ToggleWireframe),
        KeyCode::Char('c') => Some(Action::NextColor),
        _ => None,
    }
}

/// Amount one key press moves a scalar parameter
pub fn step_size(param: Parameter) -> f32 {
    match param {
        Parameter::Fov => 5.0,
        Parameter::BackgroundIntensity | Parameter::ToneMappingExposure => 0.1,
        _ => 0.05,
    }
}

/// Raw payload for moving `param` from `current` by `steps` key presses.
///
/// Rounded to hundredths so repeated presses do not accumulate float noise.
pub fn stepped_payload(param: Parameter, current: f32, steps: f32) -> String {
    let value = current + steps * step_size(param);
    format!("{:.2}", value)
}

/// Payload of the preset after `current`, or the first preset if `current`
/// is not one of them.
pub fn next_color(current: Color) -> &'static str {
    let position = COLOR_PRESETS
        .iter()
        .position(|preset| preset.parse::<Color>().ok() == Some(current));
    COLOR_PRESETS[position.map_or(0, |i| (i + 1) % COLOR_PRESETS.len())]
}

pub fn flag_payload(on: bool) -> &'static str {
    if on {
        "true"
    } else {
        "false"
    }
}

pub const HELP_LINE: &str =
    "WASD/Arrows=Orbit +/-=Dolly f/F=FOV x/X=Scale m/M=Metal r/R=Rough b/B=Blur i/I=Bg e/E=Exposure g=Wire c=Color Q=Quit";
