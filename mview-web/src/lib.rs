/// mview Web - WASM host for the model viewer
///
/// Binds a viewer to an HTML canvas, fetches the mesh and environment map over
/// HTTP and exposes the UI event handlers to JavaScript.
use js_sys::Error;
use log::info;
use mview_core::{DecodingLoader, Parameter, Viewer, ViewerConfig};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub mod animation;
pub mod canvas;
pub mod fetch;
pub mod resize;

pub use animation::AnimationLoop;
pub use canvas::{CanvasRenderer, CanvasSurface};
pub use fetch::HttpFetcher;
pub use resize::ResizeWatch;

pub type WebViewer = Viewer<CanvasRenderer, CanvasSurface>;

/// WASM binding for a viewer attached to a canvas.
#[wasm_bindgen]
pub struct ModelViewer {
    viewer: Rc<RefCell<WebViewer>>,
    animation: AnimationLoop,
    resize: Option<ResizeWatch>,
}

#[wasm_bindgen]
impl ModelViewer {
    /// Attaches a viewer to `canvas` and starts loading and animating.
    ///
    /// `config` is an optional `ViewerConfig` object; missing fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: JsValue) -> Result<ModelViewer, JsValue> {
        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            from_json(&config)?
        };

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| Error::new("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        info!("attaching viewer for {} and {}", config.model, config.hdri);
        let loader = DecodingLoader::new(HttpFetcher);
        let viewer = Viewer::attach(
            config,
            CanvasSurface::new(canvas.clone()),
            CanvasRenderer::new(context),
            &loader,
        );

        let resize = ResizeWatch::observe(&canvas, &viewer)?;
        let animation = AnimationLoop::start(&viewer)?;

        Ok(ModelViewer {
            viewer,
            animation,
            resize: Some(resize),
        })
    }

    #[wasm_bindgen(js_name = "onChangeRenderScale")]
    pub fn on_change_render_scale(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::RenderScale, value)
    }

    #[wasm_bindgen(js_name = "onChangeFov")]
    pub fn on_change_fov(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::Fov, value)
    }

    #[wasm_bindgen(js_name = "onChangeWireframe")]
    pub fn on_change_wireframe(&self, checked: bool) {
        self.viewer.borrow_mut().on_change_wireframe(checked);
    }

    #[wasm_bindgen(js_name = "onChangeColor")]
    pub fn on_change_color(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::Color, value)
    }

    #[wasm_bindgen(js_name = "onChangeMetalness")]
    pub fn on_change_metalness(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::Metalness, value)
    }

    #[wasm_bindgen(js_name = "onChangeRoughness")]
    pub fn on_change_roughness(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::Roughness, value)
    }

    #[wasm_bindgen(js_name = "onBgBlurrinessChange")]
    pub fn on_bg_blurriness_change(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::BackgroundBlurriness, value)
    }

    #[wasm_bindgen(js_name = "onBgIntensityChange")]
    pub fn on_bg_intensity_change(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::BackgroundIntensity, value)
    }

    #[wasm_bindgen(js_name = "onToneMappingExposureChange")]
    pub fn on_tone_mapping_exposure_change(&self, value: &str) -> Result<(), JsValue> {
        self.change(Parameter::ToneMappingExposure, value)
    }

    /// Sets a parameter by its kebab-case or camelCase name.
    #[wasm_bindgen(js_name = "setParameter")]
    pub fn set_parameter(&self, name: &str, value: &str) -> Result<(), JsValue> {
        let param: Parameter = name.parse().map_err(to_js)?;
        self.change(param, value)
    }

    #[wasm_bindgen(js_name = "onResize")]
    pub fn on_resize(&self) {
        self.viewer.borrow_mut().on_resize();
    }

    #[wasm_bindgen(js_name = "displayState")]
    pub fn display_state(&self) -> Result<JsValue, JsValue> {
        as_json(self.viewer.borrow().display())
    }

    #[wasm_bindgen(js_name = "loadStatus")]
    pub fn load_status(&self) -> Result<JsValue, JsValue> {
        as_json(self.viewer.borrow().load_status())
    }

    /// Queues an orbit by the given angles in radians.
    pub fn orbit(&self, left: f32, up: f32) {
        let mut viewer = self.viewer.borrow_mut();
        let controls = viewer.controls_mut();
        controls.rotate_left(left);
        controls.rotate_up(up);
    }

    /// Queues a dolly; factors above 1 move closer.
    pub fn zoom(&self, factor: f32) {
        self.viewer.borrow_mut().controls_mut().dolly_in(factor);
    }

    /// Whether a frame is still scheduled.
    #[wasm_bindgen(js_name = "isAnimating")]
    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    /// Stops the animation loop and stops watching the canvas size.
    pub fn destroy(&mut self) {
        self.viewer.borrow_mut().destroy();
        self.animation.stop();

        if let Some(resize) = self.resize.take() {
            resize.disconnect();
        }
    }
}

impl ModelViewer {
    fn change(&self, param: Parameter, value: &str) -> Result<(), JsValue> {
        self.viewer
            .borrow_mut()
            .on_change(param, value)
            .map_err(to_js)
    }
}

impl Drop for ModelViewer {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn as_json<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    Ok(JsValue::from_serde(value).map_err(|e| Error::new(&e.to_string()))?)
}

fn from_json<T: DeserializeOwned>(json: &JsValue) -> Result<T, JsValue> {
    Ok(json.into_serde().map_err(|e| Error::new(&e.to_string()))?)
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    Error::new(&err.to_string()).into()
}

/// Readable text for a JS exception or rejection value.
pub(crate) fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[wasm_bindgen]
pub fn version() -> String {
    concat!("mview v", env!("CARGO_PKG_VERSION"), " (canvas 2d)").to_owned()
}

/// Configures browser logging functionality.
///
/// Safe to call more than once, so it co-exists with hot reloaders.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
