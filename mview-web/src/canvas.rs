/// HTML canvas as surface and presentation target
use mview_core::{
    PerspectiveCamera, RenderError, Renderer, RendererSettings, Scene, SoftwareRenderer,
    Surface, ToneMapping,
};
use wasm_bindgen::Clamped;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::describe;

/// A canvas whose CSS layout size is the displayed size and whose
/// `width`/`height` attributes are the buffer size.
///
/// The page must size the canvas with CSS; otherwise the client size follows
/// the buffer and every resize shrinks it by the render scale.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn displayed_size(&self) -> (f64, f64) {
        (
            self.canvas.client_width() as f64,
            self.canvas.client_height() as f64,
        )
    }

    fn buffer_size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

/// Software renderer presenting each frame with `putImageData`.
#[derive(Debug, Clone)]
pub struct CanvasRenderer {
    inner: SoftwareRenderer,
    context: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d) -> Self {
        Self {
            inner: SoftwareRenderer::new(RendererSettings::default()),
            context,
        }
    }

    fn present(&self) -> Result<(), RenderError> {
        let (width, height) = self.inner.size();
        let image =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(self.inner.pixels()), width, height)
                .map_err(|e| RenderError::Present(describe(&e)))?;
        self.context
            .put_image_data(&image, 0.0, 0.0)
            .map_err(|e| RenderError::Present(describe(&e)))
    }
}

impl Renderer for CanvasRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.inner.set_size(width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn antialias(&self) -> bool {
        self.inner.antialias()
    }

    fn set_antialias(&mut self, antialias: bool) {
        self.inner.set_antialias(antialias);
    }

    fn tone_mapping(&self) -> ToneMapping {
        self.inner.tone_mapping()
    }

    fn set_tone_mapping(&mut self, tone_mapping: ToneMapping) {
        self.inner.set_tone_mapping(tone_mapping);
    }

    fn tone_mapping_exposure(&self) -> f32 {
        self.inner.tone_mapping_exposure()
    }

    fn set_tone_mapping_exposure(&mut self, exposure: f32) {
        self.inner.set_tone_mapping_exposure(exposure);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.inner.render(scene, camera)?;
        self.present()
    }
}
