/// Drawable surfaces the viewer renders into

/// A host surface with a displayed (layout) size and a pixel buffer size.
///
/// The two differ by the render scale: the buffer is what the renderer fills,
/// the displayed size is what the host stretches it to.
pub trait Surface {
    /// Displayed size in layout units, e.g. CSS pixels or terminal cells.
    fn displayed_size(&self) -> (f64, f64);

    fn buffer_size(&self) -> (u32, u32);

    fn set_buffer_size(&mut self, width: u32, height: u32);

    fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.buffer_size();
        width as f32 / height.max(1) as f32
    }
}

/// Buffer dimensions for a displayed size at a render scale, at least 1x1.
pub fn scaled_buffer_size(displayed: (f64, f64), scale: f32) -> (u32, u32) {
    let scale = scale as f64;
    let dimension = |d: f64| {
        let scaled = (d * scale).round();
        if scaled.is_finite() && scaled >= 1.0 {
            scaled.min(u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (dimension(displayed.0), dimension(displayed.1))
}

/// Offscreen surface with a host-controlled displayed size
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessSurface {
    displayed: (f64, f64),
    buffer: (u32, u32),
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            displayed: (width, height),
            buffer: scaled_buffer_size((width, height), 1.0),
        }
    }

    /// Simulates a layout change; the viewer picks it up on its next resize.
    pub fn set_displayed_size(&mut self, width: f64, height: f64) {
        self.displayed = (width, height);
    }
}

impl Surface for HeadlessSurface {
    fn displayed_size(&self) -> (f64, f64) {
        self.displayed
    }

    fn buffer_size(&self) -> (u32, u32) {
        self.buffer
    }

    fn set_buffer_size(&mut self, width: u32, height: u32) {
        self.buffer = (width, height);
    }
}
