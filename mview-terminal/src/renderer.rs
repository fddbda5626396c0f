/// ASCII presentation of the software renderer for terminal output
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use mview_core::{
    PerspectiveCamera, RenderError, Renderer, RendererSettings, Scene, SoftwareRenderer,
    ToneMapping,
};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Renders into an RGBA buffer and draws it as coloured ramp characters.
#[derive(Debug, Clone, Default)]
pub struct AsciiRenderer {
    inner: SoftwareRenderer,
}

impl AsciiRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            inner: SoftwareRenderer::new(settings),
        }
    }

    pub fn software(&self) -> &SoftwareRenderer {
        &self.inner
    }

    /// Character and colour of one cell of a `columns x rows` grid.
    ///
    /// The buffer is stretched over the grid; each cell averages the two
    /// pixels under its upper and lower half.
    pub fn cell(&self, column: u16, row: u16, cells: (u16, u16)) -> (char, [u8; 3]) {
        let (width, height) = self.inner.size();
        let columns = cells.0.max(1) as u32;
        let half_rows = cells.1.max(1) as u32 * 2;

        let x = (column as u32 * width / columns).min(width.saturating_sub(1));
        let top = (row as u32 * 2 * height / half_rows).min(height.saturating_sub(1));
        let bottom = ((row as u32 * 2 + 1) * height / half_rows).min(height.saturating_sub(1));

        let upper = self.inner.pixel(x, top).unwrap_or([0; 4]);
        let lower = self.inner.pixel(x, bottom).unwrap_or([0; 4]);
        let rgb = [0, 1, 2].map(|k| ((upper[k] as u16 + lower[k] as u16) / 2) as u8);

        let luma =
            (0.2126 * rgb[0] as f32 + 0.7152 * rgb[1] as f32 + 0.0722 * rgb[2] as f32) / 255.0;
        let index = ((luma * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize)
            .min(LUMINOSITY_RAMP.len() - 1);

        (LUMINOSITY_RAMP[index], rgb)
    }

    pub fn draw<W: Write>(&self, writer: &mut W, cells: (u16, u16)) -> std::io::Result<()> {
        let (columns, rows) = cells;
        for row in 0..rows {
            writer.queue(cursor::MoveTo(0, row))?;
            for column in 0..columns {
                let (c, [r, g, b]) = self.cell(column, row, cells);
                writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Renderer for AsciiRenderer {
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
        self.inner.render(scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleared(clear_color: [f32; 3]) -> AsciiRenderer {
        let mut renderer = AsciiRenderer::new(RendererSettings {
            tone_mapping: ToneMapping::None,
            clear_color,
            ..RendererSettings::default()
        });
        renderer.set_size(8, 8);
        renderer
            .render(&Scene::default(), &PerspectiveCamera::default())
            .unwrap();
        renderer
    }

    #[test]
    fn test_black_buffer_draws_blanks() {
        let renderer = cleared([0.0; 3]);
        assert_eq!(renderer.cell(0, 0, (4, 4)), (' ', [0, 0, 0]));
        assert_eq!(renderer.cell(3, 3, (4, 4)), (' ', [0, 0, 0]));
    }

    #[test]
    fn test_white_buffer_draws_brightest_character() {
        let renderer = cleared([1.0; 3]);
        assert_eq!(renderer.cell(2, 1, (4, 4)), ('@', [255, 255, 255]));
    }

    #[test]
    fn test_cells_outside_buffer_are_clamped() {
        let renderer = cleared([1.0; 3]);
        assert_eq!(renderer.cell(100, 100, (4, 4)).0, '@');
    }

    #[test]
    fn test_draw_emits_every_cell() {
        let renderer = cleared([1.0; 3]);
        let mut out = Vec::new();
        renderer.draw(&mut out, (3, 2)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('@').count(), 6);
    }
}
