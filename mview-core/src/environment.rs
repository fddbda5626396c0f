/// Equirectangular environment maps
use nalgebra::Vector3;

use crate::error::RenderError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureMapping {
    #[default]
    Uv,
    EquirectangularReflection,
}

#[derive(Clone, Debug, PartialEq)]
struct Level {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Level {
    fn texel(&self, x: u32, y: u32) -> [f32; 3] {
        self.pixels[(y * self.width + x) as usize]
    }

    fn sample_nearest(&self, u: f32, v: f32) -> [f32; 3] {
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.texel(x, y)
    }

    /// 2x2 box filter; odd edges are clamped.
    fn downsample(&self) -> Level {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut pixels = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let mut sum = [0.0f32; 3];
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let sx = (x * 2 + dx).min(self.width - 1);
                    let sy = (y * 2 + dy).min(self.height - 1);
                    let texel = self.texel(sx, sy);
                    for c in 0..3 {
                        sum[c] += texel[c];
                    }
                }
                pixels.push(sum.map(|c| c * 0.25));
            }
        }

        Level {
            width,
            height,
            pixels,
        }
    }
}

/// A decoded HDR image in linear RGB with a box-filtered mip chain.
///
/// Row 0 is the top of the image (the +Y pole for equirectangular maps).
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentMap {
    pub mapping: TextureMapping,
    levels: Vec<Level>,
}

impl EnvironmentMap {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 3]>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
            return Err(RenderError::InvalidTexture {
                width,
                height,
                len: pixels.len(),
            });
        }

        let mut levels = vec![Level {
            width,
            height,
            pixels,
        }];

        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }

        Ok(Self {
            mapping: TextureMapping::default(),
            levels,
        })
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_levels(&self) -> usize {
        self.levels.len()
    }

    /// Samples along a world-space direction.
    ///
    /// `blur` in `[0, 1]` blends from the full-resolution image to the
    /// single-pixel average.
    pub fn sample(&self, direction: &Vector3<f32>, blur: f32) -> [f32; 3] {
        let (u, v) = direction_to_uv(direction);
        let level = blur.clamp(0.0, 1.0) * (self.levels.len() - 1) as f32;
        let lower = level.floor() as usize;
        let upper = (lower + 1).min(self.levels.len() - 1);
        let t = level - lower as f32;

        let a = self.levels[lower].sample_nearest(u, v);
        if t <= 0.0 || lower == upper {
            return a;
        }

        let b = self.levels[upper].sample_nearest(u, v);
        [0, 1, 2].map(|c| a[c] + (b[c] - a[c]) * t)
    }
}

/// Equirectangular lookup: `u` follows the azimuth, `v` runs from +Y (0) to -Y (1).
pub fn direction_to_uv(direction: &Vector3<f32>) -> (f32, f32) {
    let d = direction.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
    let u = d.z.atan2(d.x) / (2.0 * std::f32::consts::PI) + 0.5;
    let v = 0.5 - d.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
    (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> EnvironmentMap {
        let pixels = (0..width * height)
            .map(|i| [(i % width) as f32, (i / width) as f32, 1.0])
            .collect();
        EnvironmentMap::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_rejects_mismatched_pixels() {
        assert!(EnvironmentMap::new(4, 2, vec![[0.0; 3]; 7]).is_err());
        assert!(EnvironmentMap::new(0, 0, vec![]).is_err());
    }

    #[test]
    fn test_mip_chain_ends_at_one_pixel() {
        let map = gradient(8, 4);
        assert_eq!(map.mip_levels(), 4);
        assert_eq!(map.levels.last().unwrap().pixels.len(), 1);
    }

    #[test]
    fn test_full_blur_is_average() {
        let map = gradient(4, 2);
        let avg = map.sample(&Vector3::x(), 1.0);
        assert!((avg[0] - 1.5).abs() < 1e-6);
        assert!((avg[1] - 0.5).abs() < 1e-6);
        assert!((avg[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_poles_map_to_top_and_bottom_rows() {
        let (_, v_up) = direction_to_uv(&Vector3::y());
        let (_, v_down) = direction_to_uv(&-Vector3::y());
        assert!(v_up.abs() < 1e-6);
        assert!((v_down - 1.0).abs() < 1e-6);

        let map = gradient(4, 4);
        assert_eq!(map.sample(&Vector3::y(), 0.0)[1], 0.0);
        assert_eq!(map.sample(&-Vector3::y(), 0.0)[1], 3.0);
    }

    #[test]
    fn test_horizon_is_middle_row() {
        let (u, v) = direction_to_uv(&Vector3::x());
        assert!((u - 0.5).abs() < 1e-6);
        assert!((v - 0.5).abs() < 1e-6);
    }
}
