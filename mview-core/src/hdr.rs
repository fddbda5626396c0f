/// Radiance HDR decoding for environment maps
use image::ImageFormat;

use crate::environment::EnvironmentMap;
use crate::error::LoadError;

/// Decodes a Radiance `.hdr` image into linear RGB.
///
/// The result keeps the default UV mapping; the viewer switches it to
/// equirectangular reflection when it installs the texture.
pub fn decode_hdr(data: &[u8]) -> Result<EnvironmentMap, LoadError> {
    let image = image::load_from_memory_with_format(data, ImageFormat::Hdr)
        .map_err(|e| LoadError::Hdr(e.to_string()))?
        .into_rgb32f();

    let (width, height) = image.dimensions();
    let pixels = image.pixels().map(|p| p.0).collect();

    EnvironmentMap::new(width, height, pixels).map_err(|e| LoadError::Hdr(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::TextureMapping;

    fn radiance(width: u32, height: u32, rgbe: [u8; 4]) -> Vec<u8> {
        let mut data =
            format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y {} +X {}\n", height, width)
                .into_bytes();
        for _ in 0..width * height {
            data.extend_from_slice(&rgbe);
        }
        data
    }

    #[test]
    fn test_decode_flat_scanlines() {
        // mantissa 128 with exponent 129 encodes exactly 1.0
        let map = decode_hdr(&radiance(2, 1, [128, 128, 128, 129])).unwrap();
        assert_eq!((map.width(), map.height()), (2, 1));
        assert_eq!(map.mapping, TextureMapping::Uv);

        let texel = map.sample(&nalgebra::Vector3::x(), 0.0);
        for c in texel {
            assert!((c - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_rejects_non_hdr_data() {
        assert!(matches!(decode_hdr(b"not an image"), Err(LoadError::Hdr(_))));
    }
}
