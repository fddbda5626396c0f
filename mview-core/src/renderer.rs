/// Renderer interface and the CPU rasterizer behind every host
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::RenderError;
use crate::projection::PerspectiveCamera;
use crate::scene::Scene;
use crate::tonemap::{linear_to_srgb, ToneMapping};

/// Radiance used for lighting while no environment map is loaded
const FALLBACK_AMBIENT: f32 = 0.25;
const FALLBACK_HEADLIGHT: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererSettings {
    pub antialias: bool,
    pub tone_mapping: ToneMapping,
    pub tone_mapping_exposure: f32,
    /// Linear colour behind the scene when there is no background texture
    pub clear_color: [f32; 3],
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            tone_mapping: ToneMapping::AcesFilmic,
            tone_mapping_exposure: 1.0,
            clear_color: [0.0; 3],
        }
    }
}

/// Draws a scene through a camera into an output buffer.
pub trait Renderer {
    /// Resizes the output buffer in pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn antialias(&self) -> bool;

    fn set_antialias(&mut self, antialias: bool);

    fn tone_mapping(&self) -> ToneMapping;

    fn set_tone_mapping(&mut self, tone_mapping: ToneMapping);

    fn tone_mapping_exposure(&self) -> f32;

    fn set_tone_mapping_exposure(&mut self, exposure: f32);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// A screen-space vertex: sample-buffer coordinates plus NDC depth
#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    x: f32,
    y: f32,
    z: f32,
}

/// Z-buffered rasterizer producing RGBA8 pixels.
///
/// With `antialias` each pixel is resolved from a 2x2 grid of samples.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    settings: RendererSettings,
    width: u32,
    height: u32,
    color: Vec<[f32; 3]>,
    depth: Vec<f32>,
    pixels: Vec<u8>,
}

impl SoftwareRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        let mut renderer = Self {
            settings,
            width: 0,
            height: 0,
            color: Vec::new(),
            depth: Vec::new(),
            pixels: Vec::new(),
        };
        renderer.set_size(1, 1);
        renderer
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Output of the last render, row-major RGBA8.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of one output pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    fn samples_per_axis(&self) -> u32 {
        if self.settings.antialias {
            2
        } else {
            1
        }
    }

    fn sample_size(&self) -> (usize, usize) {
        let s = self.samples_per_axis() as usize;
        (self.width as usize * s, self.height as usize * s)
    }

    fn clear(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let (sw, sh) = self.sample_size();
        self.depth.iter_mut().for_each(|d| *d = f32::INFINITY);

        let background = scene.background();
        let inverse = camera.view_projection().try_inverse();

        let (background, inverse) = match (background, inverse) {
            (Some(background), Some(inverse)) => (background, inverse),
            _ => {
                let clear = self.settings.clear_color;
                self.color.iter_mut().for_each(|c| *c = clear);
                return;
            }
        };

        let blur = scene.background_blurriness;
        let intensity = scene.background_intensity;

        for y in 0..sh {
            let ndc_y = 1.0 - (y as f32 + 0.5) / sh as f32 * 2.0;
            for x in 0..sw {
                let ndc_x = (x as f32 + 0.5) / sw as f32 * 2.0 - 1.0;
                let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
                let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
                let texel = background.sample(&(far - near), blur);
                self.color[y * sw + x] = texel.map(|c| c * intensity);
            }
        }
    }

    fn shade(scene: &Scene, normal: &Vector3<f32>, view: &Vector3<f32>) -> [f32; 3] {
        let material = &scene.material;
        let base = Vector3::from(material.color.to_linear());
        let metalness = material.metalness.clamp(0.0, 1.0);
        let roughness = material.roughness.clamp(0.0, 1.0);

        let n_dot_v = normal.dot(view).max(0.0);
        let reflected = normal * (2.0 * normal.dot(view)) - view;

        let (diffuse_light, specular_light) = match scene.environment() {
            Some(environment) => (
                Vector3::from(environment.sample(normal, 1.0)),
                Vector3::from(environment.sample(&reflected, roughness)),
            ),
            None => {
                let light = FALLBACK_AMBIENT + FALLBACK_HEADLIGHT * n_dot_v;
                (Vector3::repeat(light), Vector3::repeat(light))
            }
        };

        // Schlick's approximation with a roughness-limited grazing reflectance
        let f0 = Vector3::repeat(0.04).lerp(&base, metalness);
        let grazing = (1.0 - n_dot_v).powi(5);
        let fresnel = f0.map(|f| f + ((1.0 - roughness).max(f) - f) * grazing);

        let diffuse = base.component_mul(&diffuse_light) * (1.0 - metalness);
        let kd = Vector3::repeat(1.0) - fresnel;

        (kd.component_mul(&diffuse) + fresnel.component_mul(&specular_light)).into()
    }

    fn project(&self, view_projection: &Matrix4<f32>, p: &Point3<f32>) -> Option<ScreenVertex> {
        let clip = view_projection * p.to_homogeneous();
        if clip.w <= 1e-5 {
            return None;
        }

        let (sw, sh) = self.sample_size();
        Some(ScreenVertex {
            x: (clip.x / clip.w + 1.0) * 0.5 * sw as f32,
            y: (1.0 - clip.y / clip.w) * 0.5 * sh as f32,
            z: clip.z / clip.w,
        })
    }

    fn write_sample(&mut self, x: i64, y: i64, z: f32, color: [f32; 3]) {
        let (sw, sh) = self.sample_size();
        if x < 0 || y < 0 || x as usize >= sw || y as usize >= sh || !(-1.0..=1.0).contains(&z) {
            return;
        }
        let idx = y as usize * sw + x as usize;
        if z < self.depth[idx] {
            self.depth[idx] = z;
            self.color[idx] = color;
        }
    }

    fn fill_triangle(&mut self, v: [ScreenVertex; 3], color: [f32; 3]) {
        let (sw, sh) = self.sample_size();

        let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
        let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(sw as f32 - 1.0) as i64;
        let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as i64;
        let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(sh as f32 - 1.0) as i64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) =
                    barycentric((v[0].x, v[0].y), (v[1].x, v[1].y), (v[2].x, v[2].y), p)
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let z = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
                        self.write_sample(x, y, z, color);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, a: ScreenVertex, b: ScreenVertex, color: [f32; 3]) {
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0);
        // Lines are the only geometry in wireframe mode; cap runaway edges
        let steps = steps.min(65536.0) as u32;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.x + (b.x - a.x) * t;
            let y = a.y + (b.y - a.y) * t;
            let z = a.z + (b.z - a.z) * t;
            self.write_sample(x.floor() as i64, y.floor() as i64, z, color);
        }
    }

    fn resolve(&mut self) {
        let s = self.samples_per_axis() as usize;
        let (sw, _) = self.sample_size();
        let weight = 1.0 / (s * s) as f32;

        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                let mut sum = [0.0f32; 3];
                for sy in 0..s {
                    for sx in 0..s {
                        let c = self.color[(y * s + sy) * sw + x * s + sx];
                        for k in 0..3 {
                            sum[k] += c[k] * weight;
                        }
                    }
                }

                let mapped = self
                    .settings
                    .tone_mapping
                    .apply(sum, self.settings.tone_mapping_exposure);
                let out = (y * self.width as usize + x) * 4;
                for k in 0..3 {
                    self.pixels[out + k] = (linear_to_srgb(mapped[k]) * 255.0).round() as u8;
                }
                self.pixels[out + 3] = 255;
            }
        }
    }
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self::new(RendererSettings::default())
    }
}

impl Renderer for SoftwareRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);

        let (sw, sh) = self.sample_size();
        self.color = vec![self.settings.clear_color; sw * sh];
        self.depth = vec![f32::INFINITY; sw * sh];
        self.pixels = vec![0; self.width as usize * self.height as usize * 4];
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn antialias(&self) -> bool {
        self.settings.antialias
    }

    /// Reallocates the sample buffers when the setting changes.
    fn set_antialias(&mut self, antialias: bool) {
        if self.settings.antialias != antialias {
            self.settings.antialias = antialias;
            self.set_size(self.width, self.height);
        }
    }

    fn tone_mapping(&self) -> ToneMapping {
        self.settings.tone_mapping
    }

    fn set_tone_mapping(&mut self, tone_mapping: ToneMapping) {
        self.settings.tone_mapping = tone_mapping;
    }

    fn tone_mapping_exposure(&self) -> f32 {
        self.settings.tone_mapping_exposure
    }

    fn set_tone_mapping_exposure(&mut self, exposure: f32) {
        self.settings.tone_mapping_exposure = exposure;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.clear(scene, camera);

        let view_projection = camera.view_projection();
        let wireframe = scene.material.wireframe;

        for object in scene.objects() {
            let model = object.transform.matrix();

            for triangle in &object.mesh.triangles {
                let world = triangle.vertices.map(|v| model.transform_point(&v.position));

                let projected = [
                    self.project(&view_projection, &world[0]),
                    self.project(&view_projection, &world[1]),
                    self.project(&view_projection, &world[2]),
                ];
                // Triangles crossing the camera plane are dropped, not clipped
                let screen = match projected {
                    [Some(a), Some(b), Some(c)] => [a, b, c],
                    _ => continue,
                };

                // Screen y points down, so front faces wind clockwise here
                let area = (screen[1].x - screen[0].x) * (screen[2].y - screen[0].y)
                    - (screen[1].y - screen[0].y) * (screen[2].x - screen[0].x);
                if area >= 0.0 {
                    continue;
                }

                let normal = match (world[1] - world[0])
                    .cross(&(world[2] - world[0]))
                    .try_normalize(f32::EPSILON)
                {
                    Some(normal) => normal,
                    None => continue,
                };
                let centroid = Point3::from((world[0].coords + world[1].coords + world[2].coords) / 3.0);
                let view = (camera.position - centroid)
                    .try_normalize(f32::EPSILON)
                    .unwrap_or(normal);

                let color = Self::shade(scene, &normal, &view);

                if wireframe {
                    self.draw_line(screen[0], screen[1], color);
                    self.draw_line(screen[1], screen[2], color);
                    self.draw_line(screen[2], screen[0], color);
                } else {
                    self.fill_triangle(screen, color);
                }
            }
        }

        self.resolve();
        Ok(())
    }
}

/// Barycentric weights of `p` in a 2D triangle, `None` if degenerate
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
