/// The model viewer component
use log::{debug, error, info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::animation::{AnimationToken, FrameStatus};
use crate::bounds::FrameGeometry;
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::display::DisplayState;
use crate::environment::{EnvironmentMap, TextureMapping};
use crate::error::{LoadError, ParamError, Result};
use crate::geometry::Mesh;
use crate::loader::AssetLoader;
use crate::material::StandardMaterial;
use crate::params::{ParamValue, Parameter};
use crate::projection::{PerspectiveCamera, DEFAULT_FAR, DEFAULT_NEAR};
use crate::renderer::Renderer;
use crate::scene::{Scene, SceneObject};
use crate::surface::{scaled_buffer_size, Surface};
use crate::tonemap::ToneMapping;
use crate::transform::Transform;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Failed(String),
}

/// Progress of the two asset loads
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadStatus {
    pub mesh: LoadState,
    pub environment: LoadState,
}

/// Owns the scene, camera, controls and renderer of one drawable surface
/// and keeps them in step with the [`DisplayState`].
pub struct Viewer<R, S> {
    config: ViewerConfig,
    display: DisplayState,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    renderer: R,
    surface: S,
    status: LoadStatus,
    /// Bumped by every [`Viewer::load_assets`]; older completions are dropped
    generation: u64,
    token: AnimationToken,
}

impl<R: Renderer, S: Surface> Viewer<R, S> {
    /// Sets up scene, camera, controls and renderer for an attached surface.
    ///
    /// No assets are requested; see [`Viewer::attach`].
    pub fn new(config: ViewerConfig, surface: S, mut renderer: R) -> Self {
        let display = config.display.sanitized();

        let camera = PerspectiveCamera::new(
            display.fov,
            surface.aspect_ratio(),
            DEFAULT_NEAR,
            DEFAULT_FAR,
        );
        let controls = OrbitControls::new(&camera);

        renderer.set_antialias(true);
        renderer.set_tone_mapping(ToneMapping::AcesFilmic);
        renderer.set_tone_mapping_exposure(display.tone_mapping_exposure);

        let mut scene = Scene::new(StandardMaterial {
            color: display.color,
            metalness: display.metalness,
            roughness: display.roughness,
            wireframe: display.wireframe,
        });
        scene.background_blurriness = display.bg_blurriness;
        scene.background_intensity = display.bg_intensity;

        Self {
            config,
            display,
            scene,
            camera,
            controls,
            renderer,
            surface,
            status: LoadStatus::default(),
            generation: 0,
            token: AnimationToken::new(),
        }
    }

    /// Creates a viewer, sizes it to the surface and requests both assets.
    ///
    /// The host drives frames with [`Viewer::frame`] until it reports
    /// [`FrameStatus::Stopped`].
    pub fn attach(
        config: ViewerConfig,
        surface: S,
        renderer: R,
        loader: &dyn AssetLoader,
    ) -> Rc<RefCell<Self>>
    where
        R: 'static,
        S: 'static,
    {
        let viewer = Rc::new(RefCell::new(Self::new(config, surface, renderer)));
        viewer.borrow_mut().on_resize();
        Self::load_assets(&viewer, loader);
        viewer
    }

    /// Issues the mesh and environment loads.
    ///
    /// Each completion is applied as soon as it arrives, in whatever order.
    /// Calling this again supersedes loads still in flight from an earlier
    /// call. Completions arriving after the viewer is dropped or destroyed
    /// are discarded. The viewer must not be borrowed during this call.
    pub fn load_assets(this: &Rc<RefCell<Self>>, loader: &dyn AssetLoader)
    where
        R: 'static,
        S: 'static,
    {
        let (model, hdri, generation) = {
            let mut viewer = this.borrow_mut();
            viewer.status = LoadStatus::default();
            viewer.generation += 1;
            (
                viewer.config.model.clone(),
                viewer.config.hdri.clone(),
                viewer.generation,
            )
        };

        let weak = Rc::downgrade(this);
        loader.load_mesh(
            &model,
            Box::new(move |result| match Weak::upgrade(&weak) {
                Some(viewer) => {
                    let mut viewer = viewer.borrow_mut();
                    if viewer.is_current(generation) {
                        viewer.on_mesh_loaded(result);
                    }
                }
                None => debug!("viewer dropped before its mesh arrived"),
            }),
        );

        let weak = Rc::downgrade(this);
        loader.load_environment(
            &hdri,
            Box::new(move |result| match Weak::upgrade(&weak) {
                Some(viewer) => {
                    let mut viewer = viewer.borrow_mut();
                    if viewer.is_current(generation) {
                        viewer.on_environment_loaded(result);
                    }
                }
                None => debug!("viewer dropped before its environment map arrived"),
            }),
        );
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "dropping result of superseded load {} (current {})",
                generation, self.generation
            );
        }
        generation == self.generation
    }

    /// Shows a loaded mesh in place of any earlier one and frames the
    /// camera on it.
    pub fn on_mesh_loaded(&mut self, result: Result<Mesh, LoadError>) {
        if self.token.is_cancelled() {
            debug!("viewer destroyed, dropping mesh result");
            return;
        }

        let mesh = match result {
            Ok(mesh) => mesh,
            Err(err) => {
                error!("failed to load mesh {}: {}", self.config.model, err);
                self.status.mesh = LoadState::Failed(err.to_string());
                return;
            }
        };

        let transform = Transform::z_up();
        let bbox = mesh.bounding_box(&transform.matrix());
        self.scene.clear_objects();
        self.scene.add(SceneObject::new(mesh, transform));
        self.status.mesh = LoadState::Loaded;

        match bbox {
            Some(bbox) => {
                let frame = FrameGeometry::from_bounding_box(&bbox);
                self.camera.position = frame.camera_position();
                self.controls.target = frame.orbit_target();
                self.camera.look_at(frame.orbit_target());
                debug!(
                    "framed mesh: size {:?}, center {:?}",
                    frame.size, frame.center
                );
            }
            None => warn!(
                "mesh {} has no triangles, keeping the current camera",
                self.config.model
            ),
        }
    }

    /// Installs a loaded environment map as background and lighting.
    pub fn on_environment_loaded(&mut self, result: Result<EnvironmentMap, LoadError>) {
        if self.token.is_cancelled() {
            debug!("viewer destroyed, dropping environment result");
            return;
        }

        let mut texture = match result {
            Ok(texture) => texture,
            Err(err) => {
                error!("failed to load environment map {}: {}", self.config.hdri, err);
                self.status.environment = LoadState::Failed(err.to_string());
                return;
            }
        };

        texture.mapping = TextureMapping::EquirectangularReflection;
        let texture = Rc::new(texture);
        self.scene.set_background(Rc::clone(&texture));
        self.scene.set_environment(texture);
        self.scene.background_blurriness = self.display.bg_blurriness;
        self.scene.background_intensity = self.display.bg_intensity;
        self.status.environment = LoadState::Loaded;
    }

    /// One animation step: apply pending orbit input, then draw.
    pub fn frame(&mut self) -> Result<FrameStatus> {
        if self.token.is_cancelled() {
            return Ok(FrameStatus::Stopped);
        }

        self.controls.update(&mut self.camera);
        self.renderer.render(&self.scene, &self.camera)?;

        Ok(FrameStatus::Continue)
    }

    /// Resizes the buffer to the displayed size times the render scale and
    /// keeps the camera aspect in step with it.
    pub fn on_resize(&mut self) {
        let (width, height) =
            scaled_buffer_size(self.surface.displayed_size(), self.display.render_scale);

        self.surface.set_buffer_size(width, height);
        self.renderer.set_size(width, height);

        self.camera.aspect = width as f32 / height as f32;
        self.camera.update_projection_matrix();

        debug!("resized to {}x{}", width, height);
    }

    /// Handles a raw UI event payload for `param`.
    ///
    /// Invalid input is rejected and leaves every field untouched.
    pub fn on_change(&mut self, param: Parameter, raw: &str) -> Result<(), ParamError> {
        let value = param.parse(raw).map_err(|err| {
            warn!("rejected input: {}", err);
            err
        })?;
        self.set(param, value)
    }

    /// Typed counterpart of [`Viewer::on_change`].
    pub fn set(&mut self, param: Parameter, value: ParamValue) -> Result<(), ParamError> {
        let value = param.check(value)?;
        self.display.set(param, value);
        self.apply(param);
        Ok(())
    }

    /// Pushes one display field to the live object it drives.
    fn apply(&mut self, param: Parameter) {
        let display = self.display;
        match param {
            Parameter::RenderScale => self.on_resize(),
            Parameter::Fov => {
                self.camera.fov = display.fov;
                self.camera.update_projection_matrix();
            }
            Parameter::Wireframe => self.scene.material.wireframe = display.wireframe,
            Parameter::Color => self.scene.material.color = display.color,
            Parameter::Metalness => self.scene.material.metalness = display.metalness,
            Parameter::Roughness => self.scene.material.roughness = display.roughness,
            Parameter::BackgroundBlurriness => {
                self.scene.background_blurriness = display.bg_blurriness
            }
            Parameter::BackgroundIntensity => {
                self.scene.background_intensity = display.bg_intensity
            }
            Parameter::ToneMappingExposure => self
                .renderer
                .set_tone_mapping_exposure(display.tone_mapping_exposure),
        }
    }

    pub fn on_change_render_scale(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::RenderScale, raw)
    }

    pub fn on_change_fov(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::Fov, raw)
    }

    pub fn on_change_wireframe(&mut self, checked: bool) {
        self.display.wireframe = checked;
        self.apply(Parameter::Wireframe);
    }

    pub fn on_change_color(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::Color, raw)
    }

    pub fn on_change_metalness(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::Metalness, raw)
    }

    pub fn on_change_roughness(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::Roughness, raw)
    }

    pub fn on_bg_blurriness_change(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::BackgroundBlurriness, raw)
    }

    pub fn on_bg_intensity_change(&mut self, raw: &str) -> Result<(), ParamError> {
        self.on_change(Parameter::BackgroundIntensity, raw)
    }

    pub fn on_tone_mapping_exposure_change(
        &mut self,
        raw: &str,
    ) -> Result<(), ParamError> {
        self.on_change(Parameter::ToneMappingExposure, raw)
    }

    /// Stops the animation loop and ignores any load still in flight.
    pub fn destroy(&mut self) {
        if !self.token.is_cancelled() {
            info!("viewer destroyed");
            self.token.cancel();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token the host's frame callback watches to stop rescheduling.
    pub fn animation_token(&self) -> AnimationToken {
        self.token.clone()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    /// Orbit input goes here; it is applied on the next frame.
    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Layout changes go here; follow up with [`Viewer::on_resize`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<R, S> Drop for Viewer<R, S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::geometry::{Triangle, Vertex};
    use crate::loader::Completion;
    use crate::material::Color;
    use crate::renderer::SoftwareRenderer;
    use crate::surface::HeadlessSurface;
    use nalgebra::{Point3, Vector3};
    use std::collections::VecDeque;

    #[derive(Debug, Default)]
    struct RecordingRenderer {
        size: (u32, u32),
        antialias: bool,
        tone_mapping: ToneMapping,
        exposure: f32,
        frames: usize,
    }

    impl Renderer for RecordingRenderer {
        fn set_size(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }

        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn antialias(&self) -> bool {
            self.antialias
        }

        fn set_antialias(&mut self, antialias: bool) {
            self.antialias = antialias;
        }

        fn tone_mapping(&self) -> ToneMapping {
            self.tone_mapping
        }

        fn set_tone_mapping(&mut self, tone_mapping: ToneMapping) {
            self.tone_mapping = tone_mapping;
        }

        fn tone_mapping_exposure(&self) -> f32 {
            self.exposure
        }

        fn set_tone_mapping_exposure(&mut self, exposure: f32) {
            self.exposure = exposure;
        }

        fn render(&mut self, _: &Scene, _: &PerspectiveCamera) -> Result<(), RenderError> {
            self.frames += 1;
            Ok(())
        }
    }

    /// Holds completions until the test releases them, oldest first
    #[derive(Default)]
    struct ManualLoader {
        mesh: RefCell<VecDeque<(String, Completion<Mesh>)>>,
        environment: RefCell<VecDeque<(String, Completion<EnvironmentMap>)>>,
    }

    impl AssetLoader for ManualLoader {
        fn load_mesh(&self, source: &str, done: Completion<Mesh>) {
            self.mesh.borrow_mut().push_back((source.to_owned(), done));
        }

        fn load_environment(&self, source: &str, done: Completion<EnvironmentMap>) {
            self.environment
                .borrow_mut()
                .push_back((source.to_owned(), done));
        }
    }

    impl ManualLoader {
        fn finish_mesh(&self, result: Result<Mesh, LoadError>) {
            let next = self.mesh.borrow_mut().pop_front();
            let (_, done) = next.expect("mesh load was not issued");
            done(result);
        }

        fn finish_environment(&self, result: Result<EnvironmentMap, LoadError>) {
            let next = self.environment.borrow_mut().pop_front();
            let (_, done) = next.expect("environment load was not issued");
            done(result);
        }
    }

    type TestViewer = Viewer<RecordingRenderer, HeadlessSurface>;

    fn attach(loader: &ManualLoader) -> Rc<RefCell<TestViewer>> {
        Viewer::attach(
            ViewerConfig::default(),
            HeadlessSurface::new(800.0, 600.0),
            RecordingRenderer::default(),
            loader,
        )
    }

    fn environment() -> EnvironmentMap {
        EnvironmentMap::new(4, 2, vec![[0.5; 3]; 8]).unwrap()
    }

    /// One triangle in Z-up model space spanning (0..4, 0..2, 0..6)
    fn wedge() -> Mesh {
        let v = |x, y, z| Vertex::new(Point3::new(x, y, z), Vector3::z());
        Mesh {
            triangles: vec![Triangle::new(
                v(0.0, 0.0, 0.0),
                v(4.0, 0.0, 0.0),
                v(4.0, 2.0, 6.0),
            )],
        }
    }

    #[test]
    fn test_new_sets_up_camera_and_renderer() {
        let viewer = Viewer::new(
            ViewerConfig::default(),
            HeadlessSurface::new(800.0, 600.0),
            RecordingRenderer::default(),
        );

        let camera = viewer.camera();
        assert_eq!(camera.fov, 45.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!(viewer.renderer().antialias());
        assert_eq!(viewer.renderer().tone_mapping(), ToneMapping::AcesFilmic);
        assert_eq!(viewer.renderer().tone_mapping_exposure(), 1.0);
        assert_eq!(viewer.scene().material.color, Color::ALUMINIUM);
        assert_eq!(viewer.scene().background_intensity, 0.5);
    }

    #[test]
    fn test_attach_requests_configured_assets() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);

        assert_eq!(
            loader.mesh.borrow().front().map(|(s, _)| s.clone()),
            Some("assets/models/hero_statue.stl".to_owned())
        );
        assert_eq!(
            loader.environment.borrow().front().map(|(s, _)| s.clone()),
            Some("assets/hdri/cyclorama_hard_light_2k.hdr".to_owned())
        );
        assert_eq!(*viewer.borrow().load_status(), LoadStatus::default());
    }

    #[test]
    fn test_resize_applies_render_scale() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let viewer = viewer.borrow();

        assert_eq!(viewer.surface().buffer_size(), (600, 450));
        assert_eq!(viewer.renderer().size(), (600, 450));
        assert!((viewer.camera().aspect - 1.333).abs() < 1e-3);
    }

    #[test]
    fn test_resize_tracks_surface_layout() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();

        viewer.surface_mut().set_displayed_size(1024.0, 512.0);
        viewer.on_resize();

        assert_eq!(viewer.surface().buffer_size(), (768, 384));
        assert!((viewer.camera().aspect - 2.0).abs() < 1e-6);
        let expected = PerspectiveCamera::new(45.0, 2.0, 0.1, 1000.0);
        assert_eq!(viewer.camera().projection_matrix(), expected.projection_matrix());
    }

    #[test]
    fn test_render_scale_change_resizes() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();

        viewer.on_change_render_scale("0.5").unwrap();
        assert_eq!(viewer.display().render_scale, 0.5);
        assert_eq!(viewer.renderer().size(), (400, 300));
    }

    #[test]
    fn test_mesh_load_frames_camera() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        loader.finish_mesh(Ok(wedge()));

        let mut viewer = viewer.borrow_mut();
        // rotated to Y-up: bounds (0, 0, -2)..(4, 6, 0), size (4, 6, 2), center (2, 3, -1)
        let expected = Point3::new(2.0 + 0.66 * 4.0, 3.0 + 6.0, -1.0 + 3.0 * 2.0);
        assert!((viewer.camera().position - expected).norm() < 1e-4);
        assert!((viewer.controls().target - Point3::new(2.0, 3.0, -1.0)).norm() < 1e-5);
        assert_eq!(viewer.scene().objects().len(), 1);
        assert_eq!(viewer.load_status().mesh, LoadState::Loaded);

        viewer.frame().unwrap();
        assert!((viewer.camera().position - expected).norm() < 1e-3);
        assert!((viewer.camera().target - Point3::new(2.0, 3.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_reload_replaces_mesh() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        loader.finish_mesh(Ok(Mesh::cube(2.0)));
        loader.finish_environment(Ok(environment()));

        Viewer::load_assets(&viewer, &loader);
        assert_eq!(*viewer.borrow().load_status(), LoadStatus::default());
        loader.finish_mesh(Ok(wedge()));

        let viewer = viewer.borrow();
        assert_eq!(viewer.scene().objects().len(), 1);
        assert_eq!(viewer.scene().objects()[0].mesh.triangles.len(), 1);
        assert!((viewer.controls().target - Point3::new(2.0, 3.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_superseded_loads_are_ignored() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        Viewer::load_assets(&viewer, &loader);
        let before = viewer.borrow().camera().position;

        // Results of the first request arrive after the second was issued
        loader.finish_mesh(Ok(Mesh::cube(2.0)));
        loader.finish_environment(Err(LoadError::Fetch {
            asset: "assets/hdri/cyclorama_hard_light_2k.hdr".to_owned(),
            reason: "HTTP 500".to_owned(),
        }));
        {
            let viewer = viewer.borrow();
            assert!(viewer.scene().objects().is_empty());
            assert_eq!(viewer.camera().position, before);
            assert_eq!(*viewer.load_status(), LoadStatus::default());
        }

        loader.finish_mesh(Ok(wedge()));
        loader.finish_environment(Ok(environment()));

        let viewer = viewer.borrow();
        assert_eq!(viewer.scene().objects().len(), 1);
        assert_eq!(viewer.load_status().mesh, LoadState::Loaded);
        assert_eq!(viewer.load_status().environment, LoadState::Loaded);
        assert_environment_installed(&viewer);
    }

    #[test]
    fn test_empty_mesh_keeps_camera() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let before = viewer.borrow().camera().position;

        loader.finish_mesh(Ok(Mesh::new()));

        let viewer = viewer.borrow();
        assert_eq!(viewer.camera().position, before);
        assert_eq!(viewer.load_status().mesh, LoadState::Loaded);
    }

    fn assert_environment_installed(viewer: &TestViewer) {
        let scene = viewer.scene();
        let background = scene.background().unwrap();
        assert_eq!(background.mapping, TextureMapping::EquirectangularReflection);
        assert!(scene.environment().is_some());
        assert!(scene.shares_background_and_environment());
        assert_eq!(scene.background_blurriness, viewer.display().bg_blurriness);
        assert_eq!(scene.background_intensity, viewer.display().bg_intensity);
    }

    #[test]
    fn test_environment_before_mesh() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);

        loader.finish_environment(Ok(environment()));
        assert_environment_installed(&viewer.borrow());
        assert!(viewer.borrow().scene().objects().is_empty());

        loader.finish_mesh(Ok(wedge()));
        assert_environment_installed(&viewer.borrow());
        assert_eq!(viewer.borrow().scene().objects().len(), 1);
    }

    #[test]
    fn test_environment_after_mesh() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);

        loader.finish_mesh(Ok(wedge()));
        loader.finish_environment(Ok(environment()));

        assert_environment_installed(&viewer.borrow());
        assert_eq!(viewer.borrow().load_status().environment, LoadState::Loaded);
    }

    #[test]
    fn test_environment_uses_current_display_state() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        viewer.borrow_mut().on_bg_blurriness_change("0.2").unwrap();
        viewer.borrow_mut().on_bg_intensity_change("3").unwrap();

        loader.finish_environment(Ok(environment()));

        let viewer = viewer.borrow();
        assert_eq!(viewer.scene().background_blurriness, 0.2);
        assert_eq!(viewer.scene().background_intensity, 3.0);
    }

    #[test]
    fn test_load_failure_is_reported() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);

        loader.finish_mesh(Err(LoadError::Fetch {
            asset: "assets/models/hero_statue.stl".to_owned(),
            reason: "HTTP 404".to_owned(),
        }));

        let mut viewer = viewer.borrow_mut();
        match &viewer.load_status().mesh {
            LoadState::Failed(reason) => assert!(reason.contains("HTTP 404")),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(viewer.scene().objects().is_empty());
        assert_eq!(viewer.frame().unwrap(), FrameStatus::Continue);
    }

    fn snapshot(viewer: &TestViewer) -> (DisplayState, StandardMaterial, [f32; 3], (u32, u32), f32) {
        (
            *viewer.display(),
            viewer.scene().material.clone(),
            [
                viewer.scene().background_blurriness,
                viewer.scene().background_intensity,
                viewer.camera().fov,
            ],
            viewer.renderer().size(),
            viewer.renderer().tone_mapping_exposure(),
        )
    }

    #[test]
    fn test_handlers_are_idempotent() {
        let inputs = [
            (Parameter::RenderScale, "1.25"),
            (Parameter::Fov, "60"),
            (Parameter::Wireframe, "true"),
            (Parameter::Color, "#336699"),
            (Parameter::Metalness, "0.3"),
            (Parameter::Roughness, "0.9"),
            (Parameter::BackgroundBlurriness, "0.1"),
            (Parameter::BackgroundIntensity, "2"),
            (Parameter::ToneMappingExposure, "1.7"),
        ];

        for (param, raw) in inputs {
            let loader = ManualLoader::default();
            let viewer = attach(&loader);
            let mut viewer = viewer.borrow_mut();

            viewer.on_change(param, raw).unwrap();
            let once = snapshot(&viewer);
            viewer.on_change(param, raw).unwrap();
            assert_eq!(snapshot(&viewer), once, "{} is not idempotent", param);
        }
    }

    #[test]
    fn test_each_handler_drives_its_target() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();

        viewer.on_change_fov("60").unwrap();
        viewer.on_change_wireframe(true);
        viewer.on_change_roughness("0.9").unwrap();
        viewer.on_tone_mapping_exposure_change("1.7").unwrap();

        assert_eq!(viewer.camera().fov, 60.0);
        let expected = PerspectiveCamera::new(60.0, viewer.camera().aspect, 0.1, 1000.0);
        assert_eq!(viewer.camera().projection_matrix(), expected.projection_matrix());
        assert!(viewer.scene().material.wireframe);
        assert_eq!(viewer.scene().material.roughness, 0.9);
        assert_eq!(viewer.renderer().tone_mapping_exposure(), 1.7);
    }

    #[test]
    fn test_color_survives_metalness_change() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();

        viewer.on_change_color("#ff0000").unwrap();
        assert_eq!(viewer.scene().material.color, Color::RED);

        viewer.on_change_metalness("0.2").unwrap();
        assert_eq!(viewer.scene().material.color, Color::RED);
        assert_eq!(viewer.scene().material.metalness, 0.2);
    }

    #[test]
    fn test_invalid_input_changes_nothing() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();
        let before = snapshot(&viewer);

        assert!(viewer.on_change_fov("wide").is_err());
        assert!(viewer.on_change_color("blue").is_err());
        assert!(viewer.on_change_render_scale("NaN").is_err());
        assert!(viewer.set(Parameter::Metalness, ParamValue::Flag(true)).is_err());

        assert_eq!(snapshot(&viewer), before);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let mut viewer = viewer.borrow_mut();

        viewer.on_change_metalness("3").unwrap();
        viewer.on_change_fov("0").unwrap();

        assert_eq!(viewer.scene().material.metalness, 1.0);
        assert_eq!(viewer.camera().fov, 1.0);
    }

    #[test]
    fn test_destroy_stops_frames() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let token = viewer.borrow().animation_token();
        let mut viewer = viewer.borrow_mut();

        assert_eq!(viewer.frame().unwrap(), FrameStatus::Continue);
        viewer.destroy();

        assert!(token.is_cancelled());
        assert_eq!(viewer.frame().unwrap(), FrameStatus::Stopped);
        assert_eq!(viewer.renderer().frames, 1);
    }

    #[test]
    fn test_loads_after_destroy_are_ignored() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        viewer.borrow_mut().destroy();

        loader.finish_mesh(Ok(wedge()));
        loader.finish_environment(Ok(environment()));

        let viewer = viewer.borrow();
        assert!(viewer.scene().objects().is_empty());
        assert!(viewer.scene().background().is_none());
    }

    #[test]
    fn test_loads_after_drop_are_ignored() {
        let loader = ManualLoader::default();
        let viewer = attach(&loader);
        let token = viewer.borrow().animation_token();
        drop(viewer);

        assert!(token.is_cancelled());
        loader.finish_mesh(Ok(wedge()));
        loader.finish_environment(Ok(environment()));
    }

    #[test]
    fn test_software_rendered_frame_shows_mesh() {
        let loader = ManualLoader::default();
        let viewer = Viewer::attach(
            ViewerConfig::default(),
            HeadlessSurface::new(80.0, 60.0),
            SoftwareRenderer::default(),
            &loader,
        );
        loader.finish_mesh(Ok(Mesh::cube(2.0)));
        loader.finish_environment(Ok(environment()));

        let mut viewer = viewer.borrow_mut();
        viewer.on_change_render_scale("1").unwrap();
        assert_eq!(viewer.frame().unwrap(), FrameStatus::Continue);

        let renderer = viewer.renderer();
        assert_eq!(renderer.size(), (80, 60));
        let center = renderer.pixel(40, 30).unwrap();
        assert_eq!(center[3], 255);
        assert!(center[0] > 0);
    }
}
