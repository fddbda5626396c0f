/// mview Core Library - Model viewer shared by every host
///
/// Loads an STL mesh and an equirectangular HDR environment, frames the
/// camera on the mesh, and keeps the scene in step with a small set of
/// UI-bound display settings. Hosts supply the drawable surface, the
/// renderer output and the way asset bytes are fetched.

pub mod animation;
pub mod bounds;
pub mod config;
pub mod controls;
pub mod display;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod hdr;
pub mod loader;
pub mod material;
pub mod params;
pub mod projection;
pub mod renderer;
pub mod scene;
pub mod stl;
pub mod surface;
pub mod tonemap;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use animation::{AnimationToken, FrameStatus};
pub use bounds::{BoundingBox, FrameGeometry};
pub use config::ViewerConfig;
pub use controls::OrbitControls;
pub use display::DisplayState;
pub use environment::{EnvironmentMap, TextureMapping};
pub use error::{LoadError, ParamError, RenderError, StlError, ViewerError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use loader::{AssetLoader, Completion, DecodingLoader, Fetch, FileFetcher};
pub use material::{Color, StandardMaterial};
pub use params::{ParamKind, ParamValue, Parameter};
pub use projection::PerspectiveCamera;
pub use renderer::{Renderer, RendererSettings, SoftwareRenderer};
pub use scene::{Scene, SceneObject};
pub use surface::{HeadlessSurface, Surface};
pub use tonemap::ToneMapping;
pub use transform::{Rotation, Transform};
pub use viewer::{LoadState, LoadStatus, Viewer};
