/// Axis-aligned bounds and the camera framing derived from them
use nalgebra::{Point3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Smallest box enclosing every point, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bbox = Self::from_point(points.next()?);

        for point in points {
            bbox.expand_by_point(&point);
        }

        Some(bbox)
    }

    pub fn expand_by_point(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Size and centre of a freshly loaded mesh.
///
/// Only used to seed the initial camera pose; nothing keeps it in sync with
/// the scene afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameGeometry {
    pub size: Vector3<f32>,
    pub center: Point3<f32>,
}

impl FrameGeometry {
    pub fn from_bounding_box(bbox: &BoundingBox) -> Self {
        Self {
            size: bbox.size(),
            center: bbox.center(),
        }
    }

    /// Empirical framing: off to one side, above, and back by three depths.
    ///
    /// This does not guarantee the whole object is visible at every aspect ratio.
    pub fn camera_position(&self) -> Point3<f32> {
        self.center + Vector3::new(self.size.x * 0.66, self.size.y, self.size.z * 3.0)
    }

    pub fn orbit_target(&self) -> Point3<f32> {
        self.center
    }
}
