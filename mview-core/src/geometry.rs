/// Triangle mesh primitives produced by the STL decoder
use nalgebra::{Matrix4, Point3, Vector3};

use crate::bounds::BoundingBox;

/// A mesh vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the counter-clockwise winding of the vertices.
    ///
    /// Degenerate triangles yield the zero vector rather than NaNs.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [a, b, c] = self.vertices.map(|v| v.position);
        (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

/// An indexed-free triangle soup, as stored in STL files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// World-space bounds of every vertex after `model` is applied.
    pub fn bounding_box(&self, model: &Matrix4<f32>) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.triangles
                .iter()
                .flat_map(|t| t.vertices.iter())
                .map(|v| model.transform_point(&v.position)),
        )
    }

    /// Axis-aligned cube centred on the origin, two triangles per face.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        // (normal, u axis, v axis) per face; u x v == normal keeps the winding outward
        let faces = [
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
        ];

        let mut mesh = Self::with_capacity(12);
        for (n, u, v) in faces {
            let corner = |su: f32, sv: f32| {
                Vertex::new(Point3::from((n + u * su + v * sv) * h), n)
            };
            let quad = [
                corner(-1.0, -1.0),
                corner(1.0, -1.0),
                corner(1.0, 1.0),
                corner(-1.0, 1.0),
            ];
            mesh.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
            mesh.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
        }

        mesh
    }
}
