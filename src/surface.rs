//! Collaborator traits for the underlying surface and the sizing field.
//!
//! The triangulator never owns geometry: it sees the surface through
//! [`Surface`] and the desired element sizes through [`FeatureSize`], both
//! as read-only borrows. A handful of concrete implementations cover the
//! common cases and keep the examples and tests self-contained.
//!
//! # Example
//!
//! ```
//! use tessella::surface::{FeatureSize, PlaneSurface, Surface};
//! use nalgebra::Point3;
//!
//! let p = PlaneSurface.eval_point(0.25, 0.5);
//! assert_eq!(p, Point3::new(0.25, 0.5, 0.0));
//!
//! // Closures are feature-size fields.
//! let field = |x: &Point3<f64>| 0.1 + 0.05 * x.x.abs();
//! assert!(field.feature_size(&p) > 0.0);
//! ```

use nalgebra::{Point3, Vector3};

/// A parametric surface `(u, v) → (x, y, z)`.
///
/// Implementations must be deterministic and reentrant; the triangulator
/// evaluates each point exactly once and caches the result.
pub trait Surface {
    /// Evaluate the surface position at parameter `(u, v)`.
    fn eval_point(&self, u: f64, v: f64) -> Point3<f64>;

    /// Evaluate the surface position and first derivatives at `(u, v)`.
    ///
    /// Returns `(X, ∂X/∂u, ∂X/∂v)`.
    fn eval_deriv(&self, u: f64, v: f64) -> (Point3<f64>, Vector3<f64>, Vector3<f64>);
}

/// A positive scalar field giving the desired element edge length at a
/// location in 3D space.
pub trait FeatureSize {
    /// The desired edge length near `x`. Must be strictly positive.
    fn feature_size(&self, x: &Point3<f64>) -> f64;
}

impl<F> FeatureSize for F
where
    F: Fn(&Point3<f64>) -> f64,
{
    fn feature_size(&self, x: &Point3<f64>) -> f64 {
        self(x)
    }
}

/// The identity embedding of the parameter domain: `(u, v) ↦ (u, v, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneSurface;

impl Surface for PlaneSurface {
    fn eval_point(&self, u: f64, v: f64) -> Point3<f64> {
        Point3::new(u, v, 0.0)
    }

    fn eval_deriv(&self, u: f64, v: f64) -> (Point3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            Point3::new(u, v, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        )
    }
}

/// A right circular cylinder: `(u, v) ↦ (r cos u, r sin u, v)`.
///
/// Useful for exercising the parameter-to-3D distortion handling: a step
/// in `u` covers `r` times more surface than the same step in `v` only
/// when `r = 1`.
#[derive(Debug, Clone, Copy)]
pub struct CylinderSurface {
    /// Cylinder radius.
    pub radius: f64,
}

impl CylinderSurface {
    /// Create a cylinder of the given radius.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Surface for CylinderSurface {
    fn eval_point(&self, u: f64, v: f64) -> Point3<f64> {
        Point3::new(self.radius * u.cos(), self.radius * u.sin(), v)
    }

    fn eval_deriv(&self, u: f64, v: f64) -> (Point3<f64>, Vector3<f64>, Vector3<f64>) {
        (
            self.eval_point(u, v),
            Vector3::new(-self.radius * u.sin(), self.radius * u.cos(), 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
    }
}

/// A constant feature size.
#[derive(Debug, Clone, Copy)]
pub struct UniformFeatureSize {
    /// The edge length everywhere.
    pub h: f64,
}

impl UniformFeatureSize {
    /// Create a uniform field with edge length `h`.
    pub fn new(h: f64) -> Self {
        Self { h }
    }
}

impl FeatureSize for UniformFeatureSize {
    fn feature_size(&self, _x: &Point3<f64>) -> f64 {
        self.h
    }
}

/// A refinement source for [`PointFeatureSize`].
#[derive(Debug, Clone, Copy)]
pub struct SizeSource {
    /// Center of the refined region.
    pub center: Point3<f64>,
    /// Edge length at the center.
    pub h: f64,
    /// Radius over which the size ramps back to the background value.
    pub radius: f64,
}

/// A background size with localized refinement around point sources.
///
/// Within `radius` of a source the size ramps linearly from the source's
/// `h` up to `hmax`; overlapping sources take the minimum.
#[derive(Debug, Clone)]
pub struct PointFeatureSize {
    /// Background edge length away from every source.
    pub hmax: f64,
    /// Refinement sources.
    pub sources: Vec<SizeSource>,
}

impl PointFeatureSize {
    /// Create a field with background size `hmax` and the given sources.
    pub fn new(hmax: f64, sources: Vec<SizeSource>) -> Self {
        Self { hmax, sources }
    }
}

impl FeatureSize for PointFeatureSize {
    fn feature_size(&self, x: &Point3<f64>) -> f64 {
        let mut h = self.hmax;
        for src in &self.sources {
            let d = (x - src.center).norm();
            if d < src.radius {
                let t = d / src.radius;
                h = h.min(src.h + t * (self.hmax - src.h));
            }
        }
        h
    }
}
