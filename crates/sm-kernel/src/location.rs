//! Shape placement in 3D space

use std::ops::Mul;

use glam::{DMat4, DVec3, DVec4};

/// Placement of a shape relative to its parent.
///
/// Locations compose top-down: `parent * local` yields the placement of the
/// child in the parent's parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    matrix: DMat4,
}

impl Default for Location {
    fn default() -> Self {
        Self::identity()
    }
}

impl Location {
    /// The identity placement
    pub fn identity() -> Self {
        Self {
            matrix: DMat4::IDENTITY,
        }
    }

    /// Create a location from a column-major matrix
    pub fn from_matrix(matrix: DMat4) -> Self {
        Self { matrix }
    }

    /// Pure translation
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            matrix: DMat4::from_translation(translation),
        }
    }

    /// Create a location from an axis placement
    ///
    /// # Arguments
    /// * `origin` - Origin of the local frame
    /// * `axis` - Local Z direction
    /// * `ref_direction` - Approximate local X direction (projected onto the plane
    ///   normal to `axis`)
    pub fn from_axis_placement(origin: DVec3, axis: DVec3, ref_direction: DVec3) -> Self {
        let z = axis.try_normalize().unwrap_or(DVec3::Z);
        // Gram-Schmidt so X is orthogonal to Z even for sloppy exporters
        let x = (ref_direction - z * ref_direction.dot(z))
            .try_normalize()
            .unwrap_or_else(|| z.any_orthonormal_vector());
        let y = z.cross(x);

        Self {
            matrix: DMat4::from_cols(
                x.extend(0.0),
                y.extend(0.0),
                z.extend(0.0),
                DVec4::new(origin.x, origin.y, origin.z, 1.0),
            ),
        }
    }

    /// Translation part of the placement
    pub fn translation(&self) -> DVec3 {
        self.matrix.w_axis.truncate()
    }

    /// Check whether this is the identity placement
    pub fn is_identity(&self) -> bool {
        self.matrix.abs_diff_eq(DMat4::IDENTITY, 1e-12)
    }

    /// Inverse placement
    pub fn inverted(&self) -> Self {
        Self {
            matrix: self.matrix.inverse(),
        }
    }

    /// Transform a point (translation applies)
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, vector: DVec3) -> DVec3 {
        self.matrix.transform_vector3(vector)
    }
}

impl Mul for Location {
    type Output = Location;

    fn mul(self, rhs: Location) -> Location {
        Location {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_default() {
        assert!(Location::default().is_identity());
        assert!(!Location::from_translation(DVec3::X).is_identity());
    }

    #[test]
    fn test_composition_order() {
        let parent = Location::from_translation(DVec3::new(10.0, 0.0, 0.0));
        // Quarter turn about Z
        let local = Location::from_axis_placement(DVec3::ZERO, DVec3::Z, DVec3::Y);

        let combined = parent * local;
        let p = combined.transform_point(DVec3::new(1.0, 0.0, 0.0));

        assert_relative_eq!(p.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_placement_orthogonalizes_ref_direction() {
        let loc = Location::from_axis_placement(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::Z,
            DVec3::new(1.0, 0.0, 0.5),
        );
        let x = loc.transform_vector(DVec3::X);
        assert_relative_eq!(x.length(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(x.z, 0.0, epsilon = 1e-12);
        assert_eq!(loc.translation(), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let loc = Location::from_axis_placement(DVec3::new(5.0, -2.0, 1.0), DVec3::X, DVec3::Y);
        let p = DVec3::new(0.3, 0.7, -1.1);
        let back = loc.inverted().transform_point(loc.transform_point(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
        assert_relative_eq!(back.z, p.z, epsilon = 1e-12);
    }

    #[test]
    fn test_vector_ignores_translation() {
        let loc = Location::from_translation(DVec3::new(3.0, 3.0, 3.0));
        assert_eq!(loc.transform_vector(DVec3::Z), DVec3::Z);
    }
}
