//! Small geometric estimators over landmark point sets.

use nalgebra::{Matrix3, Unit, Vector3};

/// Least-squares plane through a point set.
#[derive(Debug, Clone, Copy)]
pub struct PlaneFit {
    pub centroid: Vector3<f64>,
    /// Unit normal (eigenvector of the smallest covariance eigenvalue).
    /// The sign is arbitrary; callers orient it.
    pub normal: Unit<Vector3<f64>>,
    /// Covariance eigenvalues, ascending.
    pub eigenvalues: [f64; 3],
}

pub fn centroid(points: &[Vector3<f64>]) -> Option<Vector3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().sum();
    Some(sum / points.len() as f64)
}

/// Fit a plane to `points`.
///
/// Returns `None` for fewer than three points, and for degenerate sets whose
/// second-largest spread is below `collinearity_tolerance` times the largest
/// (collinear or coincident points have no defined plane).
pub fn fit_plane(points: &[Vector3<f64>], collinearity_tolerance: f64) -> Option<PlaneFit> {
    if points.len() < 3 {
        return None;
    }
    let centroid = centroid(points)?;
    let eigen = covariance(points, &centroid).symmetric_eigen();
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
    let eigenvalues = order.map(|i| eigen.eigenvalues[i]);

    let largest = eigenvalues[2];
    if !largest.is_finite() || largest <= 0.0 {
        return None;
    }
    if eigenvalues[1] <= collinearity_tolerance * largest {
        return None;
    }

    let normal = Unit::try_new(eigen.eigenvectors.column(order[0]).into_owned(), 1e-12)?;
    Some(PlaneFit {
        centroid,
        normal,
        eigenvalues,
    })
}

/// Largest covariance eigenvalue (mm²): the variance of `points` along their
/// principal direction. Zero for coincident points.
pub fn principal_spread(points: &[Vector3<f64>]) -> Option<f64> {
    let centroid = centroid(points)?;
    let eigen = covariance(points, &centroid).symmetric_eigen();
    Some(eigen.eigenvalues.max())
}

fn covariance(points: &[Vector3<f64>], centroid: &Vector3<f64>) -> Matrix3<f64> {
    let mut cov = Matrix3::zeros();
    for p in points {
        let d = p - centroid;
        cov += d * d.transpose();
    }
    cov / points.len() as f64
}

/// Near intersection of the ray `origin + t * dir` (t >= 0) with a sphere.
pub fn intersect_ray_sphere(
    origin: &Vector3<f64>,
    dir: &Unit<Vector3<f64>>,
    center: &Vector3<f64>,
    radius: f64,
) -> Option<Vector3<f64>> {
    let oc = origin - center;
    let b = dir.dot(&oc);
    let c = oc.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t_near = -b - sqrt_disc;
    let t = if t_near >= 0.0 { t_near } else { -b + sqrt_disc };
    if t < 0.0 {
        return None;
    }
    Some(origin + dir.as_ref() * t)
}
