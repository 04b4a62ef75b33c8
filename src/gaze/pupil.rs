//! PupilLocator: 3D pupil and eyeball center of one eye from its landmarks.

use nalgebra::{Unit, Vector3};
use tracing::trace;

use crate::config::LocatorSettings;
use crate::error::{GazeError, Result};
use crate::gaze::eyeball::EyeballModel;
use crate::geometry::{centroid, fit_plane, intersect_ray_sphere, principal_spread};
use crate::landmarks::LandmarkSnapshot;

/// Iris landmarks whose principal variance (mm²) is at or below this are
/// treated as coincident.
const MIN_IRIS_SPREAD_MM2: f64 = 1e-6;

/// Pupil and eyeball center of one eye, in the snapshot's frame (camera
/// space, mm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeGeometry {
    pub pupil: Vector3<f64>,
    pub eyeball_center: Vector3<f64>,
}

/// Locate the pupil and the eyeball center.
///
/// - pupil: centroid of the iris landmarks,
/// - eyeball center: socket centroid pushed one eyeball radius along the
///   socket plane normal, away from the camera.
///
/// Fails with `InvalidLandmarkSet` if too few socket or iris landmarks are
/// present, if the iris landmarks coincide, or if the socket contour is
/// collinear.
pub fn locate_pupil_3d(
    snapshot: &LandmarkSnapshot,
    model: &EyeballModel,
    settings: &LocatorSettings,
) -> Result<EyeGeometry> {
    let side = model.side();

    let iris = snapshot.gather(model.iris_indices());
    if iris.len() < settings.min_iris_points {
        return Err(GazeError::landmarks(
            side,
            format!(
                "{} of {} iris landmarks present, need {}",
                iris.len(),
                model.iris_indices().len(),
                settings.min_iris_points
            ),
        ));
    }

    if principal_spread(&iris).is_none_or(|spread| spread <= MIN_IRIS_SPREAD_MM2) {
        return Err(GazeError::landmarks(side, "iris landmarks coincide"));
    }

    let socket = snapshot.gather(model.socket_indices());
    if socket.len() < settings.min_socket_points {
        return Err(GazeError::landmarks(
            side,
            format!(
                "{} of {} eye-socket landmarks present, need {}",
                socket.len(),
                model.socket_indices().len(),
                settings.min_socket_points
            ),
        ));
    }

    let plane = fit_plane(&socket, settings.collinearity_tolerance)
        .ok_or_else(|| GazeError::landmarks(side, "eye-socket landmarks are collinear"))?;

    // The eyeball sits behind the socket, on the far side from the camera.
    let normal = if plane.normal.dot(&plane.centroid) < 0.0
        || (plane.centroid.norm_squared() == 0.0 && plane.normal.z < 0.0)
    {
        -plane.normal
    } else {
        plane.normal
    };
    let eyeball_center = plane.centroid + normal.as_ref() * model.radius();

    let mut pupil = centroid(&iris).ok_or_else(|| GazeError::landmarks(side, "no iris landmarks"))?;
    if settings.project_pupil_onto_sphere {
        if let Some(ray) = Unit::try_new(pupil, 1e-9) {
            if let Some(hit) =
                intersect_ray_sphere(&Vector3::zeros(), &ray, &eyeball_center, model.radius())
            {
                pupil = hit;
            }
        }
    }

    trace!(
        %side,
        socket_points = socket.len(),
        iris_points = iris.len(),
        "located pupil"
    );

    Ok(EyeGeometry {
        pupil,
        eyeball_center,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use crate::gaze::EyeSide;
    use crate::geometry::HeadPose;
    use crate::landmarks::{LandmarkLayout, SyntheticFace};

    fn model(side: EyeSide) -> EyeballModel {
        EyeballModel::new(side, 12.0, &LandmarkLayout::clnf_with_eyes()).unwrap()
    }

    fn face(gaze: Vector3<f64>) -> SyntheticFace {
        SyntheticFace::looking(gaze, 12.0).with_head_pose(HeadPose::from_euler(
            Vector3::new(0.0, 0.0, 500.0),
            0.0,
            0.0,
            0.0,
        ))
    }

    #[test]
    fn test_recovers_synthetic_geometry() {
        let face = face(Vector3::new(0.2, -0.1, -1.0));
        let snap = face.snapshot(0);
        for side in EyeSide::BOTH {
            let geom = locate_pupil_3d(&snap, &model(side), &LocatorSettings::default()).unwrap();
            let eye = face.eye(side);
            assert_relative_eq!(geom.eyeball_center, face.eyeball_center_cam(side), epsilon = 1e-9);
            assert_relative_eq!(
                geom.pupil,
                face.head_pose.transform_point(&eye.pupil()),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_eyeball_center_lies_behind_socket() {
        let snap = face(Vector3::new(0.0, 0.0, -1.0)).snapshot(0);
        let geom = locate_pupil_3d(&snap, &model(EyeSide::Left), &LocatorSettings::default()).unwrap();
        assert!(geom.eyeball_center.z > geom.pupil.z);
        assert_relative_eq!((geom.eyeball_center - geom.pupil).norm(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_too_few_iris_points() {
        let m = model(EyeSide::Left);
        let snap = LandmarkSnapshot::from_indexed(
            0,
            m.socket_indices()
                .iter()
                .enumerate()
                .map(|(k, &i)| (i, Vector3::new(k as f64, (k * k) as f64, 500.0)))
                .chain([(m.iris_indices()[0], Vector3::new(0.0, 0.0, 490.0))]),
        );
        let err = locate_pupil_3d(&snap, &m, &LocatorSettings::default()).unwrap_err();
        assert!(matches!(err, GazeError::InvalidLandmarkSet { side: EyeSide::Left, .. }));
    }

    #[test]
    fn test_coincident_iris_points_rejected() {
        let m = model(EyeSide::Left);
        let socket = m
            .socket_indices()
            .iter()
            .enumerate()
            .map(|(k, &i)| {
                let a = k as f64;
                (i, Vector3::new(10.0 * a.cos(), 4.0 * a.sin(), 500.0))
            });
        let iris = m
            .iris_indices()
            .iter()
            .map(|&i| (i, Vector3::new(0.0, 0.0, 490.0)));
        let snap = LandmarkSnapshot::from_indexed(0, socket.chain(iris));
        let err = locate_pupil_3d(&snap, &m, &LocatorSettings::default()).unwrap_err();
        match err {
            GazeError::InvalidLandmarkSet { side, reason } => {
                assert_eq!(side, EyeSide::Left);
                assert!(reason.contains("coincide"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_collinear_socket_rejected() {
        let m = model(EyeSide::Right);
        let socket = m
            .socket_indices()
            .iter()
            .enumerate()
            .map(|(k, &i)| (i, Vector3::new(k as f64 * 2.0, 0.0, 500.0)));
        let iris = m
            .iris_indices()
            .iter()
            .enumerate()
            .map(|(k, &i)| (i, Vector3::new((k as f64).cos(), (k as f64).sin(), 490.0)));
        let snap = LandmarkSnapshot::from_indexed(0, socket.chain(iris));
        let err = locate_pupil_3d(&snap, &m, &LocatorSettings::default()).unwrap_err();
        assert!(matches!(err, GazeError::InvalidLandmarkSet { side: EyeSide::Right, .. }));
    }

    #[test]
    fn test_empty_snapshot_rejected() {
        let snap = LandmarkSnapshot::new(0, Vec::new());
        assert!(locate_pupil_3d(&snap, &model(EyeSide::Left), &LocatorSettings::default()).is_err());
    }

    #[test]
    fn test_sphere_projection_keeps_on_sphere_pupil() {
        let face = face(Vector3::new(0.1, 0.05, -1.0));
        let snap = face.snapshot(0);
        let settings = LocatorSettings {
            project_pupil_onto_sphere: true,
            ..LocatorSettings::default()
        };
        let m = model(EyeSide::Left);
        let plain = locate_pupil_3d(&snap, &m, &LocatorSettings::default()).unwrap();
        let projected = locate_pupil_3d(&snap, &m, &settings).unwrap();
        assert_relative_eq!(
            (projected.pupil - projected.eyeball_center).norm(),
            12.0,
            epsilon = 1e-6
        );
        assert_relative_eq!(projected.pupil, plain.pupil, epsilon = 1e-6);
    }
}
