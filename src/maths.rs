use cgmath::{Deg, Matrix4, Vector3};

use crate::camera::Camera;

/// Model-space to world-space transform: translate, then rotate about X, Y
/// and Z in that order, then apply the uniform scale. Rotations are in
/// degrees.
pub fn create_transformation_matrix(
    translation: Vector3<f32>,
    rot_x: f32,
    rot_y: f32,
    rot_z: f32,
    scale: f32,
) -> Matrix4<f32> {
    Matrix4::from_translation(translation)
        * Matrix4::from_angle_x(Deg(rot_x))
        * Matrix4::from_angle_y(Deg(rot_y))
        * Matrix4::from_angle_z(Deg(rot_z))
        * Matrix4::from_scale(scale)
}

/// The inverse of the camera's transform: the world rotated and shifted so
/// the camera sits at the origin looking down negative Z.
pub fn create_view_matrix(camera: &Camera) -> Matrix4<f32> {
    Matrix4::from_angle_x(Deg(camera.pitch))
        * Matrix4::from_angle_y(Deg(camera.yaw))
        * Matrix4::from_angle_z(Deg(camera.roll))
        * Matrix4::from_translation(-camera.position)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{vec3, Matrix4, SquareMatrix, Vector4};

    use super::*;

    #[test]
    fn identity_transform_for_origin_unrotated_unit_scale() {
        let matrix = create_transformation_matrix(vec3(0.0, 0.0, 0.0), 0.0, 0.0, 0.0, 1.0);

        assert_relative_eq!(matrix, Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn translation_and_scale_apply_in_order() {
        let matrix = create_transformation_matrix(vec3(10.0, -2.0, 3.0), 0.0, 0.0, 0.0, 2.0);
        let corner = matrix * Vector4::new(1.0, 1.0, 1.0, 1.0);

        assert_relative_eq!(corner, Vector4::new(12.0, 0.0, 5.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn rotation_is_applied_before_scaleless_translation_is_undone() {
        // 90 degrees of yaw carries +X onto -Z.
        let matrix = create_transformation_matrix(vec3(0.0, 0.0, 0.0), 0.0, 90.0, 0.0, 1.0);
        let x_axis = matrix * Vector4::new(1.0, 0.0, 0.0, 0.0);

        assert_relative_eq!(x_axis, Vector4::new(0.0, 0.0, -1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn view_matrix_moves_camera_to_origin() {
        let mut camera = Camera::new(vec3(5.0, 4.0, -3.0));
        camera.pitch = 0.0;
        let view = create_view_matrix(&camera);
        let eye = view * Vector4::new(5.0, 4.0, -3.0, 1.0);

        assert_relative_eq!(eye, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn view_matrix_is_inverse_of_camera_transform() {
        let mut camera = Camera::new(vec3(1.0, 2.0, 3.0));
        camera.pitch = 15.0;
        camera.yaw = 40.0;
        let view = create_view_matrix(&camera);
        let camera_world = view.invert().unwrap();
        let origin = camera_world * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert_relative_eq!(origin, Vector4::new(1.0, 2.0, 3.0, 1.0), epsilon = 1e-4);
    }
}
