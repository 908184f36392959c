use glam::{Mat3, Mat4};
use objview_common::PlacementOp;

/// Apply `ops` in order on top of `base`.
pub fn compose(ops: &[PlacementOp], base: Mat4) -> Mat4 {
    ops.iter().fold(base, |m, op| op.apply(m))
}

/// Model matrices for a list of placements.
///
/// With `chained`, each placement continues from the previous result;
/// otherwise each starts from identity.
pub fn compose_all<'a>(
    placements: impl IntoIterator<Item = &'a [PlacementOp]>,
    chained: bool,
) -> Vec<Mat4> {
    let mut current = Mat4::IDENTITY;
    placements
        .into_iter()
        .map(|ops| {
            let base = if chained { current } else { Mat4::IDENTITY };
            current = compose(ops, base);
            current
        })
        .collect()
}

/// Inverse-transpose of the model's linear part, so normals stay
/// perpendicular to surfaces under non-uniform scale. A singular model keeps
/// its own linear part.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    let linear = Mat3::from_mat4(model);
    let det = linear.determinant();
    if det == 0.0 || !det.is_finite() {
        return Mat4::from_mat3(linear);
    }
    Mat4::from_mat3(linear.inverse().transpose())
}
