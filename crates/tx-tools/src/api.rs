//! Programmatic transform API
//!
//! Translate or rotate nodes without going through a gizmo. Every call
//! validates its input before touching the scene and ends with a single
//! redraw. The aggregate variants run one sub-operation per selection, let
//! the others proceed when one fails, and report success only if all of
//! them succeeded.

use glam::{Quat, Vec3};
use tx_core::constants::VECTOR_EPSILON;
use tx_core::{
    BoundingBox, FragmentApplier, FragmentId, NodeSelection, Scene, SharedScene, TransformError,
};

use crate::translate::{apply_absolute, apply_relative};

/// Rotation center
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CenterMode {
    /// Each node about the center of its own bounds
    Individual,
    /// Everything about the center of the union of the nodes' bounds
    #[default]
    Median,
    /// Everything about a fixed point
    Custom(Vec3),
}

/// Rotate the fragments under `selection` by `angle` radians about `axis`.
///
/// A fragment reachable from several selected nodes is rotated once, with
/// the first node that reaches it. Returns the number of fragments rotated.
pub fn rotate_nodes<S: Scene + ?Sized>(
    applier: &mut FragmentApplier<'_, S>,
    selection: &NodeSelection,
    axis: Vec3,
    angle: f32,
    center: CenterMode,
) -> Result<usize, TransformError> {
    if selection.node_ids.is_empty() {
        return Err(TransformError::EmptySelection);
    }
    if !axis.is_finite() {
        return Err(TransformError::NonFiniteVector("axis"));
    }
    if axis.length_squared() < VECTOR_EPSILON {
        return Err(TransformError::ZeroAxis);
    }
    if !angle.is_finite() {
        return Err(TransformError::NonFiniteAngle);
    }
    if let CenterMode::Custom(point) = center
        && !point.is_finite()
    {
        return Err(TransformError::NonFiniteVector("center"));
    }

    let model = selection.model;
    let rotation = Quat::from_axis_angle(axis.normalize(), angle);

    // Resolve everything first: (pivot, fragments) per node
    let mut groups: Vec<(Vec3, Vec<FragmentId>)> = Vec::with_capacity(selection.node_ids.len());
    let mut claimed: Vec<FragmentId> = Vec::new();
    let mut union = BoundingBox::empty();
    for &node in &selection.node_ids {
        let fragments: Vec<FragmentId> = applier
            .store()
            .resolve_descendants(model, node)?
            .into_iter()
            .filter(|fragment| !claimed.contains(fragment))
            .collect();
        let bounds = applier.store().bounding_box(model, node)?;
        union = union.union(&bounds);
        claimed.extend(&fragments);
        groups.push((bounds.center(), fragments));
    }

    let shared_pivot = match center {
        CenterMode::Individual => None,
        CenterMode::Median => Some(union.center()),
        CenterMode::Custom(point) => Some(point),
    };

    for (own_pivot, fragments) in &groups {
        let pivot = shared_pivot.unwrap_or(*own_pivot);
        for &fragment in fragments {
            applier.rotate_about(model, fragment, pivot, rotation)?;
        }
    }
    tracing::debug!(
        "Rotated {} fragments by {} rad about {:?} ({:?})",
        claimed.len(),
        angle,
        axis,
        center
    );
    Ok(claimed.len())
}

/// Entry point for scripted transforms
#[derive(Clone)]
pub struct TransformApi {
    scene: SharedScene,
}

impl TransformApi {
    pub fn new(scene: SharedScene) -> Self {
        Self { scene }
    }

    /// Translate the selection. `absolute` moves every node's bounds center
    /// to `vector`; otherwise `vector` is added to every fragment.
    pub fn try_translate(
        &self,
        selection: &NodeSelection,
        vector: Vec3,
        absolute: bool,
    ) -> Result<usize, TransformError> {
        let mut scene = self.scene.lock();
        let mut applier = FragmentApplier::new(&mut *scene);
        let result = translate_one(&mut applier, selection, vector, absolute);
        applier.finish();
        result
    }

    pub fn translate(&self, selection: &NodeSelection, vector: Vec3, absolute: bool) -> bool {
        log_outcome("translate", self.try_translate(selection, vector, absolute))
    }

    /// Translate several selections with one redraw
    pub fn try_aggregate_translate(
        &self,
        selections: &[NodeSelection],
        vector: Vec3,
        absolute: bool,
    ) -> Result<usize, TransformError> {
        if !vector.is_finite() {
            return Err(TransformError::NonFiniteVector("translation"));
        }
        self.aggregate(selections, |applier, selection| {
            translate_one(applier, selection, vector, absolute)
        })
    }

    pub fn aggregate_translate(
        &self,
        selections: &[NodeSelection],
        vector: Vec3,
        absolute: bool,
    ) -> bool {
        log_outcome(
            "aggregate translate",
            self.try_aggregate_translate(selections, vector, absolute),
        )
    }

    /// Rotate the selection by `angle` radians about `axis`
    pub fn try_rotate(
        &self,
        selection: &NodeSelection,
        axis: Vec3,
        angle: f32,
        center: CenterMode,
    ) -> Result<usize, TransformError> {
        let mut scene = self.scene.lock();
        let mut applier = FragmentApplier::new(&mut *scene);
        let result = rotate_nodes(&mut applier, selection, axis, angle, center);
        applier.finish();
        result
    }

    pub fn rotate(
        &self,
        selection: &NodeSelection,
        axis: Vec3,
        angle: f32,
        center: CenterMode,
    ) -> bool {
        log_outcome("rotate", self.try_rotate(selection, axis, angle, center))
    }

    /// Rotate several selections with one redraw. Each selection gets its
    /// own median center.
    pub fn try_aggregate_rotate(
        &self,
        selections: &[NodeSelection],
        axis: Vec3,
        angle: f32,
        center: CenterMode,
    ) -> Result<usize, TransformError> {
        self.aggregate(selections, |applier, selection| {
            rotate_nodes(applier, selection, axis, angle, center)
        })
    }

    pub fn aggregate_rotate(
        &self,
        selections: &[NodeSelection],
        axis: Vec3,
        angle: f32,
        center: CenterMode,
    ) -> bool {
        log_outcome(
            "aggregate rotate",
            self.try_aggregate_rotate(selections, axis, angle, center),
        )
    }

    /// Run `operation` on every selection, collecting all outcomes
    fn aggregate<F>(
        &self,
        selections: &[NodeSelection],
        mut operation: F,
    ) -> Result<usize, TransformError>
    where
        F: FnMut(
            &mut FragmentApplier<'_, dyn Scene + Send>,
            &NodeSelection,
        ) -> Result<usize, TransformError>,
    {
        if selections.is_empty() {
            return Err(TransformError::EmptySelection);
        }

        let mut scene = self.scene.lock();
        let mut applier: FragmentApplier<'_, dyn Scene + Send> =
            FragmentApplier::new(&mut *scene);
        let mut moved = 0;
        let mut failed = 0;
        for selection in selections {
            match operation(&mut applier, selection) {
                Ok(count) => moved += count,
                Err(e) => {
                    tracing::warn!("Sub-operation on model {} failed: {}", selection.model, e);
                    failed += 1;
                }
            }
        }
        applier.finish();

        if failed > 0 {
            return Err(TransformError::Partial {
                failed,
                total: selections.len(),
            });
        }
        Ok(moved)
    }
}

fn translate_one<S: Scene + ?Sized>(
    applier: &mut FragmentApplier<'_, S>,
    selection: &NodeSelection,
    vector: Vec3,
    absolute: bool,
) -> Result<usize, TransformError> {
    if absolute {
        apply_absolute(applier, selection, vector)
    } else {
        apply_relative(applier, selection, vector)
    }
}

fn log_outcome(operation: &str, result: Result<usize, TransformError>) -> bool {
    match result {
        Ok(count) => {
            tracing::info!("{}: {} fragments", operation, count);
            true
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", operation, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use parking_lot::Mutex;
    use std::f32::consts::{FRAC_PI_2, PI};
    use std::sync::Arc;
    use tx_core::{FragmentStore, InMemoryScene, ModelId, NodeId, SceneModel};

    struct Setup {
        scene: Arc<Mutex<InMemoryScene>>,
        api: TransformApi,
        model: ModelId,
        nodes: Vec<NodeId>,
        fragments: Vec<FragmentId>,
    }

    impl Setup {
        fn position(&self, index: usize) -> Vec3 {
            self.scene
                .lock()
                .transform(self.model, self.fragments[index])
                .unwrap()
                .position
        }

        fn all(&self) -> NodeSelection {
            NodeSelection::new(self.model, self.nodes.clone())
        }
    }

    fn setup(positions: &[Vec3]) -> Setup {
        let mut model = SceneModel::new("api");
        let root = model.root();
        let (nodes, fragments) = positions
            .iter()
            .enumerate()
            .map(|(i, p)| model.add_part(root, format!("part{i}"), *p).unwrap())
            .unzip();
        let mut memory = InMemoryScene::new();
        let model = memory.add_model(model);
        let scene = Arc::new(Mutex::new(memory));
        let shared: SharedScene = scene.clone();
        Setup {
            scene,
            api: TransformApi::new(shared),
            model,
            nodes,
            fragments,
        }
    }

    #[test]
    fn test_translate_pair() {
        let s = setup(&[Vec3::X, -Vec3::X]);
        assert!(s.api.translate(&s.all(), Vec3::new(0.0, 5.0, 0.0), false));
        assert_eq!(s.position(0), Vec3::new(1.0, 5.0, 0.0));
        assert_eq!(s.position(1), Vec3::new(-1.0, 5.0, 0.0));
        assert_eq!(s.scene.lock().redraw_requests(), 1);
    }

    #[test]
    fn test_translate_absolute() {
        let s = setup(&[Vec3::X, -Vec3::X]);
        let first = NodeSelection::new(s.model, [s.nodes[0]]);
        assert!(s.api.translate(&first, Vec3::new(3.0, 3.0, 3.0), true));
        assert!(s.position(0).abs_diff_eq(Vec3::splat(3.0), 1e-5));
        assert_eq!(s.position(1), -Vec3::X);
    }

    #[test]
    fn test_median_half_turn_swaps_pair() {
        let s = setup(&[Vec3::X, -Vec3::X]);
        assert!(s.api.rotate(&s.all(), Vec3::Z, PI, CenterMode::Median));
        assert!(s.position(0).abs_diff_eq(-Vec3::X, 1e-5));
        assert!(s.position(1).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_rotate_then_inverse_restores() {
        let s = setup(&[Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.0, 0.5, 1.0)]);
        let axis = Vec3::new(1.0, 1.0, 0.0);
        for center in [
            CenterMode::Median,
            CenterMode::Individual,
            CenterMode::Custom(Vec3::new(7.0, -1.0, 2.0)),
        ] {
            assert!(s.api.rotate(&s.all(), axis, 0.7, center));
            assert!(s.api.rotate(&s.all(), axis, -0.7, center));
        }
        assert!(s.position(0).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-4));
        assert!(s.position(1).abs_diff_eq(Vec3::new(-4.0, 0.5, 1.0), 1e-4));
    }

    #[test]
    fn test_median_preserves_distances_individual_does_not_move_singletons() {
        let s = setup(&[Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)]);
        let distance = |a: usize, b: usize| s.position(a).distance(s.position(b));
        let before = [distance(0, 1), distance(0, 2), distance(1, 2)];

        assert!(s.api.rotate(&s.all(), Vec3::Z, FRAC_PI_2, CenterMode::Median));
        assert_relative_eq!(distance(0, 1), before[0], epsilon = 1e-4);
        assert_relative_eq!(distance(0, 2), before[1], epsilon = 1e-4);
        assert_relative_eq!(distance(1, 2), before[2], epsilon = 1e-4);
        let positions: Vec<Vec3> = (0..3).map(|i| s.position(i)).collect();

        // Single-fragment nodes spin in place: positions are unchanged
        assert!(s.api.rotate(&s.all(), Vec3::Z, FRAC_PI_2, CenterMode::Individual));
        for (i, expected) in positions.iter().enumerate() {
            assert!(s.position(i).abs_diff_eq(*expected, 1e-5));
        }
        let orientation = s.scene.lock().transform(s.model, s.fragments[0]).unwrap().orientation;
        assert!(orientation.abs_diff_eq(Quat::from_rotation_z(PI), 1e-5));
    }

    #[test]
    fn test_individual_differs_from_median_for_groups() {
        // Two groups of two parts each
        let mut model = SceneModel::new("groups");
        let root = model.root();
        let left = model.add_node(root, "left").unwrap();
        let right = model.add_node(root, "right").unwrap();
        model.add_part(left, "a", Vec3::new(-3.0, 0.0, 0.0)).unwrap();
        model.add_part(left, "b", Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        model.add_part(right, "c", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let (_, d) = model.add_part(right, "d", Vec3::new(3.0, 0.0, 0.0)).unwrap();
        let mut memory = InMemoryScene::new();
        let id = memory.add_model(model);
        let scene: SharedScene = Arc::new(Mutex::new(memory));
        let api = TransformApi::new(scene.clone());
        let groups = NodeSelection::new(id, [left, right]);

        api.try_rotate(&groups, Vec3::Z, PI, CenterMode::Individual).unwrap();
        // d spun about the right group's center (2, 0, 0)
        let position = scene.lock().read_transform(id, d).unwrap().position;
        assert!(position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_invalid_arguments() {
        let s = setup(&[Vec3::X]);
        let all = s.all();
        assert_eq!(
            s.api.try_rotate(&all, Vec3::ZERO, 1.0, CenterMode::Median),
            Err(TransformError::ZeroAxis)
        );
        assert_eq!(
            s.api.try_rotate(&all, Vec3::Z, f32::INFINITY, CenterMode::Median),
            Err(TransformError::NonFiniteAngle)
        );
        assert_eq!(
            s.api.try_rotate(&all, Vec3::Z, 1.0, CenterMode::Custom(Vec3::NAN)),
            Err(TransformError::NonFiniteVector("center"))
        );
        assert_eq!(
            s.api.try_translate(&all, Vec3::new(0.0, f32::NAN, 0.0), false),
            Err(TransformError::NonFiniteVector("translation"))
        );
        assert!(!s.api.aggregate_translate(&[], Vec3::X, false));
        assert_eq!(s.position(0), Vec3::X);
        assert_eq!(s.scene.lock().redraw_requests(), 0);
    }

    #[test]
    fn test_aggregate_partial_failure() {
        let s = setup(&[Vec3::X, -Vec3::X]);
        let good = NodeSelection::new(s.model, [s.nodes[0]]);
        let bad = NodeSelection::new(s.model, [NodeId(404)]);

        let result = s
            .api
            .try_aggregate_translate(&[good.clone(), bad], Vec3::Z, false);
        assert_eq!(result, Err(TransformError::Partial { failed: 1, total: 2 }));
        // The good selection still moved, with a single redraw
        assert_eq!(s.position(0), Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(s.scene.lock().redraw_requests(), 1);

        assert!(s.api.aggregate_rotate(&[good], Vec3::Z, PI, CenterMode::Custom(Vec3::ZERO)));
        assert!(s.position(0).abs_diff_eq(Vec3::new(-1.0, 0.0, 1.0), 1e-5));
    }
}
