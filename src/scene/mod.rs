pub mod curve;
pub mod edge;
pub mod face;
pub mod vertex;

pub use curve::{CurveData, CurveId};
pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use vertex::{VertexData, VertexId};

use slotmap::SlotMap;

use crate::error::{OperationError, Result, TopologyError};
use crate::math::arc_3d::ArcFrame;
use crate::math::{Point3, Vector3, MERGE_TOLERANCE, TOLERANCE};

/// A full copy of the scene's entity arenas, taken at an operation
/// boundary. Generational keys survive the clone, so handles taken before
/// a boundary stay valid after an undo restores it.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    curves: SlotMap<CurveId, CurveData>,
    faces: SlotMap<FaceId, FaceData>,
}

/// An operation boundary that has been opened but not yet committed.
#[derive(Debug)]
struct PendingOperation {
    name: String,
    snapshot: Snapshot,
    created_edges: Vec<EdgeId>,
}

/// Result of splitting an edge at an interior point.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSplit {
    /// The vertex created at the split point.
    pub vertex: VertexId,
    /// The two replacement edges, in chain order. They inherit the parent's
    /// metadata and curve membership.
    pub edges: [EdgeId; 2],
}

/// Stand-in for the host application's scene graph.
///
/// Entities live in central arenas and reference each other via typed IDs
/// (generational indices), so the editing tools never hold self-referential
/// structures and can re-fetch fresh data after every mutation.
///
/// All mutations are expected to happen inside an operation boundary
/// (`begin_operation` / `commit_operation`), which is the unit the host's
/// undo system sees.
#[derive(Debug, Default)]
pub struct Scene {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    curves: SlotMap<CurveId, CurveData>,
    faces: SlotMap<FaceId, FaceData>,
    undo_stack: Vec<Snapshot>,
    pending: Option<PendingOperation>,
}

impl Scene {
    /// Creates a new, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Accessors ---

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex").into())
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge").into())
    }

    /// Returns a mutable reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn edge_mut(&mut self, id: EdgeId) -> Result<&mut EdgeData> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge").into())
    }

    /// Returns a reference to the curve data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn curve(&self, id: CurveId) -> Result<&CurveData> {
        self.curves
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("curve").into())
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the scene.
    pub fn face(&self, id: FaceId) -> Result<&FaceData> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face").into())
    }

    /// Mutable access to a face's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not found.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData> {
        self.faces
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face").into())
    }

    /// Whether the vertex handle is still alive.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Whether the edge handle is still alive.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// All live edge handles, in arena order.
    #[must_use]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().collect()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live curve groupings.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found.
    pub fn point(&self, id: VertexId) -> Result<Point3> {
        Ok(self.vertex(id)?.point)
    }

    /// Start and end positions of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or either endpoint is not found.
    pub fn edge_points(&self, id: EdgeId) -> Result<(Point3, Point3)> {
        let edge = self.edge(id)?;
        Ok((self.point(edge.start)?, self.point(edge.end)?))
    }

    /// Length of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or either endpoint is not found.
    pub fn edge_length(&self, id: EdgeId) -> Result<f64> {
        let (a, b) = self.edge_points(id)?;
        Ok((b - a).norm())
    }

    /// Whether the vertex is an open end (exactly one incident edge).
    #[must_use]
    pub fn is_open_vertex(&self, id: VertexId) -> bool {
        self.vertices.get(id).is_some_and(VertexData::is_open)
    }

    /// The live vertex within the merge threshold of `point`, if any.
    #[must_use]
    pub fn vertex_at(&self, point: &Point3) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, data)| (data.point - point).norm() < MERGE_TOLERANCE)
            .map(|(id, _)| id)
    }

    // --- Mutation primitives ---

    /// Inserts a bare vertex. Used by edge creation; a vertex with no
    /// incident edges is not a valid end state.
    fn insert_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(VertexData::new(point))
    }

    /// Existing vertex welded within the merge threshold, or a new one.
    fn vertex_or_create(&mut self, point: &Point3) -> VertexId {
        self.vertex_at(point)
            .unwrap_or_else(|| self.insert_vertex(*point))
    }

    fn record_created(&mut self, edge: EdgeId) {
        if let Some(pending) = &mut self.pending {
            pending.created_edges.push(edge);
        }
    }

    /// Creates an edge between two existing vertices.
    ///
    /// If an edge between the pair already exists, that edge is returned
    /// (the host welds rather than duplicating).
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing, or the edge would be
    /// degenerate (same vertex, or endpoints within the merge threshold).
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> Result<EdgeId> {
        if a == b {
            return Err(OperationError::MutationRejected(
                "edge endpoints are the same vertex".into(),
            )
            .into());
        }
        let pa = self.point(a)?;
        let pb = self.point(b)?;
        if (pb - pa).norm() < MERGE_TOLERANCE {
            return Err(OperationError::MutationRejected("edge would be zero-length".into()).into());
        }
        if let Some(existing) = self.find_edge_between(a, b) {
            return Ok(existing);
        }

        let id = self.edges.insert(EdgeData::new(a, b));
        self.vertices[a].edges.push(id);
        self.vertices[b].edges.push(id);
        self.record_created(id);
        Ok(id)
    }

    /// Creates an edge between two points, welding each endpoint to an
    /// existing vertex within the merge threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge would be degenerate.
    pub fn add_edge_between(&mut self, p: &Point3, q: &Point3) -> Result<EdgeId> {
        if (q - p).norm() < MERGE_TOLERANCE {
            return Err(OperationError::MutationRejected("edge would be zero-length".into()).into());
        }
        let a = self.vertex_or_create(p);
        let b = self.vertex_or_create(q);
        self.add_edge(a, b)
    }

    /// The existing edge between two vertices, if any.
    #[must_use]
    pub fn find_edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        let data = self.vertices.get(a)?;
        data.edges
            .iter()
            .copied()
            .find(|&e| self.edges[e].has_vertex(b))
    }

    /// Erases an edge, dropping orphaned vertices and shrinking (or
    /// removing) the owning curve grouping.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn erase_edge(&mut self, id: EdgeId) -> Result<()> {
        let data = self.edge(id)?.clone();
        if let Some(curve) = data.curve {
            self.remove_from_curve(id, curve);
        }
        for vertex in [data.start, data.end] {
            let list = &mut self.vertices[vertex].edges;
            list.retain(|&e| e != id);
            if list.is_empty() {
                self.vertices.remove(vertex);
            }
        }
        self.edges.remove(id);
        Ok(())
    }

    /// Erases every listed edge, silently skipping handles that are
    /// already dead (batch callers routinely hold stale handles).
    pub fn erase_edges(&mut self, ids: &[EdgeId]) {
        for &id in ids {
            if self.contains_edge(id) {
                // Live handle checked above.
                let _ = self.erase_edge(id);
            }
        }
    }

    fn remove_from_curve(&mut self, edge: EdgeId, curve: CurveId) {
        if let Some(data) = self.curves.get_mut(curve) {
            data.edges.retain(|&e| e != edge);
            if data.edges.is_empty() {
                self.curves.remove(curve);
            }
        }
    }

    /// Splits an edge at an interior point, replacing it with two new
    /// edges joined at a new vertex.
    ///
    /// The replacement edges inherit material, layer and curve membership;
    /// a grouped edge's halves take its place in the curve's chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is missing or the split point falls on
    /// one of its endpoints.
    pub fn split_edge(&mut self, id: EdgeId, point: &Point3) -> Result<EdgeSplit> {
        let data = self.edge(id)?.clone();
        let (pa, pb) = self.edge_points(id)?;
        if (point - pa).norm() < MERGE_TOLERANCE || (point - pb).norm() < MERGE_TOLERANCE {
            return Err(OperationError::MutationRejected(
                "split point coincides with an edge end".into(),
            )
            .into());
        }

        for vertex in [data.start, data.end] {
            self.vertices[vertex].edges.retain(|&e| e != id);
        }
        self.edges.remove(id);

        let mid = self.insert_vertex(*point);
        let mut first = EdgeData::new(data.start, mid);
        let mut second = EdgeData::new(mid, data.end);
        first.material.clone_from(&data.material);
        first.layer.clone_from(&data.layer);
        second.material.clone_from(&data.material);
        second.layer.clone_from(&data.layer);
        first.curve = data.curve;
        second.curve = data.curve;

        let e1 = self.edges.insert(first);
        let e2 = self.edges.insert(second);
        if let Some(curve) = data.curve {
            if let Some(chain) = self.curves.get_mut(curve) {
                if let Some(pos) = chain.edges.iter().position(|&e| e == id) {
                    chain.edges.splice(pos..=pos, [e1, e2]);
                }
            }
        }
        self.vertices[data.start].edges.push(e1);
        self.vertices[mid].edges.push(e1);
        self.vertices[mid].edges.push(e2);
        self.vertices[data.end].edges.push(e2);
        self.record_created(e1);
        self.record_created(e2);

        Ok(EdgeSplit {
            vertex: mid,
            edges: [e1, e2],
        })
    }

    /// Merges `drop` into `keep`: incident edges are re-pointed, edges
    /// made degenerate or duplicate by the merge are erased, and the
    /// `drop` handle dies.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is missing or both are the same.
    pub fn merge_vertices(&mut self, keep: VertexId, drop: VertexId) -> Result<()> {
        if keep == drop {
            return Err(OperationError::MutationRejected(
                "cannot merge a vertex with itself".into(),
            )
            .into());
        }
        self.vertex(keep)?;
        let drop_edges = self.vertex(drop)?.edges.clone();

        for id in drop_edges {
            let data = self.edges[id].clone();
            let other = data.other_vertex(drop).unwrap_or(keep);
            if other == keep || self.find_edge_between(keep, other).is_some() {
                // Degenerate or duplicate after re-pointing.
                if let Some(curve) = data.curve {
                    self.remove_from_curve(id, curve);
                }
                self.vertices[other].edges.retain(|&e| e != id);
                if other != keep && self.vertices[other].edges.is_empty() {
                    self.vertices.remove(other);
                }
                self.edges.remove(id);
            } else {
                let edge = &mut self.edges[id];
                if edge.start == drop {
                    edge.start = keep;
                } else {
                    edge.end = keep;
                }
                self.vertices[keep].edges.push(id);
            }
        }

        self.vertices.remove(drop);
        if self
            .vertices
            .get(keep)
            .is_some_and(|data| data.edges.is_empty())
        {
            self.vertices.remove(keep);
        }
        Ok(())
    }

    /// Creates a multi-point curve: a run of welded edges sharing one
    /// grouping, in path order.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two points are given or any segment
    /// is degenerate.
    pub fn add_curve(&mut self, points: &[Point3]) -> Result<(CurveId, Vec<EdgeId>)> {
        if points.len() < 2 {
            return Err(
                OperationError::InvalidInput("a curve needs at least two points".into()).into(),
            );
        }
        let mut edges = Vec::with_capacity(points.len() - 1);
        for pair in points.windows(2) {
            edges.push(self.add_edge_between(&pair[0], &pair[1])?);
        }
        let curve = self.curves.insert(CurveData::new(edges.clone()));
        for &edge in &edges {
            self.edges[edge].curve = Some(curve);
        }
        Ok((curve, edges))
    }

    /// Attaches arc metadata to a curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is not found.
    pub fn set_curve_arc(&mut self, id: CurveId, arc: ArcFrame) -> Result<()> {
        self.curves
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("curve"))?
            .arc = Some(arc);
        Ok(())
    }

    /// Removes an edge from its curve grouping ("explode").
    ///
    /// # Errors
    ///
    /// Returns an error if the edge is not found.
    pub fn detach_from_curve(&mut self, id: EdgeId) -> Result<()> {
        let curve = self.edge(id)?.curve;
        if let Some(curve) = curve {
            self.remove_from_curve(id, curve);
            self.edges[id].curve = None;
        }
        Ok(())
    }

    /// Adds an edge to an existing curve grouping.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or curve is missing, or the edge
    /// already belongs to another grouping.
    pub fn attach_to_curve(&mut self, edge: EdgeId, curve: CurveId) -> Result<()> {
        self.curve(curve)?;
        let data = self.edge_mut(edge)?;
        if let Some(existing) = data.curve {
            if existing == curve {
                return Ok(());
            }
            return Err(OperationError::MutationRejected(
                "edge already belongs to another curve".into(),
            )
            .into());
        }
        data.curve = Some(curve);
        self.curves[curve].edges.push(edge);
        Ok(())
    }

    /// Moves a set of vertices by per-vertex displacement vectors, as one
    /// batch. Nothing moves unless every handle is valid.
    ///
    /// # Errors
    ///
    /// Returns an error if any vertex is not found.
    pub fn transform_by_vectors(&mut self, moves: &[(VertexId, Vector3)]) -> Result<()> {
        for &(vertex, _) in moves {
            self.vertex(vertex)?;
        }
        for &(vertex, displacement) in moves {
            self.vertices[vertex].point += displacement;
        }
        Ok(())
    }

    /// Registers a face over existing boundary edges.
    ///
    /// # Errors
    ///
    /// Returns an error if any boundary edge is missing.
    pub fn add_face(&mut self, edges: Vec<EdgeId>) -> Result<FaceId> {
        for &edge in &edges {
            self.edge(edge)?;
        }
        Ok(self.faces.insert(FaceData::new(edges)))
    }

    /// The support plane of a face as `(origin, unit normal)`, derived
    /// from the first two non-parallel boundary directions.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or its boundary is
    /// degenerate (all edges parallel).
    pub fn face_plane(&self, id: FaceId) -> Result<(Point3, Vector3)> {
        let face = self.face(id)?;
        let mut first_dir: Option<(Point3, Vector3)> = None;
        for &edge in &face.edges {
            let (a, b) = self.edge_points(edge)?;
            let dir = b - a;
            match first_dir {
                None => first_dir = Some((a, dir)),
                Some((origin, base)) => {
                    let normal = base.cross(&dir);
                    let len = normal.norm();
                    if len > TOLERANCE {
                        return Ok((origin, normal / len));
                    }
                }
            }
        }
        Err(crate::error::GeometryError::Degenerate("face has no spanning plane".into()).into())
    }

    // --- Operation boundaries ---

    /// Opens an undoable operation boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary is already open.
    pub fn begin_operation(&mut self, name: &str) -> Result<()> {
        if self.pending.is_some() {
            return Err(OperationError::BoundaryAlreadyOpen.into());
        }
        self.pending = Some(PendingOperation {
            name: name.to_string(),
            snapshot: self.snapshot(),
            created_edges: Vec::new(),
        });
        tracing::debug!(operation = name, "operation boundary opened");
        Ok(())
    }

    /// Commits the open boundary, publishing one undo step.
    ///
    /// # Errors
    ///
    /// Returns an error if no boundary is open.
    pub fn commit_operation(&mut self) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or(OperationError::NoOpenBoundary)?;
        tracing::debug!(operation = %pending.name, "operation boundary committed");
        self.undo_stack.push(pending.snapshot);
        Ok(())
    }

    /// Abandons the open boundary, restoring the scene as it was when the
    /// boundary opened. No undo step is published.
    ///
    /// # Errors
    ///
    /// Returns an error if no boundary is open.
    pub fn abort_operation(&mut self) -> Result<()> {
        let pending = self
            .pending
            .take()
            .ok_or(OperationError::NoOpenBoundary)?;
        tracing::debug!(operation = %pending.name, "operation boundary aborted");
        self.restore(pending.snapshot);
        Ok(())
    }

    /// Edges created since the current boundary opened, filtered to the
    /// ones still alive. Empty when no boundary is open.
    #[must_use]
    pub fn created_edges(&self) -> Vec<EdgeId> {
        self.pending
            .as_ref()
            .map(|pending| {
                pending
                    .created_edges
                    .iter()
                    .copied()
                    .filter(|&e| self.contains_edge(e))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Undoes the most recently committed operation boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary is open or there is nothing to undo.
    pub fn undo(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Err(OperationError::BoundaryAlreadyOpen.into());
        }
        let snapshot = self
            .undo_stack
            .pop()
            .ok_or(OperationError::Failed("nothing to undo".into()))?;
        self.restore(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            curves: self.curves.clone(),
            faces: self.faces.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.vertices = snapshot.vertices;
        self.edges = snapshot.edges;
        self.curves = snapshot.curves;
        self.faces = snapshot.faces;
    }
}
