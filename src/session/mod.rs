//! Interactive gap-closing session: a small state machine fed by host
//! pointer and text events, resolving one gap per click.

use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::math::Point3;
use crate::operations::gaps::repair_curve_memberships;
use crate::operations::{CloseGap, FindGapCandidates, GapCandidates, GapKind};
use crate::scene::{EdgeId, Scene, VertexId};
use crate::topology::find_end_vertices;

/// Screen-space radius of an open-end marker's hit circle.
pub const PICK_RADIUS: f64 = 10.0;

/// The host's world-to-screen primitive.
pub trait Projector {
    fn screen_coords(&self, point: &Point3) -> (f64, f64);
}

/// Host events driving the session.
#[derive(Debug, Clone)]
pub enum Event {
    PointerMove { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    /// Raw text from the measurement box.
    UserText(String),
    /// The host reports an undo. Scene data is not yet consistent at
    /// notification time; the rescan is deferred to the next event.
    Undo,
    /// Tool deactivation: in-progress hover state is discarded.
    Cancel,
    /// An idle tick; consumes a deferred reset.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Idle,
    Hover(VertexId),
}

/// What the UI should show after an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    None,
    /// Hovering an open end, with the fix a click would apply.
    Hover {
        vertex: VertexId,
        best: Option<GapKind>,
        removable: bool,
    },
    /// A gap was closed, consuming this many open ends.
    Closed { ends: usize },
    /// The hovered dangling edge was erased instead.
    Removed,
    /// Nothing within tolerance for the clicked end.
    OutOfRange,
    /// The text entry did not parse as a positive length.
    InputError,
    ToleranceSet(f64),
    /// A deferred reset ran and the topology was rescanned.
    Rescanned,
}

/// One ranked candidate row for the preview overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewEntry {
    pub kind: GapKind,
    pub distance: f64,
    pub within_tolerance: bool,
    pub best: bool,
}

/// Interactive close-gaps tool state.
///
/// The session caches the open-end scan between events and re-reads it
/// after every mutation; candidate searches run only when the hovered
/// marker changes.
pub struct GapSession {
    settings: Settings,
    state: SessionState,
    open_vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
    candidates: Option<GapCandidates>,
    pending_reset: bool,
}

impl GapSession {
    /// Creates a session and scans the scene's current topology.
    #[must_use]
    pub fn new(scene: &Scene, settings: Settings) -> Self {
        let mut session = Self {
            settings,
            state: SessionState::Idle,
            open_vertices: Vec::new(),
            edges: Vec::new(),
            candidates: None,
            pending_reset: false,
        };
        session.rescan(scene);
        session
    }

    /// Currently tracked open ends, in scan order.
    #[must_use]
    pub fn open_vertices(&self) -> &[VertexId] {
        &self.open_vertices
    }

    /// Current gap tolerance.
    #[must_use]
    pub fn gap_epsilon(&self) -> f64 {
        self.settings.gap_epsilon
    }

    /// Screen positions of the open-end markers still alive in the scene.
    pub fn markers<P: Projector>(&self, scene: &Scene, projector: &P) -> Vec<(VertexId, (f64, f64))> {
        self.open_vertices
            .iter()
            .filter_map(|&v| {
                let point = scene.point(v).ok()?;
                Some((v, projector.screen_coords(&point)))
            })
            .collect()
    }

    /// Ranked candidate rows for the hovered end, best first.
    #[must_use]
    pub fn preview(&self) -> Vec<PreviewEntry> {
        let Some(candidates) = &self.candidates else {
            return Vec::new();
        };
        let best = candidates.best_within(self.settings.gap_epsilon);
        GapKind::RANKED
            .into_iter()
            .filter_map(|kind| {
                let distance = candidates.distance(kind)?;
                Some(PreviewEntry {
                    kind,
                    distance,
                    within_tolerance: distance < self.settings.gap_epsilon,
                    best: best == Some(kind),
                })
            })
            .collect()
    }

    /// Feeds one host event through the state machine.
    ///
    /// # Errors
    ///
    /// Returns an error if a scene lookup or mutation fails; mutation
    /// failures abort their operation boundary first.
    pub fn handle_event<P: Projector>(
        &mut self,
        scene: &mut Scene,
        projector: &P,
        event: Event,
    ) -> Result<Feedback> {
        // A deferred reset always runs before the event itself; the host's
        // data is consistent again by the time the next event arrives.
        let reset_ran = self.pending_reset;
        if reset_ran {
            self.pending_reset = false;
            self.rescan(scene);
        }

        match event {
            Event::PointerMove { x, y } => self.hover(scene, projector, x, y),
            Event::Click { x, y } => self.commit(scene, projector, x, y),
            Event::UserText(text) => Ok(self.parse_tolerance(&text)),
            Event::Undo => {
                self.pending_reset = true;
                Ok(Feedback::None)
            }
            Event::Cancel => {
                self.state = SessionState::Idle;
                self.candidates = None;
                Ok(Feedback::None)
            }
            Event::Tick => {
                if reset_ran {
                    Ok(Feedback::Rescanned)
                } else {
                    Ok(Feedback::None)
                }
            }
        }
    }

    fn hover<P: Projector>(
        &mut self,
        scene: &Scene,
        projector: &P,
        x: f64,
        y: f64,
    ) -> Result<Feedback> {
        let Some(vertex) = self.pick(scene, projector, x, y) else {
            self.state = SessionState::Idle;
            self.candidates = None;
            return Ok(Feedback::None);
        };

        if self.state != SessionState::Hover(vertex) {
            let candidates =
                FindGapCandidates::new(vertex).execute(scene, &self.open_vertices, &self.edges)?;
            self.candidates = Some(candidates);
            self.state = SessionState::Hover(vertex);
            debug!(?vertex, "hover pick changed");
        }

        let best = self
            .candidates
            .as_ref()
            .and_then(|c| c.best_within(self.settings.gap_epsilon));
        Ok(Feedback::Hover {
            vertex,
            best,
            removable: self.removable(scene, vertex)?,
        })
    }

    fn commit<P: Projector>(
        &mut self,
        scene: &mut Scene,
        projector: &P,
        x: f64,
        y: f64,
    ) -> Result<Feedback> {
        let Some(vertex) = self.pick(scene, projector, x, y) else {
            self.state = SessionState::Idle;
            self.candidates = None;
            return Ok(Feedback::None);
        };
        let removable = self.removable(scene, vertex)?;

        scene.begin_operation("Close Gaps")?;
        let candidates =
            match FindGapCandidates::new(vertex).execute(scene, &self.open_vertices, &self.edges) {
                Ok(candidates) => candidates,
                Err(err) => {
                    scene.abort_operation()?;
                    return Err(err);
                }
            };
        let closed =
            match CloseGap::new(vertex, self.settings.gap_epsilon).execute(scene, &candidates) {
                Ok(closed) => closed,
                Err(err) => {
                    scene.abort_operation()?;
                    return Err(err);
                }
            };

        let feedback = if let Some(kind) = closed {
            match repair_curve_memberships(scene) {
                Ok(_) => {}
                Err(err) => {
                    scene.abort_operation()?;
                    return Err(err);
                }
            }
            scene.commit_operation()?;
            Feedback::Closed {
                ends: kind.ends_fixed(),
            }
        } else if removable {
            let edge = scene.vertex(vertex)?.edges.first().copied();
            match edge {
                Some(edge) => {
                    scene.erase_edge(edge)?;
                    scene.commit_operation()?;
                    Feedback::Removed
                }
                None => {
                    scene.abort_operation()?;
                    Feedback::OutOfRange
                }
            }
        } else {
            scene.abort_operation()?;
            Feedback::OutOfRange
        };

        self.rescan(scene);
        Ok(feedback)
    }

    fn parse_tolerance(&mut self, text: &str) -> Feedback {
        match text.trim().parse::<f64>() {
            Ok(value) if value > 0.0 && value.is_finite() => {
                self.settings.gap_epsilon = value;
                Feedback::ToleranceSet(value)
            }
            _ => Feedback::InputError,
        }
    }

    /// Whether a click on this end may fall back to erasing its edge.
    fn removable(&self, scene: &Scene, vertex: VertexId) -> Result<bool> {
        if !self.settings.remove_small_edges {
            return Ok(false);
        }
        let Some(&edge) = scene.vertex(vertex)?.edges.first() else {
            return Ok(false);
        };
        Ok(scene.edge_length(edge)? < self.settings.gap_epsilon)
    }

    /// The first open-end marker within the pick radius of the pointer.
    fn pick<P: Projector>(&self, scene: &Scene, projector: &P, x: f64, y: f64) -> Option<VertexId> {
        self.open_vertices.iter().copied().find(|&v| {
            scene.point(v).is_ok_and(|point| {
                let (sx, sy) = projector.screen_coords(&point);
                let (dx, dy) = (sx - x, sy - y);
                dx * dx + dy * dy <= PICK_RADIUS * PICK_RADIUS
            })
        })
    }

    fn rescan(&mut self, scene: &Scene) {
        self.edges = scene.edge_ids();
        self.open_vertices = find_end_vertices(scene, &self.edges);
        self.state = SessionState::Idle;
        self.candidates = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Orthographic top view: world X/Y map straight to screen.
    struct TopView;

    impl Projector for TopView {
        fn screen_coords(&self, point: &Point3) -> (f64, f64) {
            (point.x, point.y)
        }
    }

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    /// Two collinear danglers with a 5-unit gap between their open ends.
    fn gapped_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_edge_between(&p(0.0, 0.0), &p(100.0, 0.0)).unwrap();
        scene.add_edge_between(&p(105.0, 0.0), &p(200.0, 0.0)).unwrap();
        scene
    }

    #[test]
    fn pointer_over_marker_hovers_with_best_fix() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::PointerMove { x: 101.0, y: 2.0 })
            .unwrap();
        match feedback {
            Feedback::Hover { vertex, best, .. } => {
                assert_eq!(scene.point(vertex).unwrap(), p(100.0, 0.0));
                assert_eq!(best, Some(GapKind::VertexProjected));
            }
            other => panic!("expected hover, got {other:?}"),
        }
    }

    #[test]
    fn pointer_far_from_markers_goes_idle() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        session
            .handle_event(&mut scene, &TopView, Event::PointerMove { x: 101.0, y: 2.0 })
            .unwrap();
        let feedback = session
            .handle_event(&mut scene, &TopView, Event::PointerMove { x: 50.0, y: 80.0 })
            .unwrap();
        assert_eq!(feedback, Feedback::None);
        assert!(session.preview().is_empty());
    }

    #[test]
    fn preview_is_ranked_and_flags_the_best() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        session
            .handle_event(&mut scene, &TopView, Event::PointerMove { x: 101.0, y: 2.0 })
            .unwrap();
        let rows = session.preview();
        assert_eq!(rows.len(), 3);
        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, GapKind::RANKED.to_vec());
        assert_eq!(rows.iter().filter(|r| r.best).count(), 1);
        assert!(rows[0].best && rows[0].within_tolerance);
    }

    #[test]
    fn click_on_marker_closes_the_gap_and_rescans() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());
        assert_eq!(session.open_vertices().len(), 4);

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::Click { x: 101.0, y: 2.0 })
            .unwrap();
        assert_eq!(feedback, Feedback::Closed { ends: 2 });
        assert_eq!(scene.edge_count(), 3);
        assert_eq!(session.open_vertices().len(), 2);
    }

    #[test]
    fn click_falls_back_to_removing_a_short_edge() {
        let mut scene = Scene::new();
        scene.add_edge_between(&p(0.0, 0.0), &p(2.0, 0.0)).unwrap();
        let mut session = GapSession::new(&scene, Settings::default());

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::Click { x: 2.0, y: 0.0 })
            .unwrap();
        assert_eq!(feedback, Feedback::Removed);
        assert_eq!(scene.edge_count(), 0);
        assert!(session.open_vertices().is_empty());
    }

    #[test]
    fn click_with_nothing_in_range_aborts_the_boundary() {
        let mut scene = Scene::new();
        scene.add_edge_between(&p(0.0, 0.0), &p(50.0, 0.0)).unwrap();
        let settings = Settings {
            remove_small_edges: false,
            ..Settings::default()
        };
        let mut session = GapSession::new(&scene, settings);

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::Click { x: 50.0, y: 0.0 })
            .unwrap();
        assert_eq!(feedback, Feedback::OutOfRange);
        assert_eq!(scene.edge_count(), 1);
        // Nothing changed, so nothing was published to the undo stack.
        assert!(scene.undo().is_err());
    }

    #[test]
    fn undo_defers_the_rescan_to_the_next_tick() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());
        session
            .handle_event(&mut scene, &TopView, Event::Click { x: 101.0, y: 2.0 })
            .unwrap();
        assert_eq!(session.open_vertices().len(), 2);

        scene.undo().unwrap();
        let feedback = session
            .handle_event(&mut scene, &TopView, Event::Undo)
            .unwrap();
        assert_eq!(feedback, Feedback::None);
        // Not rescanned yet: the notification itself must not touch the
        // scene.
        assert_eq!(session.open_vertices().len(), 2);

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::Tick)
            .unwrap();
        assert_eq!(feedback, Feedback::Rescanned);
        assert_eq!(session.open_vertices().len(), 4);
    }

    #[test]
    fn tolerance_text_updates_settings() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        let feedback = session
            .handle_event(&mut scene, &TopView, Event::UserText("2.5".into()))
            .unwrap();
        assert_eq!(feedback, Feedback::ToleranceSet(2.5));
        assert!((session.gap_epsilon() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_tolerance_text_is_a_non_fatal_input_error() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        for text in ["ten", "", "-3", "0"] {
            let feedback = session
                .handle_event(&mut scene, &TopView, Event::UserText(text.into()))
                .unwrap();
            assert_eq!(feedback, Feedback::InputError);
        }
        assert!((session.gap_epsilon() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cancel_discards_hover_state() {
        let mut scene = gapped_scene();
        let mut session = GapSession::new(&scene, Settings::default());

        session
            .handle_event(&mut scene, &TopView, Event::PointerMove { x: 101.0, y: 2.0 })
            .unwrap();
        assert!(!session.preview().is_empty());

        session
            .handle_event(&mut scene, &TopView, Event::Cancel)
            .unwrap();
        assert!(session.preview().is_empty());
        assert_eq!(scene.edge_count(), 2);
    }

    #[test]
    fn markers_follow_the_projector() {
        let scene = gapped_scene();
        let session = GapSession::new(&scene, Settings::default());
        let markers = session.markers(&scene, &TopView);
        assert_eq!(markers.len(), 4);
        assert!(markers.iter().any(|&(_, xy)| xy == (100.0, 0.0)));
    }
}
