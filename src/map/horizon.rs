//! Clipping of projected outlines against the globe's horizon.
//!
//! Points arrive one at a time together with a flag telling whether they
//! face the viewer. Hidden points are dropped. Where the outline passes
//! behind the globe and comes back, a closed ring is joined along the
//! silhouette circle so that it stays a single area; an open line is
//! split instead.

use glam::DVec2;
use std::f64::consts::PI;
use tracing::trace;

use crate::map::polygon::{ScreenPoint, ScreenPolygon};
use crate::map::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Crossing {
    NoPendingCrossing,
    /// Left the visible hemisphere at `exit`, waiting to come back.
    AwaitingExitPartner { exit: ScreenPoint },
}

/// Traversal state for one line or ring. Build a fresh one per shape.
#[derive(Clone, Debug)]
pub struct HorizonClipper {
    center: DVec2,
    /// Squared radius of the silhouette circle.
    rlimit: f64,
    closed: bool,
    crossing: Crossing,
    /// Entry point of a ring that started behind the globe, waiting for
    /// the final exit to close against.
    orphaned_entry: Option<ScreenPoint>,
    first: Option<(ScreenPoint, bool)>,
    previous: Option<(ScreenPoint, bool)>,
    current: ScreenPolygon,
    finished: Vec<ScreenPolygon>,
}

impl HorizonClipper {
    pub fn new(vp: &Viewport, closed: bool) -> Self {
        let radius = vp.radius() as f64;
        Self {
            center: vp.center(),
            rlimit: radius * radius,
            closed,
            crossing: Crossing::NoPendingCrossing,
            orphaned_entry: None,
            first: None,
            previous: None,
            current: ScreenPolygon::new(closed),
            finished: Vec::new(),
        }
    }

    /// True between leaving the visible hemisphere and coming back.
    pub fn awaiting_exit_partner(&self) -> bool {
        matches!(self.crossing, Crossing::AwaitingExitPartner { .. })
    }

    pub fn has_orphaned_entry(&self) -> bool {
        self.orphaned_entry.is_some()
    }

    /// Feed the next point of the outline.
    pub fn push(&mut self, point: ScreenPoint, visible: bool) {
        match self.previous {
            None => self.first = Some((point, visible)),
            Some((previous, previous_visible)) if previous_visible != visible => {
                self.cross_horizon(previous, point, visible);
            }
            Some(_) => {}
        }

        if visible {
            self.current.push_distinct(point);
        }
        self.previous = Some((point, visible));
    }

    /// End the current line here and start a new one with the next
    /// point. Rings ignore this.
    pub fn break_line(&mut self) {
        if !self.closed {
            self.flush();
        }
    }

    /// Flush the traversal and hand back every non-degenerate polygon.
    pub fn finish(mut self) -> Vec<ScreenPolygon> {
        if self.closed {
            // The ring's implicit last edge leads back to the first point.
            if let (Some((first, first_visible)), Some((last, last_visible))) = (self.first, self.previous) {
                if first_visible != last_visible {
                    self.cross_horizon(last, first, first_visible);
                }
            }
            if let (Crossing::AwaitingExitPartner { exit }, Some(entry)) =
                (self.crossing, self.orphaned_entry.take())
            {
                self.create_arc(exit, entry);
                self.crossing = Crossing::NoPendingCrossing;
            }
            self.current.close();
        }
        self.flush();
        self.finished
    }

    fn cross_horizon(&mut self, previous: ScreenPoint, current: ScreenPoint, entering: bool) {
        let hidden = if entering { previous } else { current };
        let horizon = self.horizon_point(current, hidden);

        if !self.closed {
            // Lines run up to the horizon and restart from it.
            self.current.push_distinct(horizon);
            if !entering {
                self.flush();
            }
            return;
        }

        match (self.crossing, entering) {
            (Crossing::NoPendingCrossing, false) | (Crossing::AwaitingExitPartner { .. }, false) => {
                self.crossing = Crossing::AwaitingExitPartner { exit: horizon };
            }
            (Crossing::AwaitingExitPartner { exit }, true) => {
                self.create_arc(exit, horizon);
                self.crossing = Crossing::NoPendingCrossing;
            }
            (Crossing::NoPendingCrossing, true) => {
                // The ring started behind the globe.
                self.orphaned_entry = Some(horizon);
            }
        }
    }

    /// Where a segment meets the silhouette circle: keep the x offset of
    /// `current` and take the y half matching the hidden point's side.
    fn horizon_point(&self, current: ScreenPoint, hidden: ScreenPoint) -> ScreenPoint {
        let radius = self.rlimit.sqrt();
        let xa = (current.x - self.center.x).clamp(-radius, radius);
        let mut ya = (self.rlimit - xa * xa).max(0.0).sqrt();
        if hidden.y - self.center.y < 0.0 {
            ya = -ya;
        }
        DVec2::new(self.center.x + xa, self.center.y + ya)
    }

    /// Append `exit`, the silhouette between the two points one degree at
    /// a time the short way round, then `entry`. Points exactly opposite
    /// or equal in angle give no direction and are skipped.
    fn create_arc(&mut self, exit: ScreenPoint, entry: ScreenPoint) {
        let alpha = angle_degrees(exit - self.center);
        let beta = angle_degrees(entry - self.center);
        let mut diff = beta - alpha;

        if diff == 0.0 || diff == 180.0 || diff == -180.0 {
            trace!(alpha, beta, "skipping degenerate horizon arc");
            return;
        }
        if diff.abs() > 180.0 {
            diff -= diff.signum() * 360.0;
        }
        let step = diff.signum();
        let radius = self.rlimit.sqrt();

        self.current.push_distinct(exit);
        let mut it = 1.0;
        while it < diff.abs() {
            let angle = (alpha + step * it) * PI / 180.0;
            self.current
                .push_distinct(self.center + DVec2::new(angle.cos(), angle.sin()) * radius);
            it += 1.0;
        }
        self.current.push_distinct(entry);
    }

    fn flush(&mut self) {
        let polygon = std::mem::replace(&mut self.current, ScreenPolygon::new(self.closed));
        if !polygon.is_degenerate() {
            self.finished.push(polygon);
        }
    }
}

#[inline]
fn angle_degrees(d: DVec2) -> f64 {
    d.y.atan2(d.x) * 180.0 / PI
}
