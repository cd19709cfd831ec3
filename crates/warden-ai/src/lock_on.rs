//! Camera-relative lock-on targeting.
//!
//! The selected enemy is the one closest to the line the camera looks
//! along (camera through player), not the one closest to the player.

use glam::Vec3;
use tracing::debug;

use warden_core::events::{AiEvent, Directive};
use warden_core::types::AgentId;

use crate::fsm::Outbox;
use crate::geometry::{angle_deg, flatten};

/// An enemy eligible for lock-on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: AgentId,
    pub position: Vec3,
}

/// Flattened, normalized camera -> player direction.
/// `None` when the camera sits directly above or on the player.
pub fn sightline(camera: Vec3, player: Vec3) -> Option<Vec3> {
    let flat = flatten(player - camera);
    (flat.length_squared() > 1e-8).then(|| flat.normalize())
}

/// Candidate within `radius` of `anchor` with the smallest perpendicular
/// distance to the sightline through `anchor`. Ties keep the first seen.
pub fn select_target(
    anchor: Vec3,
    sightline: Vec3,
    radius: f32,
    candidates: impl IntoIterator<Item = Candidate>,
) -> Option<AgentId> {
    let mut best: Option<(AgentId, f32)> = None;
    for candidate in candidates {
        let distance = anchor.distance(candidate.position);
        if distance > radius {
            continue;
        }
        let angle = angle_deg(sightline, flatten(candidate.position - anchor));
        let score = distance * angle.to_radians().sin();
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((candidate.id, score));
        }
    }
    best.map(|(id, _)| id)
}

/// Current lock-on target and combat-mode flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockOnController {
    combat_mode: bool,
    target: Option<AgentId>,
}

impl LockOnController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combat_mode(&self) -> bool {
        self.combat_mode
    }

    pub fn target(&self) -> Option<AgentId> {
        self.target
    }

    /// Enter or leave combat mode. Leaving clears and unhighlights the target.
    pub fn set_combat_mode(&mut self, active: bool, out: &mut Outbox) {
        if self.combat_mode == active {
            return;
        }
        self.combat_mode = active;
        debug!(active, "combat mode");
        if !active {
            if let Some(previous) = self.target.take() {
                out.directives.push(Directive::Highlight {
                    target: previous,
                    on: false,
                });
                out.events.push(AiEvent::LockOnChanged { target: None });
            }
        }
    }

    /// Apply this tick's selection: unhighlight the old target, store the
    /// new one and highlight it. Does nothing outside combat mode.
    pub fn update(&mut self, selection: Option<AgentId>, out: &mut Outbox) {
        if !self.combat_mode {
            return;
        }
        if let Some(previous) = self.target {
            out.directives.push(Directive::Highlight {
                target: previous,
                on: false,
            });
        }
        if selection != self.target {
            debug!(target = ?selection, "lock-on target changed");
            out.events.push(AiEvent::LockOnChanged { target: selection });
        }
        self.target = selection;
        if let Some(current) = self.target {
            out.directives.push(Directive::Highlight {
                target: current,
                on: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, x: f32, z: f32) -> Candidate {
        Candidate {
            id: AgentId(id),
            position: Vec3::new(x, 0.0, z),
        }
    }

    #[test]
    fn test_sightline_is_flattened() {
        let line = sightline(Vec3::new(0.0, 5.0, -4.0), Vec3::ZERO).unwrap();
        assert!((line - Vec3::Z).length() < 1e-5, "{line}");
        assert!(sightline(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO).is_none());
    }

    #[test]
    fn test_collinear_candidates_keep_first() {
        let near_first = [candidate(1, 0.0, 5.0), candidate(2, 0.0, 10.0), candidate(3, 0.0, 15.0)];
        assert_eq!(select_target(Vec3::ZERO, Vec3::Z, 20.0, near_first), Some(AgentId(1)));

        let far_first = [candidate(3, 0.0, 15.0), candidate(2, 0.0, 10.0), candidate(1, 0.0, 5.0)];
        assert_eq!(select_target(Vec3::ZERO, Vec3::Z, 20.0, far_first), Some(AgentId(3)));
    }

    #[test]
    fn test_on_line_beats_closer_off_line() {
        let a = candidate(1, 0.0, 10.0);
        let b = candidate(2, 5.0, 0.0);
        assert_eq!(select_target(Vec3::ZERO, Vec3::Z, 20.0, [b, a]), Some(AgentId(1)));
    }

    #[test]
    fn test_radius_excludes() {
        let far = candidate(1, 0.0, 25.0);
        assert_eq!(select_target(Vec3::ZERO, Vec3::Z, 20.0, [far]), None);
    }

    #[test]
    fn test_highlight_swaps_every_update() {
        let mut lock = LockOnController::new();
        let mut out = Outbox::new();
        lock.update(Some(AgentId(1)), &mut out);
        assert!(out.is_empty(), "outside combat mode nothing happens");

        lock.set_combat_mode(true, &mut out);
        lock.update(Some(AgentId(1)), &mut out);
        assert_eq!(lock.target(), Some(AgentId(1)));
        assert_eq!(
            out.directives,
            vec![Directive::Highlight {
                target: AgentId(1),
                on: true
            }]
        );

        let mut out = Outbox::new();
        lock.update(Some(AgentId(2)), &mut out);
        assert_eq!(
            out.directives,
            vec![
                Directive::Highlight {
                    target: AgentId(1),
                    on: false
                },
                Directive::Highlight {
                    target: AgentId(2),
                    on: true
                },
            ]
        );
        assert_eq!(
            out.events,
            vec![AiEvent::LockOnChanged {
                target: Some(AgentId(2))
            }]
        );
    }

    #[test]
    fn test_leaving_combat_mode_clears_target() {
        let mut lock = LockOnController::new();
        let mut out = Outbox::new();
        lock.set_combat_mode(true, &mut out);
        lock.update(Some(AgentId(4)), &mut out);

        let mut out = Outbox::new();
        lock.set_combat_mode(false, &mut out);
        assert_eq!(lock.target(), None);
        assert!(!lock.combat_mode());
        assert_eq!(
            out.directives,
            vec![Directive::Highlight {
                target: AgentId(4),
                on: false
            }]
        );
    }
}
