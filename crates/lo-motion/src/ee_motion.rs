//! Contact schedule and foothold positions of all end-effectors.
//!
//! Every end-effector alternates between stance and swing phases, starting in
//! stance on its start-stance foothold. Each later stance phase lands on a new
//! free foothold whose x/y position is an optimization variable. Free
//! footholds are numbered in touchdown order (ties broken by end-effector).

use crate::error::{MotionError, MotionResult};
use crate::variables::{VarSetId, VariableProvider, check_len};
use lo_core::{ContactId, Coord, EndeffectorId, GRID_EPS, K_DIM2D};
use nalgebra::{DVector, Vector3};
use tracing::debug;

/// A foothold of one end-effector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub ee: EndeffectorId,
    pub id: ContactId,
    pub p: Vector3<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct StancePhase {
    t_start: f64,
    t_end: f64,
    id: ContactId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EndeffectorsMotion {
    start_stance: Vec<Vector3<f64>>,
    phases: Vec<Vec<StancePhase>>,
    free_contacts: Vec<Contact>,
    total_time: f64,
}

impl EndeffectorsMotion {
    /// Build the schedule from alternating `[stance, swing, stance, ...]`
    /// durations per end-effector.
    ///
    /// Zero-length stance phases produce no foothold. All end-effectors must
    /// cover the same total duration.
    pub fn from_phase_durations(
        start_stance: Vec<Vector3<f64>>,
        phase_durations: &[Vec<f64>],
    ) -> MotionResult<Self> {
        if start_stance.is_empty() || start_stance.len() != phase_durations.len() {
            return Err(MotionError::InvalidSchedule {
                what: format!(
                    "{} start footholds for {} phase lists",
                    start_stance.len(),
                    phase_durations.len()
                ),
            });
        }

        let mut total_time = None;
        // (t_start, t_end, ee) of every stance phase after the first one
        let mut pending = Vec::new();
        let mut phases = vec![Vec::new(); start_stance.len()];

        for (ee, durations) in phase_durations.iter().enumerate() {
            let mut t = 0.0;
            for (i, &d) in durations.iter().enumerate() {
                if !(d.is_finite() && d >= 0.0) {
                    return Err(MotionError::InvalidSchedule {
                        what: format!("end-effector {ee} has phase duration {d}"),
                    });
                }
                let is_stance = i % 2 == 0;
                if is_stance && d > 0.0 {
                    if i == 0 {
                        phases[ee].push(StancePhase {
                            t_start: t,
                            t_end: t + d,
                            id: ContactId::FixedByStartStance,
                        });
                    } else {
                        pending.push((t, t + d, ee));
                    }
                }
                t += d;
            }

            match total_time {
                None => total_time = Some(t),
                Some(total) if (total - t).abs() > GRID_EPS => {
                    return Err(MotionError::InvalidSchedule {
                        what: format!("end-effector {ee} lasts {t}s, expected {total}s"),
                    });
                }
                Some(_) => {}
            }
        }

        let total_time = total_time.unwrap_or(0.0);
        if total_time <= 0.0 {
            return Err(MotionError::InvalidSchedule {
                what: "motion has zero duration".to_string(),
            });
        }

        pending.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.2.cmp(&b.2)));

        let mut free_contacts = Vec::with_capacity(pending.len());
        for (i, &(t_start, t_end, ee)) in pending.iter().enumerate() {
            let id = ContactId::Free(i);
            free_contacts.push(Contact {
                ee: EndeffectorId::from_index(ee),
                id,
                p: start_stance[ee],
            });
            phases[ee].push(StancePhase { t_start, t_end, id });
        }
        for ee_phases in &mut phases {
            ee_phases.sort_by(|a, b| a.t_start.total_cmp(&b.t_start));
        }

        debug!(
            endeffectors = start_stance.len(),
            free_contacts = free_contacts.len(),
            total_time,
            "built contact schedule"
        );
        Ok(Self {
            start_stance,
            phases,
            free_contacts,
            total_time,
        })
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn endeffector_count(&self) -> usize {
        self.start_stance.len()
    }

    pub fn endeffectors(&self) -> impl Iterator<Item = EndeffectorId> + '_ {
        (0..self.start_stance.len()).map(EndeffectorId::from_index)
    }

    fn is_active(&self, phase: &StancePhase, t: f64) -> bool {
        let ends_motion = phase.t_end >= self.total_time - GRID_EPS;
        t >= phase.t_start - GRID_EPS
            && (t < phase.t_end - GRID_EPS || (ends_motion && t <= phase.t_end + GRID_EPS))
    }

    fn position(&self, ee: usize, id: ContactId) -> Vector3<f64> {
        match id {
            ContactId::FixedByStartStance => self.start_stance[ee],
            ContactId::Free(i) => self.free_contacts[i].p,
        }
    }

    /// Footholds in contact at time `t`, ordered by end-effector.
    pub fn contacts(&self, t: f64) -> Vec<Contact> {
        let mut contacts = Vec::new();
        for (ee, ee_phases) in self.phases.iter().enumerate() {
            if let Some(phase) = ee_phases.iter().find(|ph| self.is_active(ph, t)) {
                contacts.push(Contact {
                    ee: EndeffectorId::from_index(ee),
                    id: phase.id,
                    p: self.position(ee, phase.id),
                });
            }
        }
        contacts
    }

    pub fn is_in_contact(&self, ee: EndeffectorId, t: f64) -> bool {
        self.phases
            .get(ee.index())
            .is_some_and(|ee_phases| ee_phases.iter().any(|ph| self.is_active(ph, t)))
    }

    pub fn all_free_contacts(&self) -> &[Contact] {
        &self.free_contacts
    }

    pub fn start_stance(&self) -> &[Vector3<f64>] {
        &self.start_stance
    }

    /// Column of coordinate `dim` of a free foothold, `None` for start-stance
    /// footholds.
    pub fn index(&self, id: ContactId, dim: Coord) -> Option<usize> {
        debug_assert!(dim != Coord::Z, "only x/y of footholds are optimized");
        id.free_index().map(|i| i * K_DIM2D + dim.index())
    }
}

impl VariableProvider for EndeffectorsMotion {
    fn id(&self) -> VarSetId {
        VarSetId::Footholds
    }

    fn opt_var_count(&self) -> usize {
        self.free_contacts.len() * K_DIM2D
    }

    fn optimization_parameters(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.opt_var_count(),
            self.free_contacts.iter().flat_map(|c| [c.p.x, c.p.y]),
        )
    }

    fn set_optimization_parameters(&mut self, x: &DVector<f64>) -> MotionResult<()> {
        check_len(self.id(), x, self.opt_var_count())?;
        for (i, c) in self.free_contacts.iter_mut().enumerate() {
            c.p.x = x[i * K_DIM2D];
            c.p.y = x[i * K_DIM2D + 1];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Biped: left swings in [0.2, 0.4), right swings in [0.6, 0.8).
    fn walk() -> EndeffectorsMotion {
        EndeffectorsMotion::from_phase_durations(
            vec![Vector3::new(0.0, 0.1, 0.0), Vector3::new(0.0, -0.1, 0.0)],
            &[vec![0.2, 0.2, 0.6], vec![0.6, 0.2, 0.2]],
        )
        .unwrap()
    }

    #[test]
    fn free_contacts_are_numbered_by_touchdown() {
        let m = walk();
        let free = m.all_free_contacts();
        assert_eq!(free.len(), 2);
        assert_eq!(free[0].ee, EndeffectorId::from_index(0));
        assert_eq!(free[0].id, ContactId::Free(0));
        assert_eq!(free[1].ee, EndeffectorId::from_index(1));
        assert_eq!(m.opt_var_count(), 4);
        assert!((m.total_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn contacts_follow_schedule() {
        let m = walk();
        assert_eq!(m.contacts(0.0).len(), 2);
        let swing_left = m.contacts(0.3);
        assert_eq!(swing_left.len(), 1);
        assert_eq!(swing_left[0].ee, EndeffectorId::from_index(1));
        assert!(swing_left[0].id.is_fixed());

        let after = m.contacts(0.5);
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, ContactId::Free(0));
        assert!(after[1].id.is_fixed());

        // terminal time still counts as stance
        let end = m.contacts(1.0);
        assert_eq!(end.len(), 2);
        assert!(end.iter().all(|c| !c.id.is_fixed()));
    }

    #[test]
    fn phase_boundary_belongs_to_next_phase() {
        let m = walk();
        assert!(!m.is_in_contact(EndeffectorId::from_index(0), 0.2));
        assert!(m.is_in_contact(EndeffectorId::from_index(0), 0.4));
        // 0.1 * 6 overshoots 0.6 by one ulp
        assert!(!m.is_in_contact(EndeffectorId::from_index(1), 0.1 * 6.0));
    }

    #[test]
    fn parameters_move_free_footholds_only() {
        let mut m = walk();
        m.set_optimization_parameters(&DVector::from_row_slice(&[0.3, 0.1, 0.5, -0.1]))
            .unwrap();
        let c = m.contacts(0.9);
        assert_eq!(c[0].p, Vector3::new(0.3, 0.1, 0.0));
        assert_eq!(c[1].p, Vector3::new(0.5, -0.1, 0.0));
        assert_eq!(m.start_stance()[0], Vector3::new(0.0, 0.1, 0.0));
        assert_eq!(m.optimization_parameters()[2], 0.5);
        assert_eq!(m.index(ContactId::Free(1), Coord::Y), Some(3));
        assert_eq!(m.index(ContactId::FixedByStartStance, Coord::X), None);
    }

    #[test]
    fn rejects_inconsistent_durations() {
        let err = EndeffectorsMotion::from_phase_durations(
            vec![Vector3::zeros(), Vector3::zeros()],
            &[vec![0.5], vec![0.6]],
        )
        .unwrap_err();
        assert!(matches!(err, MotionError::InvalidSchedule { .. }));
        assert!(EndeffectorsMotion::from_phase_durations(vec![Vector3::zeros()], &[]).is_err());
    }
}
