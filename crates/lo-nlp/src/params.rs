//! Motion parameters: which terms to build and the numbers they need.

use crate::error::{NlpError, NlpResult};
use lo_motion::MotionDerivative;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintName {
    InitCom,
    FinalCom,
    JunctionCom,
    Convexity,
    Dynamic,
    RomBox,
    FinalStance,
    Obstacle,
}

impl ConstraintName {
    pub const ALL: [ConstraintName; 8] = [
        ConstraintName::InitCom,
        ConstraintName::FinalCom,
        ConstraintName::JunctionCom,
        ConstraintName::Convexity,
        ConstraintName::Dynamic,
        ConstraintName::RomBox,
        ConstraintName::FinalStance,
        ConstraintName::Obstacle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintName::InitCom => "init_com",
            ConstraintName::FinalCom => "final_com",
            ConstraintName::JunctionCom => "junction_com",
            ConstraintName::Convexity => "convexity",
            ConstraintName::Dynamic => "dynamic",
            ConstraintName::RomBox => "rom_box",
            ConstraintName::FinalStance => "final_stance",
            ConstraintName::Obstacle => "obstacle",
        }
    }
}

impl fmt::Display for ConstraintName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintName {
    type Err = NlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConstraintName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| NlpError::UnknownConstraint {
                name: s.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostName {
    ComCost,
    RangeOfMotionCost,
    PolyCenterCost,
    FinalComCost,
    FinalStanceCost,
}

impl CostName {
    pub const ALL: [CostName; 5] = [
        CostName::ComCost,
        CostName::RangeOfMotionCost,
        CostName::PolyCenterCost,
        CostName::FinalComCost,
        CostName::FinalStanceCost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CostName::ComCost => "com_cost",
            CostName::RangeOfMotionCost => "range_of_motion_cost",
            CostName::PolyCenterCost => "poly_center_cost",
            CostName::FinalComCost => "final_com_cost",
            CostName::FinalStanceCost => "final_stance_cost",
        }
    }
}

impl fmt::Display for CostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostName {
    type Err = NlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CostName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| NlpError::UnknownCost {
                name: s.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostWeight {
    pub name: CostName,
    pub weight: f64,
}

/// Everything the factory needs besides the providers themselves.
///
/// Missing YAML keys fall back to [`MotionParameters::default`], a biped
/// walking in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParameters {
    /// Sample and load-segment spacing [s].
    pub dt_nodes: f64,
    /// Duration of one CoM polynomial [s].
    pub spline_segment_duration: f64,
    /// CoM height above ground for the cart-table model [m].
    pub walking_height: f64,
    pub offset_geom_to_com: [f64; 3],
    pub weight_com_motion_xy: [f64; 2],
    /// Nominal foot position per end-effector in the base frame.
    pub nominal_stance: Vec<[f64; 3]>,
    pub max_dev_xy: [f64; 2],
    pub com_motion_cost: MotionDerivative,
    /// Alternating stance/swing durations per end-effector, starting with
    /// stance.
    pub phase_durations: Vec<Vec<f64>>,
    pub constraints: Vec<ConstraintName>,
    pub costs: Vec<CostWeight>,
}

impl Default for MotionParameters {
    fn default() -> Self {
        Self {
            dt_nodes: 0.1,
            spline_segment_duration: 0.3,
            walking_height: 0.58,
            offset_geom_to_com: [0.0; 3],
            weight_com_motion_xy: [1.0, 1.0],
            nominal_stance: vec![[0.0, 0.1, 0.0], [0.0, -0.1, 0.0]],
            max_dev_xy: [0.15, 0.1],
            com_motion_cost: MotionDerivative::Acc,
            phase_durations: vec![vec![0.3, 0.3, 0.6], vec![0.6, 0.3, 0.3]],
            constraints: vec![
                ConstraintName::InitCom,
                ConstraintName::FinalCom,
                ConstraintName::JunctionCom,
                ConstraintName::Convexity,
                ConstraintName::Dynamic,
                ConstraintName::RomBox,
            ],
            costs: vec![CostWeight {
                name: CostName::ComCost,
                weight: 1.0,
            }],
        }
    }
}

impl MotionParameters {
    pub fn from_yaml_str(content: &str) -> NlpResult<Self> {
        let params: MotionParameters = serde_yaml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load_yaml(path: &std::path::Path) -> NlpResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> NlpResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> NlpResult<()> {
        lo_core::ensure_positive(self.dt_nodes, "dt_nodes")?;
        lo_core::ensure_positive(self.spline_segment_duration, "spline_segment_duration")?;
        lo_core::ensure_positive(self.walking_height, "walking_height")?;

        if self.max_dev_xy.iter().any(|d| d.is_nan() || *d < 0.0) {
            return Err(invalid("max_dev_xy must be non-negative"));
        }
        if self.weight_com_motion_xy.iter().any(|w| w.is_nan() || *w < 0.0) {
            return Err(invalid("weight_com_motion_xy must be non-negative"));
        }
        if self.costs.iter().any(|c| c.weight.is_nan() || c.weight < 0.0) {
            return Err(invalid("cost weights must be non-negative"));
        }
        if !matches!(
            self.com_motion_cost,
            MotionDerivative::Acc | MotionDerivative::Jerk
        ) {
            return Err(invalid("com_motion_cost must be acc or jerk"));
        }
        if self.phase_durations.is_empty() {
            return Err(invalid("phase_durations needs at least one end-effector"));
        }
        if self.nominal_stance.len() != self.phase_durations.len() {
            return Err(NlpError::InvalidParameter {
                what: format!(
                    "nominal_stance has {} entries for {} end-effectors",
                    self.nominal_stance.len(),
                    self.phase_durations.len()
                ),
            });
        }
        Ok(())
    }

    pub fn nominal_stance_in_base(&self) -> Vec<Vector3<f64>> {
        self.nominal_stance.iter().map(|p| Vector3::from(*p)).collect()
    }

    pub fn max_deviation_from_nominal(&self) -> [f64; 2] {
        self.max_dev_xy
    }

    pub fn offset_geom_to_com(&self) -> Vector3<f64> {
        Vector3::from(self.offset_geom_to_com)
    }
}

fn invalid(what: &str) -> NlpError {
    NlpError::InvalidParameter {
        what: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        MotionParameters::default().validate().unwrap();
    }

    #[test]
    fn names_parse_and_print() {
        for name in ConstraintName::ALL {
            assert_eq!(name.as_str().parse::<ConstraintName>().unwrap(), name);
        }
        for name in CostName::ALL {
            assert_eq!(name.to_string().parse::<CostName>().unwrap(), name);
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        let err = "hover".parse::<ConstraintName>().unwrap_err();
        assert!(matches!(err, NlpError::UnknownConstraint { ref name } if name == "hover"));
        let err = "laziness".parse::<CostName>().unwrap_err();
        assert!(matches!(err, NlpError::UnknownCost { .. }));
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let yaml = r#"
dt_nodes: 0.05
constraints: [dynamic, convexity]
costs:
  - name: range_of_motion_cost
    weight: 10.0
"#;
        let params = MotionParameters::from_yaml_str(yaml).unwrap();
        assert_eq!(params.dt_nodes, 0.05);
        assert_eq!(params.walking_height, 0.58);
        assert_eq!(
            params.constraints,
            vec![ConstraintName::Dynamic, ConstraintName::Convexity]
        );
        assert_eq!(params.costs[0].name, CostName::RangeOfMotionCost);
        assert_eq!(params.com_motion_cost, MotionDerivative::Acc);
    }

    #[test]
    fn yaml_round_trip() {
        let params = MotionParameters::default();
        let yaml = params.to_yaml_string().unwrap();
        assert_eq!(MotionParameters::from_yaml_str(&yaml).unwrap(), params);
    }

    #[test]
    fn unknown_constraint_in_yaml_is_rejected() {
        let err = MotionParameters::from_yaml_str("constraints: [teleport]").unwrap_err();
        assert!(matches!(err, NlpError::Yaml(_)));
    }

    #[test]
    fn rejects_bad_values() {
        let mut params = MotionParameters::default();
        params.dt_nodes = 0.0;
        assert!(matches!(params.validate(), Err(NlpError::Core(_))));

        let mut params = MotionParameters::default();
        params.com_motion_cost = MotionDerivative::Vel;
        assert!(matches!(
            params.validate(),
            Err(NlpError::InvalidParameter { .. })
        ));

        let mut params = MotionParameters::default();
        params.nominal_stance.pop();
        assert!(params.validate().is_err());
    }

    #[test]
    fn nominal_stance_as_vectors() {
        let params = MotionParameters::default();
        let stance = params.nominal_stance_in_base();
        assert_eq!(stance.len(), 2);
        assert_eq!(stance[1], Vector3::new(0.0, -0.1, 0.0));
    }
}
