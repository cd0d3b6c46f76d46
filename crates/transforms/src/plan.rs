//! Patch plans: which host method to patch, which call anchors the splice, and which locals
//! get scaled.

use crate::factor::FactorSource;
use crate::{Error, Result};
use ilsplice_core::{MethodSignature, Opcode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Arithmetic applied between a local and its factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleOp {
    Mul,
    Div,
}

impl ScaleOp {
    pub fn opcode(self) -> Opcode {
        match self {
            ScaleOp::Mul => Opcode::Mul,
            ScaleOp::Div => Opcode::Div,
        }
    }
}

/// One local consumed by reference by the target call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchTarget {
    /// Human readable name used in log events.
    pub name: String,
    /// Position of the `ldloca` relative to the call; always negative.
    pub offset: isize,
    pub operation: ScaleOp,
    pub source: FactorSource,
}

/// Everything the pipeline needs to patch one method body.
///
/// Targets are spliced in the order listed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchPlan {
    /// Host method whose body is being patched.
    pub method: MethodSignature,
    /// Call whose reference arguments are scaled.
    pub target: MethodSignature,
    pub targets: Vec<PatchTarget>,
}

impl PatchPlan {
    /// Mine shaft spawn-rate plan.
    ///
    /// `adjustLevelChances(ref stone, ref monster, ref item, ref gem)` receives its four
    /// addresses via consecutive `ldloca` instructions, so `monster` sits three instructions
    /// before the call and `stone` four. Monster chance is scaled up first, then stone chance
    /// is scaled down when the secondary toggle allows it.
    pub fn spawn_rate() -> Self {
        Self {
            method: MethodSignature::new("StardewValley.Locations.MineShaft", "populateLevel", 0),
            target: MethodSignature::new(
                "StardewValley.Locations.MineShaft",
                "adjustLevelChances",
                4,
            ),
            targets: vec![
                PatchTarget {
                    name: "monsterChance".into(),
                    offset: -3,
                    operation: ScaleOp::Mul,
                    source: FactorSource::Primary,
                },
                PatchTarget {
                    name: "stoneChance".into(),
                    offset: -4,
                    operation: ScaleOp::Div,
                    source: FactorSource::Secondary,
                },
            ],
        }
    }

    pub fn offsets(&self) -> Vec<isize> {
        self.targets.iter().map(|t| t.offset).collect()
    }

    /// Checks the plan is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::InvalidPlan("plan has no targets".into()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.offset >= 0 {
                return Err(Error::InvalidPlan(format!(
                    "offset {} for `{}` must be negative",
                    target.offset, target.name
                )));
            }
            if !seen.insert(target.offset) {
                return Err(Error::InvalidPlan(format!(
                    "offset {} is used more than once",
                    target.offset
                )));
            }
        }
        Ok(())
    }

    /// Loads and validates a JSON plan.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::PlanRead {
            path: path.display().to_string(),
            source,
        })?;
        let plan: Self = serde_json::from_str(&text)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for PatchPlan {
    fn default() -> Self {
        Self::spawn_rate()
    }
}
