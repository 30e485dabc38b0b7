//! Extended variable tracker for fluted-pattern validation.
//!
//! An `EVar` records what a walk has observed about the variable content of a
//! fluted sequence: nothing yet, "ground" (a sequence over zero variables),
//! or a highest variable index. Ground sits below every variable in the
//! comparison order, so distance and ordering treat it like index "-1".

use std::cmp::Ordering;

/// Observation state of a fluted walk's variable tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EVar {
    /// No observation yet
    #[default]
    Unset,
    /// Only constants observed
    Ground,
    /// Highest variable index observed
    Var(u32),
}

impl EVar {
    pub fn is_set(self) -> bool {
        !matches!(self, EVar::Unset)
    }

    pub fn is_var(self) -> bool {
        matches!(self, EVar::Var(_))
    }

    pub fn is_ground(self) -> bool {
        matches!(self, EVar::Ground)
    }

    /// The variable index. Calling this on `Unset` or `Ground` is a
    /// programming error in the classification walk.
    pub fn index(self) -> u32 {
        match self {
            EVar::Var(v) => v,
            other => panic!("EVar::index on {:?}", other),
        }
    }

    /// Successor: ground steps to var(1), var(k) to var(k+1).
    pub fn succ(self) -> EVar {
        match self {
            EVar::Ground => EVar::Var(1),
            EVar::Var(v) => EVar::Var(v + 1),
            EVar::Unset => panic!("EVar::succ on Unset"),
        }
    }

    /// Distance between two set trackers: 0 when equal, `1 + k` between
    /// ground and var(k), `|k1 - k2|` between variables.
    pub fn distance(self, other: EVar) -> u32 {
        match (self, other) {
            (EVar::Ground, EVar::Ground) => 0,
            (EVar::Ground, EVar::Var(v)) | (EVar::Var(v), EVar::Ground) => 1 + v,
            (EVar::Var(a), EVar::Var(b)) => a.abs_diff(b),
            (EVar::Unset, _) | (_, EVar::Unset) => panic!("EVar::distance on Unset"),
        }
    }

    fn rank(self) -> Option<i64> {
        match self {
            EVar::Unset => None,
            EVar::Ground => Some(-1),
            EVar::Var(v) => Some(v as i64),
        }
    }
}

impl PartialOrd for EVar {
    /// Ground < var(0) < var(1) < ...; unset is ordered only against itself.
    fn partial_cmp(&self, other: &EVar) -> Option<Ordering> {
        match (self, other) {
            (EVar::Unset, EVar::Unset) => Some(Ordering::Equal),
            _ => Some(self.rank()?.cmp(&other.rank()?)),
        }
    }
}
