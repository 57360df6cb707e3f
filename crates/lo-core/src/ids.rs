use core::fmt;

/// Index of an end-effector (leg) of the robot.
///
/// End-effectors are numbered densely from 0, so the id doubles as a
/// position in per-end-effector arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndeffectorId(u32);

impl EndeffectorId {
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("end-effector index fits in u32"))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EndeffectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for EndeffectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a foothold of an end-effector.
///
/// Footholds of the start stance are given by the initial robot state and
/// are not optimization variables. Every later foothold owns two entries
/// (x, y) in the contact variable block, addressed by its free index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactId {
    FixedByStartStance,
    Free(usize),
}

impl ContactId {
    pub fn is_fixed(self) -> bool {
        matches!(self, ContactId::FixedByStartStance)
    }

    /// Free-contact index, `None` for start-stance footholds.
    pub fn free_index(self) -> Option<usize> {
        match self {
            ContactId::FixedByStartStance => None,
            ContactId::Free(i) => Some(i),
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactId::FixedByStartStance => write!(f, "start"),
            ContactId::Free(i) => write!(f, "#{i}"),
        }
    }
}
