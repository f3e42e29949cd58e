//! State types of the profile state machine.
//!
//! The main model has match, insert and delete states, each in a local and a glocal
//! flavour. Around it sit the special states:
//! `S -> N -> B -> {L,G} -> ... -> E -> C -> T`, with `J` joining domains.
use serde::{Deserialize, Serialize};

/// Number of state codes, including the `Bogus` sentinel.
pub const NUM_STATETYPES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateType {
    /// Error sentinel. Never stored in a trace.
    Bogus = 0,
    ML = 1,
    MG = 2,
    IL = 3,
    IG = 4,
    DL = 5,
    DG = 6,
    S = 7,
    N = 8,
    B = 9,
    L = 10,
    G = 11,
    E = 12,
    C = 13,
    J = 14,
    T = 15,
}

const STATES: [StateType; NUM_STATETYPES] = [
    StateType::Bogus,
    StateType::ML,
    StateType::MG,
    StateType::IL,
    StateType::IG,
    StateType::DL,
    StateType::DG,
    StateType::S,
    StateType::N,
    StateType::B,
    StateType::L,
    StateType::G,
    StateType::E,
    StateType::C,
    StateType::J,
    StateType::T,
];

const NAMES: [&str; NUM_STATETYPES] = [
    "BOGUS", "ML", "MG", "IL", "IG", "DL", "DG", "S", "N", "B", "L", "G", "E", "C", "J", "T",
];

impl StateType {
    pub const fn code(self) -> usize {
        self as usize
    }
    /// Decode a numeric code. Anything out of range maps to `Bogus`.
    pub fn from_code(code: usize) -> Self {
        STATES.get(code).copied().unwrap_or(StateType::Bogus)
    }
    /// Match, insert or delete, local or glocal.
    pub fn is_main(self) -> bool {
        (StateType::ML.code()..=StateType::DG.code()).contains(&self.code())
    }
    pub fn is_match(self) -> bool {
        matches!(self, StateType::ML | StateType::MG)
    }
    pub fn is_insert(self) -> bool {
        matches!(self, StateType::IL | StateType::IG)
    }
    pub fn is_delete(self) -> bool {
        matches!(self, StateType::DL | StateType::DG)
    }
    pub fn is_glocal(self) -> bool {
        matches!(
            self,
            StateType::G | StateType::MG | StateType::DG | StateType::IG
        )
    }
    pub fn is_local(self) -> bool {
        matches!(
            self,
            StateType::L | StateType::ML | StateType::DL | StateType::IL
        )
    }
    /// N, C and J emit on transition into them.
    pub fn is_flank(self) -> bool {
        matches!(self, StateType::N | StateType::C | StateType::J)
    }
    /// States that may carry a sequence position: matches, inserts and flanks.
    pub fn may_emit(self) -> bool {
        self.is_match() || self.is_insert() || self.is_flank()
    }
}

impl std::fmt::Display for StateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(NAMES[self.code()])
    }
}

impl std::str::FromStr for StateType {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMES
            .iter()
            .skip(1)
            .position(|name| name.eq_ignore_ascii_case(s))
            .map(|pos| STATES[pos + 1])
            .ok_or_else(|| crate::Error::InvalidArgument(format!("no such state type: {}", s)))
    }
}
