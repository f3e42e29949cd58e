//! Log-space scores of a profile, as consumed by the trace scorers.
//!
//! Scores are natural-log odds (nats). How they are parameterized from a core
//! model is not this crate's business; callers fill them in through the setters.
use crate::alphabet::Alphabet;
use crate::statetype::StateType;
use serde::{Deserialize, Serialize};

/// Per-node transitions. All are stored at the node they leave from,
/// except `LM` which is stored at k-1 for L->Mk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Mk->Mk+1
    MM = 0,
    /// Ik->Mk+1
    IM = 1,
    /// Dk->Mk+1
    DM = 2,
    /// L->Mk+1
    LM = 3,
    /// G->M1, at node 0
    GM = 4,
    /// G->D1, at node 0
    GD = 5,
    /// Mk->Dk+1
    MD = 6,
    /// Dk->Dk+1
    DD = 7,
    /// Mk->Ik
    MI = 8,
    /// Ik->Ik
    II = 9,
}

pub const NUM_TRANSITIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTransition {
    Loop = 0,
    Move = 1,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    alphabet: Alphabet,
    m: usize,
    tsc: Vec<[f32; NUM_TRANSITIONS]>,
    msc: Vec<Vec<f32>>,
    isc: Vec<Vec<f32>>,
    /// Loop/move of E, N, J, C. For E, "loop" goes to J and "move" to C.
    xsc: [[f32; 2]; 4],
    /// B->L, B->G.
    bsc: [f32; 2],
}

fn special_index(st: StateType) -> Option<usize> {
    match st {
        StateType::E => Some(0),
        StateType::N => Some(1),
        StateType::J => Some(2),
        StateType::C => Some(3),
        _ => None,
    }
}

impl Profile {
    /// A profile of `m` nodes with every transition impossible and every emission neutral.
    pub fn new(m: usize, alphabet: Alphabet) -> Self {
        let kp = alphabet.kp();
        Self {
            alphabet,
            m,
            tsc: vec![[f32::NEG_INFINITY; NUM_TRANSITIONS]; m + 1],
            msc: vec![vec![0f32; kp]; m + 1],
            isc: vec![vec![0f32; kp]; m + 1],
            xsc: [[f32::NEG_INFINITY; 2]; 4],
            bsc: [f32::NEG_INFINITY; 2],
        }
    }
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
    /// Model length M.
    pub fn len(&self) -> usize {
        self.m
    }
    pub fn is_empty(&self) -> bool {
        self.m == 0
    }
    pub fn tsc(&self, k: usize, t: Transition) -> f32 {
        self.tsc[k][t as usize]
    }
    pub fn set_tsc(&mut self, k: usize, t: Transition, sc: f32) {
        self.tsc[k][t as usize] = sc;
    }
    pub fn msc(&self, k: usize, x: u8) -> f32 {
        self.msc[k][x as usize]
    }
    pub fn set_msc(&mut self, k: usize, x: u8, sc: f32) {
        self.msc[k][x as usize] = sc;
    }
    pub fn isc(&self, k: usize, x: u8) -> f32 {
        self.isc[k][x as usize]
    }
    pub fn set_isc(&mut self, k: usize, x: u8, sc: f32) {
        self.isc[k][x as usize] = sc;
    }
    /// Loop or move score of E, N, J or C. Other states have none.
    pub fn xsc(&self, st: StateType, t: SpecialTransition) -> Option<f32> {
        special_index(st).map(|s| self.xsc[s][t as usize])
    }
    pub fn set_xsc(&mut self, st: StateType, t: SpecialTransition, sc: f32) {
        if let Some(s) = special_index(st) {
            self.xsc[s][t as usize] = sc;
        }
    }
    /// B->L when `glocal` is false, B->G otherwise.
    pub fn bsc(&self, glocal: bool) -> f32 {
        self.bsc[glocal as usize]
    }
    pub fn set_bsc(&mut self, glocal: bool, sc: f32) {
        self.bsc[glocal as usize] = sc;
    }
    /// Emission score of `x` at a step. Only matches and inserts score; flanks emit
    /// at background and everything else is silent.
    pub fn emission_score(&self, st: StateType, k: usize, x: u8) -> f32 {
        if st.is_match() {
            self.msc(k, x)
        } else if st.is_insert() {
            self.isc(k, x)
        } else {
            0f32
        }
    }
    /// Score of the edge from `(from, k_from)` to `(to, k_to)`, or `None` if the
    /// state machine has no such edge.
    pub fn transition_score(
        &self,
        from: StateType,
        k_from: usize,
        to: StateType,
        k_to: usize,
    ) -> Option<f32> {
        use SpecialTransition::*;
        use StateType::*;
        if from.is_main() && to.is_main() && from.is_local() != to.is_local() {
            return None;
        }
        let sc = match (from, to) {
            (S, N) => 0f32,
            (N, N) | (J, J) | (C, C) => self.xsc(from, Loop)?,
            (N, B) | (J, B) | (C, T) => self.xsc(from, Move)?,
            (E, C) => self.xsc(E, Move)?,
            (E, J) => self.xsc(E, Loop)?,
            (B, L) => self.bsc(false),
            (B, G) => self.bsc(true),
            (L, ML) if 1 <= k_to && k_to <= self.m => self.tsc(k_to - 1, Transition::LM),
            (G, MG) if k_to == 1 => self.tsc(0, Transition::GM),
            (G, DG) if k_to == 1 => self.tsc(0, Transition::GD),
            (ML, E) | (DL, E) => 0f32,
            (MG, E) | (DG, E) if k_from == self.m => 0f32,
            _ if from.is_main() && to.is_main() && k_from <= self.m => {
                let next = k_to == k_from + 1 && k_to <= self.m;
                let stay = k_to == k_from && k_to < self.m;
                let t = match (from, to) {
                    (ML, ML) | (MG, MG) if next => Transition::MM,
                    (ML, IL) | (MG, IG) if stay => Transition::MI,
                    (ML, DL) | (MG, DG) if next => Transition::MD,
                    (IL, ML) | (IG, MG) if next => Transition::IM,
                    (IL, IL) | (IG, IG) if stay => Transition::II,
                    (DL, ML) | (DG, MG) if next => Transition::DM,
                    (DL, DL) | (DG, DG) if next => Transition::DD,
                    _ => return None,
                };
                self.tsc(k_from, t)
            }
            _ => return None,
        };
        Some(sc)
    }
}
