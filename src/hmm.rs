//! Core model in count form: the sufficient statistics a trace is counted into.
//! Turning counts into probabilities is left to the model-building code that owns them.
use crate::alphabet::Alphabet;
use serde::{Deserialize, Serialize};

/// Core transitions, stored at the node they leave from.
/// Node 0 is the begin node: `t[0][MM]` is B->M1, `t[0][MD]` is B->D1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreTransition {
    MM = 0,
    MI = 1,
    MD = 2,
    IM = 3,
    II = 4,
    DM = 5,
    DD = 6,
}

pub const NUM_CORE_TRANSITIONS: usize = 7;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hmm {
    alphabet: Alphabet,
    m: usize,
    /// Transition counts, nodes 0..=M.
    pub t: Vec<[f32; NUM_CORE_TRANSITIONS]>,
    /// Match emission counts, nodes 0..=M (node 0 unused).
    pub mat: Vec<Vec<f32>>,
    /// Insert emission counts, nodes 0..=M.
    pub ins: Vec<Vec<f32>>,
}

impl Hmm {
    /// All-zero counts for a model of `m` nodes.
    pub fn zeros(m: usize, alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            m,
            t: vec![[0f32; NUM_CORE_TRANSITIONS]; m + 1],
            mat: vec![vec![0f32; alphabet.k()]; m + 1],
            ins: vec![vec![0f32; alphabet.k()]; m + 1],
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
    pub fn t(&self, k: usize, t: CoreTransition) -> f32 {
        self.t[k][t as usize]
    }
    pub(crate) fn add_t(&mut self, k: usize, t: CoreTransition, wt: f32) {
        self.t[k][t as usize] += wt;
    }
    /// Sum of all counts, transitions and emissions alike.
    pub fn total(&self) -> f32 {
        let t: f32 = self.t.iter().flat_map(|xs| xs.iter()).sum();
        let mat: f32 = self.mat.iter().flat_map(|xs| xs.iter()).sum();
        let ins: f32 = self.ins.iter().flat_map(|xs| xs.iter()).sum();
        t + mat + ins
    }
    /// Add the counts of `other` into `self`. Both must share M and alphabet.
    pub fn merge(&mut self, other: &Self) -> crate::Result<()> {
        if self.m != other.m || self.alphabet != other.alphabet {
            return Err(crate::Error::DimensionMismatch {
                what: "model length",
                trace: other.m,
                available: self.m,
            });
        }
        self.t
            .iter_mut()
            .zip(other.t.iter())
            .for_each(|(xs, ys)| xs.iter_mut().zip(ys.iter()).for_each(|(x, y)| *x += y));
        self.mat
            .iter_mut()
            .zip(other.mat.iter())
            .for_each(|(xs, ys)| xs.iter_mut().zip(ys.iter()).for_each(|(x, y)| *x += y));
        self.ins
            .iter_mut()
            .zip(other.ins.iter())
            .for_each(|(xs, ys)| xs.iter_mut().zip(ys.iter()).for_each(|(x, y)| *x += y));
        Ok(())
    }
}

impl std::fmt::Display for Hmm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NODE\tMM\tMI\tMD\tIM\tII\tDM\tDD")?;
        for (k, t) in self.t.iter().enumerate() {
            write!(f, "{}", k)?;
            for x in t.iter() {
                write!(f, "\t{:.3}", x)?;
            }
            writeln!(f)?;
        }
        for (k, (mat, ins)) in self.mat.iter().zip(self.ins.iter()).enumerate() {
            write!(f, "MAT{}", k)?;
            for x in mat.iter() {
                write!(f, "\t{:.3}", x)?;
            }
            write!(f, "\nINS{}", k)?;
            for x in ins.iter() {
                write!(f, "\t{:.3}", x)?;
            }
            if k < self.m {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
