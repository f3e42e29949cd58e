//! Traceback of a profile against a sequence.
//!
//! A trace only makes sense together with the profile (nodes 1..M) and the digital
//! sequence (positions 1..L) it was made from. It is always relative to the profile,
//! so minimally it reads `S->N->B->{L,G}->...->E->C->T`. There are no I0 or IM
//! states, and DG1 only occurs as the glocal entry G->DG1.
//!
//! N, C and J emit on transition: a run of N emits one residue fewer than its
//! length. The emission is stored on the trailing state of each transition, so
//! the first N, C or J of a run has i = 0.
//!
//! `k` is nonzero only for main-model states, `i` and `pp` only for emitted
//! residues.
use crate::statetype::{StateType, NUM_STATETYPES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

mod count;
mod dump;
mod faux;
mod index;
mod score;
mod validate;

pub use faux::{DoctorReport, FauxConfig};

// Smallest allocation made by the first growth.
const MIN_STEP_ALLOC: usize = 256;
const MIN_DOMAIN_ALLOC: usize = 16;

/// One position of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub st: StateType,
    /// Model node, 1..M for main-model states, 0 otherwise.
    pub k: usize,
    /// Sequence position, 1..L for an emitted residue, 0 otherwise.
    pub i: usize,
    /// Posterior probability of the emitted residue, 0.0 otherwise.
    pub pp: f32,
}

/// One aligned region of a trace, from its B step to its E step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Domain {
    /// Trace offsets of B and E.
    pub tfrom: usize,
    pub tto: usize,
    /// First and last residue emitted by the main model.
    pub sqfrom: usize,
    pub sqto: usize,
    /// First and last model node.
    pub hmmfrom: usize,
    pub hmmto: usize,
    /// Anchor position. Deprecated: always 0.
    pub anch: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    steps: Vec<Step>,
    domains: Vec<Domain>,
    with_pp: bool,
    indexed: bool,
    m: usize,
    l: usize,
}

// Make room for at least `n` elements, doubling the allocation when it grows.
// On failure the vector is left untouched.
pub(crate) fn grow_vec<T>(xs: &mut Vec<T>, n: usize, min_alloc: usize) -> Result<()> {
    if n <= xs.capacity() {
        return Ok(());
    }
    let target = n.max(2 * xs.capacity()).max(min_alloc);
    xs.try_reserve_exact(target - xs.len())?;
    Ok(())
}

impl Trace {
    /// An empty trace without posterior probabilities.
    pub fn new() -> Self {
        Self::default()
    }
    /// An empty trace that records a posterior probability for each emitted residue.
    pub fn with_pp() -> Self {
        Self {
            with_pp: true,
            ..Self::default()
        }
    }
    /// Empty the trace for reuse. Allocations are kept.
    pub fn reuse(&mut self) {
        self.steps.clear();
        self.domains.clear();
        self.indexed = false;
        self.m = 0;
        self.l = 0;
    }
    /// Make room for at least `n` steps.
    pub fn grow_to(&mut self, n: usize) -> Result<()> {
        grow_vec(&mut self.steps, n, MIN_STEP_ALLOC)
    }
    /// Make room for at least `ndom` domains.
    pub fn grow_index_to(&mut self, ndom: usize) -> Result<()> {
        grow_vec(&mut self.domains, ndom, MIN_DOMAIN_ALLOC)
    }
    pub fn step_capacity(&self) -> usize {
        self.steps.capacity()
    }
    pub fn domain_capacity(&self) -> usize {
        self.domains.capacity()
    }
    /// N, the number of steps. Zero means there is no path.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
    pub fn step(&self, z: usize) -> Option<&Step> {
        self.steps.get(z)
    }
    /// M, the largest node index this trace may refer to.
    pub fn model_len(&self) -> usize {
        self.m
    }
    /// L, the largest sequence position this trace may refer to.
    pub fn seq_len(&self) -> usize {
        self.l
    }
    pub fn set_model_len(&mut self, m: usize) {
        self.m = m;
    }
    pub fn set_seq_len(&mut self, l: usize) {
        self.l = l;
    }
    pub fn has_pp(&self) -> bool {
        self.with_pp
    }
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
    /// The domain index. Empty unless [`Trace::index`] has run since the last change.
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }
    pub fn domain_count(&self) -> Result<usize> {
        self.require_index()?;
        Ok(self.domains.len())
    }
    /// Sequence and model coordinates `(sqfrom, sqto, hmmfrom, hmmto)` of domain `which`.
    pub fn domain_coords(&self, which: usize) -> Result<(usize, usize, usize, usize)> {
        let d = self.domain(which)?;
        Ok((d.sqfrom, d.sqto, d.hmmfrom, d.hmmto))
    }
    pub(crate) fn domain(&self, which: usize) -> Result<&Domain> {
        self.require_index()?;
        self.domains.get(which).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "no domain {}; trace has {}",
                which,
                self.domains.len()
            ))
        })
    }
    pub(crate) fn require_index(&self) -> Result<()> {
        if self.indexed {
            Ok(())
        } else {
            Err(Error::Structural {
                step: None,
                msg: "trace is not indexed".to_string(),
            })
        }
    }
    /// How many times each state type is used, indexed by state code.
    pub fn state_use_counts(&self) -> [usize; NUM_STATETYPES] {
        let mut counts = [0; NUM_STATETYPES];
        for step in self.steps.iter() {
            counts[step.st.code()] += 1;
        }
        counts
    }
    fn invalidate_index(&mut self) {
        self.domains.clear();
        self.indexed = false;
    }
    /// Append a step. Only local constraints are checked here: main-model states need
    /// a node, special states must not have one, silent states must not emit.
    /// For N, C and J, `i` is kept only if the previous step is the same state.
    pub fn append(&mut self, st: StateType, k: usize, i: usize) -> Result<()> {
        self.push_step(st, k, i, 0f32)
    }
    /// Like [`Trace::append`], with the posterior probability of the residue.
    pub fn append_with_pp(&mut self, st: StateType, k: usize, i: usize, pp: f32) -> Result<()> {
        if !self.with_pp {
            return Err(Error::InvalidArgument(
                "trace was created without posterior probabilities".to_string(),
            ));
        }
        self.push_step(st, k, i, pp)
    }
    fn push_step(&mut self, st: StateType, k: usize, i: usize, pp: f32) -> Result<()> {
        if st == StateType::Bogus {
            return Err(Error::InvalidArgument("can't append a BOGUS state".to_string()));
        }
        if st.is_main() && k == 0 {
            return Err(Error::InvalidArgument(format!("{} needs a node index", st)));
        }
        if !st.is_main() && k != 0 {
            return Err(Error::InvalidArgument(format!(
                "{} can't have a node index (k={})",
                st, k
            )));
        }
        let (i, pp) = if st.is_flank() {
            match self.steps.last() {
                Some(prev) if prev.st == st => (i, pp),
                _ => (0, 0f32),
            }
        } else if st.is_match() || st.is_insert() {
            if i == 0 {
                return Err(Error::InvalidArgument(format!("{}{} must emit", st, k)));
            }
            (i, pp)
        } else if i != 0 {
            return Err(Error::InvalidArgument(format!(
                "{} can't emit (i={})",
                st, i
            )));
        } else {
            (0, 0f32)
        };
        let pp = if self.with_pp { pp } else { 0f32 };
        self.grow_to(self.steps.len() + 1)?;
        self.steps.push(Step { st, k, i, pp });
        self.invalidate_index();
        Ok(())
    }
    /// Reverse a trace built from its end, so that it reads from S to T.
    /// Emissions inside runs of N, C and J are moved so the first state of each run
    /// stays silent after the reversal. Applying this twice restores the trace.
    /// The domain index is dropped.
    pub fn reverse(&mut self) {
        for z in 0..self.steps.len().saturating_sub(1) {
            let (cur, next) = (self.steps[z], self.steps[z + 1]);
            if cur.st.is_flank() && cur.st == next.st && cur.i == 0 && next.i > 0 {
                self.steps[z].i = next.i;
                self.steps[z].pp = next.pp;
                self.steps[z + 1].i = 0;
                self.steps[z + 1].pp = 0f32;
            }
        }
        self.steps.reverse();
        self.invalidate_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_trace;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    use StateType::*;

    // S N N B G MG1 MG2 E C C T, as a DP traceback would produce it.
    fn backward_glocal() -> Trace {
        let mut tr = Trace::with_pp();
        tr.append(T, 0, 0).unwrap();
        tr.append_with_pp(C, 0, 4, 0.9).unwrap();
        tr.append_with_pp(C, 0, 4, 0.9).unwrap();
        tr.append(E, 0, 0).unwrap();
        tr.append_with_pp(MG, 2, 3, 0.8).unwrap();
        tr.append_with_pp(MG, 1, 2, 0.7).unwrap();
        tr.append(G, 0, 0).unwrap();
        tr.append(B, 0, 0).unwrap();
        tr.append_with_pp(N, 0, 1, 0.6).unwrap();
        tr.append_with_pp(N, 0, 1, 0.6).unwrap();
        tr.append(S, 0, 0).unwrap();
        tr.set_model_len(2);
        tr.set_seq_len(4);
        tr
    }

    #[test]
    fn flank_emits_on_transition() {
        let tr = backward_glocal();
        // First C after T and first N after B are silent.
        assert_eq!(tr.step(1).unwrap().i, 0);
        assert_eq!(tr.step(2).unwrap().i, 4);
        assert_eq!(tr.step(8).unwrap().i, 0);
        assert_eq!(tr.step(8).unwrap().pp, 0.0);
        assert_eq!(tr.step(9).unwrap().i, 1);
    }

    #[test]
    fn reverse_orients_forward() {
        let mut tr = backward_glocal();
        tr.reverse();
        let sts: Vec<_> = tr.steps().iter().map(|s| s.st).collect();
        assert_eq!(sts, vec![S, N, N, B, G, MG, MG, E, C, C, T]);
        let is: Vec<_> = tr.steps().iter().map(|s| s.i).collect();
        assert_eq!(is, vec![0, 0, 1, 0, 0, 2, 3, 0, 0, 4, 0]);
        assert_eq!(tr.step(2).unwrap().pp, 0.6);
        assert_eq!(tr.step(1).unwrap().pp, 0.0);
    }

    #[test]
    fn reverse_twice_restores() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4829);
        for _ in 0..200 {
            let m = rng.gen_range(1..12);
            let tr = gen_trace::generate_trace(&mut rng, m, true).unwrap();
            let mut twice = tr.clone();
            twice.reverse();
            assert!(!twice.is_indexed());
            twice.reverse();
            assert_eq!(tr.steps(), twice.steps());
        }
        let mut tr = backward_glocal();
        let orig = tr.steps().to_vec();
        tr.reverse();
        tr.reverse();
        assert_eq!(tr.steps(), orig.as_slice());
    }

    #[test]
    fn append_local_checks() {
        let mut tr = Trace::new();
        assert!(tr.append(S, 0, 0).is_ok());
        assert!(tr.append(N, 3, 0).is_err());
        assert!(tr.append(B, 0, 5).is_err());
        assert!(tr.append(MG, 0, 1).is_err());
        assert!(tr.append(ML, 2, 0).is_err());
        assert!(tr.append(DG, 2, 7).is_err());
        assert!(tr.append(Bogus, 0, 0).is_err());
        assert!(tr.append_with_pp(MG, 1, 1, 0.5).is_err());
        // Rejected steps leave no trace.
        assert_eq!(tr.len(), 1);
        assert!(tr.append(DG, 2, 0).is_ok());
        assert_eq!(tr.len(), 2);
    }

    #[test]
    fn pp_dropped_without_tracking() {
        let mut tr = Trace::new();
        tr.append(S, 0, 0).unwrap();
        tr.append(N, 0, 0).unwrap();
        tr.append(N, 0, 1).unwrap();
        assert_eq!(tr.step(2).unwrap().pp, 0.0);
        assert!(!tr.has_pp());
    }

    #[test]
    fn grow_and_reuse() {
        let mut tr = Trace::new();
        assert_eq!(tr.step_capacity(), 0);
        tr.grow_to(10).unwrap();
        assert!(tr.step_capacity() >= MIN_STEP_ALLOC);
        let cap = tr.step_capacity();
        tr.grow_to(cap + 1).unwrap();
        assert!(tr.step_capacity() >= 2 * cap);
        tr.grow_index_to(3).unwrap();
        assert!(tr.domain_capacity() >= MIN_DOMAIN_ALLOC);
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(11);
        let mut tr = gen_trace::generate_trace(&mut rng, 5, false).unwrap();
        let cap = tr.step_capacity();
        assert!(tr.is_indexed());
        tr.reuse();
        assert!(tr.is_empty());
        assert!(!tr.is_indexed());
        assert!(tr.domains().is_empty());
        assert_eq!(tr.step_capacity(), cap);
        assert_eq!((tr.model_len(), tr.seq_len()), (0, 0));
    }

    #[test]
    fn grow_failure_keeps_trace() {
        let mut tr = backward_glocal();
        let before = tr.steps().to_vec();
        assert!(matches!(tr.grow_to(usize::MAX), Err(Error::Allocation(_))));
        assert_eq!(tr.steps(), before.as_slice());
    }

    #[test]
    fn state_use_counts() {
        let mut tr = backward_glocal();
        tr.reverse();
        let counts = tr.state_use_counts();
        assert_eq!(counts[N.code()], 2);
        assert_eq!(counts[MG.code()], 2);
        assert_eq!(counts[T.code()], 1);
        assert_eq!(counts.iter().sum::<usize>(), tr.len());
    }
}
