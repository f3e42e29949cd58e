//! This module is to generate random traces, profiles and sequences for testing.
//! Usually, it would not be used in the real-applications.
use crate::alphabet::Alphabet;
use crate::dsq::DigitalSequence;
use crate::profile::{Profile, SpecialTransition, Transition};
use crate::statetype::StateType;
use crate::trace::Trace;
use crate::Result;
use rand::Rng;

const TRANSITIONS: [Transition; 10] = [
    Transition::MM,
    Transition::IM,
    Transition::DM,
    Transition::LM,
    Transition::GM,
    Transition::GD,
    Transition::MD,
    Transition::DD,
    Transition::MI,
    Transition::II,
];

const MAX_DOMAINS: usize = 3;
const MAX_FLANK: usize = 4;
const MAX_INSERT: usize = 3;

/// A profile of `m` nodes where every edge is possible.
pub fn generate_profile<T: Rng>(rng: &mut T, abc: Alphabet, m: usize) -> Profile {
    let mut gm = Profile::new(m, abc);
    for k in 0..=m {
        for &t in TRANSITIONS.iter() {
            gm.set_tsc(k, t, rng.gen_range(0.05f32..1f32).ln());
        }
        for x in 0..abc.kp() as u8 {
            gm.set_msc(k, x, rng.gen_range(-2f32..2f32));
            gm.set_isc(k, x, rng.gen_range(-0.5f32..0.5f32));
        }
    }
    for &st in [StateType::E, StateType::N, StateType::J, StateType::C].iter() {
        let loop_p: f32 = rng.gen_range(0.05..0.95);
        gm.set_xsc(st, SpecialTransition::Loop, loop_p.ln());
        gm.set_xsc(st, SpecialTransition::Move, (1f32 - loop_p).ln());
    }
    let local_p: f32 = rng.gen_range(0.05..0.95);
    gm.set_bsc(false, local_p.ln());
    gm.set_bsc(true, (1f32 - local_p).ln());
    gm
}

/// `l` random canonical residues.
pub fn generate_dsq<T: Rng>(rng: &mut T, abc: Alphabet, l: usize) -> DigitalSequence {
    let k = abc.k() as u8;
    let codes: Vec<u8> = (0..l).map(|_| rng.gen_range(0..k)).collect();
    DigitalSequence::new(codes)
}

// Appends steps in order, numbering emitted residues as it goes.
struct PathWriter<'a, T: Rng> {
    tr: Trace,
    rng: &'a mut T,
    i: usize,
}

impl<'a, T: Rng> PathWriter<'a, T> {
    fn silent(&mut self, st: StateType, k: usize) -> Result<()> {
        self.push(st, k, 0)
    }
    fn emit(&mut self, st: StateType, k: usize) -> Result<()> {
        self.i += 1;
        self.push(st, k, self.i)
    }
    fn push(&mut self, st: StateType, k: usize, i: usize) -> Result<()> {
        if self.tr.has_pp() {
            let pp = if i > 0 {
                self.rng.gen_range(0.01f32..=1f32)
            } else {
                0f32
            };
            self.tr.append_with_pp(st, k, i, pp)
        } else {
            self.tr.append(st, k, i)
        }
    }
    // A run of N, J or C: the first one is silent, each further one emits.
    fn flank(&mut self, st: StateType) -> Result<()> {
        self.silent(st, 0)?;
        for _ in 0..self.rng.gen_range(0..=MAX_FLANK) {
            self.emit(st, 0)?;
        }
        Ok(())
    }
    fn domain(&mut self, m: usize) -> Result<()> {
        use StateType::*;
        let glocal = self.rng.gen_bool(0.5);
        let (entry, mat, ins, del) = if glocal {
            (G, MG, IG, DG)
        } else {
            (L, ML, IL, DL)
        };
        let (start, end) = if glocal {
            (1, m)
        } else {
            let start = self.rng.gen_range(1..=m);
            (start, self.rng.gen_range(start..=m))
        };
        // Which nodes are matches; a local domain enters on a match.
        let is_match: Vec<bool> = (start..=end)
            .map(|k| (!glocal && k == start) || self.rng.gen_bool(0.75))
            .collect();
        self.silent(B, 0)?;
        self.silent(entry, 0)?;
        for (offset, k) in (start..=end).enumerate() {
            if is_match[offset] {
                self.emit(mat, k)?;
            } else {
                self.silent(del, k)?;
            }
            // Inserts sit between two matches.
            let next_is_match = is_match.get(offset + 1).copied().unwrap_or(false);
            if is_match[offset] && next_is_match && self.rng.gen_bool(0.2) {
                for _ in 0..self.rng.gen_range(1..=MAX_INSERT) {
                    self.emit(ins, k)?;
                }
            }
        }
        self.silent(E, 0)
    }
}

/// A random, well-formed, indexed trace over a model of `m` nodes.
/// It has one to a few domains, each local or glocal, with flanks of random length.
/// L is the number of residues it emits.
pub fn generate_trace<T: Rng>(rng: &mut T, m: usize, with_pp: bool) -> Result<Trace> {
    use StateType::*;
    let m = m.max(1);
    let tr = if with_pp { Trace::with_pp() } else { Trace::new() };
    let mut writer = PathWriter { tr, rng, i: 0 };
    writer.silent(S, 0)?;
    writer.flank(N)?;
    let ndom = writer.rng.gen_range(1..=MAX_DOMAINS);
    for d in 0..ndom {
        writer.domain(m)?;
        if d + 1 < ndom {
            writer.flank(J)?;
        }
    }
    writer.flank(C)?;
    writer.silent(T, 0)?;
    let mut tr = writer.tr;
    tr.set_model_len(m);
    tr.set_seq_len(writer.i);
    tr.index()?;
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn generated_traces_are_valid() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(1);
        for m in 1..40 {
            let tr = generate_trace(&mut rng, m, m % 2 == 0).unwrap();
            assert!(tr.is_indexed());
            assert_eq!(tr.model_len(), m);
            tr.validate(Alphabet::Dna, None).unwrap();
            let ndom = tr.domain_count().unwrap();
            assert!(1 <= ndom && ndom <= MAX_DOMAINS);
            let dsq = generate_dsq(&mut rng, Alphabet::Dna, tr.seq_len());
            assert_eq!(dsq.len(), tr.seq_len());
            let gm = generate_profile(&mut rng, Alphabet::Dna, m);
            assert!(tr.score(&dsq, &gm).unwrap().is_finite());
        }
    }
}
