use super::{Step, Trace};
use crate::alphabet::Alphabet;
use crate::dsq::DigitalSequence;
use crate::statetype::StateType;
use crate::{Error, Result};

// S N B {L,G} {M,D} E C T
const MIN_PATH_LEN: usize = 8;

fn bad_edge(z: usize, prev: &Step, cur: &Step, why: &str) -> Error {
    Error::structural(
        z,
        format!(
            "{}{}->{}{}: {}",
            prev.st,
            show_k(prev),
            cur.st,
            show_k(cur),
            why
        ),
    )
}

fn show_k(step: &Step) -> String {
    if step.st.is_main() {
        step.k.to_string()
    } else {
        String::new()
    }
}

// Next residue to be emitted, walking over the sequence as the trace goes.
struct Cursor<'a> {
    abc: Alphabet,
    dsq: Option<&'a DigitalSequence>,
    i: usize,
}

impl<'a> Cursor<'a> {
    // Skip gaps, `*` and `~`: columns of an aligned row that no step emits.
    fn skip_nonresidues(&mut self) {
        if let Some(dsq) = self.dsq {
            while self.i <= dsq.len() && !self.abc.is_residue(dsq[self.i]) {
                self.i += 1;
            }
        }
    }
    fn emit(&mut self, z: usize, step: &Step) -> Result<()> {
        self.skip_nonresidues();
        if step.i != self.i {
            return Err(Error::structural(
                z,
                format!("{} emits i={}, expected i={}", step.st, step.i, self.i),
            ));
        }
        if let Some(dsq) = self.dsq {
            if dsq.len() < self.i || !self.abc.is_residue(dsq[self.i]) {
                return Err(Error::structural(
                    z,
                    format!("{} emits i={}, which is not a residue", step.st, step.i),
                ));
            }
        }
        self.i += 1;
        Ok(())
    }
}

impl Trace {
    /// Check that the trace is a legal path through the state machine.
    ///
    /// An empty trace is valid. Otherwise every step must follow from the previous
    /// one, emitted residues must run 1..L without gaps or repeats, and if the trace
    /// is indexed the index must agree with the steps. With `dsq`, emitted positions
    /// are also checked against it; positions of `dsq` that hold no residue (gaps,
    /// `*` and `~`) are skipped, so a trace in alignment coordinates validates against its row.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, abc: Alphabet, dsq: Option<&DigitalSequence>) -> Result<()> {
        let result = self.check_steps().and_then(|_| self.check_path(abc, dsq));
        if let Err(ref why) = result {
            debug!("trace failed validation: {}", why);
        }
        result
    }

    fn check_steps(&self) -> Result<()> {
        let n = self.steps.len();
        if n == 0 {
            return Ok(());
        }
        if n < MIN_PATH_LEN {
            return Err(Error::Structural {
                step: None,
                msg: format!("too short to be a path (N={})", n),
            });
        }
        for (z, step) in self.steps.iter().enumerate() {
            if step.st == StateType::Bogus {
                return Err(Error::structural(z, "BOGUS state"));
            }
            if step.st.is_main() {
                if step.k == 0 || self.m < step.k {
                    return Err(Error::structural(
                        z,
                        format!("{} has k={}, out of 1..{}", step.st, step.k, self.m),
                    ));
                }
            } else if step.k != 0 {
                return Err(Error::structural(
                    z,
                    format!("{} has k={}, expected 0", step.st, step.k),
                ));
            }
            if !step.st.may_emit() && step.i != 0 {
                return Err(Error::structural(
                    z,
                    format!("{} can't emit, but has i={}", step.st, step.i),
                ));
            }
            if self.l < step.i {
                return Err(Error::structural(
                    z,
                    format!("i={} beyond L={}", step.i, self.l),
                ));
            }
            if !(0f32..=1f32).contains(&step.pp) {
                return Err(Error::structural(
                    z,
                    format!("pp={} is not a probability", step.pp),
                ));
            }
            if step.i == 0 && step.pp != 0f32 {
                return Err(Error::structural(
                    z,
                    format!("{} emits nothing, but has pp={}", step.st, step.pp),
                ));
            }
            if !self.with_pp && step.pp != 0f32 {
                return Err(Error::structural(
                    z,
                    "pp set on a trace without posterior probabilities",
                ));
            }
        }
        let bracket = [
            (0, StateType::S),
            (1, StateType::N),
            (n - 2, StateType::C),
            (n - 1, StateType::T),
        ];
        for &(z, st) in bracket.iter() {
            if self.steps[z].st != st {
                return Err(Error::structural(
                    z,
                    format!("expected {}, found {}", st, self.steps[z].st),
                ));
            }
        }
        Ok(())
    }

    fn check_path(&self, abc: Alphabet, dsq: Option<&DigitalSequence>) -> Result<()> {
        use StateType::*;
        let n = self.steps.len();
        if n == 0 {
            return Ok(());
        }
        if let Some(dsq) = dsq {
            if dsq.len() < self.l {
                return Err(Error::DimensionMismatch {
                    what: "sequence length",
                    trace: self.l,
                    available: dsq.len(),
                });
            }
        }
        let mut cursor = Cursor { abc, dsq, i: 1 };
        let mut is_local = false;
        let mut open: Option<usize> = None;
        let mut bounds = vec![];
        for z in 1..n {
            let (prev, cur) = (&self.steps[z - 1], &self.steps[z]);
            let edge_ok = match cur.st {
                S => return Err(Error::structural(z, "S is only allowed first")),
                T => {
                    if z + 1 != n {
                        return Err(Error::structural(z, "T is only allowed last"));
                    }
                    prev.st == C
                }
                N => prev.st == S || prev.st == N,
                B => {
                    if let Some(from) = open {
                        return Err(Error::structural(
                            z,
                            format!("B inside the domain begun at step {}", from),
                        ));
                    }
                    open = Some(z);
                    prev.st == N || prev.st == J
                }
                L | G => {
                    is_local = cur.st == L;
                    prev.st == B
                }
                E => {
                    let from = open
                        .take()
                        .ok_or_else(|| Error::structural(z, "E outside of any domain"))?;
                    bounds.push((from, z));
                    let flavour_ok = prev.st.is_main() && prev.st.is_local() == is_local;
                    let from_md = prev.st.is_match() || prev.st.is_delete();
                    if flavour_ok && from_md && !is_local && prev.k != self.m {
                        return Err(bad_edge(z, prev, cur, "glocal path must reach node M"));
                    }
                    flavour_ok && from_md
                }
                J | C => prev.st == E || prev.st == cur.st,
                ML | MG | IL | IG | DL | DG => {
                    if cur.st.is_local() != is_local || open.is_none() {
                        return Err(bad_edge(z, prev, cur, "local and glocal states mixed"));
                    }
                    let same_flavour = prev.st.is_main() && prev.st.is_local() == is_local;
                    if cur.st.is_match() {
                        match prev.st {
                            L => true,
                            G => cur.k == 1,
                            _ => same_flavour && cur.k == prev.k + 1,
                        }
                    } else if cur.st.is_insert() {
                        same_flavour && !prev.st.is_delete() && cur.k == prev.k && cur.k < self.m
                    } else if cur.st == DG && prev.st == G {
                        cur.k == 1
                    } else {
                        if cur.st == DG && cur.k == 1 {
                            return Err(bad_edge(z, prev, cur, "DG1 must follow G"));
                        }
                        same_flavour && !prev.st.is_insert() && cur.k == prev.k + 1
                    }
                }
                Bogus => false,
            };
            if !edge_ok {
                return Err(bad_edge(z, prev, cur, "no such transition"));
            }
            if cur.st.is_flank() && prev.st != cur.st {
                if cur.i != 0 {
                    return Err(Error::structural(
                        z,
                        format!("first {} of a run emits nothing, but has i={}", cur.st, cur.i),
                    ));
                }
            } else if cur.st.may_emit() {
                cursor.emit(z, cur)?;
            }
        }
        if let Some(from) = open {
            return Err(Error::structural(from, "domain is never closed by E"));
        }
        cursor.skip_nonresidues();
        if cursor.i != self.l + 1 {
            return Err(Error::Structural {
                step: None,
                msg: format!("path emits {} residues, but L={}", cursor.i - 1, self.l),
            });
        }
        if self.indexed {
            if self.domains.len() != bounds.len() {
                return Err(Error::Structural {
                    step: None,
                    msg: format!(
                        "index has {} domains, path has {}",
                        self.domains.len(),
                        bounds.len()
                    ),
                });
            }
            for (d, &(from, to)) in self.domains.iter().zip(bounds.iter()) {
                if d.tfrom != from || d.tto != to {
                    return Err(Error::structural(
                        from,
                        format!(
                            "index says the domain spans steps {}..{}, path says {}..{}",
                            d.tfrom, d.tto, from, to
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_trace;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    use StateType::*;

    fn build(path: &[(StateType, usize, usize)], m: usize, l: usize) -> Trace {
        let mut tr = Trace::new();
        for &(st, k, i) in path {
            tr.append(st, k, i).unwrap();
        }
        tr.set_model_len(m);
        tr.set_seq_len(l);
        tr
    }

    fn glocal_path() -> Vec<(StateType, usize, usize)> {
        vec![
            (S, 0, 0),
            (N, 0, 0),
            (N, 0, 1),
            (B, 0, 0),
            (G, 0, 0),
            (MG, 1, 2),
            (IG, 1, 3),
            (MG, 2, 4),
            (DG, 3, 0),
            (E, 0, 0),
            (C, 0, 0),
            (C, 0, 5),
            (T, 0, 0),
        ]
    }

    #[test]
    fn empty_is_valid() {
        assert!(Trace::new().validate(Alphabet::Dna, None).is_ok());
    }

    #[test]
    fn glocal_is_valid() {
        let mut tr = build(&glocal_path(), 3, 5);
        tr.validate(Alphabet::Dna, None).unwrap();
        let dsq = Alphabet::Dna.digitize(b"ACGTA").unwrap();
        tr.validate(Alphabet::Dna, Some(&dsq)).unwrap();
        tr.index().unwrap();
        tr.validate(Alphabet::Dna, Some(&dsq)).unwrap();
    }

    #[test]
    fn aligned_row_validates() {
        // Same path in alignment coordinates: residues sit at columns 1,3,4,6,8.
        let mut path = glocal_path();
        for (step, i) in path
            .iter_mut()
            .filter(|s| s.2 > 0)
            .zip(vec![1, 3, 4, 6, 8])
        {
            step.2 = i;
        }
        let tr = build(&path, 3, 8);
        let row = Alphabet::Dna.digitize(b"A-CG-T-A").unwrap();
        tr.validate(Alphabet::Dna, Some(&row)).unwrap();
        assert!(tr.validate(Alphabet::Dna, None).is_err());
    }

    #[test]
    fn dg1_after_l() {
        let tr = build(
            &[
                (S, 0, 0),
                (N, 0, 0),
                (B, 0, 0),
                (L, 0, 0),
                (DG, 1, 0),
                (MG, 2, 1),
                (E, 0, 0),
                (C, 0, 0),
                (T, 0, 0),
            ],
            2,
            1,
        );
        let err = tr.validate(Alphabet::Dna, None).unwrap_err();
        assert_eq!(err.step(), Some(4));
        let msg = format!("{}", err);
        assert!(msg.contains("L->DG1"), "{}", msg);
    }

    #[test]
    fn violations() {
        let abc = Alphabet::Dna;
        // Too short.
        let tr = build(&[(S, 0, 0), (N, 0, 0), (C, 0, 0), (T, 0, 0)], 1, 0);
        assert!(matches!(
            tr.validate(abc, None),
            Err(Error::Structural { step: None, .. })
        ));
        // Glocal path must end at node M.
        let mut path = glocal_path();
        path.remove(8);
        let err = build(&path, 3, 5).validate(abc, None).unwrap_err();
        assert_eq!(err.step(), Some(8));
        // Skipped residue.
        let mut path = glocal_path();
        path[7].2 = 5;
        path[11].2 = 6;
        let err = build(&path, 3, 6).validate(abc, None).unwrap_err();
        assert_eq!(err.step(), Some(7));
        // Unconsumed residue.
        let err = build(&glocal_path(), 3, 6).validate(abc, None).unwrap_err();
        assert_eq!(err.step(), None);
        // Insert followed by delete.
        let mut path = glocal_path();
        path[7] = (DG, 2, 0);
        path[8] = (MG, 3, 4);
        let err = build(&path, 3, 5).validate(abc, None).unwrap_err();
        assert_eq!(err.step(), Some(7));
        // k beyond M.
        let err = build(&glocal_path(), 2, 5).validate(abc, None).unwrap_err();
        assert_eq!(err.step(), Some(8));
        // Emission on a gap of the sequence.
        let dsq = abc.digitize(b"ACG").unwrap();
        assert!(build(&glocal_path(), 3, 5).validate(abc, Some(&dsq)).is_err());
    }

    #[test]
    fn mixed_flavours() {
        let tr = build(
            &[
                (S, 0, 0),
                (N, 0, 0),
                (B, 0, 0),
                (L, 0, 0),
                (ML, 1, 1),
                (MG, 2, 2),
                (E, 0, 0),
                (C, 0, 0),
                (T, 0, 0),
            ],
            2,
            2,
        );
        assert_eq!(tr.validate(Alphabet::Dna, None).unwrap_err().step(), Some(5));
    }

    #[test]
    fn stale_index() {
        let mut tr = build(&glocal_path(), 3, 5);
        tr.index().unwrap();
        tr.domains[0].tto = 4;
        assert!(tr.validate(Alphabet::Dna, None).is_err());
    }

    #[test]
    fn random_traces_validate() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(2001);
        for _ in 0..300 {
            let m = rng.gen_range(1..20);
            let with_pp = rng.gen_bool(0.5);
            let tr = gen_trace::generate_trace(&mut rng, m, with_pp).unwrap();
            let dsq = gen_trace::generate_dsq(&mut rng, Alphabet::Amino, tr.seq_len());
            tr.validate(Alphabet::Amino, Some(&dsq)).unwrap();
            let mut rev = tr.clone();
            rev.reverse();
            if tr.len() > 0 {
                assert!(rev.validate(Alphabet::Amino, None).is_err());
            }
        }
    }

    #[test]
    fn node_index_on_special_state() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(77);
        for _ in 0..100 {
            let m = rng.gen_range(1..15);
            let tr = gen_trace::generate_trace(&mut rng, m, false).unwrap();
            for z in (0..tr.len()).filter(|&z| !tr.steps[z].st.is_main()) {
                let mut broken = tr.clone();
                broken.steps[z].k = rng.gen_range(1..=m);
                let err = broken.validate(Alphabet::Dna, None).unwrap_err();
                assert_eq!(err.step(), Some(z), "{}", err);
            }
        }
    }

    #[test]
    fn aligned_rows_with_nonresidues() {
        use crate::msa::Msa;
        use crate::trace::FauxConfig;
        let config = FauxConfig::default().msa_coords(true);
        let cases: [(&str, &[bool]); 2] = [
            ("AAA*", &[true, false, false, true]),
            ("R*CCAR~", &[true, true, false, false, false, true, true]),
        ];
        for &(row, matassign) in cases.iter() {
            let records = vec![("row".to_string(), row.as_bytes().to_vec())];
            let msa = Msa::from_records(&records, Alphabet::Dna).unwrap();
            let mut trs = Trace::faux_from_msa(&msa, matassign, &config).unwrap();
            let tr = &mut trs[0];
            tr.doctor();
            tr.index().unwrap();
            tr.validate(Alphabet::Dna, Some(&msa.rows()[0])).unwrap();
        }
    }
}
