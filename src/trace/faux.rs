//! Faux traces: the paths implied by a multiple alignment and a consensus assignment,
//! as used when counting a model out of an alignment.
use super::{Step, Trace};
use crate::dsq::DigitalSequence;
use crate::msa::Msa;
use crate::statetype::StateType;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FauxConfig {
    /// Use alignment columns 1..alen as sequence coordinates instead of
    /// the unaligned residue positions 1..L.
    pub msa_coords: bool,
    /// Make room for posterior probabilities. They stay zero.
    pub with_pp: bool,
}

impl FauxConfig {
    pub fn msa_coords(mut self, msa_coords: bool) -> Self {
        self.msa_coords = msa_coords;
        self
    }
    pub fn with_pp(mut self, with_pp: bool) -> Self {
        self.with_pp = with_pp;
        self
    }
}

/// How many delete/insert pairs [`Trace::doctor`] turned into matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoctorReport {
    /// D->I pairs.
    pub ndi: usize,
    /// I->D pairs.
    pub nid: usize,
}

impl std::ops::AddAssign for DoctorReport {
    fn add_assign(&mut self, other: Self) {
        self.ndi += other.ndi;
        self.nid += other.nid;
    }
}

impl Trace {
    /// One glocal trace per row of `msa`. `matassign[c]` tells whether column `c+1`
    /// is a consensus column. Residues before the first consensus column go to N,
    /// after the last one to C, and in between to MG or IG; gaps in consensus
    /// columns become DG. Missing data counts as a gap.
    ///
    /// The traces may contain D->I and I->D pairs; see [`Trace::doctor`].
    pub fn faux_from_msa(
        msa: &Msa,
        matassign: &[bool],
        config: &FauxConfig,
    ) -> Result<Vec<Trace>> {
        if matassign.len() != msa.alen() {
            return Err(Error::MalformedAlignment(format!(
                "{} consensus flags for {} columns",
                matassign.len(),
                msa.alen()
            )));
        }
        let (lpos, rpos) = match (
            matassign.iter().position(|&x| x),
            matassign.iter().rposition(|&x| x),
        ) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(Error::MalformedAlignment(
                    "no consensus columns".to_string(),
                ))
            }
        };
        let m = matassign.iter().filter(|&&x| x).count();
        let trs = msa
            .rows()
            .iter()
            .map(|row| faux_row(msa, row, matassign, (lpos, rpos), m, config))
            .collect::<Result<Vec<_>>>()?;
        trace!(
            "{} faux traces, M={}, consensus columns {}..{}",
            trs.len(),
            m,
            lpos + 1,
            rpos + 1
        );
        Ok(trs)
    }

    /// Turn each DG/IG pair into a match, and each IG/DG pair likewise.
    /// Such pairs come out of faux traces but can't be aligned by a profile,
    /// which has no D->I or I->D edges. The match takes the node of the delete and
    /// the residue of the insert, so residues and nodes covered stay the same.
    pub fn doctor(&mut self) -> DoctorReport {
        let mut report = DoctorReport::default();
        let n = self.steps.len();
        let (mut opos, mut npos) = (0, 0);
        while opos < n {
            let cur = self.steps[opos];
            let fused = match self.steps.get(opos + 1) {
                Some(next) if cur.st.is_delete() && next.st.is_insert() => {
                    report.ndi += 1;
                    Some(Step {
                        st: match_of(cur.st),
                        k: cur.k,
                        i: next.i,
                        pp: next.pp,
                    })
                }
                Some(next) if cur.st.is_insert() && next.st.is_delete() => {
                    report.nid += 1;
                    Some(Step {
                        st: match_of(next.st),
                        k: next.k,
                        i: cur.i,
                        pp: cur.pp,
                    })
                }
                _ => None,
            };
            match fused {
                Some(step) => {
                    self.steps[npos] = step;
                    opos += 2;
                }
                None => {
                    self.steps[npos] = cur;
                    opos += 1;
                }
            }
            npos += 1;
        }
        self.steps.truncate(npos);
        if report != DoctorReport::default() {
            self.invalidate_index();
        }
        debug!("doctored {} D->I and {} I->D pairs", report.ndi, report.nid);
        report
    }
}

fn match_of(st: StateType) -> StateType {
    if st.is_local() {
        StateType::ML
    } else {
        StateType::MG
    }
}

fn faux_row(
    msa: &Msa,
    row: &DigitalSequence,
    matassign: &[bool],
    (lpos, rpos): (usize, usize),
    m: usize,
    config: &FauxConfig,
) -> Result<Trace> {
    use StateType::*;
    let abc = msa.alphabet();
    let mut tr = if config.with_pp {
        Trace::with_pp()
    } else {
        Trace::new()
    };
    tr.grow_to(row.len() + 8)?;
    tr.append(S, 0, 0)?;
    tr.append(N, 0, 0)?;
    let (mut k, mut i) = (0, 1);
    for (cpos, (&x, &is_consensus)) in row.iter().zip(matassign.iter()).enumerate() {
        let residue = abc.is_residue(x);
        let showpos = if config.msa_coords { cpos + 1 } else { i };
        if is_consensus {
            k += 1;
        }
        if cpos == lpos {
            tr.append(B, 0, 0)?;
            tr.append(G, 0, 0)?;
        }
        match (is_consensus, residue) {
            (true, true) => tr.append(MG, k, showpos)?,
            (true, false) => tr.append(DG, k, 0)?,
            (false, true) if cpos < lpos => tr.append(N, 0, showpos)?,
            (false, true) if rpos < cpos => tr.append(C, 0, showpos)?,
            (false, true) => tr.append(IG, k, showpos)?,
            (false, false) => {}
        }
        if cpos == rpos {
            tr.append(E, 0, 0)?;
            tr.append(C, 0, 0)?;
        }
        if residue {
            i += 1;
        }
    }
    tr.append(T, 0, 0)?;
    tr.set_model_len(m);
    tr.set_seq_len(if config.msa_coords { msa.alen() } else { i - 1 });
    Ok(tr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::fasta::FASTARecord;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    use StateType::*;

    fn msa(rows: &[&str]) -> Msa {
        let records: Vec<FASTARecord> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (format!("seq{}", i), r.as_bytes().to_vec()))
            .collect();
        Msa::from_records(&records, Alphabet::Dna).unwrap()
    }

    fn states(tr: &Trace) -> Vec<(StateType, usize, usize)> {
        tr.steps().iter().map(|s| (s.st, s.k, s.i)).collect()
    }

    #[test]
    fn flanks_and_inserts() {
        // Columns: . x x . x x . (x = consensus)
        let msa = msa(&["GAC-TAA"]);
        let matassign = [false, true, true, false, true, true, false];
        let trs = Trace::faux_from_msa(&msa, &matassign, &FauxConfig::default()).unwrap();
        let tr = &trs[0];
        assert_eq!(
            states(tr),
            vec![
                (S, 0, 0),
                (N, 0, 0),
                (N, 0, 1),
                (B, 0, 0),
                (G, 0, 0),
                (MG, 1, 2),
                (MG, 2, 3),
                (MG, 3, 4),
                (MG, 4, 5),
                (E, 0, 0),
                (C, 0, 0),
                (C, 0, 6),
                (T, 0, 0),
            ]
        );
        assert_eq!((tr.model_len(), tr.seq_len()), (4, 6));
        tr.validate(Alphabet::Dna, Some(&msa.unaligned(0))).unwrap();
    }

    #[test]
    fn deletes_and_doctor() {
        let msa = msa(&["A-C-GT", "AC--GT", "A-CGT-"]);
        let matassign = [true, true, false, false, true, true];
        let config = FauxConfig::default();
        let mut trs = Trace::faux_from_msa(&msa, &matassign, &config).unwrap();
        // Row 0: MG1 DG2 IG2 MG3 MG4, a D->I pair.
        assert_eq!(
            states(&trs[0])[4..10].to_vec(),
            vec![(G, 0, 0), (MG, 1, 1), (DG, 2, 0), (IG, 2, 2), (MG, 3, 3), (MG, 4, 4)]
        );
        // Row 2: MG1 DG2 IG2 IG2 MG3 DG4.
        let report = trs[2].doctor();
        assert_eq!(report, DoctorReport { ndi: 1, nid: 0 });
        assert_eq!(
            states(&trs[2])[4..10].to_vec(),
            vec![(G, 0, 0), (MG, 1, 1), (MG, 2, 2), (IG, 2, 3), (MG, 3, 4), (DG, 4, 0)]
        );
        let mut total = DoctorReport::default();
        for (idx, tr) in trs.iter_mut().enumerate() {
            total += tr.doctor();
            tr.index().unwrap();
            tr.validate(Alphabet::Dna, Some(&msa.unaligned(idx))).unwrap();
        }
        assert_eq!(total, DoctorReport { ndi: 1, nid: 0 });
        assert!(trs[1].is_indexed());
    }

    #[test]
    fn insert_then_delete() {
        let msa = msa(&["AT-G", "A-CG"]);
        let matassign = [true, false, true, true];
        let mut trs = Trace::faux_from_msa(&msa, &matassign, &FauxConfig::default()).unwrap();
        let tr = &mut trs[0];
        // MG1 IG1 DG2 MG3
        let before = tr.state_use_counts();
        let report = tr.doctor();
        assert_eq!(report, DoctorReport { ndi: 0, nid: 1 });
        assert_eq!(
            states(tr)[4..8].to_vec(),
            vec![(G, 0, 0), (MG, 1, 1), (MG, 2, 2), (MG, 3, 3)]
        );
        let after = tr.state_use_counts();
        assert_eq!(after[MG.code()], before[MG.code()] + 1);
        tr.validate(Alphabet::Dna, Some(&msa.unaligned(0))).unwrap();
        assert_eq!(tr.doctor(), DoctorReport::default());
    }

    #[test]
    fn alignment_coordinates() {
        let msa = msa(&["-A-CG~T", "TA-C-GT"]);
        let matassign = [false, true, false, true, true, true, false];
        let config = FauxConfig::default().msa_coords(true).with_pp(true);
        let trs = Trace::faux_from_msa(&msa, &matassign, &config).unwrap();
        let tr = &trs[0];
        assert!(tr.has_pp());
        assert_eq!(tr.seq_len(), 7);
        let emitted: Vec<_> = tr.steps().iter().filter(|s| s.i > 0).map(|s| s.i).collect();
        assert_eq!(emitted, vec![2, 4, 5, 7]);
        tr.validate(Alphabet::Dna, Some(&msa.rows()[0])).unwrap();
        trs[1].validate(Alphabet::Dna, Some(&msa.rows()[1])).unwrap();
        assert_eq!(tr.expected_accuracy(), 0.0);
    }

    #[test]
    fn empty_row() {
        let msa = msa(&["A-G", "---"]);
        let trs = Trace::faux_from_msa(&msa, &[true, true, true], &FauxConfig::default()).unwrap();
        let tr = &trs[1];
        assert_eq!(tr.len(), 10);
        assert_eq!(tr.seq_len(), 0);
        tr.validate(Alphabet::Dna, None).unwrap();
    }

    #[test]
    fn malformed() {
        let msa = msa(&["ACGT"]);
        let err = Trace::faux_from_msa(&msa, &[true, true], &FauxConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedAlignment(_)));
        let err = Trace::faux_from_msa(&msa, &[false; 4], &FauxConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedAlignment(_)));
    }

    // Nodes touched by matches and deletes, in path order.
    fn nodes(tr: &Trace) -> Vec<usize> {
        tr.steps()
            .iter()
            .filter(|s| s.st.is_match() || s.st.is_delete())
            .map(|s| s.k)
            .collect()
    }

    #[test]
    fn random_alignments_doctor_into_valid_traces() {
        const SYMBOLS: &[u8] = b"ACGTRN--~*";
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(9182);
        for _ in 0..500 {
            let nseq = rng.gen_range(1..6);
            let alen = rng.gen_range(1..16);
            let rows: Vec<String> = (0..nseq)
                .map(|_| {
                    (0..alen)
                        .map(|_| SYMBOLS[rng.gen_range(0..SYMBOLS.len())] as char)
                        .collect()
                })
                .collect();
            let rows: Vec<&str> = rows.iter().map(|r| r.as_str()).collect();
            let msa = msa(&rows);
            let mut matassign: Vec<bool> = (0..alen).map(|_| rng.gen_bool(0.6)).collect();
            matassign[rng.gen_range(0..alen)] = true;
            let m = matassign.iter().filter(|&&x| x).count();
            for &msa_coords in [false, true].iter() {
                let config = FauxConfig::default().msa_coords(msa_coords);
                let mut trs = Trace::faux_from_msa(&msa, &matassign, &config).unwrap();
                for (idx, tr) in trs.iter_mut().enumerate() {
                    let emitted = tr.steps().iter().filter(|s| s.i > 0).count();
                    assert_eq!(emitted, msa.residue_count(idx));
                    assert_eq!(nodes(tr), (1..=m).collect::<Vec<_>>());
                    tr.doctor();
                    assert_eq!(tr.steps().iter().filter(|s| s.i > 0).count(), emitted);
                    assert_eq!(nodes(tr), (1..=m).collect::<Vec<_>>());
                    tr.index().unwrap();
                    let dsq = if msa_coords {
                        msa.rows()[idx].clone()
                    } else {
                        msa.unaligned(idx)
                    };
                    if let Err(why) = tr.validate(Alphabet::Dna, Some(&dsq)) {
                        panic!("{} {:?}: {}", rows[idx], matassign, why);
                    }
                }
            }
        }
    }
}
