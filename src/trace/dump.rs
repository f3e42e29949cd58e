use super::{Step, Trace};
use crate::dsq::DigitalSequence;
use crate::profile::Profile;
use crate::{Error, Result};
use std::io::Write;

impl Trace {
    /// One line per step: offset, state, node, position and posterior.
    pub fn dump<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(
            w,
            "#    z st     k      i     pp  (M={}, L={}, N={})",
            self.m,
            self.l,
            self.len()
        )?;
        writeln!(w, "#----- -- ------ ------ ------")?;
        for (z, step) in self.steps.iter().enumerate() {
            writeln!(
                w,
                "{:6} {:<2} {:6} {:6} {:6.4}",
                z, step.st, step.k, step.i, step.pp
            )?;
        }
        if self.indexed {
            for (d, dom) in self.domains.iter().enumerate() {
                writeln!(
                    w,
                    "# domain {}: steps {}..{}, seq {}..{}, model {}..{}",
                    d + 1,
                    dom.tfrom,
                    dom.tto,
                    dom.sqfrom,
                    dom.sqto,
                    dom.hmmfrom,
                    dom.hmmto
                )?;
            }
        }
        Ok(())
    }

    /// Like [`Trace::dump`], with the transition and emission score of each step,
    /// the residue, and the totals of score and posterior at the end.
    pub fn dump_annotated<W: Write>(
        &self,
        w: &mut W,
        gm: &Profile,
        dsq: &DigitalSequence,
    ) -> Result<()> {
        let abc = gm.alphabet();
        let (mut score, mut accuracy) = (0f32, 0f32);
        writeln!(w, "#    z st     k      i  transit emission postprob")?;
        writeln!(w, "#----- -- ------ ------ -------- -------- --------")?;
        for (z, step) in self.steps.iter().enumerate() {
            let transit = if z + 1 < self.steps.len() {
                self.transition_score(z, gm)?
            } else {
                0f32
            };
            let emission = self.emission_score(z, dsq, gm)?;
            score += transit + emission;
            accuracy += step.pp;
            let residue = match step.i {
                0 => b'-',
                i => dsq.get(i).map(|x| abc.symbol(x)).unwrap_or(b'?'),
            };
            writeln!(
                w,
                "{:6} {:<2} {:6} {:6} {:8.4} {:8.4} {:8.4} {}",
                z, step.st, step.k, step.i, transit, emission, step.pp, residue as char
            )?;
        }
        writeln!(w, "#                        -------- -------- --------")?;
        writeln!(w, "# total:                 {:8.4}          {:8.4}", score, accuracy)?;
        Ok(())
    }

    /// Check that two traces are identical: dimensions, steps and domain index.
    /// Posteriors may differ by up to `pptol`. Reports the first difference.
    pub fn compare(&self, other: &Trace, pptol: f32) -> Result<()> {
        let differ = |msg: String| Error::Structural { step: None, msg };
        if (self.m, self.l) != (other.m, other.l) {
            return Err(differ(format!(
                "M/L differ: {}/{} vs {}/{}",
                self.m, self.l, other.m, other.l
            )));
        }
        if self.len() != other.len() {
            return Err(differ(format!("N differs: {} vs {}", self.len(), other.len())));
        }
        if self.with_pp != other.with_pp {
            return Err(differ("only one trace has posteriors".to_string()));
        }
        for (z, (a, b)) in self.steps.iter().zip(other.steps.iter()).enumerate() {
            if (a.st, a.k, a.i) != (b.st, b.k, b.i) {
                return Err(Error::structural(
                    z,
                    format!("{} vs {}", show(a), show(b)),
                ));
            }
            if self.with_pp && pptol < (a.pp - b.pp).abs() {
                return Err(Error::structural(
                    z,
                    format!("pp {} vs {}", a.pp, b.pp),
                ));
            }
        }
        if self.indexed != other.indexed {
            return Err(differ("only one trace is indexed".to_string()));
        }
        if self.domains != other.domains {
            return Err(differ("domain indices differ".to_string()));
        }
        Ok(())
    }

    /// Check that two traces of the same sequence align the same residues to the same
    /// match states, in the same order. Everything else may differ: inserts, deletes,
    /// flanks, and the coordinates themselves, so a trace in alignment coordinates
    /// compares with its unaligned counterpart as long as each is read against its
    /// own `dsq`.
    pub fn compare_loosely(
        &self,
        dsq: &DigitalSequence,
        other: &Trace,
        other_dsq: &DigitalSequence,
    ) -> Result<()> {
        let ours = matched_residues(self, dsq)?;
        let theirs = matched_residues(other, other_dsq)?;
        for ((z, a), (_, b)) in ours.iter().zip(theirs.iter()) {
            if a != b {
                return Err(Error::structural(
                    *z,
                    format!("match k={} on {} vs k={} on {}", a.0, a.1, b.0, b.1),
                ));
            }
        }
        if ours.len() != theirs.len() {
            return Err(Error::Structural {
                step: None,
                msg: format!("{} vs {} matched residues", ours.len(), theirs.len()),
            });
        }
        Ok(())
    }
}

fn show(step: &Step) -> String {
    format!("{}(k={},i={})", step.st, step.k, step.i)
}

// (step offset, (node, residue code)) of every match state.
fn matched_residues(tr: &Trace, dsq: &DigitalSequence) -> Result<Vec<(usize, (usize, u8))>> {
    tr.steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.st.is_match())
        .map(|(z, s)| match dsq.get(s.i) {
            Some(x) if 0 < s.i && s.i <= dsq.len() => Ok((z, (s.k, x))),
            _ => Err(Error::DimensionMismatch {
                what: "sequence length",
                trace: s.i,
                available: dsq.len(),
            }),
        })
        .collect()
}
