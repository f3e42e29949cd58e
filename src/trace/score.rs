use super::Trace;
use crate::dsq::DigitalSequence;
use crate::profile::Profile;
use crate::{Error, Result};

// Compensated summation. Once the sum is infinite there is nothing left to compensate.
#[derive(Debug, Clone, Copy, Default)]
struct KahanSum {
    sum: f32,
    c: f32,
}

impl KahanSum {
    fn add(&mut self, x: f32) {
        if !x.is_finite() || !self.sum.is_finite() {
            self.sum += x;
            return;
        }
        let y = x - self.c;
        let t = self.sum + y;
        self.c = (t - self.sum) - y;
        self.sum = t;
    }
}

impl Trace {
    fn check_dimensions(&self, dsq: &DigitalSequence, gm: &Profile) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::NoPath);
        }
        self.require_index()?;
        if gm.len() < self.m {
            return Err(Error::DimensionMismatch {
                what: "model length",
                trace: self.m,
                available: gm.len(),
            });
        }
        if dsq.len() < self.l {
            return Err(Error::DimensionMismatch {
                what: "sequence length",
                trace: self.l,
                available: dsq.len(),
            });
        }
        Ok(())
    }

    /// Emission score of step `z`.
    pub(crate) fn emission_score(
        &self,
        z: usize,
        dsq: &DigitalSequence,
        gm: &Profile,
    ) -> Result<f32> {
        let step = &self.steps[z];
        if !(step.st.is_match() || step.st.is_insert()) {
            return Ok(0f32);
        }
        if gm.len() < step.k {
            return Err(Error::structural(
                z,
                format!("{}{} beyond the profile's M={}", step.st, step.k, gm.len()),
            ));
        }
        match dsq.get(step.i) {
            Some(x) if step.i > 0 && (x as usize) < gm.alphabet().kp() => {
                Ok(gm.emission_score(step.st, step.k, x))
            }
            _ => Err(Error::structural(
                z,
                format!("{}{} emits i={}, not a residue", step.st, step.k, step.i),
            )),
        }
    }

    /// Score of the transition from step `z` to step `z+1`.
    pub(crate) fn transition_score(&self, z: usize, gm: &Profile) -> Result<f32> {
        let (from, to) = (&self.steps[z], &self.steps[z + 1]);
        if gm.len() < from.k || gm.len() < to.k {
            return Err(Error::structural(
                z + 1,
                format!("node beyond the profile's M={}", gm.len()),
            ));
        }
        gm.transition_score(from.st, from.k, to.st, to.k)
            .ok_or_else(|| {
                Error::structural(
                    z + 1,
                    format!("no transition {}{}->{}{}", from.st, from.k, to.st, to.k),
                )
            })
    }

    /// Log-odds score of the trace, summed from S to T.
    /// The trace must be indexed; an empty trace is `NoPath`. Edges the profile
    /// scores -inf give -inf, while edges the state machine lacks are a structural
    /// error. Terms are accumulated in f64 and rounded once at the end.
    pub fn score(&self, dsq: &DigitalSequence, gm: &Profile) -> Result<f32> {
        self.check_dimensions(dsq, gm)?;
        let mut sc = 0f64;
        for z in 0..self.steps.len() {
            sc += self.emission_score(z, dsq, gm)? as f64;
            if z + 1 < self.steps.len() {
                sc += self.transition_score(z, gm)? as f64;
            }
        }
        Ok(sc as f32)
    }

    /// Same as [`Trace::score`], with compensated summation in f32.
    pub fn score_kahan(&self, dsq: &DigitalSequence, gm: &Profile) -> Result<f32> {
        self.check_dimensions(dsq, gm)?;
        let mut sc = KahanSum::default();
        for z in 0..self.steps.len() {
            sc.add(self.emission_score(z, dsq, gm)?);
            if z + 1 < self.steps.len() {
                sc.add(self.transition_score(z, gm)?);
            }
        }
        Ok(sc.sum)
    }

    /// Same as [`Trace::score`], summed from T back to S.
    pub fn score_backwards(&self, dsq: &DigitalSequence, gm: &Profile) -> Result<f32> {
        self.check_dimensions(dsq, gm)?;
        let mut sc = 0f64;
        for z in (0..self.steps.len()).rev() {
            sc += self.emission_score(z, dsq, gm)? as f64;
            if 0 < z {
                sc += self.transition_score(z - 1, gm)? as f64;
            }
        }
        Ok(sc as f32)
    }

    /// Score of domain `which`, from its B step to its E step.
    /// `which` must be less than the domain count.
    pub fn score_domain(&self, dsq: &DigitalSequence, gm: &Profile, which: usize) -> Result<f32> {
        self.check_dimensions(dsq, gm)?;
        let d = *self.domain(which)?;
        let mut sc = 0f64;
        for z in d.tfrom..=d.tto {
            sc += self.emission_score(z, dsq, gm)? as f64;
            if z < d.tto {
                sc += self.transition_score(z, gm)? as f64;
            }
        }
        Ok(sc as f32)
    }

    /// Mean posterior probability of the emitted residues.
    /// 0 if nothing is emitted or posteriors are not recorded.
    pub fn expected_accuracy(&self) -> f32 {
        if !self.with_pp {
            return 0f32;
        }
        let (sum, n) = self
            .steps
            .iter()
            .filter(|s| s.i > 0)
            .fold((0f64, 0usize), |(sum, n), s| (sum + s.pp as f64, n + 1));
        if n == 0 {
            0f32
        } else {
            (sum / n as f64) as f32
        }
    }
}
