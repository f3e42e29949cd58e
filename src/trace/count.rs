use super::Trace;
use crate::dsq::DigitalSequence;
use crate::hmm::{CoreTransition, Hmm};
use crate::statetype::StateType;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Event {
    Transition(usize, CoreTransition),
    Match(usize, u8),
    Insert(usize, u8),
}

impl Trace {
    /// Add the trace into the counts of `hmm` with weight `wt`.
    ///
    /// Emissions of match and insert states are counted at their node, a degenerate
    /// residue spreading its weight over its members. Core transitions are counted
    /// at the node they leave; G->M1 and G->D1 are the begin node's MM and MD, and a
    /// glocal exit from node M counts as that node's MM or DM. Local entries and
    /// exits and everything in the flanks are not counted.
    ///
    /// Nothing is added unless the whole trace can be counted.
    pub fn count(&self, hmm: &mut Hmm, dsq: &DigitalSequence, wt: f32) -> Result<()> {
        if hmm.len() < self.m {
            return Err(Error::DimensionMismatch {
                what: "model length",
                trace: self.m,
                available: hmm.len(),
            });
        }
        if dsq.len() < self.l {
            return Err(Error::DimensionMismatch {
                what: "sequence length",
                trace: self.l,
                available: dsq.len(),
            });
        }
        let events = self.count_events(hmm.len(), dsq)?;
        let abc = hmm.alphabet();
        for event in events {
            match event {
                Event::Transition(k, t) => hmm.add_t(k, t, wt),
                Event::Match(k, x) => abc.count_into(&mut hmm.mat[k], x, wt),
                Event::Insert(k, x) => abc.count_into(&mut hmm.ins[k], x, wt),
            }
        }
        Ok(())
    }

    fn count_events(&self, m: usize, dsq: &DigitalSequence) -> Result<Vec<Event>> {
        use CoreTransition::*;
        use StateType::*;
        let mut events = Vec::with_capacity(2 * self.steps.len());
        for (z, step) in self.steps.iter().enumerate() {
            if m < step.k {
                return Err(Error::structural(
                    z,
                    format!("{}{} beyond the model's M={}", step.st, step.k, m),
                ));
            }
            if step.st.is_match() || step.st.is_insert() {
                let x = match dsq.get(step.i) {
                    Some(x) if 0 < step.i && step.i <= dsq.len() => x,
                    _ => {
                        return Err(Error::structural(
                            z,
                            format!("{}{} emits i={}, not a residue", step.st, step.k, step.i),
                        ))
                    }
                };
                if step.st.is_match() {
                    events.push(Event::Match(step.k, x));
                } else {
                    events.push(Event::Insert(step.k, x));
                }
            }
            let next = match self.steps.get(z + 1) {
                Some(next) => next,
                None => break,
            };
            let t = match (step.st, next.st) {
                (G, MG) if next.k == 1 => Some((0, MM)),
                (G, DG) if next.k == 1 => Some((0, MD)),
                (ML, ML) | (MG, MG) if next.k == step.k + 1 => Some((step.k, MM)),
                (ML, IL) | (MG, IG) if next.k == step.k => Some((step.k, MI)),
                (ML, DL) | (MG, DG) if next.k == step.k + 1 => Some((step.k, MD)),
                (IL, ML) | (IG, MG) if next.k == step.k + 1 => Some((step.k, IM)),
                (IL, IL) | (IG, IG) if next.k == step.k => Some((step.k, II)),
                (DL, ML) | (DG, MG) if next.k == step.k + 1 => Some((step.k, DM)),
                (DL, DL) | (DG, DG) if next.k == step.k + 1 => Some((step.k, DD)),
                (ML, E) | (MG, E) if step.k == m => Some((step.k, MM)),
                (DL, E) | (DG, E) if step.k == m => Some((step.k, DM)),
                (ML, E) | (DL, E) => None,
                (from, _) if from.is_main() => {
                    return Err(Error::structural(
                        z + 1,
                        format!("no transition {}{}->{}{}", from, step.k, next.st, next.k),
                    ))
                }
                _ => None,
            };
            if let Some((k, t)) = t {
                events.push(Event::Transition(k, t));
            }
        }
        Ok(events)
    }
}
