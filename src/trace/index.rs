use super::{grow_vec, Domain, Trace, MIN_DOMAIN_ALLOC};
use crate::statetype::StateType;
use crate::{Error, Result};

impl Trace {
    /// Build the domain index: one entry per B..E pair.
    ///
    /// Sequence coordinates come from the first and last residue emitted by a match
    /// or insert of the domain. Model coordinates come from its first and last match;
    /// a domain without any match falls back to its first and last main-model node.
    /// Flanking residues in N, J and C never count.
    ///
    /// On error the trace is left unindexed and its steps untouched.
    pub fn index(&mut self) -> Result<()> {
        self.domains.clear();
        self.indexed = false;
        let (steps, domains) = (&self.steps, &mut self.domains);
        let mut open: Option<(Domain, usize, usize)> = None;
        for (z, step) in steps.iter().enumerate() {
            match step.st {
                StateType::B => {
                    if let Some((d, _, _)) = open {
                        domains.clear();
                        return Err(Error::structural(
                            z,
                            format!("B while the domain begun at step {} is still open", d.tfrom),
                        ));
                    }
                    let d = Domain {
                        tfrom: z,
                        ..Domain::default()
                    };
                    open = Some((d, 0, 0));
                }
                StateType::E => {
                    let (mut d, first_k, last_k) = match open.take() {
                        Some(x) => x,
                        None => {
                            domains.clear();
                            return Err(Error::structural(z, "E without a preceding B"));
                        }
                    };
                    d.tto = z;
                    if d.hmmfrom == 0 {
                        d.hmmfrom = first_k;
                        d.hmmto = last_k;
                    }
                    let ndom = domains.len() + 1;
                    if let Err(why) = grow_vec(domains, ndom, MIN_DOMAIN_ALLOC) {
                        domains.clear();
                        return Err(why);
                    }
                    domains.push(d);
                }
                st if st.is_main() => {
                    let (d, first_k, last_k) = match open.as_mut() {
                        Some(x) => x,
                        None => {
                            domains.clear();
                            return Err(Error::structural(
                                z,
                                format!("{}{} outside of any domain", st, step.k),
                            ));
                        }
                    };
                    if *first_k == 0 {
                        *first_k = step.k;
                    }
                    *last_k = step.k;
                    if st.is_match() {
                        if d.hmmfrom == 0 {
                            d.hmmfrom = step.k;
                        }
                        d.hmmto = step.k;
                    }
                    if step.i > 0 {
                        if d.sqfrom == 0 {
                            d.sqfrom = step.i;
                        }
                        d.sqto = step.i;
                    }
                }
                _ => {}
            }
        }
        if let Some((d, _, _)) = open {
            domains.clear();
            return Err(Error::structural(
                d.tfrom,
                "domain begun here is never closed by E",
            ));
        }
        self.indexed = true;
        trace!("indexed {} domain(s) over {} steps", self.domains.len(), self.steps.len());
        Ok(())
    }
}
