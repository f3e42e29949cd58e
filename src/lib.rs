//! Traceback paths of profile HMMs.
//!
//! A [`Trace`] records one path through a profile's state machine: which state was
//! used at each step, which model node and sequence residue it refers to, and
//! optionally the posterior probability of each aligned residue. Traces are built
//! by appending steps (or in reverse, then flipped), indexed into domains, checked
//! against the state machine, scored under a [`Profile`], and counted into the
//! core-model statistics of an [`Hmm`]. Alignments turn into faux traces with
//! [`Trace::faux_from_msa`].
//!
//! ```rust
//! use hmmtrace::{Alphabet, StateType::*, Trace};
//! let mut tr = Trace::new();
//! for &(st, k, i) in [(S, 0, 0), (N, 0, 0), (B, 0, 0), (G, 0, 0), (MG, 1, 1), (E, 0, 0), (C, 0, 0), (T, 0, 0)].iter() {
//!     tr.append(st, k, i).unwrap();
//! }
//! tr.set_model_len(1);
//! tr.set_seq_len(1);
//! tr.index().unwrap();
//! tr.validate(Alphabet::Dna, None).unwrap();
//! assert_eq!(tr.domain_coords(0).unwrap(), (1, 1, 1, 1));
//! ```
#[macro_use]
extern crate log;
pub mod alphabet;
pub mod dsq;
pub mod error;
pub mod fasta;
pub mod gen_trace;
pub mod hmm;
pub mod msa;
pub mod profile;
pub mod statetype;
pub mod trace;

pub use alphabet::Alphabet;
pub use dsq::DigitalSequence;
pub use error::{Error, Result};
pub use hmm::Hmm;
pub use msa::Msa;
pub use profile::Profile;
pub use statetype::StateType;
pub use trace::{Domain, DoctorReport, FauxConfig, Step, Trace};
