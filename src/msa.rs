//! Digital multiple sequence alignment, as read from aligned FASTA.
use crate::alphabet::Alphabet;
use crate::dsq::DigitalSequence;
use crate::fasta::FASTARecord;
use crate::{Error, Result};

/// Default fraction of sequences that must have a residue for a column to be consensus.
pub const DEFAULT_SYMFRAC: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Msa {
    alphabet: Alphabet,
    names: Vec<String>,
    rows: Vec<DigitalSequence>,
    alen: usize,
}

impl Msa {
    /// Aligned rows must all have the same length.
    pub fn new(alphabet: Alphabet, names: Vec<String>, rows: Vec<DigitalSequence>) -> Result<Self> {
        if names.len() != rows.len() {
            return Err(Error::MalformedAlignment(format!(
                "{} names for {} rows",
                names.len(),
                rows.len()
            )));
        }
        let alen = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != alen) {
            return Err(Error::MalformedAlignment(format!(
                "row {} ({}) has {} columns, expected {}",
                idx,
                names[idx],
                row.len(),
                alen
            )));
        }
        Ok(Self {
            alphabet,
            names,
            rows,
            alen,
        })
    }
    pub fn from_records(records: &[FASTARecord], alphabet: Alphabet) -> Result<Self> {
        let rows = records
            .iter()
            .map(|(_, seq)| alphabet.digitize(seq))
            .collect::<Result<Vec<_>>>()?;
        let names = records.iter().map(|(id, _)| id.clone()).collect();
        Self::new(alphabet, names, rows)
    }
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }
    pub fn nseq(&self) -> usize {
        self.rows.len()
    }
    pub fn alen(&self) -> usize {
        self.alen
    }
    pub fn names(&self) -> &[String] {
        &self.names
    }
    pub fn rows(&self) -> &[DigitalSequence] {
        &self.rows
    }
    /// Number of residues in row `idx`; gaps, `*` and `~` do not count.
    pub fn residue_count(&self, idx: usize) -> usize {
        let row = self.rows[idx].as_ref();
        let abc = self.alphabet;
        let skipped: usize = [abc.gap(), abc.nonresidue(), abc.missing()]
            .iter()
            .map(|&x| bytecount::count(row, x))
            .sum();
        row.len() - skipped
    }
    /// Row `idx` with everything but residues removed.
    pub fn unaligned(&self, idx: usize) -> DigitalSequence {
        let abc = self.alphabet;
        let residues: Vec<u8> = self.rows[idx]
            .iter()
            .filter(|&&x| abc.is_residue(x))
            .copied()
            .collect();
        DigitalSequence::new(residues)
    }
    /// A column is consensus if at least `symfrac` of the sequences have a residue in it.
    pub fn consensus_columns(&self, symfrac: f64) -> Vec<bool> {
        let abc = self.alphabet;
        let nseq = self.rows.len();
        (1..=self.alen)
            .map(|col| {
                let filled = self.rows.iter().filter(|row| abc.is_residue(row[col])).count();
                0 < nseq && symfrac * nseq as f64 <= filled as f64
            })
            .collect()
    }
}
