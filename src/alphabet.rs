//! Digital alphabets.
//!
//! Symbols are laid out as: canonical residues `0..K`, the gap at `K`, degenerate
//! residues, then the nonresidue `*` at `Kp-2` and missing data `~` at `Kp-1`.
use crate::dsq::DigitalSequence;
use serde::{Deserialize, Serialize};

const ILLEGAL: u8 = 0xFF;

const DNA_SYMBOLS: &[u8] = b"ACGT-RYMKSWHBVDN*~";
const AMINO_SYMBOLS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY-BJZOUX*~";

// Canonical members of each degenerate code, starting right after the gap.
const DNA_DEGENERATE: [&[u8]; 11] = [
    &[0, 2],       // R
    &[1, 3],       // Y
    &[0, 1],       // M
    &[2, 3],       // K
    &[1, 2],       // S
    &[0, 3],       // W
    &[0, 1, 3],    // H
    &[1, 2, 3],    // B
    &[0, 1, 2],    // V
    &[0, 2, 3],    // D
    &[0, 1, 2, 3], // N
];
const AMINO_DEGENERATE: [&[u8]; 6] = [
    &[2, 11], // B: D or N
    &[7, 9],  // J: I or L
    &[3, 13], // Z: E or Q
    &[8],     // O: pyrrolysine, counted as K
    &[1],     // U: selenocysteine, counted as C
    &[
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
    ], // X
];

const fn lookup_table(symbols: &[u8]) -> [u8; 256] {
    let mut slots = [ILLEGAL; 256];
    let mut x = 0;
    while x < symbols.len() {
        let c = symbols[x];
        slots[c as usize] = x as u8;
        slots[c.to_ascii_lowercase() as usize] = x as u8;
        x += 1;
    }
    slots
}

const fn dna_table() -> [u8; 256] {
    let mut slots = lookup_table(DNA_SYMBOLS);
    slots[b'U' as usize] = 3;
    slots[b'u' as usize] = 3;
    slots[b'X' as usize] = 15;
    slots[b'x' as usize] = 15;
    slots[b'.' as usize] = 4;
    slots[b'_' as usize] = 4;
    slots
}

const fn amino_table() -> [u8; 256] {
    let mut slots = lookup_table(AMINO_SYMBOLS);
    slots[b'.' as usize] = 20;
    slots[b'_' as usize] = 20;
    slots
}

const DNA_TABLE: [u8; 256] = dna_table();
const AMINO_TABLE: [u8; 256] = amino_table();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alphabet {
    Dna,
    Amino,
}

impl Alphabet {
    pub fn symbols(self) -> &'static [u8] {
        match self {
            Alphabet::Dna => DNA_SYMBOLS,
            Alphabet::Amino => AMINO_SYMBOLS,
        }
    }
    /// Number of canonical residues.
    pub fn k(self) -> usize {
        match self {
            Alphabet::Dna => 4,
            Alphabet::Amino => 20,
        }
    }
    /// Number of digital codes, including gap, degeneracies, `*` and `~`.
    pub fn kp(self) -> usize {
        self.symbols().len()
    }
    pub fn gap(self) -> u8 {
        self.k() as u8
    }
    pub fn nonresidue(self) -> u8 {
        (self.kp() - 2) as u8
    }
    pub fn missing(self) -> u8 {
        (self.kp() - 1) as u8
    }
    pub fn is_canonical(self, x: u8) -> bool {
        (x as usize) < self.k()
    }
    /// Canonical or degenerate residue; gaps, `*`, `~` and sentinels are not.
    pub fn is_residue(self, x: u8) -> bool {
        let x = x as usize;
        x < self.k() || (self.k() < x && x < self.kp() - 2)
    }
    pub fn is_gap(self, x: u8) -> bool {
        x == self.gap()
    }
    pub fn is_missing(self, x: u8) -> bool {
        x == self.missing()
    }
    pub fn digitize_symbol(self, c: u8) -> Option<u8> {
        let x = match self {
            Alphabet::Dna => DNA_TABLE[c as usize],
            Alphabet::Amino => AMINO_TABLE[c as usize],
        };
        (x != ILLEGAL).then(|| x)
    }
    /// Digitize a text sequence. Gap characters are kept, so aligned rows digitize too.
    pub fn digitize(self, text: &[u8]) -> crate::Result<DigitalSequence> {
        let codes = text
            .iter()
            .enumerate()
            .map(|(pos, &c)| {
                self.digitize_symbol(c).ok_or_else(|| {
                    crate::Error::InvalidArgument(format!(
                        "symbol {:?} at position {} is not in the {:?} alphabet",
                        c as char,
                        pos + 1,
                        self
                    ))
                })
            })
            .collect::<crate::Result<Vec<u8>>>()?;
        Ok(DigitalSequence::new(codes))
    }
    /// Text symbol of a digital code. Sentinels and unknown codes show as a space.
    pub fn symbol(self, x: u8) -> u8 {
        self.symbols().get(x as usize).copied().unwrap_or(b' ')
    }
    /// Canonical residues a code stands for. Empty for gaps, `*`, `~` and sentinels.
    pub fn canonical_members(self, x: u8) -> &'static [u8] {
        const CANONICAL: [u8; 20] = [
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
        ];
        let x = x as usize;
        if x < self.k() {
            return &CANONICAL[x..x + 1];
        }
        if !self.is_residue(x as u8) {
            return &[];
        }
        match self {
            Alphabet::Dna => DNA_DEGENERATE[x - self.k() - 1],
            Alphabet::Amino => AMINO_DEGENERATE[x - self.k() - 1],
        }
    }
    /// Add weight `wt` for an observed code into `counts[0..K]`.
    /// A degenerate residue spreads the weight evenly over its members.
    pub fn count_into(self, counts: &mut [f32], x: u8, wt: f32) {
        let members = self.canonical_members(x);
        if members.is_empty() {
            return;
        }
        let share = wt / members.len() as f32;
        for &y in members {
            counts[y as usize] += share;
        }
    }
}

impl std::str::FromStr for Alphabet {
    type Err = crate::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dna" | "nucleotide" => Ok(Alphabet::Dna),
            "amino" | "protein" => Ok(Alphabet::Amino),
            _ => Err(crate::Error::InvalidArgument(format!(
                "unknown alphabet: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn layout() {
        for &abc in &[Alphabet::Dna, Alphabet::Amino] {
            assert_eq!(abc.symbol(abc.gap()), b'-');
            assert_eq!(abc.symbol(abc.nonresidue()), b'*');
            assert_eq!(abc.symbol(abc.missing()), b'~');
            assert!(!abc.is_residue(abc.gap()));
            assert!(!abc.is_residue(abc.nonresidue()));
            assert!(!abc.is_residue(abc.missing()));
            assert!(!abc.is_residue(DigitalSequence::SENTINEL));
            for x in 0..abc.k() as u8 {
                assert!(abc.is_canonical(x) && abc.is_residue(x));
                assert_eq!(abc.canonical_members(x), &[x]);
            }
        }
        assert_eq!(Alphabet::Dna.kp(), 18);
        assert_eq!(Alphabet::Amino.kp(), 29);
    }
    #[test]
    fn digitize() {
        let abc = Alphabet::Dna;
        let dsq = abc.digitize(b"ACgt-.nU").unwrap();
        assert_eq!(dsq.as_ref(), &[0, 1, 2, 3, 4, 4, 15, 3]);
        assert!(abc.digitize(b"ACZ").is_err());
        let amino = Alphabet::Amino;
        let dsq = amino.digitize(b"WYbx").unwrap();
        assert_eq!(dsq.as_ref(), &[18, 19, 21, 26]);
    }
    #[test]
    fn degenerate_counts() {
        let abc = Alphabet::Dna;
        let mut counts = [0f32; 4];
        abc.count_into(&mut counts, abc.digitize_symbol(b'R').unwrap(), 1.0);
        assert_eq!(counts, [0.5, 0.0, 0.5, 0.0]);
        abc.count_into(&mut counts, abc.digitize_symbol(b'N').unwrap(), 2.0);
        assert_eq!(counts, [1.0, 0.5, 1.0, 0.5]);
        abc.count_into(&mut counts, abc.gap(), 1.0);
        assert_eq!(counts, [1.0, 0.5, 1.0, 0.5]);
        let amino = Alphabet::Amino;
        let mut counts = [0f32; 20];
        amino.count_into(&mut counts, amino.digitize_symbol(b'X').unwrap(), 2.0);
        assert!(counts.iter().all(|&c| (c - 0.1).abs() < 1e-6));
    }
}
