// DigitalSequence: a digitized sequence indexed from one.
//
// # What's this?
//
// Positions in a trace are 1..L, with 0 meaning "no residue". To keep that
// convention at every lookup, the digital codes are padded with a sentinel on
// both ends, so `dsq[i]` for the i-th residue and `dsq[0]`/`dsq[L+1]` are the
// sentinels.
//
// # Example
//
// ```rust
// use hmmtrace::alphabet::Alphabet;
// let dsq = Alphabet::Dna.digitize(b"ACGT").unwrap();
// assert_eq!(dsq[1], 0);
// assert_eq!(dsq.len(), 4);
// ```

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalSequence(Vec<u8>);

impl DigitalSequence {
    /// Marks both ends of the sequence.
    pub const SENTINEL: u8 = 0xFF;
    /// `codes` are the digital residues (or gaps, for an aligned row) 1..L.
    pub fn new<T: std::borrow::Borrow<[u8]>>(codes: T) -> Self {
        let codes = codes.borrow();
        let mut seq = Vec::with_capacity(codes.len() + 2);
        seq.push(Self::SENTINEL);
        seq.extend_from_slice(codes);
        seq.push(Self::SENTINEL);
        DigitalSequence(seq)
    }
    /// L, the number of positions.
    pub fn len(&self) -> usize {
        self.0.len() - 2
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Code at position `i`, including the sentinels at 0 and L+1.
    pub fn get(&self, i: usize) -> Option<u8> {
        self.0.get(i).copied()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, u8> {
        self.as_ref().iter()
    }
}

impl std::convert::From<Vec<u8>> for DigitalSequence {
    fn from(mut xs: Vec<u8>) -> Self {
        xs.insert(0, Self::SENTINEL);
        xs.push(Self::SENTINEL);
        DigitalSequence(xs)
    }
}

impl std::convert::AsRef<[u8]> for DigitalSequence {
    fn as_ref(&self) -> &[u8] {
        &self.0[1..self.0.len() - 1]
    }
}

impl std::ops::Index<usize> for DigitalSequence {
    type Output = u8;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn one_based() {
        let dsq = DigitalSequence::new(vec![0, 1, 2, 3]);
        assert_eq!(dsq.len(), 4);
        assert_eq!(dsq[0], DigitalSequence::SENTINEL);
        assert_eq!(dsq[1], 0);
        assert_eq!(dsq[4], 3);
        assert_eq!(dsq[5], DigitalSequence::SENTINEL);
        assert_eq!(dsq.get(6), None);
        assert_eq!(dsq.as_ref(), &[0, 1, 2, 3]);
        let from_vec: DigitalSequence = vec![0, 1, 2, 3].into();
        assert_eq!(from_vec, dsq);
        let empty = DigitalSequence::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty[1], DigitalSequence::SENTINEL);
    }
}
