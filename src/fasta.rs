//! Very thin Fasta reader. Only support batch IO.
//! Aligned FASTA is read the same way; gap characters are kept as they are.
use std::io::{BufRead, BufReader, BufWriter, Write};
pub type FASTARecord = (String, Vec<u8>);

/// Write records into the writer
pub fn write_fasta<W: Write>(
    wtr: &mut BufWriter<W>,
    records: &[FASTARecord],
) -> std::io::Result<()> {
    for (id, seq) in records {
        writeln!(wtr, ">{}\n{}", id, String::from_utf8_lossy(seq))?;
    }
    Ok(())
}

/// Read file or stdin, return parsed fasta records.
pub fn read_fasta<P: AsRef<std::path::Path>>(
    file: &Option<P>,
) -> std::io::Result<Vec<FASTARecord>> {
    let stdin = std::io::stdin();
    let mut reader: Box<dyn BufRead> = match file {
        Some(file) => std::fs::File::open(file)
            .map(BufReader::new)
            .map(Box::new)?,
        None => {
            let lock = stdin.lock();
            Box::new(BufReader::new(lock))
        }
    };
    let mut contents = vec![];
    reader.read_to_end(&mut contents)?;
    Ok(parse_fasta(&contents))
}

/// Parse records. Anything before the first `>` is ignored,
/// as are records without a sequence line.
pub fn parse_fasta(contents: &[u8]) -> Vec<FASTARecord> {
    contents
        .split(|&x| x == b'>')
        .skip(1)
        .filter_map(|record| {
            let mut record = record.splitn(2, |&x| x == b'\n');
            let id = record.next()?.split(|&x| x == b' ').next()?;
            let contents = record.next()?;
            let contents: Vec<_> = contents
                .iter()
                .filter(|x| !x.is_ascii_whitespace())
                .copied()
                .collect();
            let id = String::from_utf8_lossy(id).trim_end().to_string();
            Some((id, contents))
        })
        .collect()
}
