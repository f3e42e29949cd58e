use clap::{App, Arg};
use hmmtrace::{Alphabet, DoctorReport, FauxConfig, Hmm, Msa, Trace};
use rayon::prelude::*;
use std::io::{BufWriter, Write};
#[macro_use]
extern crate log;

fn app() -> App<'static, 'static> {
    App::new("hmmtrace")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Aligned FASTA -> faux traces -> core model counts (JSON)")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Debug mode"),
        )
        .arg(
            Arg::with_name("alignment")
                .long("alignment")
                .short("a")
                .value_name("FASTA")
                .takes_value(true)
                .required(true)
                .help("Multiple alignment. Aligned FASTA format, `-` for stdin."),
        )
        .arg(
            Arg::with_name("amino")
                .long("amino")
                .help("Protein alignment. Default is DNA."),
        )
        .arg(
            Arg::with_name("symfrac")
                .long("symfrac")
                .takes_value(true)
                .default_value("0.5")
                .help("Residue fraction for a column to be consensus."),
        )
        .arg(
            Arg::with_name("msa_coords")
                .long("msa-coords")
                .help("Use alignment columns as sequence coordinates."),
        )
        .arg(
            Arg::with_name("dump")
                .long("dump")
                .help("Dump the traces instead of the counts."),
        )
        .arg(
            Arg::with_name("threads")
                .long("threads")
                .short("t")
                .takes_value(true)
                .default_value("1")
                .help("Number of threads"),
        )
}

fn main() -> std::io::Result<()> {
    let matches = app().get_matches();
    let level = match matches.occurrences_of("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    let threads: usize = matches
        .value_of("threads")
        .and_then(|x| x.parse().ok())
        .unwrap_or(1);
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?}", why);
    }
    let symfrac: f64 = matches
        .value_of("symfrac")
        .and_then(|x| x.parse().ok())
        .unwrap_or(hmmtrace::msa::DEFAULT_SYMFRAC);
    let alphabet = if matches.is_present("amino") {
        Alphabet::Amino
    } else {
        Alphabet::Dna
    };
    let config = FauxConfig::default().msa_coords(matches.is_present("msa_coords"));
    let path = matches.value_of("alignment").filter(|&p| p != "-");
    let records = hmmtrace::fasta::read_fasta(&path)?;
    debug!("Read {} sequences", records.len());
    if let Err(why) = run(&records, alphabet, symfrac, &config, matches.is_present("dump")) {
        error!("{}", why);
        std::process::exit(1);
    }
    Ok(())
}

fn run(
    records: &[hmmtrace::fasta::FASTARecord],
    alphabet: Alphabet,
    symfrac: f64,
    config: &FauxConfig,
    dump: bool,
) -> hmmtrace::Result<()> {
    let msa = Msa::from_records(records, alphabet)?;
    let matassign = msa.consensus_columns(symfrac);
    let mut traces = Trace::faux_from_msa(&msa, &matassign, config)?;
    let mut report = DoctorReport::default();
    for tr in traces.iter_mut() {
        report += tr.doctor();
        tr.index()?;
    }
    info!(
        "{} traces, M={}; doctored {} D->I and {} I->D pairs",
        traces.len(),
        traces.first().map(|tr| tr.model_len()).unwrap_or(0),
        report.ndi,
        report.nid
    );
    // Validation needs what the coordinates refer to: the row itself, or its residues.
    let seqs: Vec<_> = (0..msa.nseq())
        .map(|idx| {
            if config.msa_coords {
                msa.rows()[idx].clone()
            } else {
                msa.unaligned(idx)
            }
        })
        .collect();
    traces
        .par_iter()
        .zip(seqs.par_iter())
        .try_for_each(|(tr, dsq)| tr.validate(alphabet, Some(dsq)))?;
    let stdout = std::io::stdout();
    let mut wtr = BufWriter::new(stdout.lock());
    if dump {
        for (name, tr) in msa.names().iter().zip(traces.iter()) {
            writeln!(wtr, "# {}", name)?;
            tr.dump(&mut wtr)?;
        }
        return Ok(());
    }
    let m = traces.first().map(|tr| tr.model_len()).unwrap_or(0);
    let hmm = traces
        .par_iter()
        .zip(seqs.par_iter())
        .try_fold(
            || Hmm::zeros(m, alphabet),
            |mut hmm, (tr, dsq)| tr.count(&mut hmm, dsq, 1f32).map(|_| hmm),
        )
        .try_reduce(
            || Hmm::zeros(m, alphabet),
            |mut acc, hmm| acc.merge(&hmm).map(|_| acc),
        )?;
    serde_json::to_writer_pretty(&mut wtr, &hmm).map_err(std::io::Error::from)?;
    writeln!(wtr)?;
    Ok(())
}
