use clap::*;
use gcalign::libs::{Globaligner, PairwiseAligner};
use log::info;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("align")
        .about("Align the genes of gene clusters")
        .after_help(
            r###"
Aligns every gene of each cluster against every gene of every other cluster
and writes the results as a JSON session.

Notes:
* Each input is a protein FASTA file holding one cluster, named after the file.
* Records named `locus|gene` are grouped into loci; otherwise the cluster has one locus.
* Gene order inside a locus follows the file and defines synteny.
* Gene pairs below `--cutoff` identity are not kept.
* With `--session`, the clusters are added to an existing session and only
  pairs without an alignment are computed.

Examples:
1. Align three clusters:
   gcalign align bgc1.fa bgc2.fa bgc3.fa -o session.json

2. Add a cluster to a session, using 4 threads:
   gcalign align bgc4.fa --session session.json -o session.json -p 4

3. Local alignments scored with PAM250:
   gcalign align bgc1.fa bgc2.fa --mode local --matrix pam250

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Protein FASTA file(s), one cluster per file"),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .num_args(1)
                .help("Extend this session instead of starting empty"),
        )
        .arg(
            Arg::new("cutoff")
                .long("cutoff")
                .short('c')
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("0.3")
                .help("Minimum identity of a kept gene pair"),
        )
        .arg(
            Arg::new("matrix")
                .long("matrix")
                .num_args(1)
                .default_value("blosum62")
                .help("Substitution matrix: blosum62, pam40, pam120, pam200, pam250"),
        )
        .arg(
            Arg::new("gap_open")
                .long("gap-open")
                .num_args(1)
                .allow_hyphen_values(true)
                .default_value("-10")
                .help("Score of the first position of a gap"),
        )
        .arg(
            Arg::new("gap_extend")
                .long("gap-extend")
                .num_args(1)
                .allow_hyphen_values(true)
                .default_value("-0.5")
                .help("Score of each further position of a gap"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .num_args(1)
                .default_value("global")
                .help("Alignment mode: global, local, semiglobal"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of threads"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let cutoff = *args.get_one::<f64>("cutoff").unwrap();
    let parallel = *args.get_one::<usize>("parallel").unwrap();
    if !(0.0..=1.0).contains(&cutoff) {
        anyhow::bail!("--cutoff must be between 0 and 1, got {}", cutoff);
    }

    let options = [
        ("mode", args.get_one::<String>("mode").unwrap()),
        ("substitution_matrix", args.get_one::<String>("matrix").unwrap()),
        ("open_gap_score", args.get_one::<String>("gap_open").unwrap()),
        ("extend_gap_score", args.get_one::<String>("gap_extend").unwrap()),
    ];
    let aligner = PairwiseAligner::from_options(options)?;
    info!("Aligner: {}", aligner.settings());

    //----------------------------
    // Load
    //----------------------------
    let mut ga = match args.get_one::<String>("session") {
        Some(session) => {
            let mut ga = Globaligner::load(session)?;
            ga.aligner = aligner;
            ga
        }
        None => Globaligner::with_aligner(aligner),
    };

    let mut clusters = vec![];
    for infile in args.get_many::<String>("infiles").unwrap() {
        let cluster = gcalign::read_cluster(infile)?;
        info!(
            "{}: {} loci, {} genes",
            cluster.name,
            cluster.loci.len(),
            cluster.gene_count()
        );
        clusters.push(cluster);
    }
    ga.add_clusters(clusters)?;

    //----------------------------
    // Align
    //----------------------------
    if ga.num_clusters() < 2 {
        info!("Only one cluster given, skipping alignment");
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallel)
            .build()?;
        let count = pool.install(|| ga.align_stored_clusters(cutoff))?;
        info!("{} new cluster alignments", count);
    }

    //----------------------------
    // Output
    //----------------------------
    let mut writer = gcalign::writer(args.get_one::<String>("outfile").unwrap())?;
    serde_json::to_writer_pretty(&mut writer, &ga.to_session())?;
    writer.write_all(b"\n")?;

    Ok(())
}
