use clap::*;
use gcalign::libs::{Globaligner, Method};
use log::info;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("order")
        .about("Display order of the clusters in a session")
        .after_help(
            r###"
Clusters the normalised synteny distances hierarchically and prints the
cluster names in the reversed leaf order of the dendrogram, one per line.

Linkage methods:
* single
* complete
* average (upgma)
* weighted (wpgma)
* centroid
* median
* ward

Examples:
1. Default ward linkage:
   gcalign order session.json

2. Average linkage, contiguity ignored:
   gcalign order session.json --method average --weight 0

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Session JSON written by `gcalign align`"),
        )
        .arg(
            Arg::new("weight")
                .long("weight")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .default_value("0.5")
                .help("Weight of the contiguity term"),
        )
        .arg(
            Arg::new("method")
                .long("method")
                .num_args(1)
                .default_value("ward")
                .help("Linkage method"),
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
    let weight = *args.get_one::<f64>("weight").unwrap();
    let method: Method = args.get_one::<String>("method").unwrap().parse()?;

    let ga = Globaligner::load(args.get_one::<String>("infile").unwrap())?;
    let mut writer = gcalign::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    info!("{} clusters, {} linkage", ga.num_clusters(), method);
    let order = ga.order(weight, method)?;
    let clusters: Vec<_> = ga.clusters().collect();

    //----------------------------
    // Output
    //----------------------------
    for idx in order {
        writer.write_fmt(format_args!("{}\n", clusters[idx].name))?;
    }

    Ok(())
}
