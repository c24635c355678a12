use clap::*;
use gcalign::libs::Globaligner;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("matrix")
        .about("Synteny score matrix of an aligned session")
        .after_help(
            r###"
Scores every ordered pair of clusters as
    homology + weight * contiguity
and prints the matrix as a tab-separated table.

Notes:
* Rows and columns follow the order the clusters were added in.
* The diagonal is always 0.
* With `--normalise`, every score is divided by the largest one.
* With `--distance`, every score becomes `max - score`.

Examples:
1. Raw synteny scores:
   gcalign matrix session.json

2. Normalised distances, contiguity counted double:
   gcalign matrix session.json --weight 2 --normalise --distance

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
            Arg::new("normalise")
                .long("normalise")
                .action(ArgAction::SetTrue)
                .help("Divide every value by the maximum"),
        )
        .arg(
            Arg::new("distance")
                .long("distance")
                .action(ArgAction::SetTrue)
                .help("Convert scores to distances"),
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
    let is_normalise = args.get_flag("normalise");
    let is_distance = args.get_flag("distance");

    let ga = Globaligner::load(args.get_one::<String>("infile").unwrap())?;
    let mut writer = gcalign::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Ops
    //----------------------------
    let matrix = ga.matrix(weight, is_normalise, is_distance)?;
    let names: Vec<String> = ga.clusters().map(|c| c.name.clone()).collect();

    //----------------------------
    // Output
    //----------------------------
    writer.write_fmt(format_args!("\t{}\n", names.join("\t")))?;
    for (i, name) in names.iter().enumerate() {
        let row: Vec<String> = (0..names.len())
            .map(|j| format!("{:.4}", matrix[(i, j)]))
            .collect();
        writer.write_fmt(format_args!("{}\t{}\n", name, row.join("\t")))?;
    }

    Ok(())
}
