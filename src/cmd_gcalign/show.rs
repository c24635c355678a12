use clap::*;
use gcalign::libs::format::{format_globaligner, FormatOptions};
use gcalign::libs::Globaligner;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("show")
        .about("Print the gene links of a session")
        .after_help(
            r###"
Prints every cluster alignment of a session as a block headed by
"query vs target", with one line per linked gene pair:
    query_gene  target_gene  identity  similarity

Notes:
* Without `--delimiter`, columns are padded with spaces.
* `--delimiter '\t'` gives tab-separated output.

Examples:
1. Default layout:
   gcalign show session.json

2. TSV with column names and two decimals:
   gcalign show session.json --delimiter '\t' --link-headers --decimals 2

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
            Arg::new("delimiter")
                .long("delimiter")
                .short('d')
                .num_args(1)
                .help("Column separator"),
        )
        .arg(
            Arg::new("decimals")
                .long("decimals")
                .num_args(1)
                .value_parser(value_parser!(usize))
                .default_value("4")
                .help("Decimal places of identity and similarity"),
        )
        .arg(
            Arg::new("no_headers")
                .long("no-headers")
                .action(ArgAction::SetTrue)
                .help("Omit the \"query vs target\" header of each alignment"),
        )
        .arg(
            Arg::new("link_headers")
                .long("link-headers")
                .action(ArgAction::SetTrue)
                .help("Print column names above the links"),
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
    let opts = FormatOptions {
        delimiter: args
            .get_one::<String>("delimiter")
            .map(|d| d.replace("\\t", "\t")),
        decimals: *args.get_one::<usize>("decimals").unwrap(),
        alignment_headers: !args.get_flag("no_headers"),
        link_headers: args.get_flag("link_headers"),
    };

    let ga = Globaligner::load(args.get_one::<String>("infile").unwrap())?;
    let mut writer = gcalign::writer(args.get_one::<String>("outfile").unwrap())?;

    //----------------------------
    // Output
    //----------------------------
    writer.write_all(format_globaligner(&ga, &opts).as_bytes())?;

    Ok(())
}
