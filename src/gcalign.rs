extern crate clap;
use clap::*;

mod cmd_gcalign;

fn main() -> anyhow::Result<()> {
    let app = Command::new("gcalign")
        .version(crate_version!())
        .about("`gcalign` - Gene Cluster Aligner")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Verbosity level: -v for info, -vv for debug"),
        )
        .subcommand(cmd_gcalign::align::make_subcommand())
        .subcommand(cmd_gcalign::matrix::make_subcommand())
        .subcommand(cmd_gcalign::order::make_subcommand())
        .subcommand(cmd_gcalign::show::make_subcommand())
        .after_help(
            r###"Subcommands:

* align  - Align the genes of protein FASTA clusters, write a session
* matrix - Synteny or distance matrix of an aligned session
* order  - Display order of the clusters in a session
* show   - Print the gene links of a session

A session is the JSON document written by `gcalign align`.

"###,
        );

    let matches = app.get_matches();

    let verbose = matches.get_count("verbose").max(
        matches
            .subcommand()
            .map(|(_, sub)| sub.get_count("verbose"))
            .unwrap_or(0),
    );
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    // Check which subcommand the user ran...
    match matches.subcommand() {
        Some(("align", sub_matches)) => cmd_gcalign::align::execute(sub_matches),
        Some(("matrix", sub_matches)) => cmd_gcalign::matrix::execute(sub_matches),
        Some(("order", sub_matches)) => cmd_gcalign::order::execute(sub_matches),
        Some(("show", sub_matches)) => cmd_gcalign::show::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
