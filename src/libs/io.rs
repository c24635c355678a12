use crate::libs::cluster::{Cluster, Gene, Locus};
use crate::libs::error::{GlobalignError, Result};
use indexmap::IndexMap;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Open a (possibly gzipped) file, or stdin for `"stdin"`.
pub fn reader(input: &str) -> std::io::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = Path::new(input);
        let file = std::fs::File::open(path).map_err(|why| {
            std::io::Error::new(why.kind(), format!("could not open {}: {}", path.display(), why))
        })?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Create a file, or stdout for `"stdout"`.
pub fn writer(output: &str) -> std::io::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        Box::new(BufWriter::new(std::fs::File::create(output)?))
    };

    Ok(writer)
}

/// File name without `.gz` and without its last extension
pub fn basename(input: &str) -> String {
    let name = Path::new(input)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| input.to_string());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Load one protein FASTA file as a cluster.
///
/// Records named `locus|gene` are grouped into loci in order of first
/// appearance; other records go to a locus named after the file. The cluster
/// is named after the file.
pub fn read_cluster(infile: &str) -> Result<Cluster> {
    let name = basename(infile);
    let mut fa_in = noodles_fasta::io::Reader::new(reader(infile)?);

    let mut loci: IndexMap<String, Vec<Gene>> = IndexMap::new();
    for result in fa_in.records() {
        let record = result?;
        let id = String::from_utf8_lossy(record.name().as_ref()).to_string();
        let seq = String::from_utf8_lossy(record.sequence().as_ref()).to_string();

        let (locus, gene_name) = match id.split_once('|') {
            Some((locus, gene)) if !locus.is_empty() && !gene.is_empty() => {
                (locus.to_string(), gene.to_string())
            }
            _ => (name.clone(), id.clone()),
        };

        let mut gene = Gene::new(gene_name, seq.trim_end_matches('*'));
        gene.add_name(id);
        loci.entry(locus).or_default().push(gene);
    }

    if loci.is_empty() {
        return Err(GlobalignError::InvalidInput(format!(
            "{} contains no FASTA records",
            infile
        )));
    }

    let loci = loci
        .into_iter()
        .map(|(locus, genes)| Locus::new(locus, genes))
        .collect();
    Ok(Cluster::new(name, loci))
}
