use crate::libs::alignment::Alignment;
use crate::libs::globaligner::Globaligner;

#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Column separator; `None` pads columns to a common width
    pub delimiter: Option<String>,
    pub decimals: usize,
    /// Print "query vs target" above each alignment
    pub alignment_headers: bool,
    /// Print column names above the links
    pub link_headers: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            decimals: 4,
            alignment_headers: true,
            link_headers: false,
        }
    }
}

fn render_rows(rows: &[Vec<String>], delimiter: Option<&str>) -> String {
    let mut out = String::new();
    match delimiter {
        Some(delim) => {
            for row in rows {
                out += &row.join(delim);
                out.push('\n');
            }
        }
        None => {
            let ncol = rows.iter().map(|r| r.len()).max().unwrap_or(0);
            let widths: Vec<usize> = (0..ncol)
                .map(|c| rows.iter().filter_map(|r| r.get(c)).map(|s| s.len()).max().unwrap_or(0))
                .collect();
            for row in rows {
                let cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .map(|(c, s)| format!("{:<width$}", s, width = widths[c]))
                    .collect();
                out += cells.join("  ").trim_end();
                out.push('\n');
            }
        }
    }
    out
}

/// Links of one alignment as text, genes shown by name.
pub fn format_alignment(ga: &Globaligner, alignment: &Alignment, opts: &FormatOptions) -> String {
    let cluster_name = |uid: &str| ga.cluster(uid).map_or(uid.to_string(), |c| c.name.clone());
    let gene_name = |uid: &str| ga.gene(uid).map_or(uid.to_string(), |g| g.name.clone());

    let mut out = String::new();
    if opts.alignment_headers {
        let header = format!(
            "{} vs {}",
            cluster_name(&alignment.query),
            cluster_name(&alignment.target)
        );
        out += &header;
        out.push('\n');
        out += &"-".repeat(header.len());
        out.push('\n');
    }

    let mut rows = Vec::with_capacity(alignment.len() + 1);
    if opts.link_headers {
        rows.push(
            ["Query", "Target", "Identity", "Similarity"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
    }
    for link in &alignment.links {
        rows.push(vec![
            gene_name(&link.query),
            gene_name(&link.target),
            format!("{:.*}", opts.decimals, link.identity),
            format!("{:.*}", opts.decimals, link.similarity),
        ]);
    }
    out += &render_rows(&rows, opts.delimiter.as_deref());
    out
}

/// Every stored alignment, separated by blank lines.
pub fn format_globaligner(ga: &Globaligner, opts: &FormatOptions) -> String {
    ga.alignments()
        .iter()
        .map(|alignment| format_alignment(ga, alignment, opts))
        .collect::<Vec<_>>()
        .join("\n")
}
