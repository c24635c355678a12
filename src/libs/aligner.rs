//! Pairwise protein aligner.
//!
//! A thin, configurable wrapper around `bio::alignment::pairwise::Aligner`.
//! Gap scores use the "first gap position / each further position"
//! convention. `bio` charges `open + k * extend` for a gap of length `k` and
//! only knows integer scores, so every score is doubled before it reaches
//! `bio`, which keeps half-point gap scores exact.

use crate::libs::error::{GlobalignError, Result};
use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use std::fmt;
use std::str::FromStr;

const SCALE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Global,
    Local,
    SemiGlobal,
}

impl FromStr for AlignMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(AlignMode::Global),
            "local" => Ok(AlignMode::Local),
            "semiglobal" => Ok(AlignMode::SemiGlobal),
            _ => Err(format!(
                "unknown mode \"{}\" (expected global, local or semiglobal)",
                s
            )),
        }
    }
}

impl fmt::Display for AlignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlignMode::Global => "global",
            AlignMode::Local => "local",
            AlignMode::SemiGlobal => "semiglobal",
        };
        write!(f, "{}", s)
    }
}

/// Amino-acid substitution matrices shipped with `bio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionMatrix {
    Blosum62,
    Pam40,
    Pam120,
    Pam200,
    Pam250,
}

impl SubstitutionMatrix {
    pub fn score(self, a: u8, b: u8) -> i32 {
        match self {
            SubstitutionMatrix::Blosum62 => bio::scores::blosum62(a, b),
            SubstitutionMatrix::Pam40 => bio::scores::pam40(a, b),
            SubstitutionMatrix::Pam120 => bio::scores::pam120(a, b),
            SubstitutionMatrix::Pam200 => bio::scores::pam200(a, b),
            SubstitutionMatrix::Pam250 => bio::scores::pam250(a, b),
        }
    }
}

impl FromStr for SubstitutionMatrix {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blosum62" => Ok(SubstitutionMatrix::Blosum62),
            "pam40" => Ok(SubstitutionMatrix::Pam40),
            "pam120" => Ok(SubstitutionMatrix::Pam120),
            "pam200" => Ok(SubstitutionMatrix::Pam200),
            "pam250" => Ok(SubstitutionMatrix::Pam250),
            _ => Err(format!(
                "unknown matrix \"{}\" (expected blosum62, pam40, pam120, pam200 or pam250)",
                s
            )),
        }
    }
}

impl fmt::Display for SubstitutionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubstitutionMatrix::Blosum62 => "BLOSUM62",
            SubstitutionMatrix::Pam40 => "PAM40",
            SubstitutionMatrix::Pam120 => "PAM120",
            SubstitutionMatrix::Pam200 => "PAM200",
            SubstitutionMatrix::Pam250 => "PAM250",
        };
        write!(f, "{}", s)
    }
}

/// Two equal-length gapped strings and the alignment score.
#[derive(Debug, Clone, PartialEq)]
pub struct GappedAlignment {
    pub one: Vec<u8>,
    pub two: Vec<u8>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseAligner {
    pub mode: AlignMode,
    pub matrix: SubstitutionMatrix,
    pub open_gap_score: f64,
    pub extend_gap_score: f64,
}

impl Default for PairwiseAligner {
    fn default() -> Self {
        Self {
            mode: AlignMode::Global,
            matrix: SubstitutionMatrix::Blosum62,
            open_gap_score: -10.0,
            extend_gap_score: -0.5,
        }
    }
}

fn parse_gap_score(key: &str, value: &str) -> Result<f64> {
    let score = value
        .trim()
        .parse::<f64>()
        .map_err(|_| GlobalignError::config(key, format!("\"{}\" is not a number", value)))?;
    if !score.is_finite() || score > 0.0 {
        return Err(GlobalignError::config(
            key,
            format!("\"{}\" must be zero or negative", value),
        ));
    }
    if (score * SCALE as f64).fract() != 0.0 {
        return Err(GlobalignError::config(
            key,
            format!("\"{}\" must be a multiple of 0.5", value),
        ));
    }
    Ok(score)
}

impl PairwiseAligner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default aligner with `options` applied on top.
    pub fn from_options<I, K, V>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut aligner = Self::default();
        aligner.configure(options)?;
        Ok(aligner)
    }

    /// Apply named settings.
    ///
    /// Recognized keys: `mode`, `substitution_matrix`, `open_gap_score`,
    /// `extend_gap_score`. Nothing is applied unless every option is valid.
    pub fn configure<I, K, V>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut staged = self.clone();
        for (key, value) in options {
            let key = key.as_ref();
            let value = value.as_ref();
            match key {
                "mode" => {
                    staged.mode = value
                        .parse()
                        .map_err(|e: String| GlobalignError::config(key, e))?;
                }
                "substitution_matrix" => {
                    staged.matrix = value
                        .parse()
                        .map_err(|e: String| GlobalignError::config(key, e))?;
                }
                "open_gap_score" => staged.open_gap_score = parse_gap_score(key, value)?,
                "extend_gap_score" => staged.extend_gap_score = parse_gap_score(key, value)?,
                _ => {
                    return Err(GlobalignError::config(
                        key,
                        "not a recognized aligner setting",
                    ))
                }
            }
        }

        if staged.open_gap_score > staged.extend_gap_score {
            return Err(GlobalignError::config(
                "open_gap_score",
                format!(
                    "{} must not exceed extend_gap_score {}",
                    staged.open_gap_score, staged.extend_gap_score
                ),
            ));
        }

        *self = staged;
        Ok(())
    }

    /// Printable summary of the current settings
    pub fn settings(&self) -> String {
        format!(
            "mode={} substitution_matrix={} open_gap_score={} extend_gap_score={}",
            self.mode, self.matrix, self.open_gap_score, self.extend_gap_score
        )
    }

    // Gap penalties in bio's convention, scaled.
    fn bio_gap_scores(&self) -> (i32, i32) {
        let open = ((self.open_gap_score - self.extend_gap_score) * SCALE as f64).round() as i32;
        let extend = (self.extend_gap_score * SCALE as f64).round() as i32;
        (open, extend)
    }

    /// Best-scoring alignment of two protein sequences.
    ///
    /// In local mode only the aligned region is returned.
    pub fn align(&self, seq_a: &str, seq_b: &str) -> GappedAlignment {
        let x = sanitize(seq_a);
        let y = sanitize(seq_b);

        if x.is_empty() || y.is_empty() {
            return gapped_ends(&x, &y);
        }

        let (gap_open, gap_extend) = self.bio_gap_scores();
        let matrix = self.matrix;
        let score_fn = move |a: u8, b: u8| matrix.score(a, b) * SCALE;
        let mut aligner = Aligner::with_capacity(x.len(), y.len(), gap_open, gap_extend, score_fn);

        let alignment = match self.mode {
            AlignMode::Global => aligner.global(&x, &y),
            AlignMode::Local => aligner.local(&x, &y),
            AlignMode::SemiGlobal => aligner.semiglobal(&x, &y),
        };

        let mut one = Vec::with_capacity(x.len() + y.len());
        let mut two = Vec::with_capacity(x.len() + y.len());
        let mut xi = alignment.xstart;
        let mut yi = alignment.ystart;
        for op in &alignment.operations {
            match op {
                AlignmentOperation::Match | AlignmentOperation::Subst => {
                    one.push(x[xi]);
                    two.push(y[yi]);
                    xi += 1;
                    yi += 1;
                }
                AlignmentOperation::Del => {
                    one.push(b'-');
                    two.push(y[yi]);
                    yi += 1;
                }
                AlignmentOperation::Ins => {
                    one.push(x[xi]);
                    two.push(b'-');
                    xi += 1;
                }
                AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
            }
        }

        GappedAlignment {
            one,
            two,
            score: alignment.score as f64 / SCALE as f64,
        }
    }
}

// Upper-case; anything the matrices do not know becomes X.
fn sanitize(seq: &str) -> Vec<u8> {
    seq.bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| {
            let b = b.to_ascii_uppercase();
            if b.is_ascii_uppercase() || b == b'*' {
                b
            } else {
                b'X'
            }
        })
        .collect()
}

fn gapped_ends(x: &[u8], y: &[u8]) -> GappedAlignment {
    let len = x.len().max(y.len());
    let mut one = x.to_vec();
    let mut two = y.to_vec();
    one.resize(len, b'-');
    two.resize(len, b'-');
    GappedAlignment {
        one,
        two,
        score: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let aligner = PairwiseAligner::default();
        assert_eq!(aligner.mode, AlignMode::Global);
        assert_eq!(aligner.matrix, SubstitutionMatrix::Blosum62);
        assert_eq!(aligner.bio_gap_scores(), (-19, -1));
        assert_eq!(
            aligner.settings(),
            "mode=global substitution_matrix=BLOSUM62 open_gap_score=-10 extend_gap_score=-0.5"
        );
    }

    #[test]
    fn test_configure() {
        let mut aligner = PairwiseAligner::new();
        aligner
            .configure([
                ("substitution_matrix", "pam250"),
                ("open_gap_score", "-12"),
                ("extend_gap_score", "-1"),
                ("mode", "local"),
            ])
            .unwrap();
        assert_eq!(aligner.matrix, SubstitutionMatrix::Pam250);
        assert_eq!(aligner.mode, AlignMode::Local);
        assert_eq!(aligner.open_gap_score, -12.0);
        assert_eq!(aligner.bio_gap_scores(), (-22, -2));
    }

    #[test]
    fn test_configure_unknown_key() {
        let mut aligner = PairwiseAligner::new();
        let err = aligner
            .configure([("open_gap_score", "-8"), ("wildcard", "X")])
            .unwrap_err();
        match err {
            GlobalignError::Config { key, .. } => assert_eq!(key, "wildcard"),
            other => panic!("unexpected error {:?}", other),
        }
        // nothing applied
        assert_eq!(aligner, PairwiseAligner::default());
    }

    #[test]
    fn test_configure_bad_values() {
        assert!(PairwiseAligner::from_options([("mode", "fast")]).is_err());
        assert!(PairwiseAligner::from_options([("open_gap_score", "ten")]).is_err());
        assert!(PairwiseAligner::from_options([("open_gap_score", "3")]).is_err());
        assert!(PairwiseAligner::from_options([("extend_gap_score", "-0.25")]).is_err());
        assert!(PairwiseAligner::from_options([("substitution_matrix", "blosum99")]).is_err());
        // open must not be cheaper than extend
        assert!(PairwiseAligner::from_options([("open_gap_score", "-0.5"), ("extend_gap_score", "-2")]).is_err());
    }

    #[test]
    fn test_align_identical() {
        let aligner = PairwiseAligner::default();
        let aln = aligner.align("MSTKLV", "mstklv");
        assert_eq!(aln.one, b"MSTKLV".to_vec());
        assert_eq!(aln.two, b"MSTKLV".to_vec());
        assert!(aln.score > 0.0);
    }

    #[test]
    fn test_align_with_gap() {
        let aligner = PairwiseAligner::default();
        let aln = aligner.align("MKWVTFISLLFLFSSAYS", "MKWVTFISLLFSSAYS");
        assert_eq!(aln.one.len(), aln.two.len());
        assert_eq!(aln.one.len(), 18);
        assert_eq!(aln.two.iter().filter(|&&b| b == b'-').count(), 2);
        let ungapped: Vec<u8> = aln.two.iter().copied().filter(|&b| b != b'-').collect();
        assert_eq!(ungapped, b"MKWVTFISLLFSSAYS".to_vec());
    }

    #[test]
    fn test_align_empty() {
        let aligner = PairwiseAligner::default();
        let aln = aligner.align("", "MK");
        assert_eq!(aln.one, b"--".to_vec());
        assert_eq!(aln.two, b"MK".to_vec());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("mk1v*\n"), b"MKXV*".to_vec());
    }
}
