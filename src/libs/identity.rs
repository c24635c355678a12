use lazy_static::lazy_static;

/// Physicochemical amino-acid classes. Residues sharing a class count as
/// similar when they are not identical.
pub const SIMILAR_ACIDS: [&[u8]; 7] = [
    b"GAVLI", // aliphatic
    b"FYW",   // aromatic
    b"CM",    // sulfur
    b"ST",    // hydroxyl
    b"KRH",   // basic
    b"DENQ",  // acidic/amide
    b"P",     // proline
];

lazy_static! {
    // 0 means no class
    static ref RESIDUE_CLASS: [u8; 256] = {
        let mut table = [0u8; 256];
        for (i, group) in SIMILAR_ACIDS.iter().enumerate() {
            for &aa in group.iter() {
                table[aa as usize] = i as u8 + 1;
                table[aa.to_ascii_lowercase() as usize] = i as u8 + 1;
            }
        }
        table
    };
}

fn is_gap(b: u8) -> bool {
    b == b'-' || b == b'.'
}

/// Whether two residues fall in the same similarity class.
pub fn is_similar(a: u8, b: u8) -> bool {
    let ca = RESIDUE_CLASS[a as usize];
    ca != 0 && ca == RESIDUE_CLASS[b as usize]
}

/// Identity and similarity of two aligned (gapped, equal-length) sequences.
///
/// Gap-to-gap columns are dropped from the denominator. Returns `(0.0, 0.0)`
/// when nothing is left to compare.
///
/// ```
/// use gcalign::libs::identity::compute_identity;
/// let (identity, similarity) = compute_identity(b"MSTK", b"MSTR");
/// assert_eq!(identity, 0.75);
/// assert_eq!(similarity, 1.0);
/// ```
pub fn compute_identity(one: &[u8], two: &[u8]) -> (f64, f64) {
    debug_assert_eq!(one.len(), two.len(), "aligned sequences differ in length");

    let mut length = 0usize;
    let mut matches = 0usize;
    let mut similar = 0usize;

    for (&a, &b) in one.iter().zip(two.iter()) {
        if a == b {
            if is_gap(a) {
                continue;
            }
            matches += 1;
        } else if is_similar(a, b) {
            similar += 1;
        }
        length += 1;
    }

    if length == 0 {
        return (0.0, 0.0);
    }

    let length = length as f64;
    (matches as f64 / length, (matches + similar) as f64 / length)
}
