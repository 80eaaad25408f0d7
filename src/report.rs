use crate::align::CloneAlignment;
use crate::sequence::Sequence;
use crate::utils::Result;
use itertools::Itertools;
use std::io::Write;

const FASTA_LINE_WIDTH: usize = 60;

/// Outcome of comparing one clone against one reference. A comparison
/// the aligner could not anchor at all is recorded with `aln_len == 0`.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub clone_name: String,
    pub ref_name: String,
    /// Number of alignment columns.
    pub aln_len: usize,
    /// Number of reference bases covered by the alignment.
    pub ref_matched_len: usize,
    /// Untruncated and ungapped; substitutions are allowed.
    pub is_good: bool,
    pub rendering: String,
    /// Mismatch positions, 1-based, already translated to genome
    /// coordinates when the reference carries a region annotation.
    pub mismatches: Vec<String>,
    /// Clone bases spanning the full reference, for good comparisons.
    pub fragment: Option<Vec<u8>>,
}

impl Comparison {
    pub fn new(aln: &CloneAlignment, reference: &Sequence) -> Self {
        let region = reference.region();
        let mismatches = aln
            .mismatch_offsets()
            .iter()
            .map(|&offset| match &region {
                Some(region) => {
                    format!("{}:{}", region.contig, region.genome_pos(offset as u32))
                }
                None => offset.to_string(),
            })
            .collect();
        Comparison {
            clone_name: aln.clone_name.clone(),
            ref_name: aln.ref_name.clone(),
            aln_len: aln.len(),
            ref_matched_len: aln.ref_matched_len(),
            is_good: !aln.is_truncated && !aln.has_gaps,
            rendering: aln.render(),
            mismatches,
            fragment: aln.aligned_fragment().ok().map(|f| f.to_vec()),
        }
    }

    pub fn no_match(clone: &Sequence, reference: &Sequence) -> Self {
        Comparison {
            clone_name: clone.name.clone(),
            ref_name: reference.name.clone(),
            aln_len: 0,
            ref_matched_len: 0,
            is_good: false,
            rendering: String::new(),
            mismatches: Vec::new(),
            fragment: None,
        }
    }
}

fn write_fasta_record(out: &mut dyn Write, name: &str, bases: &[u8]) -> std::io::Result<()> {
    writeln!(out, ">{}", name)?;
    for chunk in bases.chunks(FASTA_LINE_WIDTH) {
        out.write_all(chunk)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_good(out: &mut dyn Write, comparison: &Comparison) -> std::io::Result<()> {
    if comparison.mismatches.is_empty() {
        writeln!(
            out,
            "Matched {} to {} ({} / {})",
            comparison.clone_name, comparison.ref_name, comparison.aln_len,
            comparison.ref_matched_len
        )?;
    } else {
        writeln!(
            out,
            "Matched {} to {} with mismatches at {} ({} / {})",
            comparison.clone_name,
            comparison.ref_name,
            comparison.mismatches.iter().join(", "),
            comparison.aln_len,
            comparison.ref_matched_len
        )?;
    }
    write!(out, "{}", comparison.rendering)?;
    if let Some(fragment) = &comparison.fragment {
        write_fasta_record(
            out,
            &format!("{} matching {}", comparison.clone_name, comparison.ref_name),
            fragment,
        )?;
    }
    Ok(())
}

/// Writes the per-clone report: full matches when any exist, otherwise
/// the longest partial match plus any others tied at the same length.
pub fn report_results(results: &[Comparison], out: &mut dyn Write) -> Result<()> {
    write_report(results, out).map_err(|e| format!("Failed to write report: {}", e))
}

fn write_report(results: &[Comparison], out: &mut dyn Write) -> std::io::Result<()> {
    for (clone_name, group) in &results.iter().chunk_by(|c| c.clone_name.clone()) {
        let group: Vec<&Comparison> = group.collect();
        if group.iter().any(|c| c.is_good) {
            for comparison in group.iter().filter(|c| c.is_good) {
                write_good(out, comparison)?;
            }
            continue;
        }

        // Stable sort keeps submission order among equal lengths.
        let mut by_len = group;
        by_len.sort_by(|a, b| b.aln_len.cmp(&a.aln_len));
        let best = by_len[0];
        if best.aln_len == 0 {
            writeln!(out, "No match for {}", clone_name)?;
            continue;
        }
        writeln!(
            out,
            "Partially matched {} to {} with length {} / {}",
            clone_name, best.ref_name, best.aln_len, best.ref_matched_len
        )?;
        write!(out, "{}", best.rendering)?;
        for comparison in &by_len[1..] {
            if comparison.aln_len != best.aln_len {
                break;
            }
            writeln!(
                out,
                "Also partially matched {} to {} with length {} / {}",
                clone_name, comparison.ref_name, comparison.aln_len, comparison.ref_matched_len
            )?;
            write!(out, "{}", comparison.rendering)?;
        }
    }
    Ok(())
}
