use crate::sequence::Sequence;
use crate::utils::Result;
use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use std::str::FromStr;

const GAP: u8 = b'-';
const RENDER_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignerKind {
    Local,
    Global,
}

impl FromStr for AlignerKind {
    type Err = &'static str;
    fn from_str(kind: &str) -> std::result::Result<Self, Self::Err> {
        match kind {
            "local" => Ok(AlignerKind::Local),
            "global" => Ok(AlignerKind::Global),
            _ => Err("Invalid aligner"),
        }
    }
}

/// Classification of a pairwise clone-to-reference alignment.
///
/// The span is the column range of the alignment that overlaps the
/// reference, i.e. with leading and trailing reference-gap padding
/// stripped. All flags are judged within the span only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub span_start: usize,
    pub span_end: usize,
    pub ref_covered: usize,
    pub is_truncated: bool,
    pub has_gaps: bool,
    pub has_mismatches: bool,
}

/// Judges two equal-length gapped tracks against the ungapped reference
/// length. Fails when the tracks never overlap the reference.
pub fn classify(clone_track: &[u8], ref_track: &[u8], ref_len: usize) -> Result<Classification> {
    if clone_track.len() != ref_track.len() {
        return Err(format!(
            "Aligned tracks differ in length: {} != {}",
            clone_track.len(),
            ref_track.len()
        ));
    }

    let span_start = match ref_track.iter().position(|&c| c != GAP) {
        Some(pos) => pos,
        None => return Err("No alignment".to_string()),
    };
    let span_end = ref_track.iter().rposition(|&c| c != GAP).unwrap() + 1;

    let mut ref_covered = 0;
    let mut has_gaps = false;
    let mut has_mismatches = false;
    for (&c, &r) in clone_track[span_start..span_end]
        .iter()
        .zip(&ref_track[span_start..span_end])
    {
        if r != GAP {
            ref_covered += 1;
        }
        if c == GAP || r == GAP {
            has_gaps = true;
        } else if c != r {
            has_mismatches = true;
        }
    }

    Ok(Classification {
        span_start,
        span_end,
        ref_covered,
        is_truncated: ref_covered < ref_len,
        has_gaps,
        has_mismatches,
    })
}

/// A classified pairwise alignment between a clone and a reference.
///
/// The tracks are equal-length gapped renderings of the aligned region;
/// positions are 0-based half-open coordinates on the ungapped inputs.
#[derive(Debug, Clone)]
pub struct CloneAlignment {
    pub clone_name: String,
    pub ref_name: String,
    clone_track: Vec<u8>,
    ref_track: Vec<u8>,
    pub first_clone_pos: usize,
    pub last_clone_pos: usize,
    pub first_ref_pos: usize,
    pub last_ref_pos: usize,
    pub ref_len: usize,
    pub is_truncated: bool,
    pub has_gaps: bool,
    pub has_mismatches: bool,
}

impl CloneAlignment {
    /// True only if the clone matched the full reference without
    /// mismatches or gaps.
    pub fn is_match(&self) -> bool {
        !self.is_truncated && !self.has_gaps && !self.has_mismatches
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.clone_track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clone_track.is_empty()
    }

    /// Number of reference bases covered by the alignment.
    pub fn ref_matched_len(&self) -> usize {
        self.last_ref_pos - self.first_ref_pos
    }

    /// 1-based reference offsets of substitution columns.
    pub fn mismatch_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut ref_pos = self.first_ref_pos;
        for (&c, &r) in self.clone_track.iter().zip(&self.ref_track) {
            if r == GAP {
                continue;
            }
            ref_pos += 1;
            if c != GAP && c != r {
                offsets.push(ref_pos);
            }
        }
        offsets
    }

    /// The clone bases spanning the full reference. Errors if the
    /// alignment has gaps or does not cover the whole reference.
    pub fn aligned_fragment(&self) -> Result<&[u8]> {
        if self.has_gaps {
            Err("The alignment contains gaps".to_string())
        } else if self.is_truncated {
            Err(format!(
                "The alignment was truncated at pos {}",
                self.last_ref_pos
            ))
        } else {
            Ok(&self.clone_track)
        }
    }

    /// Side-by-side text rendering of the aligned tracks.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (clone_chunk, ref_chunk) in self
            .clone_track
            .chunks(RENDER_WIDTH)
            .zip(self.ref_track.chunks(RENDER_WIDTH))
        {
            let markers: String = clone_chunk
                .iter()
                .zip(ref_chunk)
                .map(|(&c, &r)| if c == r { '|' } else { ' ' })
                .collect();
            out.push_str(&String::from_utf8_lossy(clone_chunk));
            out.push('\n');
            out.push_str(&markers);
            out.push('\n');
            out.push_str(&String::from_utf8_lossy(ref_chunk));
            out.push('\n');
        }
        out
    }
}

/// Aligns a clone against a reference and classifies the result.
///
/// Fails when the aligner cannot anchor the clone to the reference at
/// all (an empty matched region).
pub fn align_clone_to_ref(
    clone: &Sequence,
    reference: &Sequence,
    kind: AlignerKind,
) -> Result<CloneAlignment> {
    let mut aligner = Aligner::new(-5, -1, |a, b| if a == b { 1i32 } else { -1i32 });
    let alignment = match kind {
        AlignerKind::Local => aligner.local(&clone.bases, &reference.bases),
        AlignerKind::Global => aligner.global(&clone.bases, &reference.bases),
    };

    if alignment.operations.is_empty() || alignment.ystart == alignment.yend {
        return Err(format!(
            "No alignment between {} and {}",
            clone.name, reference.name
        ));
    }

    let mut clone_track = Vec::with_capacity(alignment.operations.len());
    let mut ref_track = Vec::with_capacity(alignment.operations.len());
    let mut x_pos = alignment.xstart;
    let mut y_pos = alignment.ystart;
    for op in &alignment.operations {
        match op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                clone_track.push(clone.bases[x_pos]);
                ref_track.push(reference.bases[y_pos]);
                x_pos += 1;
                y_pos += 1;
            }
            AlignmentOperation::Del => {
                clone_track.push(GAP);
                ref_track.push(reference.bases[y_pos]);
                y_pos += 1;
            }
            AlignmentOperation::Ins => {
                clone_track.push(clone.bases[x_pos]);
                ref_track.push(GAP);
                x_pos += 1;
            }
            AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {}
        }
    }

    let classification = classify(&clone_track, &ref_track, reference.len())?;

    // Ungapped input coordinates of the span boundaries.
    let clone_before_span = clone_track[..classification.span_start]
        .iter()
        .filter(|&&c| c != GAP)
        .count();
    let clone_in_span = clone_track[classification.span_start..classification.span_end]
        .iter()
        .filter(|&&c| c != GAP)
        .count();
    let first_clone_pos = alignment.xstart + clone_before_span;
    let first_ref_pos = alignment.ystart;

    // Trim the tracks themselves to the span so that rendering and
    // mismatch offsets never include padding columns.
    let clone_track = clone_track[classification.span_start..classification.span_end].to_vec();
    let ref_track = ref_track[classification.span_start..classification.span_end].to_vec();

    Ok(CloneAlignment {
        clone_name: clone.name.clone(),
        ref_name: reference.name.clone(),
        clone_track,
        ref_track,
        first_clone_pos,
        last_clone_pos: first_clone_pos + clone_in_span,
        first_ref_pos,
        last_ref_pos: first_ref_pos + classification.ref_covered,
        ref_len: reference.len(),
        is_truncated: classification.is_truncated,
        has_gaps: classification.has_gaps,
        has_mismatches: classification.has_mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(name: &str, bases: &str) -> Sequence {
        Sequence::new(name, bases.as_bytes().to_vec())
    }

    #[test]
    fn identical_clone_is_full_match() {
        let clone = seq("clone", "ACGTACGTACGTACGTACGT");
        let reference = seq("ref", "ACGTACGTACGTACGTACGT");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        assert!(aln.is_match());
        assert!(!aln.is_truncated);
        assert!(!aln.has_gaps);
        assert!(!aln.has_mismatches);
        assert_eq!(aln.first_ref_pos, 0);
        assert_eq!(aln.last_ref_pos, 20);
        assert_eq!(aln.ref_matched_len(), 20);
    }

    #[test]
    fn prefix_clone_is_truncated() {
        let clone = seq("clone", "ACGTACGTAC");
        let reference = seq("ref", "ACGTACGTACGTACGTACGT");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        assert!(aln.is_truncated);
        assert!(!aln.has_gaps);
        assert!(!aln.has_mismatches);
        assert!(!aln.is_match());
        assert_eq!(aln.first_ref_pos, 0);
        assert_eq!(aln.last_ref_pos, 10);
    }

    #[test]
    fn substituted_base_is_mismatch_only() {
        let clone = seq("clone", "ACGTACGTACTTACGTACGTA");
        let reference = seq("ref", "ACGTACGTACATACGTACGTA");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        assert!(aln.has_mismatches);
        assert!(!aln.is_truncated);
        assert!(!aln.has_gaps);
        assert_eq!(aln.mismatch_offsets(), vec![11]);
    }

    #[test]
    fn inserted_base_has_gaps() {
        let clone = seq("clone", "ACGTACGTACTTACGTACGTA");
        let reference = seq("ref", "ACGTACGTACTACGTACGTA");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        assert!(aln.has_gaps);
        assert!(!aln.is_truncated);
    }

    #[test]
    fn unrelated_sequences_fail_to_align() {
        let clone = seq("clone", "AAAAAAAAAA");
        let reference = seq("ref", "CCCCCCCCCC");
        assert!(align_clone_to_ref(&clone, &reference, AlignerKind::Local).is_err());
    }

    #[test]
    fn aligned_fragment_returned_for_full_match() {
        let clone = seq("clone", "TTTTACGTACGTACGTACGTTTTT");
        let reference = seq("ref", "ACGTACGTACGTACGT");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        assert!(aln.is_match());
        assert_eq!(aln.aligned_fragment().unwrap(), b"ACGTACGTACGTACGT");
        assert_eq!(aln.first_clone_pos, 4);
        assert_eq!(aln.last_clone_pos, 20);
    }

    #[test]
    fn classify_strips_padding_outside_reference() {
        // Global alignment of a longer clone against a short reference
        // leaves reference-gap padding on both sides.
        let clone_track = b"AACGTA";
        let ref_track = b"--CGT-";
        let c = classify(clone_track, ref_track, 3).unwrap();
        assert_eq!((c.span_start, c.span_end), (2, 5));
        assert!(!c.is_truncated);
        assert!(!c.has_gaps);
        assert!(!c.has_mismatches);
    }

    #[test]
    fn classify_counts_clone_side_gap() {
        let clone_track = b"ACG-ACG";
        let ref_track = b"ACGTACG";
        let c = classify(clone_track, ref_track, 7).unwrap();
        assert!(c.has_gaps);
        assert!(!c.is_truncated);
        assert!(!c.has_mismatches);
    }

    #[test]
    fn classify_rejects_gap_only_reference() {
        assert!(classify(b"ACGT", b"----", 4).is_err());
    }

    #[test]
    fn classify_rejects_unequal_tracks() {
        assert!(classify(b"ACGT", b"ACG", 4).is_err());
    }

    #[test]
    fn global_alignment_of_longer_clone_is_not_truncated() {
        let clone = seq("clone", "TTTTACGTACGTACGTACGTTTTT");
        let reference = seq("ref", "ACGTACGTACGTACGT");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Global).unwrap();
        assert!(!aln.is_truncated);
        assert!(!aln.has_mismatches);
        assert_eq!(aln.ref_matched_len(), 16);
    }

    #[test]
    fn render_marks_matching_columns() {
        let clone = seq("clone", "ACGTACGTACGT");
        let reference = seq("ref", "ACGTACGTACGT");
        let aln = align_clone_to_ref(&clone, &reference, AlignerKind::Local).unwrap();
        let rendered = aln.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["ACGTACGTACGT", "||||||||||||", "ACGTACGTACGT"]);
    }
}
