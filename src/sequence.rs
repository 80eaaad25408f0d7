use crate::utils::GenomicRegion;
use bio::alphabets::dna;

/// A named nucleotide sequence. Sequences loaded from files carry a
/// ` (path)` annotation after their name; sequences derived from genome
/// coordinates carry a ` (chrom:start-end)` annotation instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub name: String,
    pub bases: Vec<u8>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, bases: Vec<u8>) -> Self {
        Sequence {
            name: name.into(),
            bases,
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Name with any parenthesized annotation stripped.
    pub fn real_name(&self) -> &str {
        real_name(&self.name)
    }

    /// Region encoded in a trailing `(chrom:start-end)` annotation, if any.
    pub fn region(&self) -> Option<GenomicRegion> {
        let start = self.name.rfind('(')?;
        let end = self.name.rfind(')')?;
        if start + 1 >= end {
            return None;
        }
        GenomicRegion::from_string(&self.name[start + 1..end]).ok()
    }

    pub fn reverse_complement(&self) -> Sequence {
        Sequence {
            name: format!("{} (reverse complement)", self.real_name()),
            bases: dna::revcomp(&self.bases),
        }
    }
}

pub fn real_name(name: &str) -> &str {
    match name.find(" (") {
        Some(end) => &name[..end],
        None => name,
    }
}

/// Orientation(s) in which clones are compared against references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Reverse,
    Both,
}

/// Expands the loaded clones according to the requested orientation:
/// `Reverse` swaps every clone for its reverse complement, `Both` keeps
/// the forward clone and appends the reverse-complemented variant.
pub fn expand_orientations(clones: Vec<Sequence>, orientation: Orientation) -> Vec<Sequence> {
    match orientation {
        Orientation::Forward => clones,
        Orientation::Reverse => clones.iter().map(Sequence::reverse_complement).collect(),
        Orientation::Both => {
            let mut expanded = Vec::with_capacity(clones.len() * 2);
            for clone in clones {
                let rc = clone.reverse_complement();
                expanded.push(clone);
                expanded.push(rc);
            }
            expanded
        }
    }
}
