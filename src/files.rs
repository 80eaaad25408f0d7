use crate::sequence::Sequence;
use crate::utils::Result;
use bio::alphabets::dna;
use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::Read as ioRead;
use std::path::Path;

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip")
}

pub fn read_file_contents(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    let mut contents = String::new();
    if is_gzipped(path) {
        let mut gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_none() {
            return Err(format!("Invalid gzip header: {}", path.to_string_lossy()));
        }
        gz_decoder
            .read_to_string(&mut contents)
            .map_err(|e| format!("File {}: {}", path.display(), e))?;
    } else {
        file.read_to_string(&mut contents)
            .map_err(|e| format!("File {}: {}", path.display(), e))?;
    }
    Ok(contents)
}

/// Loads every sequence from a FASTA or plain-text file. Content that
/// does not look like FASTA is treated as a single raw nucleotide
/// sequence named after the file.
pub fn load_seqs(path: &Path) -> Result<Vec<Sequence>> {
    let contents = read_file_contents(path)?;
    if contents.trim_start().starts_with('>') {
        let reader = fasta::Reader::new(contents.as_bytes());
        let mut seqs = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| format!("File {}: invalid FASTA: {}", path.display(), e))?;
            seqs.push(Sequence::new(record.id(), record.seq().to_vec()));
        }
        if seqs.is_empty() {
            return Err(format!("File {}: no FASTA records", path.display()));
        }
        return Ok(seqs);
    }

    let bases: Vec<u8> = contents.split_whitespace().flat_map(str::bytes).collect();
    if bases.is_empty() || !dna::iupac_alphabet().is_word(&bases) {
        return Err(format!(
            "File {}: not a FASTA file or a plain nucleotide sequence",
            path.display()
        ));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(vec![Sequence::new(name, bases)])
}

/// Loads all sequences matched by the given glob patterns, descending
/// into directories. A file that fails to load is reported and skipped;
/// the remaining files continue loading. Loaded names are annotated
/// with the file they came from.
pub fn load_all_seqs(patterns: &[String]) -> Vec<Sequence> {
    let mut seqs = Vec::new();
    for pattern in patterns {
        log::info!("Trying to import sequences from {}", pattern);
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("Bad glob pattern {}: {}", pattern, e);
                continue;
            }
        };
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable path: {}", e);
                    continue;
                }
            };
            if path.is_dir() {
                let sub_pattern = path.join("*").to_string_lossy().into_owned();
                seqs.extend(load_all_seqs(&[sub_pattern]));
            } else {
                match load_seqs(&path) {
                    Ok(loaded) => seqs.extend(loaded.into_iter().map(|mut seq| {
                        seq.name = format!("{} ({})", seq.name, path.display());
                        seq
                    })),
                    Err(e) => log::warn!("{}", e),
                }
            }
        }
    }
    seqs
}
