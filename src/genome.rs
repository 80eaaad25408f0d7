use crate::files::read_file_contents;
use crate::sequence::Sequence;
use crate::utils::{GenomicRegion, Result};
use bio::io::fasta;
use std::path::{Path, PathBuf};
use twobit::TwoBitFile;

/// Locates the 2-bit file for a reference genome. Accepts an existing
/// path as-is; otherwise searches `<name>.2bit` in the working
/// directory, under the gbdb directory (both `<gbdb>/<name>/` and
/// `<gbdb>/` itself), and finally under `/gbdb/<name>/`.
pub fn find_2bit_file(ref_genome: &str, path_to_gbdb: &Path) -> Result<PathBuf> {
    if ref_genome.is_empty() {
        return Err("No reference genome specified".to_string());
    }
    let as_path = PathBuf::from(ref_genome);
    if as_path.exists() {
        return Ok(as_path);
    }
    let fname = format!("{}.2bit", ref_genome);
    let candidates = [
        PathBuf::from(&fname),
        path_to_gbdb.join(ref_genome).join(&fname),
        path_to_gbdb.join(&fname),
        Path::new("/gbdb").join(ref_genome).join(&fname),
    ];
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }
    Err(format!(
        "Could not locate a 2bit file for genome {}: {} not found",
        ref_genome, fname
    ))
}

fn parse_bed_line(line: &str) -> Result<(String, GenomicRegion)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(format!(
            "Expected at least 4 BED fields (chrom, start, end, name), found {}",
            fields.len()
        ));
    }
    let start: u32 = fields[1]
        .parse()
        .map_err(|_| format!("Invalid BED start: {}", fields[1]))?;
    let end: u32 = fields[2]
        .parse()
        .map_err(|_| format!("Invalid BED end: {}", fields[2]))?;
    let region = GenomicRegion::new(fields[0], start, end)?;
    Ok((fields[3].to_string(), region))
}

fn is_bed_record(line: &str) -> bool {
    !line.is_empty()
        && !line.starts_with('#')
        && !line.starts_with("track")
        && !line.starts_with("browser")
}

/// Reads all regions from a BED file, fetching their sequence from a
/// 2-bit genome. Region names are annotated with their coordinates.
/// When `write_fasta` is set, the regions are mirrored into a
/// `<bed basename>.fa` file in the working directory.
pub fn read_bed_file(bed_path: &Path, genome: &Path, write_fasta: bool) -> Result<Vec<Sequence>> {
    let mut tb = TwoBitFile::open(genome)
        .map_err(|e| format!("Failed to open 2bit file {}: {}", genome.display(), e))?;

    let mut fasta_writer = if write_fasta {
        let out_name = format!(
            "{}.fa",
            bed_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| bed_path.display().to_string())
        );
        Some(
            fasta::Writer::to_file(&out_name)
                .map_err(|e| format!("Failed to create {}: {}", out_name, e))?,
        )
    } else {
        None
    };

    let contents = read_file_contents(bed_path)?;
    let mut seqs = Vec::new();
    for (line_number, line) in contents.lines().enumerate() {
        if !is_bed_record(line.trim()) {
            continue;
        }
        let (name, region) = parse_bed_line(line)
            .map_err(|e| format!("{} line {}: {}", bed_path.display(), line_number + 1, e))?;
        let bases = tb
            .read_sequence(&region.contig, region.start as usize..region.end as usize)
            .map_err(|e| format!("Failed to fetch {} from {}: {}", region, genome.display(), e))?;
        let region_name = format!("{} ({})", name, region);
        if let Some(writer) = fasta_writer.as_mut() {
            writer
                .write(&region_name, None, bases.as_bytes())
                .map_err(|e| format!("Failed to write FASTA record {}: {}", region_name, e))?;
        }
        seqs.push(Sequence::new(region_name, bases.into_bytes()));
    }
    Ok(seqs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bed_line_with_four_fields() {
        let (name, region) = parse_bed_line("chr1\t100\t200\tenhancer1").unwrap();
        assert_eq!(name, "enhancer1");
        assert_eq!(region, GenomicRegion::new("chr1", 100, 200).unwrap());
    }

    #[test]
    fn parse_bed_line_missing_name_fails() {
        assert!(parse_bed_line("chr1\t100\t200").is_err());
    }

    #[test]
    fn parse_bed_line_bad_coordinates_fail() {
        assert!(parse_bed_line("chr1\tabc\t200\tname").is_err());
        assert!(parse_bed_line("chr1\t200\t100\tname").is_err());
    }

    #[test]
    fn bed_records_skip_headers_and_comments() {
        assert!(!is_bed_record("# comment"));
        assert!(!is_bed_record("track name=regions"));
        assert!(!is_bed_record("browser position chr1:1-100"));
        assert!(!is_bed_record(""));
        assert!(is_bed_record("chr1\t1\t100\tname"));
    }

    #[test]
    fn find_2bit_accepts_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let genome = dir.path().join("mm9.2bit");
        std::fs::write(&genome, b"").unwrap();
        let found =
            find_2bit_file(genome.to_str().unwrap(), Path::new("/nonexistent")).unwrap();
        assert_eq!(found, genome);
    }

    #[test]
    fn find_2bit_searches_gbdb_subdirectory() {
        let gbdb = tempfile::tempdir().unwrap();
        let genome_dir = gbdb.path().join("hg19");
        std::fs::create_dir(&genome_dir).unwrap();
        let genome = genome_dir.join("hg19.2bit");
        std::fs::write(&genome, b"").unwrap();
        assert_eq!(find_2bit_file("hg19", gbdb.path()).unwrap(), genome);
    }

    #[test]
    fn find_2bit_searches_gbdb_root() {
        let gbdb = tempfile::tempdir().unwrap();
        let genome = gbdb.path().join("hg18.2bit");
        std::fs::write(&genome, b"").unwrap();
        assert_eq!(find_2bit_file("hg18", gbdb.path()).unwrap(), genome);
    }

    #[test]
    fn find_2bit_reports_missing_genome() {
        let gbdb = tempfile::tempdir().unwrap();
        let err = find_2bit_file("nosuchgenome", gbdb.path()).unwrap_err();
        assert!(err.contains("nosuchgenome.2bit"));
    }
}
