//! # checkmyclones
//! A tool for checking Sanger sequencing results ("clones") against a
//! set of reference sequences, supplied in any reasonable format:
//! FASTA files, plain-text sequence files, or BED coordinates into a
//! 2-bit reference genome.
//!
//! Each clone is aligned against every reference; per clone, the tool
//! reports full matches (including substitution positions) or, failing
//! that, the longest partial match. It can be run like so:
//! ```bash
//!  ./checkmyclones --clones 'reads/*.fa' \
//!                  --bed-reference regions.bed \
//!                  --hg19 \
//!                  --threads 4
//! ```

use crate::align::{align_clone_to_ref, AlignerKind};
use crate::cli::{get_cli_params, CliParams, FULL_VERSION};
use crate::report::Comparison;
use crate::sequence::{expand_orientations, Sequence};
use crate::utils::{handle_error_and_exit, Result};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time;
use threadpool::ThreadPool;

mod align;
mod cli;
mod files;
mod genome;
mod report;
mod sequence;
mod utils;

fn compare_clone_to_ref(clone: &Sequence, reference: &Sequence, kind: AlignerKind) -> Comparison {
    let aln = match align_clone_to_ref(clone, reference, kind) {
        Ok(aln) => aln,
        Err(err) => {
            log::debug!("{}", err);
            return Comparison::no_match(clone, reference);
        }
    };
    if aln.is_match() {
        log::info!("match found {}, {}", clone.name, reference.name);
    }
    if aln.is_truncated {
        log::debug!("alignment is truncated ({}, {})", clone.name, reference.name);
        if !aln.has_gaps && !aln.has_mismatches {
            log::info!("truncated match found {}, {}", clone.name, reference.name);
        }
    }
    if aln.has_gaps {
        log::debug!("alignment has gaps ({}, {})", clone.name, reference.name);
    }
    if aln.has_mismatches {
        log::debug!(
            "alignment has mismatches ({}, {})",
            clone.name,
            reference.name
        );
        if !aln.is_truncated && !aln.has_gaps {
            log::info!("mutated match found {}, {}", clone.name, reference.name);
        }
    }
    Comparison::new(&aln, reference)
}

fn load_references(params: &CliParams) -> Result<Vec<Sequence>> {
    if params.references.is_empty() && params.bed_reference.is_none() {
        return Err("No reference sequences specified".to_string());
    }
    let mut ref_seqs = Vec::new();
    if let Some(bed_path) = &params.bed_reference {
        let genome_path = genome::find_2bit_file(params.ref_genome(), &params.path_to_gbdb)?;
        log::debug!("Using genome {}", genome_path.display());
        ref_seqs.extend(genome::read_bed_file(bed_path, &genome_path, true)?);
    }
    if !params.references.is_empty() {
        ref_seqs.extend(files::load_all_seqs(&params.references));
    }
    if let Some(only) = &params.only_use_references {
        ref_seqs.retain(|seq| only.iter().any(|name| name == seq.real_name()));
    }
    if ref_seqs.is_empty() {
        return Err("Could not find any reference sequences".to_string());
    }
    Ok(ref_seqs)
}

fn runner() -> Result<()> {
    let params = get_cli_params();
    log::info!("Running {}-{}", env!("CARGO_PKG_NAME"), *FULL_VERSION);
    let start_timer = time::Instant::now();

    let clones = files::load_all_seqs(&params.clones);
    if clones.is_empty() {
        return Err("Could not find any clone sequences".to_string());
    }
    let clones = expand_orientations(clones, params.orientation());

    let ref_seqs = Arc::new(load_references(&params)?);
    for reference in ref_seqs.iter() {
        log::info!("Loaded reference {}", reference.name);
    }

    log::info!("Starting job pool with {} threads...", params.num_threads);
    let pool = ThreadPool::new(params.num_threads);
    let (sender, receiver) = channel();

    let aligner = params.aligner;
    let mut job_index = 0;
    for clone in clones {
        log::info!("Comparing {} to references", clone.name);
        let clone = Arc::new(clone);
        for ref_index in 0..ref_seqs.len() {
            let clone = clone.clone();
            let ref_seqs = ref_seqs.clone();
            let sender = sender.clone();
            let index = job_index;
            job_index += 1;
            pool.execute(move || {
                let result = compare_clone_to_ref(&clone, &ref_seqs[ref_index], aligner);
                sender.send((index, result)).unwrap();
            });
        }
    }
    pool.join();
    drop(sender);

    // Restore submission order so that grouping is deterministic.
    let mut indexed: Vec<(usize, Comparison)> = receiver.iter().collect();
    indexed.sort_by_key(|(index, _)| *index);
    let results: Vec<Comparison> = indexed.into_iter().map(|(_, result)| result).collect();

    report::report_results(&results, &mut std::io::stdout().lock())?;

    log::info!("Total execution time: {:?}", start_timer.elapsed());
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
