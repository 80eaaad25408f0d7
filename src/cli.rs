use crate::align::AlignerKind;
use crate::sequence::Orientation;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::io::Write;
use std::path::{Path, PathBuf};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="checkmyclones",
          author="Benjamin Schiller <benjamin.schiller@ucsf.edu>",
          version=&**FULL_VERSION,
          about="Checks Sanger sequencing results against reference sequences",
          long_about = None,
          after_help = format!("Copyright (C) 2011-{}. This program is free code and
comes with ABSOLUTELY NO WARRANTY; it is intended for research use only.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
#[command(group(ArgGroup::new("genome_choice").args(["genome", "hg18", "hg19", "mm9"])))]
#[command(group(ArgGroup::new("orientation").args(["reverse_orientation", "both_orientations"])))]
#[command(arg_required_else_help(true))]
pub struct CliParams {
    #[clap(required = true)]
    #[clap(long = "clones")]
    #[clap(num_args = 1..)]
    #[clap(help = "Files that contain clone sequences (globs allowed)")]
    #[clap(value_name = "CLONES")]
    pub clones: Vec<String>,

    #[clap(long = "references")]
    #[clap(num_args = 1..)]
    #[clap(help = "Files that contain reference sequences (globs allowed)")]
    #[clap(value_name = "REFERENCES")]
    pub references: Vec<String>,

    #[clap(long = "bed-reference")]
    #[clap(help = "Use the regions listed in the BED file as reference sequences")]
    #[clap(value_name = "BED")]
    #[arg(value_parser = check_file_exists)]
    pub bed_reference: Option<PathBuf>,

    #[clap(long = "genome")]
    #[clap(help = "Use 2bit file NAME as reference genome (also looks for {path-to-gbdb}/NAME/NAME.2bit)")]
    #[clap(value_name = "NAME")]
    pub genome: Option<String>,

    #[clap(long = "hg18")]
    #[clap(help = "Shortcut for --genome hg18")]
    pub hg18: bool,

    #[clap(long = "hg19")]
    #[clap(help = "Shortcut for --genome hg19")]
    pub hg19: bool,

    #[clap(long = "mm9")]
    #[clap(help = "Shortcut for --genome mm9")]
    pub mm9: bool,

    #[clap(long = "path-to-gbdb")]
    #[clap(help = "Location of \"gbdb\" or 2bit files, if gbdb is not in /gbdb")]
    #[clap(value_name = "DIR")]
    #[clap(default_value = "/gbdb")]
    pub path_to_gbdb: PathBuf,

    #[clap(long = "only-use-references")]
    #[clap(num_args = 1..)]
    #[clap(help = "Use only the reference regions with the following names")]
    #[clap(value_name = "NAME")]
    pub only_use_references: Option<Vec<String>>,

    #[clap(long = "reverse-orientation")]
    #[clap(help = "Compare the reverse complement of each clone instead")]
    pub reverse_orientation: bool,

    #[clap(long = "both-orientations")]
    #[clap(help = "Compare each clone in both orientations")]
    pub both_orientations: bool,

    #[clap(long = "threads")]
    #[clap(help = "Number of worker threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "aligner")]
    #[clap(value_name = "ALIGNER")]
    #[clap(help = "Pairwise alignment mode (local or global)")]
    #[clap(default_value = "local")]
    pub aligner: AlignerKind,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

impl CliParams {
    /// Reference genome selected via `--genome` or one of its
    /// shortcuts; hg19 when unspecified.
    pub fn ref_genome(&self) -> &str {
        if self.hg18 {
            "hg18"
        } else if self.hg19 {
            "hg19"
        } else if self.mm9 {
            "mm9"
        } else {
            self.genome.as_deref().unwrap_or("hg19")
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.reverse_orientation {
            Orientation::Reverse
        } else if self.both_orientations {
            Orientation::Both
        } else {
            Orientation::Forward
        }
    }
}

pub fn get_cli_params() -> CliParams {
    let args = CliParams::parse();
    init_verbose(&args);
    args
}

fn init_verbose(args: &CliParams) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn threads_in_range(s: &str) -> Result<usize, String> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genome_shortcuts_override_default() {
        let params = CliParams::parse_from(["checkmyclones", "--clones", "c.fa", "--mm9"]);
        assert_eq!(params.ref_genome(), "mm9");
    }

    #[test]
    fn genome_defaults_to_hg19() {
        let params = CliParams::parse_from(["checkmyclones", "--clones", "c.fa"]);
        assert_eq!(params.ref_genome(), "hg19");
    }

    #[test]
    fn genome_shortcuts_are_mutually_exclusive() {
        assert!(CliParams::try_parse_from([
            "checkmyclones",
            "--clones",
            "c.fa",
            "--hg18",
            "--mm9"
        ])
        .is_err());
    }

    #[test]
    fn orientation_flags_are_mutually_exclusive() {
        assert!(CliParams::try_parse_from([
            "checkmyclones",
            "--clones",
            "c.fa",
            "--reverse-orientation",
            "--both-orientations"
        ])
        .is_err());
        let params = CliParams::parse_from([
            "checkmyclones",
            "--clones",
            "c.fa",
            "--both-orientations",
        ]);
        assert_eq!(params.orientation(), Orientation::Both);
    }

    #[test]
    fn aligner_parses_local_and_global() {
        let params =
            CliParams::parse_from(["checkmyclones", "--clones", "c.fa", "--aligner", "global"]);
        assert_eq!(params.aligner, AlignerKind::Global);
        assert!(CliParams::try_parse_from([
            "checkmyclones",
            "--clones",
            "c.fa",
            "--aligner",
            "banded"
        ])
        .is_err());
    }
}
