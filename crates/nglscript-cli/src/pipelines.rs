//! Canned pipelines, one per subcommand.
//!
//! Each argument struct knows how to build its [`Script`]; running it is the
//! caller's business.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use nglscript_core::env::PreprocessOptions;
use nglscript_core::error::DslError;
use nglscript_core::expr::{less_than, Keyword, Kwargs};
use nglscript_core::script::Script;
use nglscript_core::value::Value;

/// NGLess language version targeted by every canned pipeline.
pub const NGLESS_VERSION: &str = "0.8";

fn path_text(path: &Path) -> String {
    path.display().to_string()
}

/// Why a canned pipeline could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The script builder rejected the pipeline.
    Script(DslError),
    /// A required choice between options was left open.
    MissingOption(&'static str),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Script(e) => write!(f, "{}", e),
            PipelineError::MissingOption(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<DslError> for PipelineError {
    fn from(e: DslError) -> Self {
        PipelineError::Script(e)
    }
}

/// Builtin references `map` can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Reference {
    #[value(name = "sacCer3")]
    SacCer3,
    #[value(name = "ce10")]
    Ce10,
    #[value(name = "dm3")]
    Dm3,
    #[value(name = "gg4")]
    Gg4,
    #[value(name = "canFam2")]
    CanFam2,
    #[value(name = "rn4")]
    Rn4,
    #[value(name = "bosTau4")]
    BosTau4,
    #[value(name = "mm10")]
    Mm10,
    #[value(name = "hg19")]
    Hg19,
}

impl Reference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reference::SacCer3 => "sacCer3",
            Reference::Ce10 => "ce10",
            Reference::Dm3 => "dm3",
            Reference::Gg4 => "gg4",
            Reference::CanFam2 => "canFam2",
            Reference::Rn4 => "rn4",
            Reference::BosTau4 => "bosTau4",
            Reference::Mm10 => "mm10",
            Reference::Hg19 => "hg19",
        }
    }
}

/// Map reads against a reference
#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    /// FastQ file with reads to map (forward)
    #[arg(short, long)]
    pub input: PathBuf,

    /// FastQ file with reads to map (reverse), if paired-end
    #[arg(short = '2', long)]
    pub input_reverse: Option<PathBuf>,

    /// FastQ file with unpaired reads, if paired-end
    #[arg(short = 's', long, requires = "input_reverse")]
    pub input_singles: Option<PathBuf>,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Map against a builtin reference
    #[arg(short, long, value_enum, conflicts_with = "fasta", required_unless_present = "fasta")]
    pub reference: Option<Reference>,

    /// Map against a FASTA file (indexed if no index is available)
    #[arg(short, long)]
    pub fasta: Option<PathBuf>,
}

impl MapArgs {
    pub fn script(&self) -> Result<Script, PipelineError> {
        let map_opts = match (&self.reference, &self.fasta) {
            (Some(reference), _) => Kwargs::new().with("reference", reference.as_str()),
            (None, Some(fasta)) => Kwargs::new().with("fafile", path_text(fasta)),
            (None, None) => {
                return Err(PipelineError::MissingOption(
                    "map needs either a reference or a FASTA file",
                ))
            }
        };

        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let reads = match &self.input_reverse {
                Some(reverse) => {
                    let mut kwargs = Kwargs::new();
                    if let Some(singles) = &self.input_singles {
                        kwargs.insert("singles", path_text(singles));
                    }
                    env.paired(path_text(&self.input), path_text(reverse), kwargs)
                }
                None => env.call("fastq", path_text(&self.input), Kwargs::new()),
            };
            let input = env.set("input", reads)?;
            let mapped = env.call("map", &input, map_opts);
            let mapped = env.set("mapped", mapped)?;
            env.call("write", &mapped, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

/// How `count` distributes multiple mappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Multiple {
    #[value(name = "dist1")]
    Dist1,
    #[value(name = "all1")]
    All1,
    #[value(name = "1overN")]
    OneOverN,
    #[value(name = "unique_only")]
    UniqueOnly,
}

impl Multiple {
    pub fn as_str(&self) -> &'static str {
        match self {
            Multiple::Dist1 => "dist1",
            Multiple::All1 => "all1",
            Multiple::OneOverN => "1overN",
            Multiple::UniqueOnly => "unique_only",
        }
    }
}

/// Count reads per feature
#[derive(Debug, Clone, Args)]
pub struct CountArgs {
    /// SAM/BAM/CRAM file to count reads on
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Feature to count
    #[arg(short, long, default_value = "seqname")]
    pub features: String,

    /// How to handle multiple mappers
    #[arg(short, long, value_enum)]
    pub multiple: Option<Multiple>,
}

impl CountArgs {
    pub fn script(&self) -> Result<Script, DslError> {
        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let sam = env.call("samfile", path_text(&self.input), Kwargs::new());
            let samfile = env.set("samfile", sam)?;

            let mut kwargs = Kwargs::new().with("features", vec![self.features.as_str()]);
            if let Some(multiple) = self.multiple {
                kwargs.insert("multiple", Value::symbol(multiple.as_str()));
            }
            let counts = env.call("count", &samfile, kwargs);
            let counts = env.set("counts", counts)?;
            env.call("write", &counts, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

/// Trimming functions available to `trim`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrimMethod {
    Substrim,
    Endstrim,
}

impl TrimMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrimMethod::Substrim => "substrim",
            TrimMethod::Endstrim => "endstrim",
        }
    }
}

/// Quality-trim reads and drop short ones
#[derive(Debug, Clone, Args)]
pub struct TrimArgs {
    /// FastQ file with reads to trim
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Which trimming method to use
    #[arg(short, long, value_enum)]
    pub method: TrimMethod,

    /// Minimum quality value
    #[arg(short = 'q', long)]
    pub min_quality: i64,

    /// Discard reads shorter than this
    #[arg(short, long, default_value_t = 50)]
    pub discard: i64,
}

impl TrimArgs {
    pub fn script(&self) -> Result<Script, DslError> {
        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let reads = env.call("fastq", path_text(&self.input), Kwargs::new());
            let input = env.set("input", reads)?;

            env.preprocess(&input, PreprocessOptions::using("r"), |bk| {
                let r = bk.get("r")?;
                let trimmed = bk.call(
                    self.method.as_str(),
                    &r,
                    Kwargs::new().with("min_quality", self.min_quality),
                );
                let r = bk.set("r", trimmed)?;
                let len = bk.call("len", &r, Kwargs::new());
                bk.if_(less_than(len, self.discard), |then| {
                    then.push(Keyword::Discard);
                    Ok(())
                })
            })?;

            env.call("write", &input, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

/// Whether `select` keeps or drops matching reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectAction {
    #[value(name = "keep_if")]
    KeepIf,
    #[value(name = "drop_if")]
    DropIf,
}

impl SelectAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectAction::KeepIf => "keep_if",
            SelectAction::DropIf => "drop_if",
        }
    }
}

/// Conditions `select` can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectCondition {
    Mapped,
    Unmapped,
    Unique,
}

impl SelectCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectCondition::Mapped => "mapped",
            SelectCondition::Unmapped => "unmapped",
            SelectCondition::Unique => "unique",
        }
    }
}

/// Filter alignments
#[derive(Debug, Clone, Args)]
pub struct SelectArgs {
    /// SAM/BAM/CRAM file to filter
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Whether to keep or drop when conditions are met
    #[arg(short, long, value_enum)]
    pub action: SelectAction,

    /// One or more conditions to filter on
    #[arg(short, long, value_enum, num_args = 1.., required = true)]
    pub conditions: Vec<SelectCondition>,
}

impl SelectArgs {
    pub fn script(&self) -> Result<Script, DslError> {
        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let sam = env.call("samfile", path_text(&self.input), Kwargs::new());
            let samfile = env.set("samfile", sam)?;

            let conditions: Vec<Value> = self
                .conditions
                .iter()
                .map(|c| Value::symbol(c.as_str()))
                .collect();
            let selected = env.call(
                "select",
                &samfile,
                Kwargs::new().with(self.action.as_str(), conditions),
            );
            let selected = env.set("selected", selected)?;
            env.call("write", &selected, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

/// Compute mapping statistics
#[derive(Debug, Clone, Args)]
pub struct MapstatsArgs {
    /// SAM/BAM/CRAM file to summarise
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,
}

impl MapstatsArgs {
    pub fn script(&self) -> Result<Script, DslError> {
        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let sam = env.call("samfile", path_text(&self.input), Kwargs::new());
            let samfile = env.set("samfile", sam)?;
            let stats = env.call("mapstats", &samfile, Kwargs::new());
            let stats = env.set("stats", stats)?;
            env.call("write", &stats, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

/// Remove duplicate reads
#[derive(Debug, Clone, Args)]
pub struct UniqueArgs {
    /// FastQ file to filter
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file/path for results
    #[arg(short, long)]
    pub output: PathBuf,

    /// Max number of duplicate copies to keep
    #[arg(short = 'c', long, default_value_t = 1)]
    pub max_copies: i64,
}

impl UniqueArgs {
    pub fn script(&self) -> Result<Script, DslError> {
        let mut script = Script::new(NGLESS_VERSION);
        script.build(|env| {
            let reads = env.call("fastq", path_text(&self.input), Kwargs::new());
            let input = env.set("input", reads)?;
            let unique = env.call(
                "unique",
                &input,
                Kwargs::new().with("max_copies", self.max_copies),
            );
            env.call("write", unique, Kwargs::new().with("ofile", path_text(&self.output)));
            Ok(())
        })?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(script: &Script) -> Vec<String> {
        script.statements().iter().map(|s| s.render("")).collect()
    }

    #[test]
    fn map_single_end_with_reference() {
        let args = MapArgs {
            input: "reads.fq".into(),
            input_reverse: None,
            input_singles: None,
            output: "out.sam".into(),
            reference: Some(Reference::Hg19),
            fasta: None,
        };
        let script = args.script().unwrap();
        assert_eq!(script.version(), "0.8");
        assert_eq!(
            body(&script),
            vec![
                "input = fastq(\"reads.fq\")",
                "mapped = map(input, reference=\"hg19\")",
                "write(mapped, ofile=\"out.sam\")",
            ]
        );
    }

    #[test]
    fn map_without_reference_or_fasta_is_rejected() {
        let args = MapArgs {
            input: "reads.fq".into(),
            input_reverse: None,
            input_singles: None,
            output: "out.sam".into(),
            reference: None,
            fasta: None,
        };
        assert!(matches!(args.script(), Err(PipelineError::MissingOption(_))));
    }

    #[test]
    fn map_paired_with_singles_and_fasta() {
        let args = MapArgs {
            input: "r1.fq".into(),
            input_reverse: Some("r2.fq".into()),
            input_singles: Some("s.fq".into()),
            output: "out.sam".into(),
            reference: None,
            fasta: Some("genome.fa".into()),
        };
        let script = args.script().unwrap();
        assert_eq!(
            body(&script)[..2],
            [
                "input = paired(\"r1.fq\", \"r2.fq\", singles=\"s.fq\")".to_string(),
                "mapped = map(input, fafile=\"genome.fa\")".to_string(),
            ]
        );
    }

    #[test]
    fn count_with_multiple_symbol() {
        let args = CountArgs {
            input: "in.bam".into(),
            output: "counts.txt".into(),
            features: "seqname".to_string(),
            multiple: Some(Multiple::OneOverN),
        };
        assert_eq!(
            body(&args.script().unwrap())[1],
            "counts = count(samfile, features=[\"seqname\"], multiple={1overN})"
        );
    }

    #[test]
    fn count_without_multiple() {
        let args = CountArgs {
            input: "in.bam".into(),
            output: "counts.txt".into(),
            features: "gene".to_string(),
            multiple: None,
        };
        assert_eq!(
            body(&args.script().unwrap())[1],
            "counts = count(samfile, features=[\"gene\"])"
        );
    }

    #[test]
    fn trim_builds_preprocess_block() {
        let args = TrimArgs {
            input: "in.fq".into(),
            output: "out.fq".into(),
            method: TrimMethod::Substrim,
            min_quality: 25,
            discard: 50,
        };
        let script = args.script().unwrap();
        let text = script.render();
        assert!(text.contains(
            "input = preprocess(input, keep_singles=True) using |r|:\n\
             \x20   r = substrim(r, min_quality=25)\n\
             \x20   if len(r) < 50:\n\
             \x20       discard\n"
        ));
        assert!(text.ends_with("write(input, ofile=\"out.fq\")\n"));
    }

    #[test]
    fn select_renders_condition_symbols() {
        let args = SelectArgs {
            input: "in.sam".into(),
            output: "out.sam".into(),
            action: SelectAction::DropIf,
            conditions: vec![SelectCondition::Unmapped, SelectCondition::Unique],
        };
        assert_eq!(
            body(&args.script().unwrap())[1],
            "selected = select(samfile, drop_if=[{unmapped}, {unique}])"
        );
    }

    #[test]
    fn mapstats_pipeline() {
        let args = MapstatsArgs {
            input: "in.sam".into(),
            output: "stats.txt".into(),
        };
        assert_eq!(
            body(&args.script().unwrap()),
            vec![
                "samfile = samfile(\"in.sam\")",
                "stats = mapstats(samfile)",
                "write(stats, ofile=\"stats.txt\")",
            ]
        );
    }

    #[test]
    fn unique_writes_nested_call() {
        let args = UniqueArgs {
            input: "in.fq".into(),
            output: "out.fq".into(),
            max_copies: 2,
        };
        assert_eq!(
            body(&args.script().unwrap()),
            vec![
                "input = fastq(\"in.fq\")",
                "write(unique(input, max_copies=2), ofile=\"out.fq\")",
            ]
        );
    }
}
