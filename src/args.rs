use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::params::ConfigError;

// Default install location of the converter. Overridable per invocation; never
// checked for existence here, a missing binary surfaces as a spawn failure.
pub const DEFAULT_CONVERTER_PATH: &str = "/opt/PotreeConverter/PotreeConverter";

// Accepted spellings per canonical flag. Every user-facing option is declared
// here exactly once; `canonicalize_args` resolves spellings case-insensitively
// against this table before clap ever sees them. Two fields claiming the same
// spelling is a schema bug, guarded by test, not a runtime condition.
const ALIASES: &[(&str, &[&str])] = &[
    ("source", &["source", "i"]),
    ("outdir", &["outdir", "o", "output-dir", "output_dir"]),
    ("encoding", &["encoding"]),
    ("method", &["method", "m"]),
    ("chunk-method", &["chunk-method", "chunk_method", "chunkMethod"]),
    ("attributes", &["attributes"]),
    ("keep-chunks", &["keep-chunks", "keep_chunks"]),
    ("no-chunking", &["no-chunking", "no_chunking"]),
    ("no-indexing", &["no-indexing", "no_indexing"]),
    ("generate-page", &["generate-page", "generate_page", "p"]),
    ("title", &["title"]),
    ("converter-path", &["converter-path", "converter_path"]),
    ("help", &["help", "h"]),
    ("version", &["version", "V"]),
];

// CLI surface after alias normalization. Raw strings only; semantic
// validation lives in `ParameterSet::from_cli`.
#[derive(Parser, Debug)]
#[command(name = "potree-runner", version)]
#[command(about = "Run PotreeConverter on LAS/LAZ point clouds")]
pub struct Cli {
    /// Input file(s) or directory containing LAS/LAZ files
    #[arg(long, env = "POTREE_SOURCE", value_delimiter = ',')]
    pub source: Vec<String>,

    /// Output directory (the converter picks one when omitted)
    #[arg(long, env = "POTREE_OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Encoding type: 'BROTLI', 'UNCOMPRESSED', 'DEFAULT'
    #[arg(long, env = "POTREE_ENCODING", default_value = "BROTLI")]
    pub encoding: String,

    /// Point sampling method: 'poisson', 'poisson_average', 'random'
    #[arg(long, env = "POTREE_METHOD", default_value = "poisson")]
    pub method: String,

    /// Chunking method
    #[arg(long, env = "POTREE_CHUNK_METHOD", default_value = "LASZIP")]
    pub chunk_method: String,

    /// Attributes to keep in the output file (repeatable)
    #[arg(long, env = "POTREE_ATTRIBUTES", value_delimiter = ',')]
    pub attributes: Vec<String>,

    /// Skip deleting temporary chunks during conversion
    #[arg(long, env = "POTREE_KEEP_CHUNKS", default_value_t = false)]
    pub keep_chunks: bool,

    /// Disable the chunking phase
    #[arg(long, env = "POTREE_NO_CHUNKING", default_value_t = false)]
    pub no_chunking: bool,

    /// Disable the indexing phase
    #[arg(long, env = "POTREE_NO_INDEXING", default_value_t = false)]
    pub no_indexing: bool,

    /// Generate a ready-to-use web page with the given name
    #[arg(long, env = "POTREE_GENERATE_PAGE")]
    pub generate_page: Option<String>,

    /// Page title used when generating a web page
    #[arg(long, env = "POTREE_TITLE")]
    pub title: Option<String>,

    /// Path to the PotreeConverter executable
    #[arg(long, env = "POTREE_CONVERTER_PATH", default_value = DEFAULT_CONVERTER_PATH)]
    pub converter_path: PathBuf,
}

// Rewrite raw argv onto canonical long flags.
// Flag tokens (leading `-` or `--`, optional `=value`) are resolved through
// the alias table; value tokens and everything after a literal `--` pass
// through untouched. Unknown flag names fail here, before parsing, so typos
// are never silently ignored.
pub fn canonicalize_args<I>(raw: I) -> Result<Vec<OsString>, ConfigError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = raw.into_iter();
    let mut out: Vec<OsString> = Vec::new();
    if let Some(program) = iter.next() {
        out.push(program);
    }

    let mut literal = false;
    for token in iter {
        if literal {
            out.push(token);
            continue;
        }
        let Some(text) = token.to_str() else {
            // Flag names are ASCII; a non-UTF-8 token can only be a value.
            out.push(token);
            continue;
        };
        if text == "--" {
            literal = true;
            out.push(token);
        } else if let Some(body) = text.strip_prefix("--") {
            out.push(rewrite_flag(body)?);
        } else if let Some(body) = text.strip_prefix('-') {
            if body.is_empty() {
                // Bare `-` is a value by convention.
                out.push(token);
            } else {
                out.push(rewrite_flag(body)?);
            }
        } else {
            out.push(token);
        }
    }
    Ok(out)
}

// Rewrite one flag body (`name` or `name=value`) onto `--canonical[=value]`.
fn rewrite_flag(body: &str) -> Result<OsString, ConfigError> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };
    let canonical = resolve_alias(name).ok_or_else(|| ConfigError::UnrecognizedParameter {
        name: name.to_string(),
    })?;

    let mut flag = String::from("--");
    flag.push_str(canonical);
    if let Some(value) = value {
        flag.push('=');
        flag.push_str(value);
    }
    Ok(OsString::from(flag))
}

// Case-insensitive exact match against the alias table.
fn resolve_alias(name: &str) -> Option<&'static str> {
    ALIASES.iter().find_map(|(canonical, spellings)| {
        spellings
            .iter()
            .any(|spelling| spelling.eq_ignore_ascii_case(name))
            .then_some(*canonical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Canonicalize user tokens, dropping the program name for easier asserts.
    fn canonicalize(tokens: &[&str]) -> Result<Vec<String>, ConfigError> {
        let raw = std::iter::once(OsString::from("potree-runner"))
            .chain(tokens.iter().map(|token| OsString::from(*token)));
        canonicalize_args(raw).map(|out| {
            out.into_iter()
                .skip(1)
                .map(|token| token.to_string_lossy().into_owned())
                .collect()
        })
    }

    #[rstest]
    #[case("-i", "--source")]
    #[case("--SOURCE", "--source")]
    #[case("-o", "--outdir")]
    #[case("--output-dir", "--outdir")]
    #[case("--output_dir", "--outdir")]
    #[case("-m", "--method")]
    #[case("--chunkMethod", "--chunk-method")]
    #[case("--CHUNK_METHOD", "--chunk-method")]
    #[case("--keep_chunks", "--keep-chunks")]
    #[case("--no_chunking", "--no-chunking")]
    #[case("--no_indexing", "--no-indexing")]
    #[case("-p", "--generate-page")]
    #[case("--generate_page", "--generate-page")]
    #[case("--converter_path", "--converter-path")]
    fn aliases_resolve_to_canonical_flags(#[case] spelling: &str, #[case] canonical: &str) {
        let tokens = canonicalize(&[spelling, "value"]).expect("alias must resolve");
        assert_eq!(tokens, vec![canonical.to_string(), "value".to_string()]);
    }

    #[test]
    fn values_and_literal_section_pass_through_untouched() {
        let tokens = canonicalize(&["--source", "/data/a.laz", "--", "--not-a-flag"])
            .expect("valid invocation must canonicalize");
        assert_eq!(tokens, vec!["--source", "/data/a.laz", "--", "--not-a-flag"]);
    }

    #[test]
    fn equals_form_keeps_its_value() {
        let tokens = canonicalize(&["--output_dir=/tmp/out"]).expect("alias must resolve");
        assert_eq!(tokens, vec!["--outdir=/tmp/out"]);
    }

    #[test]
    fn unknown_flags_are_rejected_with_the_given_spelling() {
        let err = canonicalize(&["--chunkMthod", "LAS"]).expect_err("typo must be rejected");
        match err {
            ConfigError::UnrecognizedParameter { name } => assert_eq!(name, "chunkMthod"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn alias_table_has_no_colliding_spellings() {
        let mut seen: Vec<String> = Vec::new();
        for (_, spellings) in ALIASES {
            for spelling in *spellings {
                let lowered = spelling.to_ascii_lowercase();
                assert!(
                    !seen.contains(&lowered),
                    "alias `{spelling}` is claimed by two fields"
                );
                seen.push(lowered);
            }
        }
    }

    #[test]
    fn canonicalized_tokens_parse_into_the_cli() {
        let raw = ["potree-runner", "-i", "/data/a.laz", "--output_dir", "/out", "-p", "page"]
            .iter()
            .map(|token| OsString::from(*token));
        let tokens = canonicalize_args(raw).expect("aliases must resolve");
        let cli = Cli::try_parse_from(tokens).expect("canonical tokens must parse");
        assert_eq!(cli.source, vec!["/data/a.laz".to_string()]);
        assert_eq!(cli.outdir, Some(PathBuf::from("/out")));
        assert_eq!(cli.generate_page, Some("page".to_string()));
    }
}
