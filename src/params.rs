use std::path::PathBuf;
use thiserror::Error;

use crate::args::Cli;

// Configuration errors. All of these are detected before any converter
// process is spawned; the wrapper exits 1 without side effects.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required parameter: {name}")]
    MissingRequiredParameter { name: &'static str },

    #[error("unrecognized parameter: {name}")]
    UnrecognizedParameter { name: String },

    #[error("invalid value `{value}` for {field}; accepted values: {accepted}")]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        accepted: &'static str,
    },
}

// Output encodings understood by the converter. `Default` means "let the
// converter decide" and is elided from the command line entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Brotli,
    Uncompressed,
    Default,
}

impl Encoding {
    const ACCEPTED: &'static str = "BROTLI, UNCOMPRESSED, DEFAULT";

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_uppercase().as_str() {
            "BROTLI" => Ok(Self::Brotli),
            "UNCOMPRESSED" => Ok(Self::Uncompressed),
            "DEFAULT" => Ok(Self::Default),
            _ => Err(ConfigError::InvalidEnumValue {
                field: "encoding",
                value: raw.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }

    // Spelling the converter expects on its command line.
    pub fn as_converter_arg(self) -> &'static str {
        match self {
            Self::Brotli => "BROTLI",
            Self::Uncompressed => "UNCOMPRESSED",
            Self::Default => "DEFAULT",
        }
    }
}

// Point sampling strategies understood by the converter. Poisson is the
// converter's own default and is elided from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingMethod {
    Poisson,
    PoissonAverage,
    Random,
}

impl SamplingMethod {
    const ACCEPTED: &'static str = "poisson, poisson_average, random";

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.to_ascii_lowercase().as_str() {
            "poisson" => Ok(Self::Poisson),
            "poisson_average" => Ok(Self::PoissonAverage),
            "random" => Ok(Self::Random),
            _ => Err(ConfigError::InvalidEnumValue {
                field: "method",
                value: raw.to_string(),
                accepted: Self::ACCEPTED,
            }),
        }
    }

    pub fn as_converter_arg(self) -> &'static str {
        match self {
            Self::Poisson => "poisson",
            Self::PoissonAverage => "poisson_average",
            Self::Random => "random",
        }
    }
}

// Validated conversion parameters, constructed once per invocation and
// immutable afterwards. `title` is inert unless `generate_page` is set;
// nothing enforces that coupling, matching the converter's own behavior.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub source: Vec<String>,
    pub outdir: Option<PathBuf>,
    pub encoding: Encoding,
    pub method: SamplingMethod,
    pub chunk_method: String,
    pub attributes: Vec<String>,
    pub keep_chunks: bool,
    pub no_chunking: bool,
    pub no_indexing: bool,
    pub generate_page: Option<String>,
    pub title: Option<String>,
}

impl ParameterSet {
    // Validate parsed CLI input into a parameter set.
    // Enum fields are checked eagerly so bad values fail here, with the
    // accepted set named, instead of after a converter process has started.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.source.is_empty() {
            return Err(ConfigError::MissingRequiredParameter { name: "source" });
        }

        Ok(Self {
            source: cli.source.clone(),
            outdir: cli.outdir.clone(),
            encoding: Encoding::parse(&cli.encoding)?,
            method: SamplingMethod::parse(&cli.method)?,
            chunk_method: cli.chunk_method.clone(),
            attributes: cli.attributes.clone(),
            keep_chunks: cli.keep_chunks,
            no_chunking: cli.no_chunking,
            no_indexing: cli.no_indexing,
            generate_page: cli.generate_page.clone(),
            title: cli.title.clone(),
        })
    }
}
