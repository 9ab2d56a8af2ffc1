//! Configuration for codec stages

use crate::reed_solomon::FieldParameters;
use clap::{Arg, ArgMatches};
use std::num::NonZeroUsize;

/// Default id of side-channel parity labels
pub const DEFAULT_PARITY_LABEL_ID: &str = "rs_parity";

/// Configuration shared by the encoder and decoder stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageConfig {
    pub params: FieldParameters,
    /// Start marker id; `None` processes the stream from position 0
    pub start_id: Option<String>,
    /// Label id for out-of-band parity (side-channel encoder)
    pub parity_label_id: String,
    /// Label id flagging uncorrectable codewords (decoder)
    pub error_label_id: Option<String>,
    /// Upper bound on codewords per step; `None` for no bound
    pub max_codewords_per_step: Option<NonZeroUsize>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            params: FieldParameters::new(8, 0x11d, 1, 1, 32),
            start_id: None,
            parity_label_id: DEFAULT_PARITY_LABEL_ID.to_string(),
            error_label_id: None,
            max_codewords_per_step: None,
        }
    }
}

impl StageConfig {
    pub fn new(params: FieldParameters, start_id: Option<String>) -> Self {
        Self {
            params,
            start_id,
            ..Self::default()
        }
    }

    /// Build from command-line matches
    ///
    /// Options missing from the command (for example label ids on commands that do not
    /// define them) keep their defaults.
    pub fn from_args(matches: &ArgMatches) -> Self {
        let defaults = Self::default();
        let param = |id: &str, default: u32| lookup::<u32>(matches, id).unwrap_or(default);

        let params = FieldParameters::new(
            param("symbol-size", defaults.params.symbol_size),
            param("field-poly", defaults.params.field_poly),
            param("fcr", defaults.params.fcr),
            param("prim", defaults.params.prim_element),
            param("num-roots", defaults.params.num_roots),
        );

        Self {
            params,
            start_id: lookup::<String>(matches, "start-id"),
            parity_label_id: lookup::<String>(matches, "parity-label-id")
                .unwrap_or(defaults.parity_label_id),
            error_label_id: lookup::<String>(matches, "error-label-id"),
            max_codewords_per_step: lookup::<usize>(matches, "max-codewords")
                .and_then(NonZeroUsize::new),
        }
    }
}

fn lookup<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Option<T> {
    matches.try_get_one::<T>(id).ok().flatten().cloned()
}

/// Parse an unsigned integer given in decimal or `0x` hexadecimal
pub fn parse_u32(value: &str) -> Result<u32, String> {
    let value = value.trim();
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid integer '{}': {}", value, e))
}

/// Arguments describing the code and stream options
pub fn codec_args() -> Vec<Arg> {
    vec![
        Arg::new("symbol-size")
            .short('m')
            .long("symbol-size")
            .help("Bits per symbol")
            .value_name("BITS")
            .value_parser(parse_u32)
            .default_value("8"),
        Arg::new("field-poly")
            .short('g')
            .long("field-poly")
            .help("Primitive field polynomial (decimal or 0x hex)")
            .value_name("POLY")
            .value_parser(parse_u32)
            .default_value("0x11d"),
        Arg::new("fcr")
            .long("fcr")
            .help("First consecutive root of the generator, index form")
            .value_name("N")
            .value_parser(parse_u32)
            .default_value("1"),
        Arg::new("prim")
            .long("prim")
            .help("Primitive element step between generator roots, index form")
            .value_name("N")
            .value_parser(parse_u32)
            .default_value("1"),
        Arg::new("num-roots")
            .short('r')
            .long("num-roots")
            .help("Parity symbols per codeword")
            .value_name("N")
            .value_parser(parse_u32)
            .default_value("32"),
        Arg::new("start-id")
            .long("start-id")
            .help("Start marker label id")
            .value_name("ID"),
        Arg::new("max-codewords")
            .long("max-codewords")
            .help("Codewords processed per step (0 = unlimited)")
            .value_name("N")
            .value_parser(clap::value_parser!(usize))
            .default_value("0"),
    ]
}
