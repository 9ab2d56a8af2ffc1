//! rsfec - Reed-Solomon encode/decode of byte files
//!
//! Files are treated as streams of 8-bit symbols. Encoding pads the last block with zeros;
//! decoding takes `--length` to trim that padding again.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{info, warn};
use rsfec::config::codec_args;
use rsfec::reporters::{CodecReporter, ConsoleReporter, SilentReporter};
use rsfec::{
    run_stage, FieldTables, Label, MemoryInput, MemoryOutput, ParityMode, ReedSolomon, RsDecoder,
    RsEncoder, StageConfig,
};
use std::fs;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = Command::new("rsfec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reed-Solomon forward error correction for byte streams")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("encode")
                .visible_alias("e")
                .about("Append Reed-Solomon parity to a file")
                .arg(Arg::new("input").help("File to protect").required(true).index(1))
                .arg(Arg::new("output").help("Encoded output file").required(true).index(2))
                .arg(parity_file_arg("Write parity to this file and leave the data unmodified"))
                .arg(quiet_arg())
                .args(codec_args()),
        )
        .subcommand(
            Command::new("decode")
                .visible_alias("d")
                .about("Correct errors in an encoded file and strip the parity")
                .arg(Arg::new("input").help("Encoded file").required(true).index(1))
                .arg(Arg::new("output").help("Decoded output file").required(true).index(2))
                .arg(parity_file_arg("Read parity from this file; input holds only data"))
                .arg(
                    Arg::new("length")
                        .short('l')
                        .long("length")
                        .help("Original data length in bytes (drops encoder padding)")
                        .value_name("BYTES")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(quiet_arg())
                .args(codec_args()),
        )
        .subcommand(
            Command::new("info")
                .visible_alias("i")
                .about("Show code geometry and generator polynomial")
                .args(codec_args()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("encode", sub_matches)) => handle_encode(sub_matches),
        Some(("decode", sub_matches)) => handle_decode(sub_matches),
        Some(("info", sub_matches)) => handle_info(sub_matches),
        Some((cmd, _)) => bail!("Unknown command: {}", cmd),
        None => bail!("No command specified"),
    }
}

fn parity_file_arg(help: &'static str) -> Arg {
    Arg::new("parity-file")
        .short('p')
        .long("parity-file")
        .help(help)
        .value_name("FILE")
}

fn quiet_arg() -> Arg {
    Arg::new("quiet")
        .short('q')
        .long("quiet")
        .help("Quiet mode - minimal output")
        .action(ArgAction::SetTrue)
}

fn reporter(matches: &ArgMatches) -> Box<dyn CodecReporter> {
    if matches.get_flag("quiet") {
        Box::new(SilentReporter::new())
    } else {
        Box::new(ConsoleReporter::new())
    }
}

fn required_path<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a Path> {
    matches
        .get_one::<String>(id)
        .map(Path::new)
        .with_context(|| format!("Missing argument: {}", id))
}

fn handle_encode(matches: &ArgMatches) -> Result<()> {
    let config = StageConfig::from_args(matches);
    let reporter = reporter(matches);
    let input_path = required_path(matches, "input")?;
    let output_path = required_path(matches, "output")?;
    let parity_path = matches.get_one::<String>("parity-file").map(Path::new);

    let mode = if parity_path.is_some() {
        ParityMode::SideChannel
    } else {
        ParityMode::Append
    };
    let mut encoder = RsEncoder::<u8>::from_config(&config, mode)
        .context("Invalid code parameters")?;
    reporter.report_code(&config.params);

    let mut data = fs::read(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let kk = config.params.kk();
    let padding = (kk - data.len() % kk) % kk;
    if padding > 0 {
        info!("Padding final block with {} zero bytes", padding);
        data.resize(data.len() + padding, 0);
    }

    let frame = data.len();
    let mut input = file_input(data, &config, frame);
    let mut output = MemoryOutput::new();
    let summary = run_stage(&mut encoder, &mut input, &mut output)?;

    fs::write(output_path, output.symbols())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if let Some(parity_path) = parity_path {
        let parity: Vec<u8> = output
            .labels_with_id(&config.parity_label_id)
            .filter_map(|label| label.payload.as_deref())
            .flatten()
            .copied()
            .collect();
        fs::write(parity_path, parity)
            .with_context(|| format!("Failed to write {}", parity_path.display()))?;
    }

    reporter.report_summary("Encoded", &summary);
    Ok(())
}

fn handle_decode(matches: &ArgMatches) -> Result<()> {
    let config = StageConfig::from_args(matches);
    let reporter = reporter(matches);
    let input_path = required_path(matches, "input")?;
    let output_path = required_path(matches, "output")?;

    let mut decoder = RsDecoder::<u8>::from_config(&config).context("Invalid code parameters")?;
    reporter.report_code(&config.params);

    let received = fs::read(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    let codewords = match matches.get_one::<String>("parity-file").map(Path::new) {
        Some(parity_path) => {
            let parity = fs::read(parity_path)
                .with_context(|| format!("Failed to read {}", parity_path.display()))?;
            interleave(&received, &parity, config.params.kk(), config.params.num_roots as usize)?
        }
        None => received,
    };

    let nn = config.params.nn();
    if codewords.len() % nn != 0 {
        warn!(
            "Ignoring {} trailing bytes that do not form a codeword",
            codewords.len() % nn
        );
    }

    let frame = codewords.len() - codewords.len() % nn;
    let mut input = file_input(codewords, &config, frame);
    let mut output = MemoryOutput::new();
    let summary = run_stage(&mut decoder, &mut input, &mut output)?;

    let mut decoded = output.symbols();
    if let Some(&length) = matches.get_one::<usize>("length") {
        if length > decoded.len() {
            bail!(
                "Requested length {} exceeds decoded size {}",
                length,
                decoded.len()
            );
        }
        decoded.truncate(length);
    }

    fs::write(output_path, decoded)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    reporter.report_summary("Decoded", &summary);
    reporter.report_uncorrectable(&summary.uncorrectable);

    if !summary.uncorrectable.is_empty() {
        reporter.report_error("Some codewords could not be corrected");
        std::process::exit(1);
    }
    Ok(())
}

/// Feed a whole file as one stream, marked as a single frame of `frame` symbols when a start
/// id is configured
fn file_input(symbols: Vec<u8>, config: &StageConfig, frame: usize) -> MemoryInput<u8> {
    let mut input = MemoryInput::from_symbols(symbols);
    if let Some(start_id) = &config.start_id {
        input.post_label(Label::new(start_id.as_str(), 0).with_width(frame));
    }
    input
}

/// Rebuild append-layout codewords from separate data and parity files
fn interleave(data: &[u8], parity: &[u8], kk: usize, num_roots: usize) -> Result<Vec<u8>> {
    let blocks = data.len() / kk;
    if data.len() % kk != 0 {
        bail!("Data length {} is not a multiple of {} bytes", data.len(), kk);
    }
    if parity.len() != blocks * num_roots {
        bail!(
            "Parity file holds {} bytes, expected {} for {} blocks",
            parity.len(),
            blocks * num_roots,
            blocks
        );
    }

    let mut codewords = Vec::with_capacity(blocks * (kk + num_roots));
    for block in 0..blocks {
        codewords.extend_from_slice(&data[block * kk..(block + 1) * kk]);
        codewords.extend_from_slice(&parity[block * num_roots..(block + 1) * num_roots]);
    }
    Ok(codewords)
}

fn handle_info(matches: &ArgMatches) -> Result<()> {
    let config = StageConfig::from_args(matches);
    let codec = ReedSolomon::<u8>::new(config.params).context("Invalid code parameters")?;
    let tables: &FieldTables = codec.tables();

    ConsoleReporter::new().report_code(&config.params);
    println!("  Correction capacity: {} symbols", codec.correction_capacity());
    println!("  Generator roots (index form): {:?}", tables.roots());
    println!(
        "  Generator polynomial (lowest order first): {:?}",
        tables.generator_poly()
    );
    Ok(())
}
