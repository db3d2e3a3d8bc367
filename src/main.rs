//! `qrarray` binary: encode files into frame strings and decode them back.
//!
//! Frame strings travel as JSON so any renderer or detector can sit between
//! the two commands.

mod cli;

use std::{
    error::Error,
    fs,
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use qrarray::{
    ChunkLimit,
    ChunkUnit,
    Detection,
    Transfer,
    TransferConfig,
    decode_transfer_expecting,
    encode_transfer,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::cli::{ChunkUnitArg, Cli, Command};

const RECOVERED_TEXT: &str = "recovered.txt";
const RECOVERED_BINARY: &str = "recovered.bin";

/// Output of `encode`, accepted back by `decode`.
#[derive(Debug, Serialize, Deserialize)]
struct FramesFile {
    frames: Vec<String>,
    rows: usize,
    cols: usize,
}

/// Shapes `decode` accepts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DecodeInput {
    Encoded(FramesFile),
    Strings(Vec<String>),
    Detections(Vec<Detection>),
}

impl DecodeInput {
    fn into_detections(self) -> Vec<Detection> {
        match self {
            Self::Encoded(file) => file.frames.into_iter().map(Detection::from).collect(),
            Self::Strings(raw) => raw.into_iter().map(Detection::from).collect(),
            Self::Detections(detections) => detections,
        }
    }
}

impl From<ChunkUnitArg> for ChunkUnit {
    fn from(unit: ChunkUnitArg) -> Self {
        match unit {
            ChunkUnitArg::Chars => Self::Chars,
            ChunkUnitArg::Bytes => Self::Bytes,
        }
    }
}

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Encode {
            input,
            chunk_size,
            chunk_unit,
            rows,
            cols,
            output,
        } => {
            let mut config = TransferConfig::default().with_chunk_limit(ChunkLimit {
                size: chunk_size,
                unit: chunk_unit.into(),
            });
            config.rows = rows;
            config.cols = cols;
            encode_file(&input, &config, output.as_deref())
        }
        Command::Decode {
            input,
            output_dir,
            expect_total,
        } => decode_file(&input, &output_dir, expect_total),
    }
}

fn encode_file(
    input: &Path,
    config: &TransferConfig,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let content = fs::read(input)?;
    let filename = input
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned);
    let encoded = encode_transfer(&Transfer::detect(content, filename), config)?;

    let (frames, layout) = encoded.into_parts();
    let file = FramesFile {
        rows: layout.rows(),
        cols: layout.cols(),
        frames,
    };
    let json = serde_json::to_string_pretty(&file)?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            info!(
                "wrote {} frames in a {}x{} grid to {}",
                file.frames.len(),
                file.rows,
                file.cols,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn decode_file(
    input: &Path,
    output_dir: &Path,
    expect_total: Option<u32>,
) -> Result<(), Box<dyn Error>> {
    let input: DecodeInput = serde_json::from_str(&fs::read_to_string(input)?)?;
    let reassembly = decode_transfer_expecting(input.into_detections(), expect_total)?;

    for warning in reassembly.diagnostics().warnings() {
        warn!("{warning}");
    }
    let transfer = reassembly.transfer();
    let path = write_recovered(output_dir, transfer)?;
    info!(
        "recovered {} bytes from {} frames into {}",
        transfer.content().len(),
        reassembly.total(),
        path.display()
    );
    Ok(())
}

/// Write `transfer` into `output_dir`, creating the directory if needed.
fn write_recovered(output_dir: &Path, transfer: &Transfer) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_path(output_dir, transfer);
    fs::write(&path, transfer.to_file_bytes())?;
    Ok(path)
}

/// Where to write `transfer`, keeping only the final component of a
/// filename that arrived with the frames.
fn output_path(output_dir: &Path, transfer: &Transfer) -> PathBuf {
    let fallback = if transfer.is_binary() {
        RECOVERED_BINARY
    } else {
        RECOVERED_TEXT
    };
    let name = transfer
        .filename()
        .and_then(|name| Path::new(name).file_name())
        .map_or_else(|| fallback.into(), ToOwned::to_owned);
    output_dir.join(name)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, process};

    use qrarray::{Transfer, envelope::UTF8_BOM};

    use super::{output_path, write_recovered};

    #[test]
    fn recovered_file_is_written_into_a_new_directory() {
        let root = std::env::temp_dir().join(format!("qrarray-decode-{}", process::id()));
        let output_dir = root.join("nested").join("out");

        let path = write_recovered(&output_dir, &Transfer::text("hi").with_filename("note.txt"))
            .expect("directory is created");
        assert_eq!(path, output_dir.join("note.txt"));
        let written = fs::read(&path).expect("file exists");
        assert_eq!(&written[..UTF8_BOM.len()], UTF8_BOM);
        assert_eq!(&written[UTF8_BOM.len()..], b"hi");

        fs::remove_dir_all(&root).expect("clean up");
    }

    #[test]
    fn untrusted_filename_keeps_only_its_last_component() {
        let transfer = Transfer::binary(vec![1_u8]).with_filename("../../etc/passwd");
        assert_eq!(output_path(Path::new("out"), &transfer), Path::new("out/passwd"));

        let unnamed = Transfer::binary(vec![1_u8]);
        assert_eq!(output_path(Path::new("out"), &unnamed), Path::new("out/recovered.bin"));
    }
}
