//! Command line interface for the `qrarray` binary.
//!
//! Kept free of library types so the build script can render the man page
//! from it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command line arguments for the `qrarray` binary.
#[derive(Debug, Parser)]
#[command(
    name = "qrarray",
    version,
    about = "Split files into indexed frames for an optical-code array and rebuild them"
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `qrarray` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a file into frame strings and plan their grid.
    Encode {
        /// File to encode.
        input: PathBuf,
        /// Maximum payload per frame.
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        /// Unit the chunk size is measured in.
        #[arg(long, value_enum, default_value_t = ChunkUnitArg::Chars)]
        chunk_unit: ChunkUnitArg,
        /// Grid rows; derived when omitted.
        #[arg(long)]
        rows: Option<usize>,
        /// Grid columns; derived when omitted.
        #[arg(long)]
        cols: Option<usize>,
        /// Write the JSON result here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rebuild a file from detected frame strings.
    Decode {
        /// JSON array of raw strings, or the output of `encode`.
        input: PathBuf,
        /// Directory to write the recovered file into.
        #[arg(short = 'd', long, default_value = ".")]
        output_dir: PathBuf,
        /// Frame count known out of band.
        #[arg(long)]
        expect_total: Option<u32>,
    },
}

/// Unit for `--chunk-unit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ChunkUnitArg {
    /// Unicode scalar values.
    Chars,
    /// UTF-8 bytes.
    Bytes,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::{ChunkUnitArg, Cli, Command};

    #[test]
    fn parses_encode_options() {
        let cli = Cli::parse_from([
            "qrarray",
            "encode",
            "notes.txt",
            "--chunk-size",
            "200",
            "--chunk-unit",
            "bytes",
            "--cols",
            "4",
        ]);
        let Command::Encode {
            input,
            chunk_size,
            chunk_unit,
            rows,
            cols,
            output,
        } = cli.command
        else {
            panic!("expected encode");
        };
        assert_eq!(input, Path::new("notes.txt"));
        assert_eq!(chunk_size, 200);
        assert_eq!(chunk_unit, ChunkUnitArg::Bytes);
        assert_eq!((rows, cols), (None, Some(4)));
        assert!(output.is_none());
    }

    #[test]
    fn decode_defaults_to_current_directory() {
        let cli = Cli::parse_from(["qrarray", "decode", "frames.json"]);
        let Command::Decode {
            input,
            output_dir,
            expect_total,
        } = cli.command
        else {
            panic!("expected decode");
        };
        assert_eq!(input, Path::new("frames.json"));
        assert_eq!(output_dir, Path::new("."));
        assert_eq!(expect_total, None);
    }
}
