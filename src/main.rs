use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use qrbatch::batch::generate_single_from_body;
use qrbatch::helper::to_console_string;
use qrbatch::scratch::ScratchPath;
use qrbatch::{
    BatchGenerator, BatchRequestBody, Config, ErrorResponse, QrBatchError, SingleRequestBody, ARCHIVE_FILENAME,
};

/// Generate QR codes in bulk or one at a time.
#[derive(Debug, Parser)]
#[command(name = "qrbatch", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true, env = "QRBATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Expand the ranges of a JSON request into a zip of QR codes.
    Batch {
        /// JSON body: {"fields":[{"begin","end"}],"contents","size","color"}
        #[arg(long)]
        request: PathBuf,
        /// Logo to place at the center of every code.
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Where to write the archive.
        #[arg(long, default_value = ARCHIVE_FILENAME)]
        out: PathBuf,
    },
    /// Encode literal text and print {"qrCodeImageUrl": ...}.
    Single {
        #[arg(long)]
        contents: String,
        #[arg(long)]
        size: String,
        #[arg(long, default_value = "#000000")]
        color: String,
        /// Also draw the code on stderr.
        #[arg(long)]
        preview: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match cli.command {
        Command::Batch { request, logo, out } => run_batch(&config, request, logo, out),
        Command::Single { contents, size, color, preview } => {
            run_single(SingleRequestBody { contents, size, color }, preview)
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let status = e.downcast_ref::<QrBatchError>().map_or(500, QrBatchError::status_code);
            tracing::error!(status, "{e:#}");
            println!("{}", serde_json::to_string(&ErrorResponse::generic()).unwrap_or_default());
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.ensure_scratch_dir().context("preparing scratch directory")?;
    Ok(config)
}

fn run_batch(config: &Config, request: PathBuf, logo: Option<PathBuf>, out: PathBuf) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&request).with_context(|| format!("reading {}", request.display()))?;
    let body = BatchRequestBody::from_json(&text)?;

    // Stage the logo under a per-request name, as an upload would be.
    let upload = match &logo {
        Some(source) => {
            let name = source.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let scratch = ScratchPath::logo_upload(&config.scratch_dir, Uuid::new_v4(), name);
            std::fs::copy(source, scratch.path()).with_context(|| format!("staging logo {}", source.display()))?;
            Some(scratch)
        }
        None => None,
    };
    let request = body.into_request(upload.as_ref().map(|s| s.path().to_path_buf()))?;

    let archive = BatchGenerator::new(config.clone()).generate(&request)?;
    let entries = archive.entries();
    let mut writer = BufWriter::new(File::create(&out).with_context(|| format!("creating {}", out.display()))?);
    let bytes = archive.stream_to(&mut writer)?;
    tracing::info!(entries, bytes, out = %out.display(), "archive written");
    Ok(())
}

fn run_single(body: SingleRequestBody, preview: bool) -> anyhow::Result<()> {
    let response = generate_single_from_body(&body)?;
    if preview {
        eprint!("{}", to_console_string(&body.contents)?);
    }
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
