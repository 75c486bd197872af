//! Batch orchestration.
//!
//! For every range of a request, in order, each code is turned into the
//! payload `<prefix>/<code>`, encoded, optionally given a logo, and appended to
//! a zip archive as `QRCode_<code>.png`. Rendering of a chunk of codes runs in
//! parallel; appends always follow input order. Any failure aborts the
//! whole batch and no archive is returned.

use std::collections::HashSet;
use std::io::{BufWriter, Seek, Write};
use std::path::PathBuf;

use image::RgbaImage;
use rayon::prelude::*;
use uuid::Uuid;

use crate::archive::{ArchiveBuilder, FinishedArchive};
use crate::config::Config;
use crate::error::{QrBatchError, Result};
use crate::helper::to_png_bytes;
use crate::logo::{overlay_centered, Logo};
use crate::qrcode::{encode_data_uri, encode_raster, QrStyle};
use crate::range::RangeDescriptor;
use crate::request::{SingleCodeResponse, SingleRequestBody};
use crate::scratch::ScratchPath;

/// One batch request, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    /// Ranges to expand, processed in order.
    pub fields: Vec<RangeDescriptor>,
    /// Payload prefix.
    pub content_prefix: String,
    /// Edge length of each image in pixels.
    pub size: u32,
    /// Hex foreground color.
    pub color: String,
    /// Logo to composite onto every code.
    pub logo_path: Option<PathBuf>,
}

impl QrRequest {
    /// Total codes across all ranges, saturating.
    pub fn total_codes(&self) -> u64 {
        self.fields.iter().fold(0u64, |acc, f| acc.saturating_add(f.codes().len()))
    }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Id used for scratch names and log correlation.
    pub request_id: Uuid,
    /// Entries written to the archive.
    pub entries: usize,
    /// Codes already produced by an earlier, overlapping range.
    pub skipped_duplicates: usize,
}

/// Text encoded for `code`.
pub fn payload_text(content_prefix: &str, code: &str) -> String {
    format!("{content_prefix}/{code}")
}

/// Archive entry name for `code`.
pub fn entry_name(code: &str) -> String {
    format!("QRCode_{code}.png")
}

/// Runs batch requests with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct BatchGenerator {
    config: Config,
}

impl BatchGenerator {
    /// Creates a generator; the configuration is not re-read afterwards.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generates the archive into a fresh scratch file.
    ///
    /// The returned [`FinishedArchive`] is fully flushed and synced. On error
    /// the scratch file is removed and nothing is returned.
    pub fn generate(&self, request: &QrRequest) -> Result<FinishedArchive> {
        let request_id = Uuid::new_v4();
        let scratch = ScratchPath::archive(&self.config.scratch_dir, request_id);
        let sink = BufWriter::new(scratch.create()?);

        let (builder, summary) = self.build(request_id, request, sink)?;
        builder.finalize_file()?;
        Ok(FinishedArchive::new(scratch, summary.entries))
    }

    /// Generates the archive into any seekable sink and returns it finalized.
    pub fn write_archive<W: Write + Seek>(&self, request: &QrRequest, sink: W) -> Result<(W, BatchSummary)> {
        let (builder, summary) = self.build(Uuid::new_v4(), request, sink)?;
        Ok((builder.finalize()?, summary))
    }

    fn build<W: Write + Seek>(
        &self,
        request_id: Uuid,
        request: &QrRequest,
        sink: W,
    ) -> Result<(ArchiveBuilder<W>, BatchSummary)> {
        let span = tracing::info_span!("batch", request_id = %request_id);
        let _guard = span.enter();

        let requested = request.total_codes();
        if let Some(limit) = self.config.max_codes_per_request {
            if requested > limit {
                return Err(QrBatchError::TooManyCodes { requested, limit });
            }
        }

        // Everything that can be checked once is checked before the archive opens.
        let style = QrStyle::new(request.size, &request.color)?;
        let logo = match &request.logo_path {
            Some(path) => Some(Logo::open(path)?.scaled_for(style.size)?),
            None => None,
        };
        tracing::info!(
            ranges = request.fields.len(),
            codes = requested,
            size = style.size,
            logo = logo.is_some(),
            "starting batch"
        );

        let job = RenderJob { prefix: &request.content_prefix, style, logo: logo.as_ref() };
        let mut archive = ArchiveBuilder::with_compression_level(sink, self.config.compression_level);
        let mut seen = HashSet::new();
        let mut skipped_duplicates = 0;
        let mut chunk = Vec::with_capacity(self.config.parallel_chunk);

        for field in &request.fields {
            for code in field.codes() {
                if !seen.insert(code.clone()) {
                    tracing::warn!(code = %code, "duplicate code across ranges, skipping");
                    skipped_duplicates += 1;
                    continue;
                }
                chunk.push(code);
                if chunk.len() >= self.config.parallel_chunk {
                    job.render_into(&mut archive, &chunk)?;
                    chunk.clear();
                }
            }
        }
        job.render_into(&mut archive, &chunk)?;

        let summary = BatchSummary { request_id, entries: archive.len(), skipped_duplicates };
        tracing::info!(entries = summary.entries, skipped = skipped_duplicates, "batch complete");
        Ok((archive, summary))
    }
}

struct RenderJob<'a> {
    prefix: &'a str,
    style: QrStyle,
    logo: Option<&'a RgbaImage>,
}

impl RenderJob<'_> {
    fn render(&self, code: &str) -> Result<Vec<u8>> {
        let mut raster = encode_raster(&payload_text(self.prefix, code), &self.style)?;
        if let Some(logo) = self.logo {
            overlay_centered(&mut raster, logo);
        }
        Ok(to_png_bytes(&raster)?)
    }

    /// Renders `codes` concurrently, then appends them in order.
    fn render_into<W: Write + Seek>(&self, archive: &mut ArchiveBuilder<W>, codes: &[String]) -> Result<()> {
        let rendered: Vec<Vec<u8>> = codes.par_iter().map(|code| self.render(code)).collect::<Result<_>>()?;
        for (code, png) in codes.iter().zip(rendered) {
            let name = entry_name(code);
            archive.append(&name, &png)?;
            tracing::debug!(entry = %name, bytes = png.len(), "appended");
        }
        Ok(())
    }
}

/// Encodes literal `contents` as one PNG, returned inline as a data URI.
///
/// No range expansion and no logo.
pub fn generate_single(contents: &str, size: u32, color: &str) -> Result<SingleCodeResponse> {
    let style = QrStyle::new(size, color)?;
    Ok(SingleCodeResponse { qr_code_image_url: encode_data_uri(contents, &style)? })
}

/// [`generate_single`] for a wire body with a textual size.
pub fn generate_single_from_body(body: &SingleRequestBody) -> Result<SingleCodeResponse> {
    let style = QrStyle::parse(&body.size, &body.color)?;
    Ok(SingleCodeResponse { qr_code_image_url: encode_data_uri(&body.contents, &style)? })
}
