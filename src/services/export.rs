use crate::metrics::Metrics;
use crate::models::FolioSettings;
use camino::{Utf8Path, Utf8PathBuf};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// Output page size. Dimensions are the portrait orientation in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    #[default]
    Letter,
    A4,
}

impl PageFormat {
    /// Portrait (width, height) in points.
    pub fn size_pt(self) -> (f32, f32) {
        match self {
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::A4 => (595.3, 841.9),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Fixed configuration of an export job.
///
/// Defaults match the reference export: 0.2 in margin, `Resume.pdf`, JPEG
/// quality 98, raster scale 2, US Letter portrait. Not user-configurable in
/// the UI; values come from [`FolioSettings`] so they live with the rest of
/// the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    /// Page margin in inches on all four sides.
    pub margin_in: f32,

    /// Default output file name offered to the user.
    pub file_name: String,

    /// JPEG quality (1-100) for the rasterized strips.
    pub jpeg_quality: u8,

    /// Upscale factor applied to the snapshot before pagination. Higher is
    /// sharper at higher memory and time cost.
    pub raster_scale: u32,

    pub page: PageFormat,
    pub orientation: Orientation,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            margin_in: 0.2,
            file_name: "Resume.pdf".to_string(),
            jpeg_quality: 98,
            raster_scale: 2,
            page: PageFormat::Letter,
            orientation: Orientation::Portrait,
        }
    }
}

impl From<&FolioSettings> for ExportSettings {
    fn from(settings: &FolioSettings) -> Self {
        Self {
            margin_in: settings.export_margin_in,
            file_name: settings.export_file_name.clone(),
            jpeg_quality: settings.export_jpeg_quality.clamp(1, 100),
            raster_scale: settings.export_raster_scale.max(1),
            ..Self::default()
        }
    }
}

/// A captured rasterization of the rendered page: tightly packed RGBA8 rows.
///
/// This is the export workflow's input - a plain pixel buffer, so the service
/// stays free of any GUI framework types.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Snapshot {
    /// Wrap a pixel buffer, checking that the byte length matches the
    /// dimensions.
    pub fn from_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ExportError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ExportError::BadSnapshot(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A snapshot with no pixels; exporting it is a "not ready" condition.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Errors from the export workflow. All of them are recoverable: the session
/// keeps running and the user may retry.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The page has no rendered content to capture yet (still on the startup
    /// splash, or the window snapshot was unavailable). Distinguishable from
    /// other failures so the UI can word the notice accordingly.
    #[error("The page is not ready to export yet")]
    NotReady,

    #[error("Invalid snapshot: {0}")]
    BadSnapshot(String),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export worker failed: {0}")]
    Worker(String),
}

/// Result of a successful export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub path: Utf8PathBuf,
    pub pages: usize,
    pub duration: Duration,
}

impl ExportOutcome {
    /// One-line summary for the status notice.
    pub fn summary(&self) -> String {
        format!(
            "Saved {} ({} page{})",
            self.path,
            self.pages,
            if self.pages == 1 { "" } else { "s" }
        )
    }
}

/// Page geometry derived from the settings and the snapshot width.
#[derive(Debug, Clone, Copy)]
struct PageGeometry {
    page_w_pt: f32,
    page_h_pt: f32,
    margin_pt: f32,
    content_w_pt: f32,
    /// Height in source pixels of one full page strip.
    strip_h_px: u32,
}

impl PageGeometry {
    fn new(settings: &ExportSettings, raster_width_px: u32) -> Result<Self, ExportError> {
        let (w, h) = settings.page.size_pt();
        let (page_w_pt, page_h_pt) = match settings.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };

        let margin_pt = settings.margin_in * POINTS_PER_INCH;
        let content_w_pt = page_w_pt - 2.0 * margin_pt;
        let content_h_pt = page_h_pt - 2.0 * margin_pt;
        if content_w_pt <= 0.0 || content_h_pt <= 0.0 {
            return Err(ExportError::BadSnapshot(format!(
                "margin {}in leaves no printable area",
                settings.margin_in
            )));
        }

        // The raster is scaled to fill the printable width; one page of
        // content is therefore this many source pixels tall.
        let strip_h_px = ((raster_width_px as f32) * content_h_pt / content_w_pt).floor() as u32;

        Ok(Self {
            page_w_pt,
            page_h_pt,
            margin_pt,
            content_w_pt,
            strip_h_px: strip_h_px.max(1),
        })
    }
}

/// Split a raster of `total_height` rows into consecutive strips of at most
/// `strip_height` rows. Strips cover every row exactly once, in order; the
/// last strip may be shorter.
fn paginate(total_height: u32, strip_height: u32) -> Vec<(u32, u32)> {
    let mut strips = Vec::new();
    let mut top = 0;
    while top < total_height {
        let height = strip_height.min(total_height - top);
        strips.push((top, height));
        top += height;
    }
    strips
}

/// One page worth of rasterized content, JPEG-encoded.
struct EncodedStrip {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

/// The document-generation capability.
///
/// Acquired lazily by [`ExportService`] on the first export and reused for
/// the rest of the session.
pub struct PdfEngine {
    producer: String,
}

impl PdfEngine {
    fn new() -> Self {
        Self {
            producer: format!("{} {}", crate::APP_NAME, crate::VERSION),
        }
    }

    /// Assemble one PDF page per strip, each page a single full-width image
    /// anchored at the top margin.
    fn assemble(
        &self,
        strips: &[EncodedStrip],
        geometry: &PageGeometry,
    ) -> Result<Document, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(strips.len());

        for strip in strips {
            let image_id = doc.add_object(
                Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => strip.width as i64,
                        "Height" => strip.height as i64,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                        "Filter" => "DCTDecode",
                    },
                    strip.jpeg.clone(),
                )
                .with_compression(false),
            );

            // Drawn height preserves the strip's aspect ratio; a short final
            // strip simply ends higher up the page.
            let draw_h_pt = geometry.content_w_pt * strip.height as f32 / strip.width as f32;
            let y_pt = geometry.page_h_pt - geometry.margin_pt - draw_h_pt;

            let content = Content {
                operations: vec![
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![
                            Object::Real(geometry.content_w_pt),
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Real(draw_h_pt),
                            Object::Real(geometry.margin_pt),
                            Object::Real(y_pt),
                        ],
                    ),
                    Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                    Operation::new("Q", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let resources_id = doc.add_object(dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            });

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(geometry.page_w_pt),
                    Object::Real(geometry.page_h_pt),
                ],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let page_count = strips.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Producer" => Object::string_literal(self.producer.clone()),
        });
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }
}

/// Service for exporting the rendered page as a paginated PDF.
///
/// The pipeline: upscale the snapshot by the configured raster scale, slice
/// it into page-height strips, JPEG-encode each strip, and embed one strip
/// per PDF page. The heavy lifting runs on the blocking pool so the UI event
/// loop is never stalled.
///
/// # Design Philosophy
///
/// - **Framework-agnostic**: input is a plain [`Snapshot`], no GUI types
/// - **Lazily acquired**: the [`PdfEngine`] is created on first use and
///   cached for the session (instrumented through [`Metrics`])
/// - **Recoverable**: every failure is an [`ExportError`] the UI can present;
///   nothing here can take down the session
pub struct ExportService {
    engine: OnceCell<Arc<PdfEngine>>,
    metrics: Arc<Metrics>,
}

impl ExportService {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            engine: OnceCell::new(),
            metrics,
        }
    }

    /// Get the PDF engine, acquiring it on first call.
    ///
    /// Subsequent calls in the same session return the cached instance; the
    /// acquisition counter in [`Metrics`] makes the load-once guarantee
    /// observable.
    pub async fn engine(&self) -> Arc<PdfEngine> {
        self.engine
            .get_or_init(|| async {
                tracing::info!("Acquiring PDF engine (first export this session)");
                self.metrics.record_engine_acquisition();
                Arc::new(PdfEngine::new())
            })
            .await
            .clone()
    }

    /// Number of engine acquisitions so far (0 before the first export).
    pub fn engine_acquisitions(&self) -> usize {
        self.metrics.engine_acquisitions()
    }

    /// Export a snapshot of the rendered page to `dest`.
    ///
    /// Returns [`ExportError::NotReady`] for an empty snapshot; any pipeline
    /// failure is returned as a recoverable error. There is no cancellation
    /// once started.
    pub async fn export(
        &self,
        snapshot: Snapshot,
        settings: &ExportSettings,
        dest: &Utf8Path,
    ) -> Result<ExportOutcome, ExportError> {
        if snapshot.is_empty() {
            return Err(ExportError::NotReady);
        }

        let engine = self.engine().await;
        let settings = settings.clone();
        let dest = dest.to_path_buf();

        tracing::info!(
            "Exporting {}x{} snapshot to {} (scale {}, quality {})",
            snapshot.width,
            snapshot.height,
            dest,
            settings.raster_scale,
            settings.jpeg_quality
        );

        let outcome = tokio::task::spawn_blocking(move || {
            Self::run_pipeline(&engine, snapshot, &settings, &dest)
        })
        .await
        .map_err(|e| ExportError::Worker(e.to_string()))??;

        self.metrics.record_export_completed(outcome.duration);
        tracing::info!(
            "Export finished: {} pages in {:.2}s",
            outcome.pages,
            outcome.duration.as_secs_f32()
        );

        Ok(outcome)
    }

    /// The CPU-bound part of the workflow: scale, paginate, encode, assemble,
    /// write. Runs on the blocking pool.
    fn run_pipeline(
        engine: &PdfEngine,
        snapshot: Snapshot,
        settings: &ExportSettings,
        dest: &Utf8Path,
    ) -> Result<ExportOutcome, ExportError> {
        let start = Instant::now();

        let raster = Self::rasterize(&snapshot, settings.raster_scale)?;
        let geometry = PageGeometry::new(settings, raster.width())?;
        let strips = Self::encode_strips(&raster, &geometry, settings.jpeg_quality)?;

        let mut doc = engine.assemble(&strips, &geometry)?;
        doc.save(dest.as_std_path())?;

        Ok(ExportOutcome {
            path: dest.to_path_buf(),
            pages: strips.len(),
            duration: start.elapsed(),
        })
    }

    /// Upscale the snapshot and flatten it to RGB (JPEG carries no alpha).
    fn rasterize(snapshot: &Snapshot, scale: u32) -> Result<RgbImage, ExportError> {
        let rgba = RgbaImage::from_raw(snapshot.width, snapshot.height, snapshot.rgba.clone())
            .ok_or_else(|| ExportError::BadSnapshot("pixel buffer length mismatch".to_string()))?;

        let scaled = if scale > 1 {
            image::imageops::resize(
                &rgba,
                snapshot.width * scale,
                snapshot.height * scale,
                FilterType::Lanczos3,
            )
        } else {
            rgba
        };

        Ok(DynamicImage::ImageRgba8(scaled).to_rgb8())
    }

    /// Slice the raster into page strips and JPEG-encode each one.
    fn encode_strips(
        raster: &RgbImage,
        geometry: &PageGeometry,
        quality: u8,
    ) -> Result<Vec<EncodedStrip>, ExportError> {
        let bands = paginate(raster.height(), geometry.strip_h_px);
        let mut strips = Vec::with_capacity(bands.len());

        for (top, height) in bands {
            let band = image::imageops::crop_imm(raster, 0, top, raster.width(), height).to_image();

            let mut jpeg = Vec::new();
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut jpeg),
                quality.clamp(1, 100),
            );
            encoder.encode_image(&band)?;

            strips.push(EncodedStrip {
                width: band.width(),
                height: band.height(),
                jpeg,
            });
        }

        Ok(strips)
    }
}
