use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use facedetect_core::binding::{self, DetectionBinding};
use facedetect_core::detection::infrastructure::model_resolver::{self, locate_model, ProgressFn};
use facedetect_core::detection::infrastructure::onnx_ultraface_engine::OnnxUltrafaceLoader;
use facedetect_core::shared::constants::{DEFAULT_MODEL_NAME, DEFAULT_MODEL_URL, IMAGE_EXTENSIONS};
use facedetect_core::shared::engine_config::EngineConfig;
use facedetect_core::shared::face_box::FaceBox;
use facedetect_core::shared::image_view::ImageView;

/// Detect faces in images with an Ultra-Light ONNX model.
#[derive(Parser)]
#[command(name = "facedetect")]
struct Cli {
    /// Input image files.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Model file or directory containing one (downloaded if omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON engine config (defaults to facedetect.json next to the model).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum face score (0.0-1.0).
    #[arg(long)]
    score_threshold: Option<f32>,

    /// NMS overlap threshold (0.0-1.0).
    #[arg(long)]
    iou_threshold: Option<f32>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ImageReport<'a> {
    path: &'a Path,
    width: u32,
    height: u32,
    faces: Vec<FaceBox>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => resolve_default_model()?,
    };

    let custom;
    let detector: &DetectionBinding = match engine_overrides(&cli, &model_path)? {
        Some(config) => {
            custom = DetectionBinding::new(Box::new(OnnxUltrafaceLoader::with_config(config)));
            &custom
        }
        None => binding::instance(),
    };

    detector.load_model(&model_path)?;
    let result = detect_all(detector, &cli);
    detector.unload_model()?;
    result
}

fn detect_all(detector: &DetectionBinding, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut reports = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        let rgba = image::open(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let view = ImageView::new(rgba.as_raw(), width, height, 4)?;
        let faces = detector.detect_faces(&view)?;
        log::info!("{}: {} face(s)", path.display(), faces.len());
        reports.push(ImageReport {
            path,
            width,
            height,
            faces,
        });
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print!("{}", format_report(report));
        }
    }
    Ok(())
}

/// Engine settings when the command line overrides the model's own.
fn engine_overrides(
    cli: &Cli,
    model_path: &Path,
) -> Result<Option<EngineConfig>, Box<dyn std::error::Error>> {
    if cli.config.is_none() && cli.score_threshold.is_none() && cli.iou_threshold.is_none() {
        return Ok(None);
    }
    let mut config = match &cli.config {
        Some(file) => EngineConfig::load(file)?,
        None => EngineConfig::for_model(&locate_model(model_path)?)?,
    };
    if let Some(score) = cli.score_threshold {
        config.score_threshold = score;
    }
    if let Some(iou) = cli.iou_threshold {
        config.iou_threshold = iou;
    }
    config.validate()?;
    Ok(Some(config))
}

fn resolve_default_model() -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {DEFAULT_MODEL_NAME}");
    let progress = ProgressLine::default();
    let path = model_resolver::resolve(
        DEFAULT_MODEL_NAME,
        DEFAULT_MODEL_URL,
        None,
        Some(progress.callback()),
    );
    if progress.started() {
        eprintln!();
    }
    Ok(path?)
}

/// Tracks whether the download progress line was drawn, so it is only
/// terminated when a download actually ran.
#[derive(Default)]
struct ProgressLine {
    started: Arc<AtomicBool>,
}

impl ProgressLine {
    fn callback(&self) -> ProgressFn {
        let started = Arc::clone(&self.started);
        Box::new(move |downloaded, total| {
            started.store(true, Ordering::Relaxed);
            download_progress(downloaded, total);
        })
    }

    fn started(&self) -> bool {
        self.started.load(Ordering::Relaxed)
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for path in &cli.images {
        if !path.exists() {
            return Err(format!("Input file not found: {}", path.display()).into());
        }
        if !is_image(path) {
            return Err(format!("Not a supported image file: {}", path.display()).into());
        }
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model not found: {}", model.display()).into());
        }
    }
    if let Some(score) = cli.score_threshold {
        if !(0.0..=1.0).contains(&score) {
            return Err(format!("Score threshold must be between 0.0 and 1.0, got {score}").into());
        }
    }
    if let Some(iou) = cli.iou_threshold {
        if !(0.0..=1.0).contains(&iou) {
            return Err(format!("IoU threshold must be between 0.0 and 1.0, got {iou}").into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn format_report(report: &ImageReport<'_>) -> String {
    let mut out = format!(
        "{} ({}x{}): {} face(s)\n",
        report.path.display(),
        report.width,
        report.height,
        report.faces.len()
    );
    for face in &report.faces {
        out.push_str(&format!(
            "  [{}, {}, {}, {}] score {:.3}\n",
            face.left, face.top, face.right, face.bottom, face.score
        ));
    }
    out
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
