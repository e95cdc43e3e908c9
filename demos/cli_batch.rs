//! Batch CLI for freshscan
//!
//! Assesses every image in a directory as one batch and prints the batch
//! report. All images share the label given on the command line.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use freshscan::{
    image_loader::is_supported_extension, AssessmentConfig, FixedLabelClassifier,
    FreshnessAssessor, ImageClassifier,
};
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("freshscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_help(&args[0]);
        process::exit(1);
    }

    let input_path = Path::new(&args[1]);
    let label = args[2].clone();

    let config = match args.get(3) {
        Some(path) => match AssessmentConfig::from_json_file(Path::new(path)) {
            Ok(cfg) => {
                eprintln!("Loaded configuration from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("Error loading config file: {}", e);
                process::exit(1);
            }
        },
        None => AssessmentConfig::default(),
    };

    let image_files = match find_image_files(input_path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error finding image files: {}", e);
            process::exit(1);
        }
    };

    if image_files.is_empty() {
        eprintln!("No image files found in {}", input_path.display());
        process::exit(1);
    }

    eprintln!("Found {} image files to process", image_files.len());

    // Unreadable files still get a slot so the report lines up with the listing
    let payloads: Vec<String> = image_files
        .iter()
        .map(|path| match fs::read(path) {
            Ok(bytes) => STANDARD.encode(bytes),
            Err(e) => {
                eprintln!("Warning: cannot read {}: {}", path.display(), e);
                String::new()
            }
        })
        .collect();

    let classifiers: Vec<Arc<dyn ImageClassifier>> =
        vec![Arc::new(FixedLabelClassifier::single("cli-label", label, 0.8))];
    let assessor = match FreshnessAssessor::from_config(config, classifiers) {
        Ok(assessor) => assessor,
        Err(e) => {
            eprintln!("Error creating assessor: {}", e);
            process::exit(1);
        }
    };

    let report = assessor.assess_batch(&payloads);

    for (path, result) in image_files.iter().zip(&report.results) {
        let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
        match result {
            Ok(r) => eprintln!("✓ {} → {} ({:.1})", filename, r.quality_badge, r.freshness_score),
            Err(e) => eprintln!("✗ {} → {}", filename, e),
        }
    }

    match serde_json::to_string_pretty(&report.to_json()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }

    eprintln!();
    eprintln!("Batch processing complete:");
    eprintln!("  Total: {}", report.summary.total);
    eprintln!("  Success: {}", report.summary.successful);
    eprintln!("  Errors: {}", report.summary.failed);

    if report.summary.failed > 0 {
        process::exit(1);
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} <image_dir> <label> [config.json]", program_name);
    eprintln!();
    eprintln!("Batch assess food photos in a directory.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  image_dir      Directory of photos, or a single photo");
    eprintln!("  label          Predicted food label shared by all photos");
    eprintln!("  config.json    Optional JSON assessment configuration");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} photos/ banana", program_name);
    eprintln!("  RUST_LOG=freshscan=debug {} photos/ pizza freshscan.json", program_name);
}

fn find_image_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    if dir.is_file() {
        return Ok(vec![dir.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(is_supported_extension)
            .unwrap_or(false);
        if path.is_file() && supported {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
