//! Command-line interface for freshscan
//!
//! Assesses a single photo. Pretrained classifiers are external, so the
//! predicted label is supplied on the command line and fed through a
//! fixed-label classifier.

use freshscan::{
    image_loader::load_image, AssessmentConfig, AssessmentResult, FixedLabelClassifier,
    FreshnessAssessor, ImageClassifier,
};
use std::{env, path::Path, process, sync::Arc};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("freshscan=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut label = None;
    let mut score = 0.8f32;
    let mut config_path = None;
    let mut image_path_arg = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--label" if i + 1 < args.len() => {
                label = Some(args[i + 1].clone());
                i += 1;
            }
            "--score" if i + 1 < args.len() => {
                score = match args[i + 1].parse() {
                    Ok(s) => s,
                    Err(_) => {
                        eprintln!("Error: Invalid score '{}'", args[i + 1]);
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--config" if i + 1 < args.len() => {
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let (image_path_str, label) = match (image_path_arg, label) {
        (Some(path), Some(label)) => (path, label),
        _ => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    let config = match config_path {
        Some(path) => match AssessmentConfig::from_json_file(Path::new(&path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config file: {}", e);
                process::exit(1);
            }
        },
        None => AssessmentConfig::default(),
    };

    let image_path = Path::new(&image_path_str);
    if !image_path.exists() {
        eprintln!("Error: File '{}' does not exist", image_path.display());
        process::exit(1);
    }

    let image = match load_image(image_path, config.analysis.resolution) {
        Ok(image) => image,
        Err(error) => {
            eprintln!("{}", error.user_message());
            process::exit(1);
        }
    };

    let classifiers: Vec<Arc<dyn ImageClassifier>> =
        vec![Arc::new(FixedLabelClassifier::single("cli-label", label, score))];
    let assessor = match FreshnessAssessor::from_config(config, classifiers) {
        Ok(assessor) => assessor,
        Err(e) => {
            eprintln!("Error creating assessor: {}", e);
            process::exit(1);
        }
    };

    match assessor.assess(&image) {
        Ok(result) => print_result(&result),
        Err(error) => {
            eprintln!("{}", error.user_message());
            process::exit(1);
        }
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] --label <LABEL> <image_path>", program_name);
    eprintln!();
    eprintln!("Assess the freshness of a food item from an image file.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --label LABEL    Predicted food label, e.g. strawberry or French_loaf");
    eprintln!("  --score S        Classifier confidence for the label (default: 0.8)");
    eprintln!("  --config PATH    JSON assessment configuration");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG         Log filter (default: freshscan=info)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} --label strawberry photo.jpg", program_name);
    eprintln!("  {} --label pizza --score 0.65 --config freshscan.json slice.png", program_name);
}

fn print_result(result: &AssessmentResult) {
    // JSON on stdout for programmatic use
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }

    // Summary on stderr for human reading
    eprintln!();
    eprintln!("Freshness Assessment Summary:");
    eprintln!("  Food: {} ({})", result.food_type, result.food_category);
    eprintln!("  Grade: {}", result.quality_badge);
    eprintln!("  Freshness Score: {:.1}", result.freshness_score);
    eprintln!("  Shelf Life: {} days", result.shelf_life_days);
    eprintln!("  Servings: {}", result.estimated_servings);
    eprintln!(
        "  Donation: {}",
        if result.donation_suitable { "suitable" } else { "not suitable" }
    );
    for recommendation in &result.recommendations {
        eprintln!("  - {}", recommendation);
    }
}
