use clap::{Parser, Subcommand};
use log::info;
use omr_grader::config::OmrConfig;
use omr_grader::detector::bubble::BubbleDetector;
use omr_grader::detector::frame::FrameRectifier;
use omr_grader::grading::{AnswerKeyParser, format_results_table};
use omr_grader::models::CardImage;
use omr_grader::tools::{binary_stats, collect_images, grayscale_stats, load_rgb, parse_key_list};
use omr_grader::utils::binarization::{ThresholdMode, threshold_binarize};
use omr_grader::visualization::{annotate_marks, annotate_regions};
use omr_grader::{OmrError, OmrPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "omrtool", version, about = "Answer sheet reading and grading tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read every card in a photo (or a directory of photos) and grade it
    Grade {
        #[arg(long)]
        image: PathBuf,
        /// Correct choices in question order, e.g. "3,1,4,1,5"
        #[arg(long)]
        key: String,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Treat the photo as a single card
        #[arg(long)]
        single: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print bubble and marking diagnostics for one card
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Write an annotated copy here
        #[arg(long)]
        annotate: Option<PathBuf>,
    },
    /// Split a photo into card images
    Segment {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Parse an answer key from recognized text
    ParseKey {
        #[arg(long)]
        text_file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Grade {
            image,
            key,
            config,
            single,
            json,
        } => grade_cmd(&image, &key, config.as_deref(), single, json),
        Command::Detect { image, annotate } => detect_cmd(&image, annotate.as_deref()),
        Command::Segment { image, out_dir } => segment_cmd(&image, out_dir.as_deref()),
        Command::ParseKey { text_file } => parse_key_cmd(&text_file),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<OmrConfig, OmrError> {
    match path {
        Some(path) => OmrConfig::from_json_file(path),
        None => Ok(OmrConfig::default()),
    }
}

fn grade_cmd(
    image: &Path,
    key: &str,
    config: Option<&Path>,
    single: bool,
    json: bool,
) -> Result<(), OmrError> {
    let key = parse_key_list(key)?;
    let mut config = load_config(config)?;
    if single {
        config.expect_grid = false;
    }
    let pipeline = OmrPipeline::new(config, None)?;

    let photos = if image.is_dir() {
        collect_images(image)
    } else {
        vec![image.to_path_buf()]
    };

    let mut cards = Vec::new();
    for path in &photos {
        let start = Instant::now();
        let rgb = load_rgb(path)?;
        let mut read = pipeline.process_photo(&rgb);
        info!(
            "{}: {} cards in {:.1} ms",
            path.display(),
            read.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        cards.append(&mut read);
    }
    for (i, card) in cards.iter_mut().enumerate() {
        card.index = i;
    }

    let result = pipeline.grade_cards(&cards, &key);
    if json {
        println!("{}", result.to_json()?);
    } else {
        println!("{}", format_results_table(&result));
    }
    Ok(())
}

fn detect_cmd(image: &Path, annotate: Option<&Path>) -> Result<(), OmrError> {
    let rgb = load_rgb(image)?;
    let config = OmrConfig::default();
    println!("Image: {} ({}x{})", image.display(), rgb.width(), rgb.height());

    let rectification = FrameRectifier::new(config.rectifier.clone()).rectify(&rgb);
    println!("Rectification: {:?}", rectification.outcome);

    let card = CardImage::new(rectification.image);
    let gray = grayscale_stats(card.gray());
    println!("Gray: min={} max={} avg={}", gray.min, gray.max, gray.avg);
    let ink = threshold_binarize(
        card.gray(),
        config.bubble.binary_threshold,
        ThresholdMode::Inverted,
    );
    let bin = binary_stats(&ink);
    println!(
        "Ink: {} of {} pixels ({:.2}%)",
        bin.foreground_pixels,
        bin.total_pixels,
        bin.foreground_ratio * 100.0
    );

    let detector = BubbleDetector::new(config.bubble.clone());
    let candidates = detector.detect(&card);
    let scores = detector.score_markings(&card, &candidates);
    let marked = scores.iter().filter(|s| s.marked).count();
    println!("Bubbles: {} ({} marked)", candidates.len(), marked);
    for (i, s) in scores.iter().enumerate() {
        println!(
            "  {i:>3}: ({}, {}) {}x{} score={:.3}{}",
            s.bbox.x,
            s.bbox.y,
            s.bbox.width,
            s.bbox.height,
            s.score,
            if s.marked { " *" } else { "" }
        );
    }

    if let Some(out) = annotate {
        annotate_marks(card.rgb(), &scores).save(out)?;
        println!("Annotated image written to {}", out.display());
    }
    Ok(())
}

fn segment_cmd(image: &Path, out_dir: Option<&Path>) -> Result<(), OmrError> {
    let rgb = load_rgb(image)?;
    let pipeline = OmrPipeline::new(OmrConfig::default(), None)?;
    let regions = pipeline.split_cards(&rgb);
    println!("Found {} cards", regions.len());
    for (i, region) in regions.iter().enumerate() {
        let b = region.bbox;
        println!("  card {i}: ({}, {}) {}x{}", b.x, b.y, b.width, b.height);
    }

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir)?;
        for (i, region) in regions.iter().enumerate() {
            region.image.save(dir.join(format!("card_{i:02}.png")))?;
        }
        let boxes: Vec<_> = regions.iter().map(|r| r.bbox).collect();
        annotate_regions(&rgb, &boxes).save(dir.join("regions.png"))?;
        println!("Cards written to {}", dir.display());
    }
    Ok(())
}

fn parse_key_cmd(text_file: &Path) -> Result<(), OmrError> {
    let text = fs::read_to_string(text_file)?;
    let pages: Vec<&str> = text.split('\u{c}').collect();
    let extracted = AnswerKeyParser::new()?.parse_pages(&pages);
    println!(
        "Questions: {} (confidence {:.2})",
        extracted.total_questions(),
        extracted.confidence
    );
    let answers: Vec<String> = extracted
        .answers
        .as_slice()
        .iter()
        .map(u8::to_string)
        .collect();
    println!("Key: {}", answers.join(","));
    Ok(())
}
