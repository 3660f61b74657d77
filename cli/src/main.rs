//! unprova CLI - exam booklet question segmentation tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unprova::transform::{
    build_question_rectangles, missing_questions, numbering_gaps, PageKind, QuestionPatterns,
};
use unprova::{
    find_positions, parse_file_with_options, render, ExportOptions, JsonFormat, OutputLayout,
    ParseOptions, PdfParser, TransformConfig, TransformInput,
};

#[derive(Parser)]
#[command(name = "unprova")]
#[command(version)]
#[command(about = "Split entrance-exam PDF booklets into question figures and texts", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    transform: TransformArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect questions and export figures, texts and the regions PDF
    Transform {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: TransformArgs,
    },

    /// Report detected question starts and numbering gaps
    Positions {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Highest accepted question number
        #[arg(long, value_name = "N")]
        max_questions: Option<u32>,

        /// Print positions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct TransformArgs {
    /// Base output directory (default: data/vestibular)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", env = "UNPROVA_CONFIG")]
    config: Option<PathBuf>,

    /// Highest accepted question number
    #[arg(long, value_name = "N")]
    max_questions: Option<u32>,

    /// Rasterization resolution
    #[arg(long, value_name = "DPI")]
    dpi: Option<u32>,

    /// Skip question figures
    #[arg(long)]
    no_question_images: bool,

    /// Skip non-question figures
    #[arg(long)]
    no_non_question_images: bool,

    /// Skip text files
    #[arg(long)]
    no_texts: bool,

    /// Skip the annotated regions PDF
    #[arg(long)]
    no_regions_pdf: bool,

    /// Also write resultado.json to the output directory
    #[arg(long)]
    json: bool,
}

impl TransformArgs {
    fn config(&self) -> Result<TransformConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => TransformConfig::from_json_file(path)?,
            None => TransformConfig::default(),
        };
        if let Some(max) = self.max_questions {
            config = config.with_max_questions(max);
        }
        if let Some(dpi) = self.dpi {
            config = config.with_dpi(dpi);
        }
        config.validate()?;
        Ok(config)
    }

    fn exports(&self) -> ExportOptions {
        ExportOptions {
            question_images: !self.no_question_images,
            non_question_images: !self.no_non_question_images,
            texts: !self.no_texts,
            regions_pdf: !self.no_regions_pdf,
        }
    }

    fn layout(&self) -> OutputLayout {
        match &self.output {
            Some(dir) => OutputLayout::with_base_dir(dir),
            None => OutputLayout::default(),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Transform { input, args }) => cmd_transform(&input, &args),
        Some(Commands::Positions {
            input,
            max_questions,
            json,
        }) => cmd_positions(&input, max_questions, json),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: transform if input is provided
            if let Some(input) = cli.input {
                cmd_transform(&input, &cli.transform)
            } else {
                println!("{}", "Usage: unprova <FILE> [-o DIR]".yellow());
                println!("       unprova --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_transform(input: &Path, args: &TransformArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.config()?;
    let exports = args.exports();
    let layout = args.layout();
    log::debug!("Transform configuration: {:?}", config);

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing PDF...");
    let parser = PdfParser::open_with_options(input, ParseOptions::new().lenient())?;
    let doc = parser.parse()?;
    pb.inc(1);

    pb.set_message("Loading renderer...");
    let input_data = TransformInput::new(&doc).with_source(parser.backend().raw_doc());
    #[cfg(feature = "pdfium")]
    let pdfium = if exports.question_images || exports.non_question_images {
        match unprova::bind_pdfium() {
            Ok(p) => Some(p),
            Err(e) => {
                pb.println(format!("{}: {} (figures skipped)", "Warning".yellow().bold(), e));
                None
            }
        }
    } else {
        None
    };
    #[cfg(feature = "pdfium")]
    let rasterizer = match pdfium.as_ref() {
        Some(p) => match unprova::PdfiumRasterizer::new(p, parser.backend().data()) {
            Ok(r) => Some(r),
            Err(e) => {
                pb.println(format!("{}: {} (figures skipped)", "Warning".yellow().bold(), e));
                None
            }
        },
        None => None,
    };
    #[cfg(feature = "pdfium")]
    let input_data = match rasterizer.as_ref() {
        Some(r) => input_data.with_rasterizer(r),
        None => input_data,
    };
    pb.inc(1);

    pb.set_message("Exporting regions...");
    let result = unprova::run_transform(input_data, &config, exports, &layout)?;
    pb.inc(1);

    if args.json {
        pb.set_message("Writing report...");
        let base = layout.base();
        fs::create_dir_all(&base)?;
        fs::write(base.join("resultado.json"), render::to_json(&result, JsonFormat::Pretty)?)?;
    }
    pb.inc(1);
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} questions",
        "Found".green().bold(),
        result.positions.len(),
        config.max_questions
    );
    if !result.missing_questions.is_empty() {
        println!(
            "  {} {:?}",
            "Not found:".yellow(),
            result.missing_questions
        );
    }

    println!("\n{}", "Output:".green().bold());
    let outputs = [
        ("Question figures", &result.questions_figs_dir),
        ("Non-question figures", &result.non_questions_figs_dir),
        ("Texts", &result.texts_dir),
        ("Regions PDF", &result.regions_pdf_path),
    ];
    let shown: Vec<_> = outputs
        .iter()
        .filter_map(|(label, path)| path.as_ref().map(|p| (label, p)))
        .collect();
    for (i, (label, path)) in shown.iter().enumerate() {
        let branch = if i + 1 == shown.len() { "└─" } else { "├─" };
        println!("  {} {}: {}", branch.dimmed(), label, path.display());
    }
    println!("  {} files written", result.files_written);

    Ok(())
}

fn cmd_positions(
    input: &Path,
    max_questions: Option<u32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match max_questions {
        Some(max) => TransformConfig::default().with_max_questions(max),
        None => TransformConfig::default(),
    };
    let doc = parse_file_with_options(input, ParseOptions::new().lenient())?;
    let positions = find_positions(&doc, config.max_questions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&positions)?);
        return Ok(());
    }

    println!(
        "{} {} question start positions.",
        "Found".green().bold(),
        positions.len()
    );
    let missing = missing_questions(&positions, config.max_questions);
    if !missing.is_empty() {
        println!(
            "  {} questions not found (different format or other exam): {:?}",
            "Note:".yellow(),
            missing
        );
    }
    for p in positions.iter().take(10) {
        let r = p.start_rect;
        println!(
            "  Question {} on page {}: bbox = ({:.1}, {:.1}, {:.1}, {:.1})",
            p.number, p.page_index, r.x0, r.y0, r.x1, r.y1
        );
    }

    let rects = build_question_rectangles(&doc, &positions, &config);
    println!("Built rectangles for {} questions.", rects.len());

    for gap in numbering_gaps(&positions) {
        println!(
            "  {} after Question {} came Question {} (missing: {:?}).",
            "Gap:".yellow(),
            gap.after,
            gap.next,
            gap.missing
        );
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient: show metadata even if some page content fails to decode
    let doc = parse_file_with_options(input, ParseOptions::new().lenient())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.metadata.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = doc.metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    println!();
    println!("{}", "Page Classification".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let patterns = QuestionPatterns::new()?;
    let config = TransformConfig::default();
    for page in &doc.pages {
        let kind = PageKind::of(page, &patterns, &config);
        let label = match kind {
            PageKind::Question => "questions".normal(),
            PageKind::Draft => "draft".dimmed(),
            PageKind::Essay => "essay / instructions".magenta(),
            PageKind::Generic => "other".normal(),
        };
        println!("  {} {:>3}: {} ({} lines)", "Page".bold(), page.index, label, page.lines.len());
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unprova".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam booklet question segmentation tool");
    println!();
    println!("License: MIT");
}
