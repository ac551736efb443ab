//! Proposal export CLI tool
//!
//! A command-line tool for turning a rendered proposal preview into a
//! paginated PDF.

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use proposal_export::layout::{Length, PageDimensions, PageGeometry};
use proposal_export::paginate;
use proposal_export::SourceImage;
use proposal_export::pdf::{
    export_to_file, extract_metadata, ExportOptions, ExportOutcome, DEFAULT_OUTPUT_FILE,
};

/// Proposal Export - Paginate a rendered proposal preview into a PDF
#[derive(Parser)]
#[command(name = "proposal-export")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Export a preview snapshot with the default A4 layout
    proposal-export export --preview preview.png --logo assets/img/masirat-logo.png

    # Letter paper, custom footer label, open the result
    proposal-export export --preview preview.png --logo logo.png --page letter --footer-label \"Acme Ltd\" --open

    # Show how a snapshot would be split across pages
    proposal-export plan --preview preview.png

    # Inspect an exported PDF
    proposal-export info Masirat-Technology-Proposal.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Page geometry flags shared by `export` and `plan`
#[derive(Args)]
struct GeometryArgs {
    /// Paper size: a4 or letter
    #[arg(long, default_value = "a4")]
    page: String,

    /// Left and right margin in millimetres
    #[arg(long, default_value_t = 8.0)]
    margin: f64,

    /// Header zone height in millimetres
    #[arg(long, default_value_t = 28.0)]
    header_height: f64,

    /// Footer zone height in millimetres
    #[arg(long, default_value_t = 15.0)]
    footer_height: f64,

    /// Gap between header zone and content in millimetres
    #[arg(long, default_value_t = 4.0)]
    content_gap: f64,
}

impl GeometryArgs {
    fn geometry(&self) -> anyhow::Result<PageGeometry> {
        let page = PageDimensions::from_name(&self.page)
            .ok_or_else(|| anyhow!("Unknown page size: {} (expected a4 or letter)", self.page))?;
        let geometry = PageGeometry {
            page,
            margin: Length::from_mm(self.margin),
            header_height: Length::from_mm(self.header_height),
            footer_height: Length::from_mm(self.footer_height),
            content_gap: Length::from_mm(self.content_gap),
        };
        geometry.validate()?;
        Ok(geometry)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a preview snapshot as a paginated PDF
    Export {
        /// Rendered preview image (PNG or JPEG)
        #[arg(long)]
        preview: PathBuf,

        /// Header logo image (PNG or JPEG)
        #[arg(long)]
        logo: PathBuf,

        /// Output PDF file path
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Bold header title line
        #[arg(long, default_value = "Masirat")]
        title: String,

        /// Second header title line (empty to omit)
        #[arg(long, default_value = "Technology")]
        subtitle: String,

        /// Label on the left of every footer
        #[arg(long, default_value = "Masirat Technology")]
        footer_label: String,

        /// Title stored in the PDF metadata
        #[arg(long)]
        doc_title: Option<String>,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show how a preview snapshot would be split into pages
    Plan {
        /// Rendered preview image (PNG or JPEG)
        #[arg(long)]
        preview: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,
    },

    /// Show information about an exported PDF
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export {
            preview, logo, output, geometry, title, subtitle, footer_label, doc_title, open,
        } => {
            cmd_export(
                preview, logo, output, geometry, title, subtitle, footer_label, doc_title, open,
            )
        }
        Commands::Plan { preview, geometry } => {
            cmd_plan(preview, geometry)
        }
        Commands::Info { input } => {
            cmd_info(input)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Open a file with the system default application
fn open_file(path: &PathBuf) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Export a preview snapshot to PDF
#[allow(clippy::too_many_arguments)]
fn cmd_export(
    preview: PathBuf,
    logo: PathBuf,
    output: PathBuf,
    geometry: GeometryArgs,
    title: String,
    subtitle: String,
    footer_label: String,
    doc_title: Option<String>,
    open: bool,
) -> anyhow::Result<()> {
    let options = ExportOptions {
        preview_path: preview,
        logo_path: logo,
        output_path: output,
        geometry: geometry.geometry()?,
        title,
        subtitle: Some(subtitle).filter(|s| !s.is_empty()),
        footer_label,
        document_title: doc_title,
    };

    eprintln!("Exporting {}...", options.preview_path.display());

    let outcome = export_to_file(&options)
        .with_context(|| format!("exporting {}", options.preview_path.display()))?;

    match outcome {
        ExportOutcome::Written { path, pages } => {
            eprintln!("Output: {} ({} pages)", path.display(), pages);
            if open {
                open_file(&path).with_context(|| format!("opening {}", path.display()))?;
            }
        }
        ExportOutcome::Skipped { reason } => {
            eprintln!("Skipped: {}", reason);
        }
    }

    Ok(())
}

/// Print the band plan for a preview snapshot
fn cmd_plan(preview: PathBuf, geometry: GeometryArgs) -> anyhow::Result<()> {
    let geometry = geometry.geometry()?;
    let image = SourceImage::open(&preview)?;
    let plan = paginate::plan(image.width(), image.height(), &geometry)?;

    println!("Source: {} ({}x{} px)", preview.display(), image.width(), image.height());
    println!("Scale: {:.4} mm/px", plan.scale);
    println!(
        "Content height: {:.2} mm on {:.2} mm pages",
        plan.total_height.mm(),
        plan.usable_height.mm()
    );
    println!("Pages: {}", plan.page_count());
    for band in &plan.bands {
        println!(
            "  Page {}: rows {}..{} ({} px) -> {:.2} mm",
            band.page,
            band.row_start,
            band.row_end,
            band.rows(),
            band.draw_height.mm()
        );
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(&input)
        .with_context(|| format!("reading {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }
    if let Some(created) = metadata.creation_date {
        println!("Created: {}", created);
    }

    Ok(())
}
