mod config;
mod script;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fieldscope_core::ComponentAssessor;
use fieldscope_gateway::{MockAssessor, MockWriter, OpenAiGateway};
use fieldscope_report::ReportDocument;
use fieldscope_store::ImageSource;
use fieldscope_workflow::Sequencer;

use config::Config;

#[derive(Parser)]
#[command(name = "fieldscope")]
#[command(about = "Fieldscope — component inspection reports from annotated photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: ingest, annotate, assess, and write a report
    Assess {
        /// Site address for the report
        #[arg(short, long)]
        address: String,
        /// Annotation script (JSON) replayed over the images
        #[arg(long)]
        annotations: Option<PathBuf>,
        /// Output directory for report.md, report.json and appendix figures
        #[arg(short, long, default_value = "report")]
        out: PathBuf,
        /// Use offline mock gateways instead of the remote service
        #[arg(long)]
        mock: bool,
        /// Image files, in report order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Assess a single image and print the result as JSON
    Grade {
        /// Use the offline mock gateway
        #[arg(long)]
        mock: bool,
        image: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess {
            address,
            annotations,
            out,
            mock,
            images,
        } => run_assess(&config, &address, annotations, &out, mock, &images).await,
        Commands::Grade { mock, image } => run_grade(&config, mock, &image).await,
    }
}

fn openai_gateway(config: &Config) -> Result<OpenAiGateway> {
    let Some(api_key) = &config.openai_api_key else {
        bail!("OPENAI_API_KEY is not set; pass --mock for an offline run");
    };
    let mut gateway = OpenAiGateway::new(api_key).with_model(&config.model);
    if let Some(url) = &config.base_url {
        gateway = gateway.with_base_url(url);
    }
    Ok(gateway)
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<ImageSource>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(ImageSource::new(name, bytes))
        })
        .collect()
}

async fn run_assess(
    config: &Config,
    address: &str,
    annotations: Option<PathBuf>,
    out: &Path,
    mock: bool,
    images: &[PathBuf],
) -> Result<()> {
    let mut seq = Sequencer::new();

    let outcome = seq.ingest(read_sources(images)?)?;
    for (name, error) in &outcome.rejected {
        warn!(file = %name, error = %error, "Skipping file");
    }
    if outcome.added == 0 {
        bail!("none of the supplied files could be decoded as images");
    }

    if let Some(path) = annotations {
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let scripts = script::parse(&json)?;
        if scripts.len() > seq.store().len() {
            warn!(
                entries = scripts.len(),
                images = seq.store().len(),
                "Annotation script has more entries than images"
            );
        }
        script::apply(&scripts, seq.store_mut())?;
    }

    if mock {
        let assessor = MockAssessor::new();
        let writer = MockWriter::new();
        seq.analyze(&assessor).await?;
        seq.generate_report(&writer, address).await?;
    } else {
        let gateway = openai_gateway(config)?;
        seq.analyze(&gateway).await?;
        seq.generate_report(&gateway, address).await?;
    }

    let report = seq
        .report()
        .context("report narrative missing after generation")?;
    let doc = ReportDocument::compile(
        address,
        chrono::Local::now().date_naive(),
        seq.store(),
        seq.results(),
        report,
    )?;

    write_report(&doc, out)?;
    info!(out = %out.display(), sections = doc.sections.len(), "Report written");
    println!("Report written to {}", out.display());
    Ok(())
}

fn write_report(doc: &ReportDocument, out: &Path) -> Result<()> {
    let appendix_dir = out.join("appendix");
    std::fs::create_dir_all(&appendix_dir)
        .with_context(|| format!("Failed to create {}", appendix_dir.display()))?;

    std::fs::write(out.join("report.md"), doc.to_markdown())?;
    std::fs::write(out.join("report.json"), doc.to_json()?)?;
    for figure in &doc.appendix {
        let path = appendix_dir.join(figure.file_name());
        figure
            .image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

async fn run_grade(config: &Config, mock: bool, path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let bitmap = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();

    let result = if mock {
        MockAssessor::new().assess(&bitmap, "").await?
    } else {
        openai_gateway(config)?.assess(&bitmap, "").await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
