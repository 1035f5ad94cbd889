use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use diagramkit::designer::default_shape_validators;
use diagramkit::{init_logging, validate_document, Config, DiagramDocument, DiagramSession};

#[derive(Parser, Debug)]
#[command(name = "diagramkit")]
#[command(version)]
#[command(about = "Validate a diagram document and report its geometry", long_about = None)]
struct Cli {
    /// Diagram document (JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Editor configuration (TOML or JSON); defaults are used when absent
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print start, end and arrow angles for each connector
    #[arg(short, long)]
    geometry: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let json = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let document = DiagramDocument::from_json(&json)
        .with_context(|| format!("parsing {}", cli.input.display()))?;

    let report = validate_document(&document, Some(&default_shape_validators()));
    if !report.is_valid() {
        for message in report.messages() {
            println!("invalid: {message}");
        }
        return Ok(ExitCode::FAILURE);
    }

    let mut session = DiagramSession::with_config(config);
    session
        .import_document(document)
        .context("importing document")?;

    let store = session.store();
    println!(
        "{:?} diagram: {} shapes, {} connectors",
        session.diagram_type(),
        store.shapes().count(),
        store.connectors().count()
    );
    match session.diagram_bounds() {
        Some(b) => println!(
            "bounds: x={:.1} y={:.1} width={:.1} height={:.1}",
            b.x, b.y, b.width, b.height
        ),
        None => println!("bounds: empty"),
    }

    if cli.geometry {
        for connector in store.connectors() {
            let id = connector.id();
            match session.connector_geometry(id) {
                Some(g) => println!(
                    "{id}: ({:.1}, {:.1}) -> ({:.1}, {:.1}) start {:.3} rad, end {:.3} rad",
                    g.start.x, g.start.y, g.end.x, g.end.y, g.start_angle, g.end_angle
                ),
                None => println!("{id}: unresolved endpoints"),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
