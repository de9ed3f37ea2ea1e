use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ifcduck_convert::{Converter, IfcDocument, PatchOptions, Patcher};
use ifcduck_engine::config::EngineConfig;
use ifcduck_engine::engine::Engine;
use ifcduck_engine::parse_host_port;
use ifcduck_executor::Executor;
use std::path::{Path, PathBuf};
use tracing::error;

mod logging;

#[derive(Debug, Parser)]
#[command(
    name = "ifcduck",
    version,
    about = "Convert IFC models to DuckDB and browse them from a web page",
    disable_help_subcommand = true
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the web viewer
    Serve(ServeArgs),
    /// Convert an IFC file to a DuckDB database
    Convert(ConvertArgs),
    /// Run the demonstration queries against an existing database
    Demo {
        /// DuckDB database file
        database: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(
        long,
        value_name = "HOST:PORT",
        env = "IFCDUCK_LISTEN",
        default_value = "127.0.0.1:8000",
        value_parser = parse_listen
    )]
    listen: (String, u16),

    /// Directory holding `uploads/` and `static/`
    #[arg(long, value_name = "DIR", env = "IFCDUCK_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Do not download the DuckDB-WASM files for /client at startup
    #[arg(long)]
    no_assets: bool,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// IFC file to convert
    ifc: PathBuf,

    /// Where to write the database
    #[arg(short, long, default_value = "example_output.duckdb")]
    output: PathBuf,

    /// Python interpreter with `ifc2duckdb` and `ifcopenshell` installed
    #[arg(long, default_value = "python3")]
    python: PathBuf,

    /// Only create tables for entities present in the file
    #[arg(long)]
    no_full_schema: bool,

    /// Skip geometry extraction
    #[arg(long)]
    no_geometry: bool,

    /// Skip property sets
    #[arg(long)]
    no_psets: bool,

    /// Skip inverse relationships
    #[arg(long)]
    no_inverses: bool,

    /// Do not run the demonstration queries afterwards
    #[arg(long)]
    skip_demo: bool,
}

impl ConvertArgs {
    fn options(&self) -> PatchOptions {
        PatchOptions {
            full_schema: !self.no_full_schema,
            geometry: !self.no_geometry,
            psets: !self.no_psets,
            inverses: !self.no_inverses,
        }
    }
}

fn parse_listen(s: &str) -> Result<(String, u16), String> {
    parse_host_port(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Convert(args) => {
            convert(&args);
            Ok(())
        }
        Command::Demo { database } => demo(&database),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let (host, port) = args.listen;
    let config = EngineConfig::default()
        .set_listen(host, port)
        .set_data_dir(&args.data_dir)
        .set_provision_assets(!args.no_assets);

    let engine = Engine::new_with_config(config)
        .with_context(|| format!("failed to prepare data dir {}", args.data_dir.display()))?;
    engine.run().await.context("server stopped")
}

/// Conversion failures are reported but do not fail the process.
fn convert(args: &ConvertArgs) {
    if !args.ifc.exists() {
        println!("Error: IFC file not found at {}", args.ifc.display());
        println!("Please ensure the IFC file is available.");
        return;
    }
    println!("Converting IFC file: {}", args.ifc.display());
    println!("Output database: {}", args.output.display());

    let output = match run_conversion(args) {
        Ok(output) => output,
        Err(e) => {
            error!("conversion failed: {e:#}");
            println!("Error during conversion: {e:#}");
            return;
        }
    };
    let Some(output) = output else {
        println!("Error: Conversion failed - no output file generated.");
        return;
    };
    println!("Conversion completed successfully!");
    println!("Database created at: {}", output.display());

    if !args.skip_demo {
        if let Err(e) = demo(&output) {
            error!("demonstration failed: {e:#}");
            println!("Error during query demonstration: {e:#}");
        }
    }
}

fn run_conversion(args: &ConvertArgs) -> anyhow::Result<Option<PathBuf>> {
    let document = IfcDocument::open(&args.ifc)?;
    println!("IFC file loaded successfully. Schema: {}", document.schema());

    let mut patcher = Patcher::new(&document, &args.output, args.options()).set_python(&args.python);
    println!("Converting to DuckDB...");
    patcher.patch()?;
    Ok(patcher.output().map(Path::to_path_buf))
}

fn demo(database: &Path) -> anyhow::Result<()> {
    let steps = Executor::new(database)
        .demonstrate()
        .with_context(|| format!("cannot open {}", database.display()))?;

    println!();
    println!("{}", "=".repeat(50));
    println!("DEMONSTRATING BASIC QUERIES");
    println!("{}", "=".repeat(50));
    for step in &steps {
        println!();
        print!("{step}");
    }
    println!();
    println!("Queries completed. Database is ready for analysis!");
    println!("You can open it with: duckdb {}", database.display());
    Ok(())
}
