use anyhow::{Context, Result};
use clap::Parser;
use stopdist::report::{self, QueryArgs};
use stopdist::stops::{self, StopFilter};
use stopdist::StopIndex;

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Load transit stops from an OSM .pbf and list those near a point.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: String,

    #[command(flatten)]
    query: QueryArgs,

    /// Only keep bus stops and bus platforms
    #[arg(long, default_value_t = false)]
    bus_only: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    stopdist::logging::init(cli.verbose);

    let filter = if cli.bus_only {
        StopFilter::BusOnly
    } else {
        StopFilter::AnyTransit
    };
    let stops = stops::read_stops_osm(&cli.pbf, filter).with_context(|| format!("reading {}", &cli.pbf))?;
    println!("Loaded {} stops from {}", stops.len(), &cli.pbf);

    let index = StopIndex::new(stops)?;
    let found = cli.query.run(&index).context("running query")?;
    report::emit(&cli.query, &index, &found).context("writing results")?;

    Ok(())
}
