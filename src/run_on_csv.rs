use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stopdist::report::{self, QueryArgs};
use stopdist::{pairs, stops, StopIndex};

#[derive(Parser, Debug)]
#[command(name = "csv")]
#[command(about = "Query a GTFS stops.txt for stops near a point, or compute distances for lat1,lon1,lat2,lon2 rows.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stops from a stops.txt near a point
    Stops {
        /// Path to a GTFS-style stops.txt (stop_id, stop_name, stop_lat, stop_lon)
        #[arg(short, long)]
        stops: String,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Print the distance for every row of a headed lat1,lon1,lat2,lon2 CSV
    Pairs {
        /// Path to the .csv file
        #[arg(short, long)]
        csv: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    stopdist::logging::init(cli.verbose);

    match &cli.command {
        Command::Pairs { csv } => {
            let distances = pairs::read_pair_distances_path(csv).with_context(|| format!("reading {}", csv))?;
            for d in &distances {
                println!("{:.6}", d);
            }
            report::print_summary(&distances);
        }
        Command::Stops { stops: path, query } => {
            let stops = stops::read_stops_csv_path(path).with_context(|| format!("reading {}", path))?;
            println!("Loaded {} stops from {}", stops.len(), path);

            let index = StopIndex::new(stops)?;
            let found = query.run(&index).context("running query")?;
            report::emit(query, &index, &found).context("writing results")?;
        }
    }

    Ok(())
}
