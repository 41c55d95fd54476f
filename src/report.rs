use std::io::Write;

use clap::Args;
use csv::Writer;
use tracing::info;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::proximity::{Neighbor, StopIndex};
use crate::stats::Summary;

/// Query options shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Latitude of the query point, in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the query point, in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Return every stop within this many kilometers
    #[arg(short, long, default_value_t = 0.5, conflicts_with = "nearest")]
    pub radius_km: f64,

    /// Return the k nearest stops instead of a radius search
    #[arg(short, long)]
    pub nearest: Option<usize>,

    /// Output CSV (stop_id, stop_name, distance_km). If omitted, prints to stdout.
    #[arg(short, long)]
    pub out: Option<String>,
}

impl QueryArgs {
    pub fn point(&self) -> Result<Coordinate> {
        Coordinate::checked(self.lat, self.lon)
    }

    pub fn run(&self, index: &StopIndex) -> Result<Vec<Neighbor>> {
        let point = self.point()?;
        let found = match self.nearest {
            Some(k) => index.nearest(&point, k),
            None => index.within(&point, self.radius_km),
        };
        info!(%point, matched = found.len(), stops = index.len(), "query done");
        Ok(found)
    }
}

/// Writes `stop_id,stop_name,distance_km` rows, distance with 6 decimals.
pub fn write_neighbors<W: Write>(wtr: &mut Writer<W>, index: &StopIndex, found: &[Neighbor]) -> Result<()> {
    wtr.write_record(["stop_id", "stop_name", "distance_km"])?;
    for n in found {
        let stop = index.stop(n);
        let distance = format!("{:.6}", n.distance_km);
        wtr.write_record([
            stop.id.as_str(),
            stop.name.as_deref().unwrap_or(""),
            distance.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_summary(distances: &[f64]) {
    match Summary::from_distances(distances) {
        Some(s) => {
            println!("Count: {}", s.count);
            println!("Min distance (km): {:.3}", s.min);
            println!("Max distance (km): {:.3}", s.max);
            println!("Mean distance (km): {:.3}", s.mean);
            if let Some(median) = s.median {
                println!("Median distance (km): {:.3}", median);
            }
        }
        None => println!("No finite distances"),
    }
}

/// Sends the result to `--out` when given, otherwise to stdout with a summary.
pub fn emit(args: &QueryArgs, index: &StopIndex, found: &[Neighbor]) -> Result<()> {
    match &args.out {
        Some(out_path) => {
            let mut wtr = Writer::from_path(out_path).map_err(|source| Error::CreateOutput {
                path: out_path.clone(),
                source,
            })?;
            write_neighbors(&mut wtr, index, found)?;
            println!("Wrote {} stops to {}", found.len(), out_path);
        }
        None => {
            let mut wtr = Writer::from_writer(std::io::stdout());
            write_neighbors(&mut wtr, index, found)?;
            let distances: Vec<f64> = found.iter().map(|n| n.distance_km).collect();
            print_summary(&distances);
        }
    }
    Ok(())
}
