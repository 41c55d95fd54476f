use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use fnv::FnvHashMap;
use osmpbfreader::{OsmObj, OsmPbfReader, Tags};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: String,
    pub name: Option<String>,
    pub coordinate: Coordinate,
}

impl Stop {
    pub fn new(id: impl Into<String>, name: Option<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name,
            coordinate,
        }
    }
}

/// Column positions resolved from a `stops.txt` header row.
struct Columns {
    id: usize,
    name: Option<usize>,
    lat: usize,
    lon: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Ok(Self {
            id: find("stop_id").ok_or(Error::MissingColumn("stop_id"))?,
            name: find("stop_name"),
            lat: find("stop_lat").ok_or(Error::MissingColumn("stop_lat"))?,
            lon: find("stop_lon").ok_or(Error::MissingColumn("stop_lon"))?,
        })
    }
}

fn parse_degrees(record: &StringRecord, idx: usize, field: &'static str, line: usize) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| Error::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}

/// Reads a GTFS-style `stops.txt`. Columns are located by header name, so
/// their order does not matter; `stop_name` is optional.
pub fn read_stops_csv<R: Read>(reader: R) -> Result<Vec<Stop>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?)?;

    let mut stops = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 1;
        let id = record.get(columns.id).unwrap_or("").trim();
        if id.is_empty() {
            return Err(Error::InvalidField {
                line,
                field: "stop_id",
                value: id.to_string(),
            });
        }
        let lat = parse_degrees(&record, columns.lat, "stop_lat", line)?;
        let lon = parse_degrees(&record, columns.lon, "stop_lon", line)?;
        let name = columns
            .name
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        stops.push(Stop::new(id, name, Coordinate::checked(lat, lon)?));
    }

    debug!(count = stops.len(), "read stops from csv");
    Ok(stops)
}

pub fn read_stops_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<Stop>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening stops csv");
    read_stops_csv(File::open(path)?)
}

/// Which OSM nodes count as stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopFilter {
    /// Any public transport stop, platform or station.
    #[default]
    AnyTransit,
    /// Only `highway=bus_stop` and bus platforms.
    BusOnly,
}

fn tag_is(tags: &Tags, key: &str, values: &[&str]) -> bool {
    tags.get(key)
        .map(|v| values.contains(&v.as_str()))
        .unwrap_or(false)
}

pub fn is_transit_stop(tags: &Tags, filter: StopFilter) -> bool {
    if tag_is(tags, "highway", &["bus_stop"]) {
        return true;
    }
    match filter {
        StopFilter::BusOnly => {
            tag_is(tags, "public_transport", &["platform"]) && tag_is(tags, "bus", &["yes"])
        }
        StopFilter::AnyTransit => {
            tag_is(tags, "public_transport", &["platform", "stop_position", "station"])
                || tag_is(tags, "railway", &["tram_stop", "station", "halt"])
                || tag_is(tags, "amenity", &["bus_station"])
        }
    }
}

/// Reads transit stop nodes out of an `.osm.pbf` extract. The stop id is the
/// OSM node id and the name comes from the `name` tag.
pub fn read_stops_osm<P: AsRef<Path>>(path: P, filter: StopFilter) -> Result<Vec<Stop>> {
    let path = path.as_ref();
    let mut pbf = OsmPbfReader::new(File::open(path)?);
    let stops = collect_osm_stops(pbf.iter(), filter)?;
    debug!(path = %path.display(), count = stops.len(), "read stops from pbf");
    Ok(stops)
}

/// Node pass behind [`read_stops_osm`]. Stops come back ordered by numeric
/// node id.
pub fn collect_osm_stops<I>(objs: I, filter: StopFilter) -> Result<Vec<Stop>>
where
    I: IntoIterator<Item = std::result::Result<OsmObj, osmpbfreader::Error>>,
{
    // A node can show up more than once across blocks; keep the last copy.
    let mut by_id: FnvHashMap<i64, Stop> = FnvHashMap::default();
    let mut skipped = 0usize;
    for obj in objs {
        let obj = obj?;
        if let OsmObj::Node(n) = obj {
            if !is_transit_stop(&n.tags, filter) {
                continue;
            }
            match Coordinate::checked(n.lat(), n.lon()) {
                Ok(coordinate) => {
                    let name = n.tags.get("name").map(|v| v.to_string());
                    by_id.insert(n.id.0, Stop::new(n.id.0.to_string(), name, coordinate));
                }
                Err(err) => {
                    warn!(node = n.id.0, %err, "skipping stop node");
                    skipped += 1;
                }
            }
        }
    }

    let mut entries: Vec<(i64, Stop)> = by_id.into_iter().collect();
    entries.sort_by_key(|(id, _)| *id);
    debug!(count = entries.len(), skipped, "collected stop nodes");
    Ok(entries.into_iter().map(|(_, stop)| stop).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use osmpbfreader::{Node, NodeId};

    #[test]
    fn reads_columns_in_any_order() {
        let data = "stop_lon,stop_name,stop_id,stop_lat\n\
                    174.7633,Britomart,100,-36.8485\n\
                    174.7762,,200,-41.2865\n";
        let stops = read_stops_csv(data.as_bytes()).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].id, "100");
        assert_eq!(stops[0].name.as_deref(), Some("Britomart"));
        assert_eq!(stops[0].coordinate, Coordinate::new(-36.8485, 174.7633));
        assert_eq!(stops[1].name, None);
    }

    #[test]
    fn name_column_is_optional() {
        let data = "stop_id,stop_lat,stop_lon\nA,1.5,2.5\n";
        let stops = read_stops_csv(data.as_bytes()).unwrap();
        assert_eq!(stops, vec![Stop::new("A", None, Coordinate::new(1.5, 2.5))]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = "stop_id,stop_lat\nA,1.0\n";
        match read_stops_csv(data.as_bytes()) {
            Err(Error::MissingColumn(col)) => assert_eq!(col, "stop_lon"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_number_reports_line() {
        let data = "stop_id,stop_lat,stop_lon\nA,1.0,2.0\nB,north,2.0\n";
        match read_stops_csv(data.as_bytes()) {
            Err(Error::InvalidField { line, field, value }) => {
                assert_eq!(line, 2);
                assert_eq!(field, "stop_lat");
                assert_eq!(value, "north");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let data = "stop_id,stop_lat,stop_lon\nA,91.0,2.0\n";
        assert!(matches!(
            read_stops_csv(data.as_bytes()),
            Err(Error::InvalidCoordinate { .. })
        ));
    }

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        let mut tags = Tags::new();
        for &(k, v) in pairs {
            tags.insert(k.into(), v.into());
        }
        tags
    }

    fn node(id: i64, lat: f64, lon: f64, pairs: &[(&str, &str)]) -> std::result::Result<OsmObj, osmpbfreader::Error> {
        Ok(OsmObj::Node(Node {
            id: NodeId(id),
            tags: tags(pairs),
            decimicro_lat: (lat * 1e7).round() as i32,
            decimicro_lon: (lon * 1e7).round() as i32,
        }))
    }

    #[test]
    fn collects_stop_nodes() {
        let objs = vec![
            node(10, -36.8, 174.7, &[("highway", "bus_stop"), ("name", "Old Name")]),
            node(9, -36.9, 174.8, &[("railway", "tram_stop")]),
            node(11, -36.7, 174.6, &[("shop", "bakery")]),
            node(12, 95.0, 174.6, &[("highway", "bus_stop")]),
            node(10, -36.85, 174.75, &[("highway", "bus_stop"), ("name", "Britomart")]),
        ];
        let stops = collect_osm_stops(objs, StopFilter::AnyTransit).unwrap();

        let ids: Vec<&str> = stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10"]);
        assert_eq!(stops[0].name, None);
        assert_eq!(stops[1].name.as_deref(), Some("Britomart"));
        assert!((stops[1].coordinate.lat - -36.85).abs() < 1e-6);
        assert!((stops[1].coordinate.lon - 174.75).abs() < 1e-6);
    }

    #[test]
    fn collect_respects_bus_filter() {
        let objs = vec![
            node(1, 0.0, 0.0, &[("railway", "tram_stop")]),
            node(2, 0.0, 0.0, &[("highway", "bus_stop")]),
        ];
        let stops = collect_osm_stops(objs, StopFilter::BusOnly).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].id, "2");
    }

    #[test]
    fn transit_tags() {
        let bus = tags(&[("highway", "bus_stop")]);
        let tram = tags(&[("railway", "tram_stop")]);
        let bus_platform = tags(&[("public_transport", "platform"), ("bus", "yes")]);
        let shop = tags(&[("shop", "bakery")]);

        assert!(is_transit_stop(&bus, StopFilter::AnyTransit));
        assert!(is_transit_stop(&bus, StopFilter::BusOnly));
        assert!(is_transit_stop(&tram, StopFilter::AnyTransit));
        assert!(!is_transit_stop(&tram, StopFilter::BusOnly));
        assert!(is_transit_stop(&bus_platform, StopFilter::BusOnly));
        assert!(!is_transit_stop(&shop, StopFilter::AnyTransit));
    }

    #[test]
    fn empty_id_is_rejected() {
        let data = "stop_id,stop_lat,stop_lon\n,1.0,2.0\n";
        assert!(matches!(
            read_stops_csv(data.as_bytes()),
            Err(Error::InvalidField { field: "stop_id", .. })
        ));
    }
}
