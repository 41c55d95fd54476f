use hashbrown::HashMap;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::stops::Stop;

/// A stop matched by a proximity query, by position in the index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub distance_km: f64,
}

/// Brute-force index over a fixed set of stops. Every query is a linear
/// scan computing one haversine distance per stop.
#[derive(Debug, Default)]
pub struct StopIndex {
    stops: Vec<Stop>,
    by_id: HashMap<String, usize>,
}

impl StopIndex {
    pub fn new(stops: Vec<Stop>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            if by_id.insert(stop.id.clone(), idx).is_some() {
                return Err(Error::DuplicateStop(stop.id.clone()));
            }
        }
        Ok(Self { stops, by_id })
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, neighbor: &Neighbor) -> &Stop {
        &self.stops[neighbor.index]
    }

    pub fn get(&self, id: &str) -> Option<&Stop> {
        self.by_id.get(id).map(|&idx| &self.stops[idx])
    }

    fn distances<'a>(&'a self, point: &'a Coordinate) -> impl Iterator<Item = Neighbor> + 'a {
        self.stops.iter().enumerate().map(move |(index, stop)| Neighbor {
            index,
            distance_km: point.distance_km(&stop.coordinate),
        })
    }

    fn sort(&self, neighbors: &mut [Neighbor]) {
        neighbors.sort_by(|a, b| {
            OrderedFloat(a.distance_km)
                .cmp(&OrderedFloat(b.distance_km))
                .then_with(|| self.stops[a.index].id.cmp(&self.stops[b.index].id))
        });
    }

    /// All stops at most `radius_km` away, closest first. The bound is
    /// inclusive; NaN distances never match.
    pub fn within(&self, point: &Coordinate, radius_km: f64) -> Vec<Neighbor> {
        // `<=` is false for a NaN radius or NaN distance.
        let mut found: Vec<Neighbor> = self
            .distances(point)
            .filter(|n| n.distance_km <= radius_km)
            .collect();
        self.sort(&mut found);
        found
    }

    /// The `k` closest stops, closest first.
    pub fn nearest(&self, point: &Coordinate, k: usize) -> Vec<Neighbor> {
        if k == 0 {
            return Vec::new();
        }
        // Max-queue on (distance, id) holding the best k seen so far, so a
        // tie at the k-th place goes to the smaller id as in `sort`.
        let mut pq: PriorityQueue<usize, (OrderedFloat<f64>, &str)> = PriorityQueue::with_capacity(k + 1);
        for n in self.distances(point).filter(|n| !n.distance_km.is_nan()) {
            let key = (OrderedFloat(n.distance_km), self.stops[n.index].id.as_str());
            if pq.len() < k {
                pq.push(n.index, key);
            } else if let Some((_, &worst)) = pq.peek() {
                if key < worst {
                    pq.pop();
                    pq.push(n.index, key);
                }
            }
        }
        let mut found: Vec<Neighbor> = pq
            .into_iter()
            .map(|(index, (d, _))| Neighbor {
                index,
                distance_km: d.into_inner(),
            })
            .collect();
        self.sort(&mut found);
        found
    }

    pub fn nearest_one(&self, point: &Coordinate) -> Option<Neighbor> {
        self.nearest(point, 1).into_iter().next()
    }
}
