/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! TCAS style proximity detection over the exact (non-interpolated) snapshot. Candidate pairs come from a
//! [`GeoGrid`] so that the cost is roughly linear in the number of airborne aircraft. The result is
//! required to be identical to [`brute_force_scan`]

use std::{cmp::Ordering, collections::HashSet, fmt, time::Instant};
use serde::Serialize;
use tracing::debug;
use odin_common::{geo::{haversine_distance, LatLon}, geo_constants::MEAN_EARTH_RADIUS_NM};

use crate::{geo_grid::GeoGrid, Snapshot, TrackedEntity};

pub const CELL_SIZE_DEG: f64 = 0.1;
pub const RA_DISTANCE_NM: f64 = 2.0;
pub const RA_VERTICAL_FT: i32 = 500;
pub const TA_DISTANCE_NM: f64 = 5.0;
pub const TA_VERTICAL_FT: i32 = 1000;
pub const PREFILTER_DEG: f64 = 0.12;

// the longitude pre-filter is wider than a cell, hence candidates can be two columns away
const ROW_REACH: i32 = 1;
const COL_REACH: i32 = 2;

/// ordered by decreasing severity
#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize)]
pub enum Severity {
    ResolutionAdvisory,
    TrafficAdvisory,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::ResolutionAdvisory => write!(f, "RA"),
            Severity::TrafficAdvisory => write!(f, "TA"),
        }
    }
}

/// a close pair of aircraft. `id_a < id_b`
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct ProximityAlert {
    pub id_a: String,
    pub id_b: String,
    pub horizontal_distance_nm: f64,
    pub vertical_separation_ft: i32,
    pub severity: Severity,
    pub pos_a: LatLon,
    pub pos_b: LatLon,
}

impl ProximityAlert {
    pub fn pair_key (&self)->(&str,&str) { (self.id_a.as_str(), self.id_b.as_str()) }
}

impl fmt::Display for ProximityAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}: {:.2}nm, {}ft", self.severity, self.id_a, self.id_b, self.horizontal_distance_nm, self.vertical_separation_ft)
    }
}

/// a validated detector input
#[derive(Debug,Clone,Copy)]
struct Candidate<'a> {
    id: &'a str,
    pos: LatLon,
    alt_ft: i32,
}

fn candidate (e: &TrackedEntity)->Option<Candidate<'_>> {
    if !e.is_airborne() || e.id.is_empty() { return None }
    let pos = e.position.filter( |p| p.is_valid())?;
    let alt_ft = e.altitude_ft?;
    Some( Candidate { id: e.id.as_str(), pos, alt_ft })
}

/// does this entity take part in proximity detection (airborne with valid position and altitude)
pub fn is_candidate (e: &TrackedEntity)->bool {
    candidate(e).is_some()
}

/// apply the pre-filters and thresholds to a candidate pair
fn evaluate_pair<'a,'b> (a: &'a Candidate<'b>, b: &'a Candidate<'b>)->Option<ProximityAlert> {
    let (a,b) = if a.id <= b.id { (a,b) } else { (b,a) };

    let v_sep = (a.alt_ft - b.alt_ft).abs();
    if v_sep > TA_VERTICAL_FT { return None }
    if (a.pos.lat - b.pos.lat).abs() > PREFILTER_DEG { return None }
    if (a.pos.lon - b.pos.lon).abs() > PREFILTER_DEG { return None }

    let dist = haversine_distance( &a.pos, &b.pos, MEAN_EARTH_RADIUS_NM);
    if dist > TA_DISTANCE_NM { return None }

    let severity = if dist < RA_DISTANCE_NM && v_sep < RA_VERTICAL_FT {
        Severity::ResolutionAdvisory
    } else {
        Severity::TrafficAdvisory
    };

    Some( ProximityAlert {
        id_a: a.id.to_string(),
        id_b: b.id.to_string(),
        horizontal_distance_nm: dist,
        vertical_separation_ft: v_sep,
        severity,
        pos_a: a.pos,
        pos_b: b.pos,
    })
}

fn canonical_key<'a> (a: &'a str, b: &'a str)->(&'a str,&'a str) {
    if a <= b { (a,b) } else { (b,a) }
}

/// RA before TA, then by increasing distance. Ids break ties so that the order is deterministic
pub fn sort_alerts (alerts: &mut [ProximityAlert]) {
    alerts.sort_by( |a,b| {
        a.severity.cmp( &b.severity)
            .then_with( || a.horizontal_distance_nm.partial_cmp( &b.horizontal_distance_nm).unwrap_or( Ordering::Equal))
            .then_with( || a.id_a.cmp( &b.id_a))
            .then_with( || a.id_b.cmp( &b.id_b))
    });
}

/// grid based detection over all candidates in `entities`
pub fn detect_proximity<'a> (entities: impl IntoIterator<Item=&'a TrackedEntity>)->Vec<ProximityAlert> {
    let candidates: Vec<Candidate> = entities.into_iter().filter_map( candidate).collect();

    let mut grid: GeoGrid<usize> = GeoGrid::new( CELL_SIZE_DEG);
    for (i,c) in candidates.iter().enumerate() {
        grid.insert( &c.pos, i);
    }

    let mut seen: HashSet<(&str,&str)> = HashSet::new();
    let mut alerts = Vec::new();

    for a in &candidates {
        for &j in grid.neighbors_within( &a.pos, ROW_REACH, COL_REACH) {
            let b = &candidates[j];
            if a.id == b.id { continue } // also covers self

            if seen.insert( canonical_key( a.id, b.id)) {
                if let Some(alert) = evaluate_pair( a, b) {
                    alerts.push( alert);
                }
            }
        }
    }

    sort_alerts( &mut alerts);
    alerts
}

/// exhaustive O(n²) reference with the same predicates and thresholds as [`detect_proximity`]
pub fn brute_force_scan<'a> (entities: impl IntoIterator<Item=&'a TrackedEntity>)->Vec<ProximityAlert> {
    let candidates: Vec<Candidate> = entities.into_iter().filter_map( candidate).collect();

    let mut seen: HashSet<(&str,&str)> = HashSet::new();
    let mut alerts = Vec::new();

    for (i,a) in candidates.iter().enumerate() {
        for b in &candidates[i+1..] {
            if a.id == b.id { continue }
            if seen.insert( canonical_key( a.id, b.id)) {
                if let Some(alert) = evaluate_pair( a, b) {
                    alerts.push( alert);
                }
            }
        }
    }

    sort_alerts( &mut alerts);
    alerts
}

/// the detector as a component. Stateless apart from diagnostics
#[derive(Debug,Clone,Default)]
pub struct ProximityDetector {}

impl ProximityDetector {
    pub fn new ()->Self { ProximityDetector {} }

    pub fn detect (&self, snapshot: &Snapshot)->Vec<ProximityAlert> {
        let t0 = Instant::now();
        let alerts = detect_proximity( snapshot.iter().map( |e| e.as_ref()));
        debug!("proximity detection over {} aircraft: {} alerts in {:?}", snapshot.len(), alerts.len(), t0.elapsed());
        alerts
    }
}
