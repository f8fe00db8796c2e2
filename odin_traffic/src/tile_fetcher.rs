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

//! viewport tiling and the concurrent fan-out/fan-in acquisition of one deduplicated aircraft set per cycle

use std::{collections::HashMap, fmt, sync::Arc};
use futures::future::{join_all, BoxFuture, FutureExt};
use serde::{Serialize,Deserialize};
use tracing::{info, warn};
use odin_common::geo::{normalize_180, LatLon};

use crate::{errors::{OdinTrafficError, Result}, query::{AircraftQuery, MAX_QUERY_RADIUS_NM}, TrackedEntity};

pub const MAX_GRID_LAT: f64 = 85.0;
pub const MIN_ASPECT: f64 = 0.5;
pub const MAX_ASPECT: f64 = 3.0;

/// zoom levels below this get the global special category queries
pub const SPECIAL_CATEGORY_MAX_ZOOM: f64 = 5.0;

/// the visible map area. The east edge can be west of the west edge if the viewport wraps at the antimeridian
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Viewport {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl Viewport {
    pub fn new (south_west: LatLon, north_east: LatLon)->Self {
        Viewport { south_west, north_east }
    }

    /// from a (west,south,east,north) bounding box
    pub fn from_bbox (west: f64, south: f64, east: f64, north: f64)->Self {
        Viewport { south_west: LatLon::new( south, west), north_east: LatLon::new( north, east) }
    }

    fn south (&self)->f64 { self.south_west.lat.clamp( -MAX_GRID_LAT, MAX_GRID_LAT) }
    fn north (&self)->f64 { self.north_east.lat.clamp( -MAX_GRID_LAT, MAX_GRID_LAT) }
    fn west (&self)->f64 { self.south_west.lon }

    /// east edge, unwrapped so that it is not smaller than the west edge
    fn east (&self)->f64 {
        let e = self.north_east.lon;
        if e < self.west() { e + 360.0 } else { e }
    }

    pub fn lat_span (&self)->f64 { self.north() - self.south() }
    pub fn lon_span (&self)->f64 { self.east() - self.west() }

    pub fn center (&self)->LatLon {
        LatLon::new( (self.south() + self.north()) / 2.0, normalize_180( (self.west() + self.east()) / 2.0))
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.south_west, self.north_east)
    }
}

/// the step function that maps zoom levels to the number of point queries
pub fn max_points_for_zoom (zoom: f64)->usize {
    if zoom < 3.0 { 16 }
    else if zoom < 5.0 { 9 }
    else if zoom < 7.0 { 4 }
    else { 1 }
}

pub fn includes_special_categories (zoom: f64)->bool {
    zoom < SPECIAL_CATEGORY_MAX_ZOOM
}

/// a row-major (south to north, west to east) grid of cell center points covering the viewport. The
/// cols/rows ratio follows the viewport aspect ratio so that cells stay roughly square
pub fn grid_points (viewport: &Viewport, max_points: usize)->Vec<LatLon> {
    let lat_span = viewport.lat_span();
    let lon_span = viewport.lon_span();

    if max_points <= 1 || !(lat_span > 0.0) || !(lon_span > 0.0) {
        return vec![ viewport.center() ]
    }

    let aspect = (lon_span / lat_span).clamp( MIN_ASPECT, MAX_ASPECT);
    let cols = ((max_points as f64 * aspect).sqrt().round() as usize).max(1);
    let rows = ((max_points as f64 / cols as f64).round() as usize).max(1);

    let d_lat = lat_span / rows as f64;
    let d_lon = lon_span / cols as f64;
    let mut points = Vec::with_capacity( rows * cols);

    for r in 0..rows {
        let lat = viewport.south() + (r as f64 + 0.5) * d_lat;
        for c in 0..cols {
            let mut lon = viewport.west() + (c as f64 + 0.5) * d_lon;
            if lon > 180.0 { lon -= 360.0 }
            points.push( LatLon::new( lat, lon));
        }
    }
    points
}

pub fn query_points (viewport: &Viewport, zoom: f64)->Vec<LatLon> {
    let max_points = max_points_for_zoom( zoom);
    if max_points <= 1 { vec![ viewport.center() ] } else { grid_points( viewport, max_points) }
}

/// the deduplicated outcome of one acquisition cycle
#[derive(Debug,Clone,Default)]
pub struct FetchResult {
    pub aircraft: HashMap<String,TrackedEntity>,
    pub n_queries: usize,
    pub n_failed: usize,
}

impl FetchResult {
    pub fn len (&self)->usize { self.aircraft.len() }
    pub fn is_empty (&self)->bool { self.aircraft.is_empty() }

    /// add entities that have lower priority than what we already have, i.e. only ids we don't know yet
    pub fn merge_secondary<'a> (&mut self, entities: impl IntoIterator<Item=&'a TrackedEntity>) {
        merge_secondary( &mut self.aircraft, entities)
    }

    pub fn into_entities (self)->impl Iterator<Item=TrackedEntity> {
        self.aircraft.into_values()
    }
}

/// merge `entities` into `map`, replacing entries with the same id
pub fn merge_last_wins (map: &mut HashMap<String,TrackedEntity>, entities: impl IntoIterator<Item=TrackedEntity>) {
    for e in entities {
        if !e.id.is_empty() {
            map.insert( e.id.clone(), e);
        }
    }
}

/// merge `entities` into `map` without replacing existing entries
pub fn merge_secondary<'a> (map: &mut HashMap<String,TrackedEntity>, entities: impl IntoIterator<Item=&'a TrackedEntity>) {
    for e in entities {
        if !e.id.is_empty() && !map.contains_key( &e.id) {
            map.insert( e.id.clone(), e.clone());
        }
    }
}

type SubQuery<'a> = BoxFuture<'a, (String, Result<Vec<TrackedEntity>>)>;

/// computes the query set for a viewport and runs it concurrently against an [`AircraftQuery`]
pub struct TileFetcher {
    query: Arc<dyn AircraftQuery>,
    radius_nm: f64,
    special_categories: Vec<String>,
}

impl TileFetcher {
    pub fn new (query: Arc<dyn AircraftQuery>, radius_nm: f64, special_categories: Vec<String>)->Self {
        let radius_nm = radius_nm.min( MAX_QUERY_RADIUS_NM);
        TileFetcher { query, radius_nm, special_categories }
    }

    pub fn radius_nm (&self)->f64 { self.radius_nm }

    /// run all sub-queries for the given viewport and zoom and merge their results in issue order. Failing
    /// sub-queries only reduce coverage, the whole fetch fails only if no sub-query succeeded
    pub async fn fetch (&self, viewport: &Viewport, zoom: f64)->Result<FetchResult> {
        let points = query_points( viewport, zoom);
        let n_points = points.len();

        let mut queries: Vec<SubQuery<'_>> = points.iter().map( |p| {
            let (lat,lon) = (p.lat, p.lon);
            async move {
                (format!("point {lat:.2},{lon:.2}"), self.query.query_by_point( lat, lon, self.radius_nm).await)
            }.boxed()
        }).collect();

        if includes_special_categories( zoom) {
            for cat in &self.special_categories {
                queries.push( async move {
                    (format!("category {cat}"), self.query.query_by_category( cat).await)
                }.boxed());
            }
        }

        let n_queries = queries.len();
        let mut result = FetchResult { n_queries, ..Default::default() };

        for (label,res) in join_all( queries).await {
            match res {
                Ok(entities) => merge_last_wins( &mut result.aircraft, entities),
                Err(e) => {
                    warn!("{label} query failed: {e}");
                    result.n_failed += 1;
                }
            }
        }

        if n_queries > 0 && result.n_failed == n_queries {
            return Err( OdinTrafficError::AcquisitionFailed( format!("all {n_queries} queries failed")))
        }

        info!("{} grid points, {} unique aircraft (zoom {:.1})", n_points, result.aircraft.len(), zoom);
        Ok(result)
    }
}
