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

//! live air traffic state pipeline: tiled acquisition from an ADS-B aggregator, two-generation snapshot
//! store, dead-reckoning interpolation and grid based proximity (TCAS style) detection

use std::{collections::HashMap, fmt, sync::Arc};
use serde::Serialize;
use uom::si::{f64::Velocity, velocity::{foot_per_minute, knot, meter_per_second}};
use odin_common::{datetime::EpochMillis, geo::LatLon};

pub mod errors;
pub mod config;
pub mod icao_ranges;
pub mod raw_state;
pub mod geo_grid;
pub mod query;
pub mod tile_fetcher;
pub mod vip;
pub mod state_store;
pub mod interpolate;
pub mod proximity;
pub mod trails;
pub mod orchestrator;

pub use config::{TrafficConfig, load_config};
pub use errors::{OdinTrafficError, Result};

/// the bitset we get from the upstream `dbFlags` field
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default,Serialize)]
pub struct EntityFlags(u32);

impl EntityFlags {
    pub const MILITARY: u32 = 1;
    pub const INTERESTING: u32 = 2;
    pub const PIA: u32 = 4; // privacy ICAO address
    pub const LADD: u32 = 8; // limiting aircraft data displayed

    pub fn new (bits: u32)->Self { EntityFlags(bits) }
    pub fn bits (&self)->u32 { self.0 }
    pub fn contains (&self, flag: u32)->bool { self.0 & flag != 0 }

    pub fn is_military (&self)->bool { self.contains( Self::MILITARY) }
}

/// coarse altitude classification used for display filtering
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize)]
pub enum AltitudeBand { Low, Mid, High }

impl AltitudeBand {
    pub fn from_altitude_ft (alt_ft: Option<i32>)->Self {
        match alt_ft {
            Some(alt) if alt > 25_000 => AltitudeBand::High,
            Some(alt) if alt > 10_000 => AltitudeBand::Mid,
            _ => AltitudeBand::Low // includes on-ground and unknown
        }
    }
}

/// the decoded state of one aircraft at the time of the acquisition cycle that produced it
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct TrackedEntity {
    pub id: String, // hex transponder (ICAO 24bit) address, unique within a snapshot
    pub position: Option<LatLon>,
    pub altitude_ft: Option<i32>, // None means on ground or unknown
    pub on_ground: bool,
    pub ground_speed: Option<Velocity>,
    pub vertical_rate: Option<Velocity>,
    pub heading_deg: f64,

    #[serde(skip_serializing_if="odin_common::is_none")]
    pub callsign: Option<String>,
    #[serde(skip_serializing_if="odin_common::is_none")]
    pub registration: Option<String>,
    #[serde(skip_serializing_if="odin_common::is_none")]
    pub type_designator: Option<String>,
    #[serde(skip_serializing_if="odin_common::is_none")]
    pub squawk: Option<String>,
    #[serde(skip_serializing_if="odin_common::is_none")]
    pub category: Option<String>,
    pub origin_country: String,
    pub flags: EntityFlags,
}

impl TrackedEntity {
    /// a minimal record, mostly useful to build test and simulation data
    pub fn new (id: impl ToString, position: LatLon, altitude_ft: Option<i32>)->Self {
        TrackedEntity {
            id: id.to_string(),
            position: Some(position),
            altitude_ft,
            on_ground: false,
            ground_speed: None,
            vertical_rate: None,
            heading_deg: 0.0,
            callsign: None,
            registration: None,
            type_designator: None,
            squawk: None,
            category: None,
            origin_country: String::new(),
            flags: EntityFlags::default(),
        }
    }

    pub fn with_velocity (mut self, ground_speed_kts: f64, heading_deg: f64)->Self {
        self.ground_speed = Some( Velocity::new::<knot>( ground_speed_kts));
        self.heading_deg = heading_deg;
        self
    }

    pub fn ground_speed_kts (&self)->Option<f64> { self.ground_speed.map( |v| v.get::<knot>()) }

    /// ground speed in m/s, zero if unknown
    pub fn ground_speed_ms (&self)->f64 { self.ground_speed.map( |v| v.get::<meter_per_second>()).unwrap_or(0.0) }

    pub fn vertical_rate_fpm (&self)->Option<f64> { self.vertical_rate.map( |v| v.get::<foot_per_minute>()) }

    pub fn is_airborne (&self)->bool { !self.on_ground }
    pub fn is_military (&self)->bool { self.flags.is_military() }

    pub fn altitude_band (&self)->AltitudeBand { AltitudeBand::from_altitude_ft( self.altitude_ft) }

    /// callsign if we have one, id otherwise
    pub fn label (&self)->&str { self.callsign.as_deref().unwrap_or( self.id.as_str()) }
}

impl fmt::Display for TrackedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "TrackedEntity( id: {}", self.id)?;
        if let Some(cs) = &self.callsign { write!( f, ", cs: \"{cs}\"")?; }
        if let Some(p) = &self.position { write!( f, ", pos: {p}")?; }
        if let Some(alt) = self.altitude_ft { write!( f, ", alt: {alt}")?; }
        if self.on_ground { write!( f, ", on_ground")?; }
        if let Some(spd) = self.ground_speed_kts() { write!( f, ", spd: {spd:.0}")?; }
        write!( f, ", hdg: {:.0}", self.heading_deg)?;
        if let Some(vr) = self.vertical_rate_fpm() { write!( f, ", vr: {vr:.0}")?; }
        if self.is_military() { write!( f, ", mil")?; }
        write!( f, ")")
    }
}

/// the complete, deduplicated aircraft state of one acquisition cycle
#[derive(Debug,Clone,Default)]
pub struct Snapshot {
    timestamp: EpochMillis,
    entities: HashMap<String,Arc<TrackedEntity>>,
}

impl Snapshot {
    pub fn new (timestamp: EpochMillis)->Self {
        Snapshot { timestamp, entities: HashMap::new() }
    }

    /// build from a sequence of entities - later entries replace earlier ones with the same id
    pub fn from_entities (entities: impl IntoIterator<Item=TrackedEntity>, timestamp: EpochMillis)->Self {
        let mut snapshot = Snapshot::new( timestamp);
        for e in entities {
            snapshot.insert( e);
        }
        snapshot
    }

    pub fn from_map (map: HashMap<String,TrackedEntity>, timestamp: EpochMillis)->Self {
        let entities = map.into_iter().map( |(id,e)| (id, Arc::new(e))).collect();
        Snapshot { timestamp, entities }
    }

    pub fn timestamp (&self)->EpochMillis { self.timestamp }

    /// last writer wins. Entities with empty ids are ignored
    pub fn insert (&mut self, e: TrackedEntity) {
        if !e.id.is_empty() {
            self.entities.insert( e.id.clone(), Arc::new(e));
        }
    }

    pub fn get (&self, id: &str)->Option<&Arc<TrackedEntity>> { self.entities.get( id) }
    pub fn contains (&self, id: &str)->bool { self.entities.contains_key( id) }

    pub fn len (&self)->usize { self.entities.len() }
    pub fn is_empty (&self)->bool { self.entities.is_empty() }

    pub fn iter (&self)->impl Iterator<Item=&Arc<TrackedEntity>> { self.entities.values() }
    pub fn ids (&self)->impl Iterator<Item=&str> { self.entities.keys().map( |k| k.as_str()) }

    pub fn airborne_count (&self)->usize { self.entities.values().filter( |e| e.is_airborne()).count() }
}
