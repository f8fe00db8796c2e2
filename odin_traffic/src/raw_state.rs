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

//! the upstream (readsb/adsb.lol v2 API) aircraft record and its translation into [`TrackedEntity`].
//! All the "field might be missing, null or of a different type" handling lives here - consumers only
//! see validated entities

use serde::Deserialize;
use serde_json::Value;
use uom::si::{f64::Velocity, velocity::{foot_per_minute, knot}};
use odin_common::geo::LatLon;

use crate::{icao_ranges::country_for_icao24, errors::Result, EntityFlags, TrackedEntity};

/// barometric altitude is either a number (ft) or the string "ground"
#[derive(Debug,Clone,PartialEq,Deserialize)]
#[serde(untagged)]
pub enum AltBaro {
    Feet(f64),
    Label(String),
}

impl AltBaro {
    pub fn is_ground (&self)->bool {
        matches!( self, AltBaro::Label(s) if s == "ground")
    }

    pub fn feet (&self)->Option<f64> {
        match self {
            AltBaro::Feet(ft) if ft.is_finite() => Some(*ft),
            _ => None
        }
    }
}

/// the fields we consume from upstream aircraft records. Everything is optional since upstream omits
/// fields it doesn't have
#[derive(Debug,Clone,Default,Deserialize)]
pub struct RawState {
    pub hex: Option<String>,
    pub flight: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt_baro: Option<AltBaro>,
    pub gs: Option<f64>, // knots
    pub track: Option<f64>, // degrees
    pub true_heading: Option<f64>, // degrees
    pub baro_rate: Option<f64>, // ft/min
    pub squawk: Option<String>,
    pub r: Option<String>, // registration
    pub t: Option<String>, // ICAO type designator
    pub category: Option<String>,
    #[serde(rename="dbFlags")]
    pub db_flags: Option<u32>,
    #[serde(rename="ownOp")]
    pub own_op: Option<String>,
}

/// the response envelope of all v2 queries
#[derive(Debug,Deserialize)]
struct AcResponse {
    ac: Option<Vec<Value>>,
}

fn non_empty (s: Option<String>)->Option<String> {
    s.map( |s| s.trim().to_string()).filter( |s| !s.is_empty())
}

/// turn a raw upstream record into a TrackedEntity. Records without id or position are dropped (this is
/// not an error, upstream reports aircraft that only have Mode-S altitude/identity)
pub fn parse (raw: RawState)->Option<TrackedEntity> {
    let id = non_empty( raw.hex)?;
    let position = LatLon::new( raw.lat?, raw.lon?);
    if !position.is_valid() { return None }

    let on_ground = raw.alt_baro.as_ref().is_some_and( |a| a.is_ground());
    let altitude_ft = if on_ground { None } else { raw.alt_baro.as_ref().and_then( |a| a.feet()).map( |ft| ft.round() as i32) };

    let origin_country = non_empty( raw.own_op)
        .or_else( || country_for_icao24( &id).map( |c| c.to_string()))
        .unwrap_or_default();

    Some( TrackedEntity {
        position: Some(position),
        altitude_ft,
        on_ground,
        ground_speed: raw.gs.filter( |v| v.is_finite()).map( |v| Velocity::new::<knot>(v)),
        vertical_rate: raw.baro_rate.filter( |v| v.is_finite()).map( |v| Velocity::new::<foot_per_minute>(v)),
        heading_deg: raw.track.or( raw.true_heading).filter( |v| v.is_finite()).unwrap_or(0.0),
        callsign: non_empty( raw.flight),
        registration: non_empty( raw.r),
        type_designator: non_empty( raw.t),
        squawk: non_empty( raw.squawk),
        category: non_empty( raw.category),
        origin_country,
        flags: EntityFlags::new( raw.db_flags.unwrap_or(0)),
        id: id.to_lowercase(),
    })
}

/// parse a single JSON record. Malformed records are dropped silently
pub fn parse_value (value: Value)->Option<TrackedEntity> {
    serde_json::from_value::<RawState>( value).ok().and_then( parse)
}

/// parse a complete v2 API response body (`{"ac":[..],..}`). A missing `ac` array means no aircraft, only
/// a body that isn't a JSON object at all is an error
pub fn parse_response (body: &[u8])->Result<Vec<TrackedEntity>> {
    let response: AcResponse = serde_json::from_slice( body)?;
    Ok( response.ac.unwrap_or_default().into_iter().filter_map( parse_value).collect() )
}
