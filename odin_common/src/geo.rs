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

//! spherical earth geodesy for the short range computations we need for tracking: great circle distance
//! (haversine), initial bearing and the direct problem (destination point from start, bearing and distance).
//! All angles in the public API are degrees, distances are in whatever unit the provided radius is in.

use std::fmt;
use serde::{Serialize,Deserialize};
use crate::{asin, atan2, cos, deg, pow2, rad, sin, sqrt};

/// a geographic position in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new (lat: f64, lon: f64)->Self { LatLon { lat, lon } }

    /// finite and within [-90,90] latitude and [-180,180] longitude
    pub fn is_valid (&self)->bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5},{:.5})", self.lat, self.lon)
    }
}

#[inline]
pub fn normalize_180 (d: f64)->f64 {
    let x = d % 360.0;
    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

#[inline]
pub fn normalize_360 (d: f64)->f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

/// central angle in radians between two positions (haversine formula)
pub fn central_angle (p1: &LatLon, p2: &LatLon)->f64 {
    let d_lat = rad(p2.lat - p1.lat);
    let d_lon = rad(p2.lon - p1.lon);
    let a = pow2(sin(d_lat / 2.0)) + cos(rad(p1.lat)) * cos(rad(p2.lat)) * pow2(sin(d_lon / 2.0));
    2.0 * asin( sqrt(a.min(1.0)))
}

/// great circle distance for a sphere of given radius (the result has the unit of `radius`)
#[inline]
pub fn haversine_distance (p1: &LatLon, p2: &LatLon, radius: f64)->f64 {
    radius * central_angle(p1, p2)
}

/// initial great circle bearing from p1 to p2 in degrees [0..360)
pub fn initial_bearing (p1: &LatLon, p2: &LatLon)->f64 {
    let φ1 = rad(p1.lat);
    let φ2 = rad(p2.lat);
    let Δλ = rad(p2.lon - p1.lon);

    let y = sin(Δλ) * cos(φ2);
    let x = cos(φ1) * sin(φ2) - sin(φ1) * cos(φ2) * cos(Δλ);
    normalize_360( deg( atan2(y, x)))
}

/// the direct geodesic problem on a sphere: compute the position we reach from `start` when travelling
/// `distance` along the great circle with initial `bearing_deg`. A zero distance returns `start` unchanged
/// (we don't want to introduce rounding noise for stationary objects)
pub fn destination (start: &LatLon, bearing_deg: f64, distance: f64, radius: f64)->LatLon {
    if distance == 0.0 { return *start }

    let φ1 = rad(start.lat);
    let λ1 = rad(start.lon);
    let θ = rad(bearing_deg);
    let δ = distance / radius; // angular distance

    let φ2 = asin( sin(φ1) * cos(δ) + cos(φ1) * sin(δ) * cos(θ));
    let λ2 = λ1 + atan2( sin(θ) * sin(δ) * cos(φ1), cos(δ) - sin(φ1) * sin(φ2));

    LatLon::new( deg(φ2), normalize_180( deg(λ2)))
}
