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

use odin_common::geo::*;
use odin_common::geo_constants::{MEAN_EARTH_RADIUS_KM, MEAN_EARTH_RADIUS_NM};

// run with "cargo test test_haversine -- --nocapture"

#[test]
fn test_haversine() {
    // one degree of latitude is 60nm on our sphere (within rounding)
    let p1 = LatLon::new( 0.0, 0.0);
    let p2 = LatLon::new( 1.0, 0.0);
    let d = haversine_distance( &p1, &p2, MEAN_EARTH_RADIUS_NM);
    println!("1 deg latitude = {d}nm");
    assert!( (d - 60.04).abs() < 0.01);

    // SFO -> LAX is about 293nm
    let sfo = LatLon::new( 37.6189, -122.3750);
    let lax = LatLon::new( 33.9425, -118.4081);
    let d = haversine_distance( &sfo, &lax, MEAN_EARTH_RADIUS_NM);
    println!("SFO->LAX = {d}nm");
    assert!( (d - 293.0).abs() < 2.0);

    assert_eq!( 0.0, haversine_distance( &sfo, &sfo, MEAN_EARTH_RADIUS_NM));
}

#[test]
fn test_bearing() {
    let p = LatLon::new( 10.0, 10.0);
    assert!( (initial_bearing( &p, &LatLon::new( 11.0, 10.0)) - 0.0).abs() < 1e-9);
    assert!( (initial_bearing( &p, &LatLon::new( 10.0, 11.0)) - 90.0).abs() < 0.1);
    assert!( (initial_bearing( &p, &LatLon::new( 9.0, 10.0)) - 180.0).abs() < 1e-9);
    assert!( (initial_bearing( &p, &LatLon::new( 10.0, 9.0)) - 270.0).abs() < 0.1);
}

#[test]
fn test_destination() {
    let start = LatLon::new( 37.0, -122.0);

    // zero distance is the identity
    assert_eq!( start, destination( &start, 123.0, 0.0, MEAN_EARTH_RADIUS_KM));

    // travel 100km due east and check we come out 100km away on bearing ~90
    let end = destination( &start, 90.0, 100.0, MEAN_EARTH_RADIUS_KM);
    println!("{start} -> 100km east -> {end}");
    let d = haversine_distance( &start, &end, MEAN_EARTH_RADIUS_KM);
    assert!( (d - 100.0).abs() < 1e-6);
    assert!( end.lon > start.lon);
    assert!( (initial_bearing( &start, &end) - 90.0).abs() < 1e-6);

    // crossing the antimeridian stays normalized
    let p = destination( &LatLon::new( 0.0, 179.9), 90.0, 50.0, MEAN_EARTH_RADIUS_KM);
    println!("antimeridian crossing: {p}");
    assert!( p.lon < 0.0 && p.lon > -180.0);
    assert!( p.is_valid());
}

#[test]
fn test_normalize() {
    assert_eq!( -170.0, normalize_180( 190.0));
    assert_eq!( 170.0, normalize_180( -190.0));
    assert_eq!( 350.0, normalize_360( -10.0));
    assert_eq!( 10.0, normalize_360( 370.0));
}
