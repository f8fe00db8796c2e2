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

use odin_common::geo::LatLon;
use odin_traffic::{AltitudeBand, EntityFlags, icao_ranges::country_for_icao24, raw_state::parse_response};

// run with "cargo test --test test_raw_state -- --nocapture"

const RESPONSE: &str = r#"{
  "ac": [
    { "hex": "A835AF", "type": "adsb_icao", "flight": "N628TS  ", "r": "N628TS", "t": "GLF6",
      "alt_baro": 41000, "gs": 478.3, "track": 87.5, "baro_rate": -64, "squawk": "2753",
      "category": "A3", "lat": 37.61, "lon": -122.38, "dbFlags": 0 },
    { "hex": "3c6444", "flight": "DLH400", "alt_baro": "ground", "gs": 12.1, "true_heading": 271.0,
      "lat": 50.03, "lon": 8.56 },
    { "hex": "ae1234", "flight": "RCH123", "alt_baro": 18250.4, "lat": 34.0, "lon": -117.0,
      "dbFlags": 1, "ownOp": "United States Air Force" },
    { "hex": "c0ffee", "flight": "NOPOS", "alt_baro": 12000 },
    { "hex": "", "lat": 1.0, "lon": 2.0 },
    { "flight": "NOHEX", "lat": 1.0, "lon": 2.0 },
    { "hex": "abcdef", "lat": "not a number", "lon": 2.0 },
    42
  ],
  "msg": "No error", "now": 1730000000000, "total": 8
}"#;

#[test]
fn test_parse_response() {
    let entities = parse_response( RESPONSE.as_bytes()).unwrap();
    for e in &entities { println!("{e}") }
    assert_eq!( entities.len(), 3);

    let e = &entities[0];
    assert_eq!( e.id, "a835af");
    assert_eq!( e.callsign.as_deref(), Some("N628TS"));
    assert_eq!( e.registration.as_deref(), Some("N628TS"));
    assert_eq!( e.type_designator.as_deref(), Some("GLF6"));
    assert_eq!( e.position, Some( LatLon::new( 37.61, -122.38)));
    assert_eq!( e.altitude_ft, Some(41000));
    assert!( !e.on_ground);
    assert!( (e.ground_speed_kts().unwrap() - 478.3).abs() < 1e-9);
    assert!( (e.vertical_rate_fpm().unwrap() + 64.0).abs() < 1e-9);
    assert_eq!( e.heading_deg, 87.5);
    assert_eq!( e.origin_country, "United States");
    assert_eq!( e.altitude_band(), AltitudeBand::High);
    assert!( !e.is_military());

    let e = &entities[1];
    assert!( e.on_ground);
    assert_eq!( e.altitude_ft, None);
    assert_eq!( e.heading_deg, 271.0); // falls back to true heading
    assert_eq!( e.origin_country, "Germany");
    assert_eq!( e.altitude_band(), AltitudeBand::Low);

    let e = &entities[2];
    assert_eq!( e.altitude_ft, Some(18250));
    assert_eq!( e.heading_deg, 0.0);
    assert!( e.is_military());
    assert!( e.flags.contains( EntityFlags::MILITARY));
    assert_eq!( e.origin_country, "United States Air Force");
    assert_eq!( e.altitude_band(), AltitudeBand::Mid);
}

#[test]
fn test_empty_responses() {
    assert!( parse_response( br#"{"ac":[]}"#).unwrap().is_empty());
    assert!( parse_response( br#"{"msg":"No error"}"#).unwrap().is_empty());
    assert!( parse_response( b"<html>bad gateway</html>").is_err());
}

#[test]
fn test_country_lookup() {
    assert_eq!( country_for_icao24( "a835af"), Some("United States"));
    assert_eq!( country_for_icao24( "3C6444"), Some("Germany"));
    assert_eq!( country_for_icao24( "~1234"), None);
    assert_eq!( country_for_icao24( "000001"), None);
}
