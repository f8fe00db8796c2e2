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

use std::{path::Path, time::Duration};
use serde::{Serialize,Deserialize,de::DeserializeOwned};
use odin_common::datetime::{millis,secs};

use crate::{errors::Result, vip::VipEntry};

/// the runtime configuration of a traffic monitor, normally loaded from a RON file (see `configs/odin_traffic.ron`)
#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct TrafficConfig {
    pub base_url: String, // root URL of the upstream aggregator API
    pub fetch_interval: Duration, // main acquisition cycle
    pub interpolation_interval: Duration, // render tick for extrapolated positions
    pub vip_interval: Duration, // independent cycle for targeted VIP queries
    pub proximity_delay: Duration, // how long to defer the detector after the snapshot has been published
    pub viewport_debounce: Duration, // quiet time after the last viewport change before we fetch
    pub request_timeout: Duration, // per upstream request, after which the sub-query counts as failed
    pub max_radius_nm: f64, // upstream point query radius (the API does not accept more than 250nm)
    pub special_categories: Vec<String>, // global queries we add for wide views
    pub max_trail: usize, // max number of trail points we keep per aircraft
    pub max_aircraft: usize, // cap for the interpolated render list
    pub proximity_enabled: bool,
    pub vip: Vec<VipEntry>,
}

impl Default for TrafficConfig {
    fn default()->Self {
        TrafficConfig {
            base_url: "https://api.adsb.lol".to_string(),
            fetch_interval: secs(5),
            interpolation_interval: millis(100),
            vip_interval: secs(30),
            proximity_delay: millis(100),
            viewport_debounce: millis(800),
            request_timeout: secs(8),
            max_radius_nm: 250.0,
            special_categories: vec!["mil".to_string(), "ladd".to_string()],
            max_trail: 12,
            max_aircraft: 3000,
            proximity_enabled: true,
            vip: Vec::new(),
        }
    }
}

/// load a RON config file into a config struct
pub fn load_config<C> (path: impl AsRef<Path>)->Result<C> where C: DeserializeOwned {
    let data = std::fs::read( path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// parse a RON config from a string (mostly for tests and embedded defaults)
pub fn config_from_str<C> (s: &str)->Result<C> where C: DeserializeOwned {
    Ok( ron::de::from_str( s)? )
}
