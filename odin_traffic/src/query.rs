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

//! the seam between acquisition logic and the upstream aggregator. Everything above this module only sees
//! the [`AircraftQuery`] trait, which is what tests mock

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use odin_common::round_to_decimals;

use crate::{errors::{op_failed, parse_error, Result}, raw_state::parse_response, TrackedEntity};

/// the largest point query radius the upstream API accepts
pub const MAX_QUERY_RADIUS_NM: f64 = 250.0;

/// the queries we need from an aircraft data source. Each one either succeeds with a (possibly empty)
/// list of parsed entities or fails as a whole
#[async_trait]
pub trait AircraftQuery: Send + Sync {
    /// all aircraft within `radius_nm` of the given point
    async fn query_by_point (&self, lat: f64, lon: f64, radius_nm: f64)->Result<Vec<TrackedEntity>>;

    /// global query for a special category such as "mil" or "ladd"
    async fn query_by_category (&self, category: &str)->Result<Vec<TrackedEntity>>;

    /// targeted query for a single transponder address
    async fn query_by_id (&self, id: &str)->Result<Vec<TrackedEntity>>;
}

/// normalize point query parameters: coordinates rounded to 2 decimals, radius rounded to an integer and
/// capped at [`MAX_QUERY_RADIUS_NM`]
pub fn point_query_params (lat: f64, lon: f64, radius_nm: f64)->(f64,f64,u32) {
    let r = radius_nm.round().clamp( 0.0, MAX_QUERY_RADIUS_NM) as u32;
    ( round_to_decimals( lat, 2), round_to_decimals( lon, 2), r )
}

/// client for the adsb.lol (readsb compatible) v2 REST API
#[derive(Debug,Clone)]
pub struct AdsbLolClient {
    client: Client,
    base_url: String,
}

impl AdsbLolClient {
    pub fn new (base_url: impl ToString, timeout: Duration)->Result<Self> {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err( parse_error!("not a http(s) base url: {}", base_url))
        }
        let client = Client::builder().timeout( timeout).build()?;
        Ok( AdsbLolClient { client, base_url } )
    }

    pub fn base_url (&self)->&str { self.base_url.as_str() }

    pub fn point_url (&self, lat: f64, lon: f64, radius_nm: f64)->String {
        let (lat,lon,r) = point_query_params( lat, lon, radius_nm);
        format!("{}/v2/point/{}/{}/{}", self.base_url, lat, lon, r)
    }

    pub fn category_url (&self, category: &str)->String {
        format!("{}/v2/{}", self.base_url, category)
    }

    pub fn id_url (&self, id: &str)->String {
        format!("{}/v2/hex/{}", self.base_url, id.to_lowercase())
    }

    async fn get_aircraft (&self, url: String)->Result<Vec<TrackedEntity>> {
        debug!("GET {url}");
        let response = self.client.get( &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err( op_failed!("{} returned status {}", url, status))
        }
        let body = response.bytes().await?;
        parse_response( &body)
    }
}

#[async_trait]
impl AircraftQuery for AdsbLolClient {
    async fn query_by_point (&self, lat: f64, lon: f64, radius_nm: f64)->Result<Vec<TrackedEntity>> {
        self.get_aircraft( self.point_url( lat, lon, radius_nm)).await
    }

    async fn query_by_category (&self, category: &str)->Result<Vec<TrackedEntity>> {
        self.get_aircraft( self.category_url( category)).await
    }

    async fn query_by_id (&self, id: &str)->Result<Vec<TrackedEntity>> {
        self.get_aircraft( self.id_url( id)).await
    }
}
