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

//! the VIP registry (known transponder addresses of interest) and the independent scanner that tracks
//! them globally, regardless of the current viewport

use std::{collections::HashMap, sync::{Arc, Mutex}};
use futures::future::join_all;
use serde::{Serialize,Deserialize};
use tracing::{info, warn};

use crate::{query::AircraftQuery, TrackedEntity};

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct VipEntry {
    pub id: String, // hex transponder address
    pub owner: String,
    pub aircraft_type: String,
    pub registration: Option<String>,
    #[serde(default)]
    pub note: String,
}

/// case insensitive lookup table for VIP entries
#[derive(Debug,Clone,Default)]
pub struct VipRegistry {
    entries: HashMap<String,VipEntry>,
}

impl VipRegistry {
    pub fn new (entries: impl IntoIterator<Item=VipEntry>)->Self {
        let entries = entries.into_iter().map( |e| (e.id.to_lowercase(), e)).collect();
        VipRegistry { entries }
    }

    pub fn lookup (&self, id: &str)->Option<&VipEntry> {
        self.entries.get( &id.to_lowercase())
    }

    /// the (lowercase) ids of all registered entries, sorted
    pub fn ids (&self)->Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len (&self)->usize { self.entries.len() }
    pub fn is_empty (&self)->bool { self.entries.is_empty() }
}

/// polls all registered VIP ids with targeted queries and caches the result for merging into main cycles
pub struct VipScanner {
    query: Arc<dyn AircraftQuery>,
    ids: Vec<String>,
    cache: Mutex<Arc<Vec<TrackedEntity>>>,
}

impl VipScanner {
    pub fn new (query: Arc<dyn AircraftQuery>, ids: Vec<String>)->Self {
        VipScanner { query, ids, cache: Mutex::new( Arc::new( Vec::new())) }
    }

    pub fn ids (&self)->&[String] { self.ids.as_slice() }

    /// query all ids concurrently and replace the cache. If every single query failed we keep the
    /// previous cache since that is more useful than nothing
    pub async fn scan (&self)->Arc<Vec<TrackedEntity>> {
        if self.ids.is_empty() { return self.cached() }

        let results = join_all( self.ids.iter().map( |id| self.query.query_by_id( id))).await;

        let mut n_failed = 0;
        let mut found = Vec::new();
        for (id,res) in self.ids.iter().zip( results) {
            match res {
                Ok(entities) => found.extend( entities),
                Err(e) => {
                    warn!("VIP query for {id} failed: {e}");
                    n_failed += 1;
                }
            }
        }

        if n_failed == self.ids.len() {
            warn!("VIP scan failed, keeping previous results");
            return self.cached()
        }

        info!("VIP scan: {}/{} active", found.len(), self.ids.len());
        let found = Arc::new( found);
        *self.cache.lock().unwrap_or_else( |e| e.into_inner()) = found.clone();
        found
    }

    pub fn cached (&self)->Arc<Vec<TrackedEntity>> {
        self.cache.lock().unwrap_or_else( |e| e.into_inner()).clone()
    }
}
