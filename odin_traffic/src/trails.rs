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

//! bounded position histories of the aircraft in the current snapshot

use std::collections::{HashMap, VecDeque};
use odin_common::{collections::push_to_ringbuffer, geo::LatLon};

use crate::Snapshot;

/// minimal movement (in degrees per axis) for a new trail point
pub const MIN_TRAIL_MOVE_DEG: f64 = 0.0001;

#[derive(Debug,Clone)]
pub struct TrailStore {
    max_len: usize,
    trails: HashMap<String,VecDeque<LatLon>>,
}

impl TrailStore {
    pub fn new (max_len: usize)->Self {
        TrailStore { max_len, trails: HashMap::new() }
    }

    /// add the positions of a new snapshot and drop the trails of aircraft that are not in it anymore
    pub fn record (&mut self, snapshot: &Snapshot) {
        self.trails.retain( |id,_| snapshot.contains( id));

        for e in snapshot.iter() {
            let Some(pos) = e.position else { continue };
            let trail = self.trails.entry( e.id.clone()).or_default();
            let moved = trail.back().is_none_or( |last| {
                (last.lat - pos.lat).abs() > MIN_TRAIL_MOVE_DEG || (last.lon - pos.lon).abs() > MIN_TRAIL_MOVE_DEG
            });
            if moved {
                push_to_ringbuffer( trail, pos, self.max_len);
            }
        }
    }

    pub fn trail (&self, id: &str)->Option<&VecDeque<LatLon>> { self.trails.get( id) }

    /// all trails that have at least two points (i.e. can be rendered as a line)
    pub fn renderable (&self)->HashMap<String,Vec<LatLon>> {
        self.trails.iter()
            .filter( |(_,t)| t.len() >= 2)
            .map( |(id,t)| (id.clone(), t.iter().copied().collect()))
            .collect()
    }

    pub fn len (&self)->usize { self.trails.len() }
    pub fn is_empty (&self)->bool { self.trails.is_empty() }
}
