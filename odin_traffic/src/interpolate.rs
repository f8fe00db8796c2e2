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

//! constant velocity dead reckoning between acquisition cycles. Everything in here is a pure function of
//! (previous, current, now) - the engine only remembers the nominal fetch interval

use std::{sync::Arc, time::Duration};
use serde::Serialize;
use odin_common::{datetime::EpochMillis, geo::{destination, LatLon}, geo_constants::MEAN_EARTH_RADIUS_KM};

use crate::{state_store::SnapshotPair, Snapshot, TrackedEntity};

/// upper bound for extrapolation in units of the nominal fetch interval (for late fetches)
pub const MAX_EXTRAPOLATION_FACTOR: f64 = 1.5;

#[derive(Debug,Clone,Serialize)]
pub struct InterpolatedPosition {
    pub entity: Arc<TrackedEntity>,
    pub position: LatLon,
}

impl InterpolatedPosition {
    pub fn id (&self)->&str { self.entity.id.as_str() }
}

#[derive(Debug,Clone)]
pub struct InterpolationEngine {
    nominal_interval: Duration,
}

impl InterpolationEngine {
    pub fn new (nominal_interval: Duration)->Self {
        InterpolationEngine { nominal_interval }
    }

    pub fn nominal_interval (&self)->Duration { self.nominal_interval }

    pub fn interpolate (&self, generations: &SnapshotPair, now: EpochMillis)->Vec<InterpolatedPosition> {
        interpolate_positions( &generations.previous, &generations.current, now, self.nominal_interval)
    }

    pub fn projection_secs (&self, snapshot_time: EpochMillis, now: EpochMillis)->f64 {
        projection_secs( snapshot_time, now, self.nominal_interval)
    }
}

/// the effective extrapolation time in seconds: elapsed time since the snapshot, clamped to
/// [0, MAX_EXTRAPOLATION_FACTOR * nominal_interval]
pub fn projection_secs (snapshot_time: EpochMillis, now: EpochMillis, nominal_interval: Duration)->f64 {
    let elapsed = now.millis_since( snapshot_time).max(0) as f64;
    let nominal = nominal_interval.as_millis() as f64;
    if nominal <= 0.0 { return 0.0 }

    let t = (elapsed / nominal).min( MAX_EXTRAPOLATION_FACTOR);
    t * nominal / 1000.0
}

/// project `entity` forward by `secs` along its heading, starting from its current fix
pub fn project (entity: &TrackedEntity, secs: f64)->Option<LatLon> {
    let pos = entity.position?;
    let distance_km = entity.ground_speed_ms() * secs / 1000.0;
    if !(distance_km > 0.0) {
        return Some(pos)
    }
    Some( destination( &pos, entity.heading_deg, distance_km, MEAN_EARTH_RADIUS_KM))
}

/// estimated positions of all entities in `current` at time `now`. Entities that were not in `previous`
/// (or had no position there) have no velocity history yet and are reported at their fetched position
pub fn interpolate_positions (previous: &Snapshot, current: &Snapshot, now: EpochMillis, nominal_interval: Duration)->Vec<InterpolatedPosition> {
    let secs = projection_secs( current.timestamp(), now, nominal_interval);

    current.iter().filter_map( |e| {
        let pos = e.position?;
        let has_history = previous.get( &e.id).is_some_and( |p| p.position.is_some_and( |p| p.is_valid()));

        let position = if has_history { project( e, secs)? } else { pos };
        Some( InterpolatedPosition { entity: e.clone(), position })
    }).collect()
}
