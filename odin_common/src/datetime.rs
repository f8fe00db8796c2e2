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

use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize,Deserialize};
use std::time::Duration;
use std::fmt;

/// a wall clock time point in milliseconds since the unix epoch
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Default)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub const fn new(millis:i64)->Self { EpochMillis(millis) }

    pub fn millis(&self)->i64 { self.0 }

    /// signed number of milliseconds between self and an earlier time point (negative if `earlier` is in our future)
    pub fn millis_since (&self, earlier: EpochMillis)->i64 { self.0 - earlier.0 }

    /// non-negative duration since `earlier` (zero if `earlier` is later than self)
    pub fn duration_since (&self, earlier: EpochMillis)->Duration {
        let dt = self.0 - earlier.0;
        if dt > 0 { Duration::from_millis(dt as u64) } else { Duration::ZERO }
    }

    pub fn add_duration (&self, dur: Duration)->Self {
        EpochMillis( self.0 + dur.as_millis() as i64)
    }

    pub fn to_utc (&self)->Option<DateTime<Utc>> { DateTime::<Utc>::from_timestamp_millis(self.0) }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utc() {
            Some(date) => write!(f, "{}", date.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "EpochMillis({})", self.0)
        }
    }
}

impl<Tz> From<DateTime<Tz>> for EpochMillis where Tz: TimeZone {
    fn from (date: DateTime<Tz>)->Self { EpochMillis(date.timestamp_millis()) }
}

// simple wrappers to keep the code that deals with intervals readable
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
