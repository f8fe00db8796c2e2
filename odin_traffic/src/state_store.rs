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

//! the two-generation snapshot store. The only shared mutable state of the pipeline

use std::sync::{Arc, RwLock};
use odin_common::datetime::EpochMillis;

use crate::{Snapshot, TrackedEntity};

/// an immutable (previous,current) generation pair. Readers always get a consistent pair since
/// updates replace the whole pair
#[derive(Debug,Clone,Default)]
pub struct SnapshotPair {
    pub previous: Arc<Snapshot>,
    pub current: Arc<Snapshot>,
    pub generation: u64, // number of accepted updates
}

impl SnapshotPair {
    pub fn timestamp (&self)->EpochMillis { self.current.timestamp() }
    pub fn has_data (&self)->bool { self.generation > 0 }
}

#[derive(Debug,Default)]
pub struct StateStore {
    generations: RwLock<Arc<SnapshotPair>>,
}

impl StateStore {
    pub fn new ()->Self { StateStore::default() }

    /// replace the current generation with `entities` (last writer wins for duplicate ids), moving
    /// the old current generation to previous
    pub fn update (&self, entities: impl IntoIterator<Item=TrackedEntity>, timestamp: EpochMillis)->Arc<Snapshot> {
        self.update_snapshot( Snapshot::from_entities( entities, timestamp))
    }

    pub fn update_snapshot (&self, snapshot: Snapshot)->Arc<Snapshot> {
        let current = Arc::new( snapshot);
        let mut gens = self.generations.write().unwrap_or_else( |e| e.into_inner());
        let previous = gens.current.clone();
        let generation = gens.generation + 1;
        *gens = Arc::new( SnapshotPair { previous, current: current.clone(), generation });
        current
    }

    /// the current (previous,current) pair. This is a cheap Arc clone
    pub fn generations (&self)->Arc<SnapshotPair> {
        self.generations.read().unwrap_or_else( |e| e.into_inner()).clone()
    }

    pub fn current (&self)->Arc<Snapshot> { self.generations().current.clone() }
    pub fn previous (&self)->Arc<Snapshot> { self.generations().previous.clone() }

    pub fn get_by_id (&self, id: &str)->Option<Arc<TrackedEntity>> {
        self.generations().current.get( id).cloned()
    }

    /// timestamp of the last accepted snapshot
    pub fn timestamp (&self)->Option<EpochMillis> {
        let gens = self.generations();
        if gens.has_data() { Some( gens.timestamp()) } else { None }
    }

    pub fn has_data (&self)->bool { self.generations().has_data() }
    pub fn generation (&self)->u64 { self.generations().generation }
}
