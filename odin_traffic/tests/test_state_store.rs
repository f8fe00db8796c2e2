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

use std::{sync::Arc, thread};
use odin_common::{datetime::EpochMillis, geo::LatLon};
use odin_traffic::{Snapshot, TrackedEntity, state_store::StateStore, trails::TrailStore};

// run with "cargo test --test test_state_store -- --nocapture"

fn e (id: &str, alt: i32)->TrackedEntity {
    TrackedEntity::new( id, LatLon::new( 10.0, 20.0), Some(alt))
}

#[test]
fn test_replacement() {
    let store = StateStore::new();
    assert!( !store.has_data());
    assert!( store.timestamp().is_none());
    assert!( store.get_by_id( "x").is_none());

    store.update( vec![ e("x",1000), e("y",2000)], EpochMillis::new(1000));
    store.update( vec![ e("y",2100), e("z",3000)], EpochMillis::new(2000));

    assert!( store.has_data());
    assert_eq!( store.timestamp(), Some( EpochMillis::new(2000)));
    assert!( store.get_by_id( "x").is_none());
    assert_eq!( store.get_by_id( "y").unwrap().altitude_ft, Some(2100));
    assert!( store.previous().contains( "x"));

    // x is missing from the last two updates, hence gone from both generations
    store.update( vec![ e("z",3100)], EpochMillis::new(3000));
    let gens = store.generations();
    assert!( !gens.current.contains( "x") && !gens.previous.contains( "x"));
    assert!( gens.previous.contains( "y") && !gens.current.contains( "y"));
    assert_eq!( gens.previous.timestamp(), EpochMillis::new(2000));
    assert_eq!( gens.generation, 3);
}

#[test]
fn test_last_writer_wins() {
    let store = StateStore::new();
    store.update( vec![ e("a",1000), e("a",1010), e("a",1005)], EpochMillis::new(1));
    assert_eq!( store.current().len(), 1);
    assert_eq!( store.get_by_id( "a").unwrap().altitude_ft, Some(1005));

    // empty ids never make it into a snapshot
    let snapshot = Snapshot::from_entities( vec![ e("",1000), e("b",1000)], EpochMillis::new(2));
    assert_eq!( snapshot.len(), 1);
}

#[test]
fn test_consistent_generations() {
    // readers always see previous.timestamp < current.timestamp, never a half updated pair
    let store = Arc::new( StateStore::new());
    store.update( vec![ e("a",0)], EpochMillis::new(0));

    let writer = {
        let store = store.clone();
        thread::spawn( move || {
            for i in 1..2000 {
                store.update( vec![ e("a",i)], EpochMillis::new( i as i64));
            }
        })
    };

    for _ in 0..2000 {
        let gens = store.generations();
        if gens.generation > 1 {
            assert_eq!( gens.previous.timestamp().millis() + 1, gens.current.timestamp().millis());
        }
    }
    writer.join().unwrap();
    assert_eq!( store.generation(), 2000);
}

#[test]
fn test_trails() {
    let mut trails = TrailStore::new( 3);

    for i in 0..5 {
        let snapshot = Snapshot::from_entities( vec![
            TrackedEntity::new( "moving", LatLon::new( 10.0 + i as f64 * 0.01, 20.0), Some(5000)),
            TrackedEntity::new( "parked", LatLon::new( 30.0, 40.0 + i as f64 * 0.00001), None),
        ], EpochMillis::new( i));
        trails.record( &snapshot);
    }

    let moving = trails.trail( "moving").unwrap();
    println!("moving trail: {moving:?}");
    assert_eq!( moving.len(), 3);
    assert!( (moving[0].lat - 10.02).abs() < 1e-9);

    // movement below threshold does not add points
    assert_eq!( trails.trail( "parked").unwrap().len(), 1);
    let renderable = trails.renderable();
    assert!( renderable.contains_key( "moving") && !renderable.contains_key( "parked"));

    // aircraft that are gone lose their trails
    trails.record( &Snapshot::from_entities( vec![ TrackedEntity::new( "parked", LatLon::new( 30.0, 40.0), None)], EpochMillis::new(10)));
    assert!( trails.trail( "moving").is_none());
    assert_eq!( trails.len(), 1);
}
