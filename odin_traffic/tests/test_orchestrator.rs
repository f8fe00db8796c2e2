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

use std::{collections::HashMap, sync::{Arc, Mutex, atomic::{AtomicBool, AtomicUsize, Ordering}}, time::Duration};
use async_trait::async_trait;
use tokio::time::sleep;
use odin_common::{datetime::millis, geo::LatLon};
use odin_traffic::{
    OdinTrafficError, Result, Snapshot, TrackedEntity, TrafficConfig,
    interpolate::InterpolatedPosition, proximity::{ProximityAlert, Severity}, query::AircraftQuery,
    orchestrator::{ConnectionStatus, CycleOutcome, CycleReport, TrafficConsumer, TrafficMonitor}, tile_fetcher::Viewport,
};

// run with "cargo test --test test_orchestrator -- --nocapture"

/// upstream that reports the same traffic for every point query
#[derive(Default)]
struct MockUpstream {
    traffic: Mutex<Vec<TrackedEntity>>,
    fail: AtomicBool,
    delay: Option<Duration>,
    n_points: AtomicUsize,
}

impl MockUpstream {
    fn with_traffic (traffic: Vec<TrackedEntity>)->Self {
        MockUpstream { traffic: Mutex::new(traffic), ..Default::default() }
    }

    fn set_traffic (&self, traffic: Vec<TrackedEntity>) { *self.traffic.lock().unwrap() = traffic }
    fn set_failing (&self, fail: bool) { self.fail.store( fail, Ordering::Relaxed) }
}

#[async_trait]
impl AircraftQuery for MockUpstream {
    async fn query_by_point (&self, _lat: f64, _lon: f64, _radius_nm: f64)->Result<Vec<TrackedEntity>> {
        self.n_points.fetch_add( 1, Ordering::Relaxed);
        if let Some(delay) = self.delay { sleep( delay).await }
        if self.fail.load( Ordering::Relaxed) {
            Err( OdinTrafficError::OpFailedError( "connection refused".to_string()))
        } else {
            Ok( self.traffic.lock().unwrap().clone())
        }
    }

    async fn query_by_category (&self, _category: &str)->Result<Vec<TrackedEntity>> { Ok( vec![]) }
    async fn query_by_id (&self, _id: &str)->Result<Vec<TrackedEntity>> { Ok( vec![]) }
}

#[derive(Default)]
struct Recorder {
    snapshots: Mutex<Vec<usize>>,
    ticks: Mutex<Vec<Vec<InterpolatedPosition>>>,
    alerts: Mutex<Vec<Arc<Vec<ProximityAlert>>>>,
    status: Mutex<Vec<ConnectionStatus>>,
}

#[async_trait]
impl TrafficConsumer for Recorder {
    async fn snapshot_updated (&self, snapshot: Arc<Snapshot>, _trails: Arc<HashMap<String,Vec<LatLon>>>) {
        self.snapshots.lock().unwrap().push( snapshot.len());
    }
    async fn positions_interpolated (&self, positions: Vec<InterpolatedPosition>) {
        self.ticks.lock().unwrap().push( positions);
    }
    async fn alerts_updated (&self, alerts: Arc<Vec<ProximityAlert>>) {
        self.alerts.lock().unwrap().push( alerts);
    }
    async fn status_changed (&self, status: ConnectionStatus) {
        println!("status: {status}");
        self.status.lock().unwrap().push( status);
    }
}

fn test_config ()->TrafficConfig {
    TrafficConfig {
        proximity_delay: millis(10),
        viewport_debounce: millis(50),
        special_categories: vec![],
        ..TrafficConfig::default()
    }
}

fn viewport ()->Viewport { Viewport::from_bbox( -1.0, -1.0, 1.0, 1.0) }

fn converging_pair ()->Vec<TrackedEntity> {
    vec![
        TrackedEntity::new( "A", LatLon::new( 0.0, 0.0), Some(5000)).with_velocity( 400.0, 90.0),
        TrackedEntity::new( "B", LatLon::new( 0.0, 0.01), Some(5100)).with_velocity( 400.0, 270.0),
    ]
}

fn separated_pair ()->Vec<TrackedEntity> {
    vec![
        TrackedEntity::new( "A", LatLon::new( 0.0, 0.0), Some(5000)),
        TrackedEntity::new( "B", LatLon::new( 0.5, 0.5), Some(5000)),
    ]
}

fn completed (outcome: Result<CycleOutcome>)->CycleReport {
    match outcome {
        Ok(CycleOutcome::Completed(report)) => report,
        other => panic!("expected completed cycle, got {other:?}")
    }
}

#[tokio::test]
async fn test_detector_alternation() {
    let upstream = Arc::new( MockUpstream::with_traffic( converging_pair()));
    let monitor = TrafficMonitor::new( test_config(), upstream.clone(), Recorder::default(), viewport(), 8.0);

    let r1 = completed( monitor.acquire_now().await);
    assert_eq!( r1.cycle, 1);
    assert_eq!( r1.n_aircraft, 2);
    assert!( r1.detector.is_none());

    let r2 = completed( monitor.acquire_now().await);
    r2.detector.expect("detector on second cycle").await.unwrap();
    let alerts = monitor.last_alerts();
    println!("alerts: {alerts:?}");
    assert_eq!( alerts.len(), 1);
    assert_eq!( alerts[0].severity, Severity::ResolutionAdvisory);

    // traffic separates, but the third cycle skips detection so the alert stays
    upstream.set_traffic( separated_pair());
    let r3 = completed( monitor.acquire_now().await);
    assert!( r3.detector.is_none());
    assert_eq!( monitor.last_alerts().len(), 1);
    assert_eq!( monitor.consumer().alerts.lock().unwrap().len(), 1);

    let r4 = completed( monitor.acquire_now().await);
    r4.detector.expect("detector on fourth cycle").await.unwrap();
    assert!( monitor.last_alerts().is_empty());
    assert_eq!( monitor.consumer().alerts.lock().unwrap().len(), 2);
    assert_eq!( *monitor.consumer().snapshots.lock().unwrap(), vec![2,2,2,2]);
}

#[tokio::test]
async fn test_proximity_disabled() {
    let upstream = Arc::new( MockUpstream::with_traffic( converging_pair()));
    let config = TrafficConfig { proximity_enabled: false, ..test_config() };
    let monitor = TrafficMonitor::new( config, upstream, Recorder::default(), viewport(), 8.0);

    completed( monitor.acquire_now().await);
    let r2 = completed( monitor.acquire_now().await);
    r2.detector.unwrap().await.unwrap();

    assert!( monitor.last_alerts().is_empty());
    assert_eq!( monitor.consumer().alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_signal_lost() {
    let upstream = Arc::new( MockUpstream::with_traffic( separated_pair()));
    let monitor = TrafficMonitor::new( test_config(), upstream.clone(), Recorder::default(), viewport(), 8.0);

    completed( monitor.acquire_now().await);
    assert!( monitor.is_live());

    upstream.set_failing( true);
    match monitor.acquire_now().await {
        Err(OdinTrafficError::AcquisitionFailed(msg)) => println!("failed as expected: {msg}"),
        other => panic!("expected acquisition failure, got {other:?}")
    }
    assert!( !monitor.is_live());
    assert_eq!( monitor.n_cycles(), 1);

    // we keep showing the last good snapshot
    assert!( monitor.store().get_by_id( "A").is_some());

    upstream.set_failing( false);
    completed( monitor.acquire_now().await);

    let status = monitor.consumer().status.lock().unwrap().clone();
    assert_eq!( status.len(), 3);
    assert_eq!( status[0], ConnectionStatus::Live);
    assert!( matches!( &status[1], ConnectionStatus::SignalLost{ retry_in, .. } if *retry_in == test_config().fetch_interval));
    assert_eq!( status[2], ConnectionStatus::Live);
}

#[tokio::test]
async fn test_reentrancy_guard() {
    let upstream = Arc::new( MockUpstream { delay: Some( millis(200)), ..MockUpstream::with_traffic( separated_pair()) });
    let monitor = TrafficMonitor::new( test_config(), upstream.clone(), Recorder::default(), viewport(), 8.0);

    let (first, second) = tokio::join!(
        monitor.acquire_now(),
        async {
            sleep( millis(50)).await;
            monitor.acquire_now().await
        }
    );

    completed( first);
    assert!( matches!( second, Ok(CycleOutcome::Skipped)));
    assert_eq!( upstream.n_points.load( Ordering::Relaxed), 1);

    // the guard is released once the cycle is done
    let r = completed( monitor.acquire_now().await);
    assert_eq!( r.cycle, 2);
}

#[tokio::test]
async fn test_interpolation_tick() {
    let mut parked = TrackedEntity::new( "P", LatLon::new( 0.2, 0.2), None);
    parked.on_ground = true;
    let mut traffic = converging_pair();
    traffic.insert( 0, parked);

    let upstream = Arc::new( MockUpstream::with_traffic( traffic));
    let config = TrafficConfig { max_aircraft: 2, ..test_config() };
    let monitor = TrafficMonitor::new( config, upstream, Recorder::default(), viewport(), 8.0);

    // no data yet - no output
    monitor.interpolate_now().await;
    assert!( monitor.consumer().ticks.lock().unwrap().is_empty());

    completed( monitor.acquire_now().await);
    monitor.interpolate_now().await;

    let ticks = monitor.consumer().ticks.lock().unwrap();
    assert_eq!( ticks.len(), 1);
    assert_eq!( ticks[0].len(), 2);
    assert!( ticks[0].iter().all( |p| p.entity.is_airborne()));
}

#[tokio::test]
async fn test_viewport_debounce() {
    let upstream = Arc::new( MockUpstream::with_traffic( separated_pair()));
    let monitor = TrafficMonitor::new( test_config(), upstream.clone(), Recorder::default(), viewport(), 8.0);

    for i in 0..3 {
        monitor.set_viewport( Viewport::from_bbox( i as f64, 0.0, i as f64 + 1.0, 1.0), 8.0);
        sleep( millis(10)).await;
    }
    sleep( millis(300)).await;

    assert_eq!( monitor.n_cycles(), 1);
    assert_eq!( upstream.n_points.load( Ordering::Relaxed), 1);
    assert_eq!( monitor.viewport().0, Viewport::from_bbox( 2.0, 0.0, 3.0, 1.0));
}

#[tokio::test]
async fn test_start_terminate() {
    let upstream = Arc::new( MockUpstream::with_traffic( converging_pair()));
    let config = TrafficConfig { fetch_interval: millis(100), interpolation_interval: millis(20), ..test_config() };
    let mut monitor = TrafficMonitor::new( config, upstream, Recorder::default(), viewport(), 8.0);

    monitor.start();
    sleep( millis(350)).await;
    monitor.terminate();

    let n_cycles = monitor.n_cycles();
    let n_ticks = monitor.consumer().ticks.lock().unwrap().len();
    println!("{n_cycles} cycles, {n_ticks} interpolation ticks");
    assert!( n_cycles >= 2);
    assert!( n_ticks > n_cycles as usize);

    sleep( millis(300)).await;
    assert!( monitor.n_cycles() <= n_cycles + 1);
    assert!( monitor.consumer().ticks.lock().unwrap().len() <= n_ticks + 1);
}
