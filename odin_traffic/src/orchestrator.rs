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

//! the glue that runs acquisition, VIP scans, interpolation and proximity detection on their own
//! cadences. The components only interact through the [`StateStore`] and the acquisition guard

use std::{collections::HashMap, fmt, sync::{Arc, Mutex, atomic::{AtomicBool, AtomicU64, Ordering}}, time::Duration};
use async_trait::async_trait;
use tokio::{task::{AbortHandle, JoinHandle}, time::{interval, sleep, MissedTickBehavior}};
use tracing::{debug, error, info};
use odin_common::{datetime::EpochMillis, geo::LatLon};

use crate::{
    errors::Result, config::TrafficConfig,
    interpolate::{InterpolatedPosition, InterpolationEngine}, proximity::{ProximityAlert, ProximityDetector},
    query::{AdsbLolClient, AircraftQuery}, state_store::StateStore, tile_fetcher::{TileFetcher, Viewport},
    trails::TrailStore, vip::{VipRegistry, VipScanner}, Snapshot
};

#[derive(Debug,Clone,PartialEq)]
pub enum ConnectionStatus {
    Live,
    SignalLost { message: String, retry_in: Duration },
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Live => write!(f, "live"),
            ConnectionStatus::SignalLost{message,retry_in} => write!(f, "signal lost ({message}), retry in {}s", retry_in.as_secs())
        }
    }
}

/// the receiver of everything the monitor produces (render/UI/audio collaborators). All callbacks
/// default to no-ops so that implementors only have to provide what they use
#[async_trait]
pub trait TrafficConsumer: Send + Sync + 'static {
    /// the exact merged snapshot of a successful acquisition cycle, together with the current trails
    async fn snapshot_updated (&self, _snapshot: Arc<Snapshot>, _trails: Arc<HashMap<String,Vec<LatLon>>>) {}

    /// extrapolated positions for smooth rendering. Not to be used for counts or alerting
    async fn positions_interpolated (&self, _positions: Vec<InterpolatedPosition>) {}

    async fn alerts_updated (&self, _alerts: Arc<Vec<ProximityAlert>>) {}

    async fn status_changed (&self, _status: ConnectionStatus) {}
}

#[derive(Debug)]
pub struct CycleReport {
    pub cycle: u64, // number of successful cycles so far, including this one
    pub n_aircraft: usize,
    pub n_queries: usize,
    pub n_failed: usize,
    pub detector: Option<JoinHandle<()>>, // set if this cycle scheduled a proximity detector run
}

#[derive(Debug)]
pub enum CycleOutcome {
    Skipped, // another cycle was still in flight
    Completed(CycleReport),
}

/// resets the acquisition flag when the cycle future completes or gets dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn try_acquire (flag: &'a AtomicBool)->Option<Self> {
        flag.compare_exchange( false, true, Ordering::AcqRel, Ordering::Acquire).ok().map( |_| InFlightGuard(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop (&mut self) {
        self.0.store( false, Ordering::Release);
    }
}

fn lock<T> (m: &Mutex<T>)->std::sync::MutexGuard<'_,T> {
    m.lock().unwrap_or_else( |e| e.into_inner())
}

struct MonitorInner<C> {
    config: TrafficConfig,
    fetcher: TileFetcher,
    vip: VipScanner,
    store: StateStore,
    engine: InterpolationEngine,
    detector: ProximityDetector,
    trails: Mutex<TrailStore>,

    view: Mutex<(Viewport,f64)>, // (viewport, zoom)
    view_changes: AtomicU64,
    in_flight: AtomicBool,
    n_cycles: AtomicU64,
    is_live: AtomicBool,
    last_alerts: Mutex<Arc<Vec<ProximityAlert>>>,

    consumer: C,
}

impl<C> MonitorInner<C> where C: TrafficConsumer {

    fn view (&self)->(Viewport,f64) { *lock( &self.view) }

    async fn acquire (self: &Arc<Self>)->Result<CycleOutcome> {
        let Some(_guard) = InFlightGuard::try_acquire( &self.in_flight) else {
            debug!("acquisition still in flight, trigger ignored");
            return Ok( CycleOutcome::Skipped )
        };

        let (viewport, zoom) = self.view();
        match self.fetcher.fetch( &viewport, zoom).await {
            Ok(mut result) => {
                result.merge_secondary( self.vip.cached().iter());
                let (n_queries, n_failed) = (result.n_queries, result.n_failed);

                let snapshot = self.store.update_snapshot( Snapshot::from_map( result.aircraft, EpochMillis::now()));
                let trails = {
                    let mut trails = lock( &self.trails);
                    trails.record( &snapshot);
                    Arc::new( trails.renderable())
                };

                if !self.is_live.swap( true, Ordering::AcqRel) {
                    info!("connection live");
                    self.consumer.status_changed( ConnectionStatus::Live).await;
                }
                self.consumer.snapshot_updated( snapshot.clone(), trails).await;

                let cycle = self.n_cycles.fetch_add( 1, Ordering::AcqRel) + 1;
                let detector = if cycle % 2 == 0 { Some( self.spawn_detector( snapshot.clone())) } else { None };

                Ok( CycleOutcome::Completed( CycleReport { cycle, n_aircraft: snapshot.len(), n_queries, n_failed, detector }))
            }
            Err(e) => {
                error!("acquisition failed: {e}");
                self.is_live.store( false, Ordering::Release);
                let status = ConnectionStatus::SignalLost { message: e.to_string(), retry_in: self.config.fetch_interval };
                self.consumer.status_changed( status).await;
                Err(e)
            }
        }
    }

    /// run the detector on the exact snapshot of this cycle, after the render push is done
    fn spawn_detector (self: &Arc<Self>, snapshot: Arc<Snapshot>)->JoinHandle<()> {
        let inner = self.clone();
        tokio::spawn( async move {
            sleep( inner.config.proximity_delay).await;

            let alerts = if inner.config.proximity_enabled { inner.detector.detect( &snapshot) } else { Vec::new() };
            let alerts = Arc::new( alerts);
            *lock( &inner.last_alerts) = alerts.clone();
            inner.consumer.alerts_updated( alerts).await;
        })
    }

    async fn interpolation_tick (&self) {
        let generations = self.store.generations();
        if !generations.has_data() { return }

        let mut positions = self.engine.interpolate( &generations, EpochMillis::now());
        let max_aircraft = self.config.max_aircraft;
        if positions.len() > max_aircraft {
            positions.sort_by_key( |p| p.entity.on_ground); // airborne first
            positions.truncate( max_aircraft);
        }
        self.consumer.positions_interpolated( positions).await;
    }
}

/// the live traffic monitor. Created with an upstream query provider and a consumer, started with
/// [`TrafficMonitor::start`] and stopped with [`TrafficMonitor::terminate`] (or by dropping it)
pub struct TrafficMonitor<C> where C: TrafficConsumer {
    inner: Arc<MonitorInner<C>>,
    vip_registry: VipRegistry,
    tasks: Vec<AbortHandle>,
    debounce: Mutex<Option<AbortHandle>>,
}

impl<C> TrafficMonitor<C> where C: TrafficConsumer {

    pub fn new (config: TrafficConfig, query: Arc<dyn AircraftQuery>, consumer: C, viewport: Viewport, zoom: f64)->Self {
        let vip_registry = VipRegistry::new( config.vip.iter().cloned());
        let fetcher = TileFetcher::new( query.clone(), config.max_radius_nm, config.special_categories.clone());
        let vip = VipScanner::new( query, vip_registry.ids());
        let engine = InterpolationEngine::new( config.fetch_interval);
        let trails = Mutex::new( TrailStore::new( config.max_trail));

        let inner = Arc::new( MonitorInner {
            config, fetcher, vip, engine, trails,
            store: StateStore::new(),
            detector: ProximityDetector::new(),
            view: Mutex::new( (viewport,zoom)),
            view_changes: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            n_cycles: AtomicU64::new(0),
            is_live: AtomicBool::new(false),
            last_alerts: Mutex::new( Arc::new( Vec::new())),
            consumer,
        });

        TrafficMonitor { inner, vip_registry, tasks: Vec::new(), debounce: Mutex::new(None) }
    }

    /// a monitor that uses the configured adsb.lol compatible upstream server
    pub fn with_adsb_lol (config: TrafficConfig, consumer: C, viewport: Viewport, zoom: f64)->Result<Self> {
        let client = AdsbLolClient::new( &config.base_url, config.request_timeout)?;
        Ok( Self::new( config, Arc::new(client), consumer, viewport, zoom) )
    }

    /// spawn the acquisition, VIP scan and interpolation tasks. Needs to be called from within a tokio runtime
    pub fn start (&mut self) {
        if !self.tasks.is_empty() { return }
        let config = &self.inner.config;

        let inner = self.inner.clone();
        let fetch_interval = config.fetch_interval;
        let jh = tokio::spawn( async move {
            loop {
                // each cycle runs in its own task so that a slow upstream does not shift our cadence
                let cycle_inner = inner.clone();
                tokio::spawn( async move { let _ = cycle_inner.acquire().await; });
                sleep( fetch_interval).await;
            }
        });
        self.tasks.push( jh.abort_handle());

        if !self.inner.vip.ids().is_empty() {
            let inner = self.inner.clone();
            let vip_interval = config.vip_interval;
            let jh = tokio::spawn( async move {
                loop {
                    inner.vip.scan().await;
                    sleep( vip_interval).await;
                }
            });
            self.tasks.push( jh.abort_handle());
        }

        let inner = self.inner.clone();
        let tick_interval = config.interpolation_interval;
        let jh = tokio::spawn( async move {
            let mut ticker = interval( tick_interval);
            ticker.set_missed_tick_behavior( MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                inner.interpolation_tick().await;
            }
        });
        self.tasks.push( jh.abort_handle());

        info!("traffic monitor started (fetch: {:?}, interpolation: {:?})", fetch_interval, tick_interval);
    }

    /// run one acquisition cycle right away (unless one is already in flight)
    pub async fn acquire_now (&self)->Result<CycleOutcome> {
        self.inner.acquire().await
    }

    /// run one interpolation tick right away
    pub async fn interpolate_now (&self) {
        self.inner.interpolation_tick().await
    }

    /// change the area of interest. The acquisition is triggered once the viewport has been stable for the
    /// configured debounce time, superseded changes don't trigger anything
    pub fn set_viewport (&self, viewport: Viewport, zoom: f64) {
        *lock( &self.inner.view) = (viewport, zoom);
        let change = self.inner.view_changes.fetch_add( 1, Ordering::AcqRel) + 1;

        let inner = self.inner.clone();
        let jh = tokio::spawn( async move {
            sleep( inner.config.viewport_debounce).await;
            if inner.view_changes.load( Ordering::Acquire) == change {
                let _ = inner.acquire().await;
            }
        });
        *lock( &self.debounce) = Some( jh.abort_handle());
    }

    pub fn viewport (&self)->(Viewport,f64) { self.inner.view() }
    pub fn config (&self)->&TrafficConfig { &self.inner.config }
    pub fn store (&self)->&StateStore { &self.inner.store }
    pub fn consumer (&self)->&C { &self.inner.consumer }
    pub fn vip_registry (&self)->&VipRegistry { &self.vip_registry }

    /// the alerts of the last detector run. These stay in place during cycles that skip detection
    pub fn last_alerts (&self)->Arc<Vec<ProximityAlert>> { lock( &self.inner.last_alerts).clone() }

    pub fn n_cycles (&self)->u64 { self.inner.n_cycles.load( Ordering::Acquire) }
    pub fn is_live (&self)->bool { self.inner.is_live.load( Ordering::Acquire) }

    pub fn terminate (&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        if let Some(ah) = lock( &self.debounce).take() {
            ah.abort();
        }
    }
}

impl<C> Drop for TrafficMonitor<C> where C: TrafficConsumer {
    fn drop (&mut self) {
        self.terminate()
    }
}
