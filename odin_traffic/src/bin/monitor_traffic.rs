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

use std::{collections::HashMap, sync::{Arc, Mutex}};
use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use odin_common::geo::LatLon;
use odin_traffic::{
    load_config, TrafficConfig, Snapshot,
    interpolate::InterpolatedPosition, proximity::{brute_force_scan, ProximityAlert},
    orchestrator::{ConnectionStatus, TrafficConsumer, TrafficMonitor}, tile_fetcher::Viewport,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "monitor live ADS-B traffic and proximity alerts within a bounding box")]
pub struct Args {
    /// RON config file (built-in defaults if not set)
    #[arg(short,long)]
    pub config: Option<String>,

    /// bounding box as west south east north (degrees)
    #[arg(long, num_args=4, allow_negative_numbers=true, value_names=["WEST","SOUTH","EAST","NORTH"], default_values_t=[-123.0, 36.5, -121.0, 38.5])]
    pub bbox: Vec<f64>,

    /// map zoom level that determines the number of tiles
    #[arg(short,long, default_value_t = 8.0)]
    pub zoom: f64,

    /// print alerts as JSON
    #[arg(long)]
    pub json: bool,

    /// verify each detector run against an exhaustive scan
    #[arg(long)]
    pub check: bool,

    /// also print interpolation ticks
    #[arg(short,long)]
    pub verbose: bool,
}

struct PrintConsumer {
    json: bool,
    check: bool,
    verbose: bool,
    last_snapshot: Mutex<Option<Arc<Snapshot>>>,
}

#[async_trait]
impl TrafficConsumer for PrintConsumer {
    async fn snapshot_updated (&self, snapshot: Arc<Snapshot>, trails: Arc<HashMap<String,Vec<LatLon>>>) {
        println!("{}: {} aircraft ({} airborne), {} trails", snapshot.timestamp(), snapshot.len(), snapshot.airborne_count(), trails.len());
        if self.check {
            *self.last_snapshot.lock().unwrap_or_else( |e| e.into_inner()) = Some(snapshot);
        }
    }

    async fn positions_interpolated (&self, positions: Vec<InterpolatedPosition>) {
        if self.verbose {
            if let Some(p) = positions.first() {
                println!("  tick: {} positions, first: {} at {}", positions.len(), p.entity.label(), p.position);
            }
        }
    }

    async fn alerts_updated (&self, alerts: Arc<Vec<ProximityAlert>>) {
        if self.json {
            match serde_json::to_string( alerts.as_ref()) {
                Ok(s) => println!("{s}"),
                Err(e) => warn!("failed to serialize alerts: {e}")
            }
        } else {
            println!("{} proximity alerts", alerts.len());
            for a in alerts.iter() {
                println!("  {a}");
            }
        }

        if self.check {
            let snapshot = self.last_snapshot.lock().unwrap_or_else( |e| e.into_inner()).clone();
            if let Some(snapshot) = snapshot {
                let reference = brute_force_scan( snapshot.iter().map( |e| e.as_ref()));
                if reference.len() != alerts.len() || reference.iter().zip( alerts.iter()).any( |(r,a)| r.pair_key() != a.pair_key() || r.severity != a.severity) {
                    warn!("detector result differs from exhaustive scan: {} vs {} alerts", alerts.len(), reference.len());
                } else {
                    println!("  check ok ({} alerts)", reference.len());
                }
            }
        }
    }

    async fn status_changed (&self, status: ConnectionStatus) {
        println!("connection status: {status}");
    }
}

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();
    let config: TrafficConfig = match &args.config {
        Some(path) => load_config( path)?,
        None => TrafficConfig::default()
    };

    let viewport = match args.bbox.as_slice() {
        [west, south, east, north] => Viewport::from_bbox( *west, *south, *east, *north),
        _ => anyhow::bail!("bbox needs 4 values: west south east north")
    };

    let consumer = PrintConsumer { json: args.json, check: args.check, verbose: args.verbose, last_snapshot: Mutex::new(None) };
    let mut monitor = TrafficMonitor::with_adsb_lol( config, consumer, viewport, args.zoom)?;
    monitor.start();

    tokio::signal::ctrl_c().await?;
    monitor.terminate();
    println!("terminated.");

    Ok(())
}
