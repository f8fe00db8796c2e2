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

//! a uniform lat/lon cell index to reduce pairwise neighbor searches from O(n²) to (roughly) O(n)

use std::collections::HashMap;
use odin_common::geo::LatLon;

pub type CellKey = (i32,i32); // (row,col) == (lat index, lon index)

/// a sparse grid of equally sized lat/lon cells. Only cells that contain items are stored
#[derive(Debug,Clone)]
pub struct GeoGrid<T> {
    cell_size: f64, // degrees
    cells: HashMap<CellKey,Vec<T>>,
    len: usize,
}

impl<T> GeoGrid<T> {
    pub fn new (cell_size: f64)->Self {
        GeoGrid { cell_size, cells: HashMap::new(), len: 0 }
    }

    pub fn cell_size (&self)->f64 { self.cell_size }

    pub fn cell_key (&self, pos: &LatLon)->CellKey {
        ( (pos.lat / self.cell_size).floor() as i32, (pos.lon / self.cell_size).floor() as i32 )
    }

    pub fn insert (&mut self, pos: &LatLon, item: T) {
        let key = self.cell_key( pos);
        self.cells.entry( key).or_default().push( item);
        self.len += 1;
    }

    pub fn cell (&self, key: CellKey)->&[T] {
        self.cells.get( &key).map( |v| v.as_slice()).unwrap_or( &[])
    }

    /// items in the 3x3 block of cells centered on the cell that contains `pos`
    pub fn neighbors (&self, pos: &LatLon)->impl Iterator<Item=&T> {
        self.neighbors_within( pos, 1, 1)
    }

    /// items in all cells that are at most `row_reach` rows and `col_reach` columns away from the cell
    /// containing `pos`
    pub fn neighbors_within (&self, pos: &LatLon, row_reach: i32, col_reach: i32)->impl Iterator<Item=&T> {
        let (row,col) = self.cell_key( pos);
        (row-row_reach ..= row+row_reach)
            .flat_map( move |r| (col-col_reach ..= col+col_reach).map( move |c| (r,c)))
            .flat_map( move |key| self.cell( key).iter())
    }

    /// iterate over all (key, items) pairs of non-empty cells
    pub fn cells (&self)->impl Iterator<Item=(&CellKey,&Vec<T>)> { self.cells.iter() }

    pub fn len (&self)->usize { self.len }
    pub fn is_empty (&self)->bool { self.len == 0 }
    pub fn n_cells (&self)->usize { self.cells.len() }

    pub fn clear (&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}
