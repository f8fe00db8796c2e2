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

/// ICAO 24bit address blocks allocated to states. This is only used as a fallback for the country of
/// registration if the upstream record does not carry an explicit operator. The table is not complete, it
/// covers the blocks that account for the bulk of ADS-B equipped traffic.
/// Lookup is first-match since some of the blocks are nested
const ICAO_BLOCKS: &[(u32,u32,&str)] = &[
    (0x004000, 0x0043ff, "Zimbabwe"),
    (0x006000, 0x006fff, "Mozambique"),
    (0x008000, 0x00ffff, "South Africa"),
    (0x010000, 0x017fff, "Egypt"),
    (0x018000, 0x01ffff, "Libya"),
    (0x020000, 0x027fff, "Morocco"),
    (0x028000, 0x02ffff, "Tunisia"),
    (0x030000, 0x0303ff, "Botswana"),
    (0x034000, 0x034fff, "Burundi"),
    (0x035000, 0x035fff, "Cameroon"),
    (0x038000, 0x038fff, "Congo"),
    (0x03e000, 0x03efff, "Gabon"),
    (0x040000, 0x040fff, "Ethiopia"),
    (0x042000, 0x042fff, "Equatorial Guinea"),
    (0x044000, 0x044fff, "Ghana"),
    (0x048000, 0x048fff, "Kenya"),
    (0x050000, 0x050fff, "Nigeria"),
    (0x054000, 0x054fff, "Uganda"),
    (0x058000, 0x058fff, "Tanzania"),
    (0x060000, 0x060fff, "Guinea"),
    (0x0a0000, 0x0a7fff, "Algeria"),
    (0x0c0000, 0x0c4fff, "Mexico"),
    (0x0d0000, 0x0d7fff, "Venezuela"),
    (0x0e0000, 0x0e3fff, "Argentina"),
    (0x0e4000, 0x0e7fff, "Brazil"),
    (0x0e8000, 0x0e8fff, "Chile"),
    (0x0ea000, 0x0ea0ff, "Colombia"),
    (0x0ec000, 0x0ec0ff, "Peru"),
    (0x0ee000, 0x0ee0ff, "Uruguay"),
    (0x100000, 0x1fffff, "Russia"),
    (0x200000, 0x27ffff, "ICAO (Intl)"),
    (0x300000, 0x33ffff, "Italy"),
    (0x340000, 0x37ffff, "Spain"),
    (0x380000, 0x3bffff, "France"),
    (0x3c0000, 0x3fffff, "Germany"),
    (0x400000, 0x43ffff, "United Kingdom"),
    (0x440000, 0x447fff, "Austria"),
    (0x448000, 0x44ffff, "Belgium"),
    (0x450000, 0x457fff, "Bulgaria"),
    (0x458000, 0x45ffff, "Denmark"),
    (0x460000, 0x467fff, "Finland"),
    (0x468000, 0x46ffff, "Greece"),
    (0x470000, 0x477fff, "Hungary"),
    (0x478000, 0x47ffff, "Norway"),
    (0x480000, 0x487fff, "Netherlands"),
    (0x488000, 0x48ffff, "Poland"),
    (0x490000, 0x497fff, "Portugal"),
    (0x498000, 0x49ffff, "Czech Republic"),
    (0x4a0000, 0x4a7fff, "Romania"),
    (0x4a8000, 0x4affff, "Sweden"),
    (0x4b0000, 0x4b7fff, "Switzerland"),
    (0x4b8000, 0x4bffff, "Turkey"),
    (0x4c0000, 0x4c7fff, "Serbia"),
    (0x4c8000, 0x4cafff, "Croatia"),
    (0x500000, 0x5003ff, "Iceland"),
    (0x501000, 0x501fff, "Ireland"),
    (0x502000, 0x502fff, "Luxembourg"),
    (0x504000, 0x504fff, "Slovakia"),
    (0x505000, 0x505fff, "Slovenia"),
    (0x508000, 0x50ffff, "Ukraine"),
    (0x510000, 0x51ffff, "Belarus"),
    (0x514000, 0x514fff, "Estonia"),
    (0x515000, 0x515fff, "Latvia"),
    (0x516000, 0x516fff, "Lithuania"),
    (0x600000, 0x6003ff, "Armenia"),
    (0x680000, 0x68ffff, "Oman"),
    (0x681000, 0x681fff, "Qatar"),
    (0x684000, 0x687fff, "Saudi Arabia"),
    (0x690000, 0x6903ff, "UAE"),
    (0x698000, 0x698fff, "Israel"),
    (0x700000, 0x700fff, "Afghanistan"),
    (0x710000, 0x717fff, "Japan"),
    (0x718000, 0x71ffff, "South Korea"),
    (0x720000, 0x727fff, "Iran"),
    (0x730000, 0x737fff, "Iraq"),
    (0x738000, 0x73ffff, "Kuwait"),
    (0x740000, 0x747fff, "Thailand"),
    (0x748000, 0x74ffff, "India"),
    (0x750000, 0x757fff, "Pakistan"),
    (0x758000, 0x75ffff, "Taiwan"),
    (0x760000, 0x767fff, "China"),
    (0x768000, 0x76ffff, "Malaysia"),
    (0x770000, 0x777fff, "Philippines"),
    (0x778000, 0x77ffff, "Indonesia"),
    (0x780000, 0x787fff, "Singapore"),
    (0x789000, 0x789fff, "Hong Kong"),
    (0x7c0000, 0x7fffff, "Australia"),
    (0x800000, 0x83ffff, "India"),
    (0x840000, 0x87ffff, "Japan"),
    (0x880000, 0x887fff, "China"),
    (0x890000, 0x893fff, "New Zealand"),
    (0x894000, 0x894fff, "Vietnam"),
    (0x895000, 0x8953ff, "Bangladesh"),
    (0x896000, 0x896fff, "Nepal"),
    (0x898000, 0x898fff, "Sri Lanka"),
    (0xa00000, 0xafffff, "United States"),
    (0xc00000, 0xc3ffff, "Canada"),
    (0xc80000, 0xc87fff, "New Zealand"),
    (0xe00000, 0xe3ffff, "Argentina"),
    (0xe40000, 0xe7ffff, "Brazil"),
    (0xe80000, 0xe80fff, "Chile"),
    (0xe84000, 0xe84fff, "Colombia"),
    (0xe88000, 0xe88fff, "Ecuador"),
    (0xe8c000, 0xe8cfff, "Paraguay"),
    (0xe90000, 0xe90fff, "Peru"),
    (0xe94000, 0xe94fff, "Uruguay"),
    (0xe98000, 0xe98fff, "Venezuela"),
];

/// country of registration for given hex ICAO address, if it falls into one of the known blocks
pub fn country_for_icao24 (hex: &str)->Option<&'static str> {
    let addr = u32::from_str_radix( hex.trim(), 16).ok()?;
    ICAO_BLOCKS.iter()
        .find( |(lo,hi,_)| addr >= *lo && addr <= *hi)
        .map( |(_,_,country)| *country)
}
