// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Locale/geo hints derived from request headers.
//!
//! Typically populated by a CDN or reverse proxy in front of the gateway.
//! Missing or malformed headers are ignored; generation never blocks on
//! these.

use axum::http::HeaderMap;

use parley_core::types::RequestHints;

pub const CITY_HEADER: &str = "x-parley-city";
pub const COUNTRY_HEADER: &str = "x-parley-country";
pub const LATITUDE_HEADER: &str = "x-parley-latitude";
pub const LONGITUDE_HEADER: &str = "x-parley-longitude";

pub fn hints_from_headers(headers: &HeaderMap) -> RequestHints {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let number = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<f64>().ok())
    };
    RequestHints {
        city: text(CITY_HEADER),
        country: text(COUNTRY_HEADER),
        latitude: number(LATITUDE_HEADER),
        longitude: number(LONGITUDE_HEADER),
    }
}
