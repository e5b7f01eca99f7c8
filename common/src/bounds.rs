//! 妥当とみなす地理範囲
//!
//! 既定値はインドネシア（緯度 -11〜-1、経度 95〜141）。
//! 範囲外の座標は棄却せず、信頼度の減点対象としてのみ扱う。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::INDONESIA
    }
}

impl GeoBounds {
    pub const INDONESIA: GeoBounds = GeoBounds {
        min_lat: -11.0,
        max_lat: -1.0,
        min_lon: 95.0,
        max_lon: 141.0,
    };

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.min_lat) || !(-90.0..=90.0).contains(&self.max_lat) {
            return Err(Error::Config(format!(
                "bounds: latitude range {}..{} outside -90..90",
                self.min_lat, self.max_lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.min_lon) || !(-180.0..=180.0).contains(&self.max_lon) {
            return Err(Error::Config(format!(
                "bounds: longitude range {}..{} outside -180..180",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(Error::Config("bounds: min greater than max".into()));
        }
        Ok(())
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.contains_latitude(latitude) && self.contains_longitude(longitude)
    }

    pub fn contains_latitude(&self, latitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
    }

    pub fn contains_longitude(&self, longitude: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&longitude)
    }

    /// 半球記号がない値に付ける緯度の符号（範囲の中心で判定）
    pub fn default_latitude_sign(&self) -> f64 {
        if self.min_lat + self.max_lat < 0.0 { -1.0 } else { 1.0 }
    }

    pub fn default_longitude_sign(&self) -> f64 {
        if self.min_lon + self.max_lon < 0.0 { -1.0 } else { 1.0 }
    }

    /// 符号なしの度（絶対値）が緯度として範囲に入り得るか
    pub fn admits_latitude_magnitude(&self, magnitude: f64) -> bool {
        self.contains_latitude(magnitude * self.default_latitude_sign())
    }

    pub fn admits_longitude_magnitude(&self, magnitude: f64) -> bool {
        self.contains_longitude(magnitude * self.default_longitude_sign())
    }
}
