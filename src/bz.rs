//! First Brillouin zone of the honeycomb lattice models.

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};
use crate::Error;

pub const SQRT_3: f64 = 1.732050807568877293527446341505872367_f64;

const TRI: f64 = 4. * PI / 9.;

/// Number of sites of the magnetic unit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ZoneSize {
    Two,
    Six,
}

impl TryFrom<u8> for ZoneSize {
    type Error = Error;

    fn try_from(size: u8) -> Result<Self, Error> {
        match size {
            2 => Ok(ZoneSize::Two),
            6 => Ok(ZoneSize::Six),
            s => Err(Error::InvalidZoneSize(s)),
        }
    }
}

impl From<ZoneSize> for u8 {
    fn from(size: ZoneSize) -> u8 {
        match size {
            ZoneSize::Two => 2,
            ZoneSize::Six => 6,
        }
    }
}

impl ZoneSize {
    /// The K' point, a corner of the zone.
    pub fn kp(self) -> (f64, f64) {
        match self {
            ZoneSize::Six => (TRI * SQRT_3 / 2., TRI * 0.5),
            ZoneSize::Two => {
                let b = 4. * SQRT_3 * PI / 9.;
                (b * 0.5, b * SQRT_3 * 0.5)
            }
        }
    }

    /// Distance from Γ to the corners.
    pub fn radius(self) -> f64 {
        let (x, y) = self.kp();
        x.hypot(y)
    }

    /// Corners of the zone: K' rotated by multiples of 60°.  The first
    /// corner is repeated at the end to close the outline.
    pub fn hexagon(self) -> [(f64, f64); 7] {
        let (kx, ky) = self.kp();
        std::array::from_fn(|i| {
            let (s, c) = (i as f64 * PI / 3.).sin_cos();
            (kx * c - ky * s, kx * s + ky * c)
        })
    }

    /// Half width of the square k-space window the contours are shown in.
    pub fn axis_limit(self) -> f64 {
        match self {
            ZoneSize::Two => 2.5,
            ZoneSize::Six => 1.5,
        }
    }

    /// Integer ticks within `[-limit, limit]`.
    pub fn ticks(self) -> Vec<f64> {
        let lim = self.axis_limit();
        let (start, end) = ((-lim).ceil() as i64, lim.floor() as i64);
        (start ..= end).map(|t| t as f64).collect()
    }
}
