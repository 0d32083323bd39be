//! Router configuration. There is no file-based config surface here - the
//! router is an embedded library, not a CLI or service - so "configuration"
//! is this struct, constructed and validated programmatically the way the
//! teacher's `GridRouter::new`/`DiffPairRouter::new` validate their own
//! tuning knobs.

use crate::error::RouterError;
use crate::geom::{diagonal_distance, manhattan, Point};

/// An admissible heuristic, also used to sort routes before routing.
pub type DistanceFn = fn(Point, Point) -> f64;

#[derive(Clone, Copy, Debug)]
pub struct RouterOptions {
    pub grid_step: f64,
    pub diagonal: bool,
    pub bus: bool,
    distance_override: Option<DistanceFn>,
    pub margin: f64,
    pub turn_cost: f64,
    pub bus_gain: f64,
    pub cross_cost: f64,
    pub proximity_cost: f64,
}

impl RouterOptions {
    /// Defaults scaled from `grid_step`, matching the spec's option table.
    /// `diagonal` and `bus` default to `false`; the distance function tracks
    /// `diagonal` automatically until the caller overrides it explicitly
    /// with [`RouterOptions::set_distance`].
    pub fn new(grid_step: f64) -> Result<Self, RouterError> {
        if !(grid_step > 0.0) {
            return Err(RouterError::InvalidGridStep(grid_step));
        }
        Ok(Self {
            grid_step,
            diagonal: false,
            bus: false,
            distance_override: None,
            margin: 2.0 * grid_step,
            turn_cost: 1.5 * grid_step,
            bus_gain: 0.5 * grid_step,
            cross_cost: 3.0 * grid_step,
            proximity_cost: 2.0 * grid_step,
        })
    }

    /// The distance function the router actually uses: whatever was passed
    /// to [`RouterOptions::set_distance`], or else Manhattan/diagonal chosen
    /// from the `diagonal` flag.
    pub fn distance(&self) -> DistanceFn {
        self.distance_override.unwrap_or(if self.diagonal {
            diagonal_distance
        } else {
            manhattan
        })
    }

    /// Pin the distance function explicitly, decoupling it from `diagonal`.
    pub fn set_distance(&mut self, f: DistanceFn) {
        self.distance_override = Some(f);
    }

    /// Enable diagonal movement and switch to the octile heuristic, unless
    /// the caller has already pinned a distance function of their own.
    pub fn use_diagonal_distance(mut self) -> Self {
        self.diagonal = true;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Result<Self, RouterError> {
        if margin < 0.0 {
            return Err(RouterError::InvalidMargin(margin));
        }
        self.margin = margin;
        Ok(self)
    }
}
