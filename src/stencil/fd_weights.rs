//! Finite difference weights.
//!
//! Weights come from Fornberg's recurrence,
//! B. Fornberg, "Generation of finite difference formulas on arbitrarily
//! spaced grids", Mathematics of Computation 51(184), 1988.
//! They are computed once when a stencil is built,
//! so the time stepping loop only ever sees coefficient tables.

use crate::error::*;

/// Which neighbors a one dimensional derivative may use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Symmetric around the evaluation point.
    Centered,
    /// Backward, the evaluation point and points before it.
    Left,
    /// Forward, the evaluation point and points after it.
    Right,
}

/// Weights `c[k][j]` for the k-th derivative at `z`
/// using values at `nodes[j]`, for every `k <= max_order`.
pub fn fornberg_weights(
    z: f64,
    nodes: &[f64],
    max_order: usize,
) -> Vec<Vec<f64>> {
    let n = nodes.len();
    let mut c = vec![vec![0.0; n]; max_order + 1];
    if n == 0 {
        return c;
    }
    let mut c1 = 1.0;
    let mut c4 = nodes[0] - z;
    c[0][0] = 1.0;
    for i in 1..n {
        let mn = i.min(max_order);
        let mut c2 = 1.0;
        let c5 = c4;
        c4 = nodes[i] - z;
        for j in 0..i {
            let c3 = nodes[i] - nodes[j];
            c2 *= c3;
            if j == i - 1 {
                for k in (1..=mn).rev() {
                    c[k][i] = c1
                        * (k as f64 * c[k - 1][i - 1] - c5 * c[k][i - 1])
                        / c2;
                }
                c[0][i] = -c1 * c5 * c[0][i - 1] / c2;
            }
            for k in (1..=mn).rev() {
                c[k][j] = (c4 * c[k][j] - k as f64 * c[k - 1][j]) / c3;
            }
            c[0][j] = c4 * c[0][j] / c3;
        }
        c1 = c2;
    }
    c
}

/// One dimensional derivative stencil on a unit spaced grid.
/// Scale by `1 / h^order` for spacing `h`.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivativeStencil {
    pub order: usize,
    pub offsets: Vec<i32>,
    pub weights: Vec<f64>,
}

impl DerivativeStencil {
    /// Build the stencil for derivative `order` (1 or 2)
    /// with formal accuracy `accuracy`.
    ///
    /// Centered stencils use `-p/2..=p/2` and need even accuracy.
    /// One sided first derivatives use `p + 1` points,
    /// one sided second derivatives `p + 2` points.
    pub fn new(order: usize, side: Side, accuracy: usize) -> Result<Self> {
        if order == 0 || order > 2 {
            return Err(Error::Configuration(format!(
                "derivative order must be 1 or 2, got {order}"
            )));
        }
        if accuracy == 0 {
            return Err(Error::Configuration(
                "derivative accuracy must be positive".to_string(),
            ));
        }
        let p = accuracy as i32;
        let offsets: Vec<i32> = match side {
            Side::Centered => {
                if accuracy % 2 != 0 {
                    return Err(Error::Configuration(format!(
                        "centered derivatives need even accuracy, got {accuracy}"
                    )));
                }
                (-p / 2..=p / 2).collect()
            }
            Side::Left => {
                let reach = p + order as i32 - 1;
                (-reach..=0).collect()
            }
            Side::Right => {
                let reach = p + order as i32 - 1;
                (0..=reach).collect()
            }
        };
        let nodes: Vec<f64> = offsets.iter().map(|o| *o as f64).collect();
        let mut weights =
            fornberg_weights(0.0, &nodes, order).swap_remove(order);

        // Tidy cancellation noise so symmetric stencils stay symmetric
        for w in weights.iter_mut() {
            if w.abs() < 1e-14 {
                *w = 0.0;
            }
        }

        Ok(DerivativeStencil {
            order,
            offsets,
            weights,
        })
    }

    /// Largest distance to a neighbor on the (left, right) side.
    pub fn reach(&self) -> (i32, i32) {
        let left = self.offsets.iter().map(|o| (-o).max(0)).max().unwrap_or(0);
        let right = self.offsets.iter().map(|o| (*o).max(0)).max().unwrap_or(0);
        (left, right)
    }
}
