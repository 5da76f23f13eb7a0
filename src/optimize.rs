// Copyright 2024 Vladimir Kharchev

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A derivative-free Nelder-Mead simplex minimizer used by the likelihood fits.

use std::cell::Cell;

/// Reflection coefficient.
const RHO: f64 = 1.0;
/// Expansion coefficient.
const CHI: f64 = 2.0;
/// Contraction coefficient.
const PSI: f64 = 0.5;
/// Shrink coefficient.
const SIGMA: f64 = 0.5;
/// Relative step of the initial simplex along a nonzero coordinate.
const NONZERO_STEP: f64 = 0.05;
/// Absolute step of the initial simplex along a zero coordinate.
const ZERO_STEP: f64 = 0.000_25;

/// Settings of the minimizer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NelderMead {
    /// Maximal number of simplex updates.
    pub max_iterations: usize,
    /// Maximal number of objective evaluations.
    pub max_evaluations: usize,
    /// Absolute tolerance on the spread of the simplex vertices.
    pub xatol: f64,
    /// Absolute tolerance on the spread of the objective over the simplex.
    pub fatol: f64,
}

impl NelderMead {
    /// Settings for a problem with `dimension` parameters.
    #[must_use]
    pub fn for_dimension(dimension: usize) -> Self {
        Self {
            max_iterations: 1000 * dimension,
            max_evaluations: 1000 * dimension,
            xatol: 1e-4,
            fatol: 1e-4,
        }
    }
}

/// The best point found by [`NelderMead::minimize`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Minimum<const N: usize> {
    pub point: [f64; N],
    pub value: f64,
    pub iterations: usize,
    /// `false` if a cap was hit before the tolerances were met.
    pub converged: bool,
}

/// A vertex of the simplex with its objective value.
type Vertex<const N: usize> = ([f64; N], f64);

/// `a * ca + b * cb`, componentwise.
fn combine<const N: usize>(a: &[f64; N], ca: f64, b: &[f64; N], cb: f64) -> [f64; N] {
    std::array::from_fn(|i| a[i] * ca + b[i] * cb)
}

impl NelderMead {
    /// Minimizes `objective` starting from `start`. NaN values of the objective count as
    /// `+inf`, so infeasible regions can be expressed either way.
    pub fn minimize<const N: usize>(
        &self,
        objective: impl Fn(&[f64; N]) -> f64,
        start: [f64; N],
    ) -> Minimum<N> {
        let evaluations = Cell::new(0_usize);
        let eval = |x: &[f64; N]| {
            evaluations.set(evaluations.get() + 1);
            let value = objective(x);
            if value.is_nan() {
                f64::INFINITY
            } else {
                value
            }
        };

        let mut simplex: Vec<Vertex<N>> = Vec::with_capacity(N + 1);
        simplex.push((start, eval(&start)));
        for k in 0..N {
            let mut vertex = start;
            vertex[k] = if vertex[k] == 0.0 {
                ZERO_STEP
            } else {
                vertex[k] * (1.0 + NONZERO_STEP)
            };
            simplex.push((vertex, eval(&vertex)));
        }
        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut iterations = 1;
        let mut converged = false;
        while iterations < self.max_iterations && evaluations.get() < self.max_evaluations {
            if self.is_converged(&simplex) {
                converged = true;
                break;
            }

            let worst = simplex[N].0;
            let mut centroid = [0.0; N];
            for (vertex, _) in &simplex[..N] {
                centroid = combine(&centroid, 1.0, vertex, 1.0);
            }
            #[allow(clippy::cast_precision_loss)]
            let centroid = centroid.map(|c| c / N as f64);

            let reflected = combine(&centroid, 1.0 + RHO, &worst, -RHO);
            let f_reflected = eval(&reflected);
            let mut shrink = false;

            if f_reflected < simplex[0].1 {
                let expanded = combine(&centroid, 1.0 + RHO * CHI, &worst, -RHO * CHI);
                let f_expanded = eval(&expanded);
                simplex[N] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
            } else if f_reflected < simplex[N - 1].1 {
                simplex[N] = (reflected, f_reflected);
            } else if f_reflected < simplex[N].1 {
                let outside = combine(&centroid, 1.0 + PSI * RHO, &worst, -PSI * RHO);
                let f_outside = eval(&outside);
                if f_outside <= f_reflected {
                    simplex[N] = (outside, f_outside);
                } else {
                    shrink = true;
                }
            } else {
                let inside = combine(&centroid, 1.0 - PSI, &worst, PSI);
                let f_inside = eval(&inside);
                if f_inside < simplex[N].1 {
                    simplex[N] = (inside, f_inside);
                } else {
                    shrink = true;
                }
            }

            if shrink {
                let best = simplex[0].0;
                for vertex in &mut simplex[1..] {
                    let point = combine(&best, 1.0 - SIGMA, &vertex.0, SIGMA);
                    *vertex = (point, eval(&point));
                }
            }

            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            iterations += 1;
        }

        let (point, value) = simplex[0];
        Minimum {
            point,
            value,
            iterations,
            converged,
        }
    }

    fn is_converged<const N: usize>(&self, simplex: &[Vertex<N>]) -> bool {
        let (best, f_best) = &simplex[0];
        simplex[1..].iter().all(|(vertex, value)| {
            (value - f_best).abs() <= self.fatol
                && vertex
                    .iter()
                    .zip(best)
                    .all(|(x, b)| (x - b).abs() <= self.xatol)
        })
    }
}
