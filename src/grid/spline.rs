//! Lagrange-window spline evaluation and the spline second-derivative
//! solver (§4.1).
//!
//! Grounded on `original_source/src/celeritas/grid/SplineCalculator.hh`
//! (window selection around a query point) and the boundary-condition
//! taxonomy exercised in
//! `original_source/test/corecel/grid/SplineDerivCalculator.test.cc`
//! (natural / not-a-knot numeric behavior verified against that fixture;
//! the "Geant" boundary condition's exact curvature-extrapolation formula
//! is not in the retrieved source, so the implementation below follows the
//! textual description in spec.md §4.1 — see `DESIGN.md`).

use super::util::locate_bin;

/// Select the window of `order + 1` grid indices to use for a Lagrange
/// interpolation of degree `order` around bin `i` (where `xs[i] <= x <
/// xs[i + 1]`), clipped to the available range. When `order + 1` is odd
/// (`order` even) the window isn't naturally balanced around the bin; the
/// side whose neighboring grid point is nearer to `x` gets the extra
/// point.
fn window_start(n: usize, order: usize, i: usize, x: f64, xs: &[f64]) -> usize {
    let width = order + 1;
    if width >= n {
        return 0;
    }
    let half = (width - 1) / 2;
    let mut start = i.saturating_sub(half);
    if width % 2 == 1 {
        let dist_left = x - xs[i];
        let dist_right = xs[i + 1] - x;
        if dist_right < dist_left {
            start += 1;
        }
    }
    start.min(n - width)
}

/// Evaluate the Lagrange interpolating polynomial of degree `order`
/// through a window of `order + 1` points around `x`.
///
/// # Panics
///
/// Panics if `xs.len() != ys.len()` or `xs.len() < order + 1`.
#[must_use]
pub fn lagrange_evaluate(xs: &[f64], ys: &[f64], order: usize, x: f64) -> f64 {
    assert_eq!(xs.len(), ys.len());
    assert!(xs.len() > order);

    let i = locate_bin(xs, x);
    let start = window_start(xs.len(), order, i, x, xs);
    let window = &xs[start..start + order + 1];
    let values = &ys[start..start + order + 1];

    let mut sum = 0.0;
    for (j, (&xj, &yj)) in window.iter().zip(values).enumerate() {
        let mut term = yj;
        for (m, &xm) in window.iter().enumerate() {
            if m != j {
                term *= (x - xm) / (xj - xm);
            }
        }
        sum += term;
    }
    sum
}

/// Boundary condition used to close the cubic-spline second-derivative
/// system (§4.1).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundaryCondition {
    /// Second derivative vanishes at both ends.
    Natural,
    /// Third derivative is continuous across the first and last interior
    /// knot (no extra curvature assumption at the boundary).
    NotAKnot,
    /// End second derivatives follow the curvature of a quadratic fit
    /// through the three nearest interior `(x, y)` points.
    Geant,
}

/// Solve the tridiagonal cubic-spline system for the second derivatives
/// `M_i` at each of `xs`, given `ys` and a boundary condition. `xs` must be
/// sorted strictly increasing and have at least 3 points.
#[must_use]
pub fn solve_second_derivatives(xs: &[f64], ys: &[f64], bc: BoundaryCondition) -> Vec<f64> {
    assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    assert!(n >= 3, "spline needs at least 3 points");

    let h: Vec<f64> = (0..n - 1).map(|i| xs[i + 1] - xs[i]).collect();
    let rhs_interior = |i: usize| -> f64 {
        6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1])
    };

    // interior unknowns are M_1..M_{n-2}; build a tridiagonal system of
    // size n - 2.
    let m = n - 2;
    let mut sub = vec![0.0; m];
    let mut diag = vec![0.0; m];
    let mut sup = vec![0.0; m];
    let mut rhs = vec![0.0; m];

    for k in 0..m {
        let i = k + 1;
        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = rhs_interior(i);
    }

    let geant_fit = |idx: [usize; 3]| -> f64 {
        // fit y = a*x^2 + b*x + c through the three points, return 2a.
        let [p0, p1, p2] = idx;
        let (x0, x1, x2) = (xs[p0], xs[p1], xs[p2]);
        let (y0, y1, y2) = (ys[p0], ys[p1], ys[p2]);
        let denom = (x0 - x1) * (x0 - x2) * (x1 - x2);
        let a = (x2 * (y1 - y0) + x1 * (y0 - y2) + x0 * (y2 - y1)) / denom;
        2.0 * a
    };

    match bc {
        BoundaryCondition::Natural => {
            // M_0 = M_{n-1} = 0: the h[0]*M_0 and h[n-2]*M_{n-1} terms in
            // the first/last interior rows vanish, so no adjustment needed.
        }
        BoundaryCondition::NotAKnot => {
            // M_0 = [(h0 + h1) * M1 - h0 * M2] / h1, substituted into row
            // i = 1; symmetric treatment at the right end.
            let h0 = h[0];
            let h1 = h[1];
            diag[0] += h0 * (h0 + h1) / h1;
            sup[0] -= h0 * h0 / h1;

            let h_last = h[n - 2];
            let h_prev = h[n - 3];
            diag[m - 1] += h_last * (h_last + h_prev) / h_prev;
            sub[m - 1] -= h_last * h_last / h_prev;
        }
        BoundaryCondition::Geant => {
            let g0 = geant_fit([0, 1, 2]);
            let g_last = geant_fit([n - 3, n - 2, n - 1]);
            rhs[0] -= h[0] * g0;
            rhs[m - 1] -= h[n - 2] * g_last;
        }
    }

    let interior = thomas_solve(&sub, &diag, &sup, &rhs);

    let mut result = vec![0.0; n];
    result[1..n - 1].copy_from_slice(&interior);

    match bc {
        BoundaryCondition::Natural => {
            result[0] = 0.0;
            result[n - 1] = 0.0;
        }
        BoundaryCondition::NotAKnot => {
            let h0 = h[0];
            let h1 = h[1];
            result[0] = ((h0 + h1) * result[1] - h0 * result[2]) / h1;

            let h_last = h[n - 2];
            let h_prev = h[n - 3];
            result[n - 1] = ((h_last + h_prev) * result[n - 2] - h_last * result[n - 3]) / h_prev;
        }
        BoundaryCondition::Geant => {
            result[0] = geant_fit([0, 1, 2]);
            result[n - 1] = geant_fit([n - 3, n - 2, n - 1]);
        }
    }

    result
}

/// Thomas algorithm for a tridiagonal system `sub[i]*x[i-1] + diag[i]*x[i]
/// + sup[i]*x[i+1] = rhs[i]` (with `sub[0]` and `sup[last]` ignored).
fn thomas_solve(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
    let n = diag.len();
    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    c_prime[0] = sup[0] / diag[0];
    d_prime[0] = rhs[0] / diag[0];
    for i in 1..n {
        let denom = diag[i] - sub[i] * c_prime[i - 1];
        c_prime[i] = sup[i] / denom;
        d_prime[i] = (rhs[i] - sub[i] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_matches_reference() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 2.0, 1.0, 2.0, 0.0];
        let m = solve_second_derivatives(&xs, &ys, BoundaryCondition::Natural);
        let expected = [0.0, -6.0, 6.0, -6.0, 0.0];
        for (a, b) in m.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn not_a_knot_matches_reference() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 2.0, 1.0, 2.0, 0.0];
        let m = solve_second_derivatives(&xs, &ys, BoundaryCondition::NotAKnot);
        let expected = [-10.5, -3.0, 4.5, -3.0, -10.5];
        for (a, b) in m.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} != {b}");
        }
    }

    #[test]
    fn constant_values_give_zero_curvature() {
        let xs = [0.0, 1.0, 3.0, 7.0, 15.0];
        let ys = [3.0, 3.0, 3.0, 3.0, 3.0];
        for bc in [
            BoundaryCondition::Natural,
            BoundaryCondition::NotAKnot,
            BoundaryCondition::Geant,
        ] {
            let m = solve_second_derivatives(&xs, &ys, bc);
            for v in m {
                assert!(v.abs() < 1e-9);
            }
        }
    }

    #[test]
    fn lagrange_reproduces_quadratic() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| 2.0 * x * x - x + 1.0).collect();
        for &x in &[0.5, 1.5, 2.5, 3.5] {
            let y = lagrange_evaluate(&xs, &ys, 2, x);
            let expected = 2.0 * x * x - x + 1.0;
            assert!((y - expected).abs() < 1e-9, "{y} != {expected} at {x}");
        }
    }
}
