//! Scalar root and minimum bracketing used by the numeric curve queries.

const MAX_ITERATIONS: usize = 200;

/// Finds a root of `f` inside `[a, b]`, given `f(a)` and `f(b)` of opposite
/// sign, by bisection.
pub fn bisect_root(f: impl Fn(f64) -> f64, mut a: f64, mut b: f64, mut fa: f64) -> f64 {
    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (a + b);
        if mid <= a || mid >= b {
            break;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if (fm < 0.0) == (fa < 0.0) {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

/// Minimizes a unimodal `f` over `[a, b]` by golden-section search.
pub fn golden_min(f: impl Fn(f64) -> f64, mut a: f64, mut b: f64) -> f64 {
    let inv_phi = (5f64.sqrt() - 1.0) / 2.0;
    let mut c = b - inv_phi * (b - a);
    let mut d = a + inv_phi * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..MAX_ITERATIONS {
        if (b - a).abs() <= f64::EPSILON * (1.0 + a.abs().max(b.abs())) {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - inv_phi * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + inv_phi * (b - a);
            fd = f(d);
        }
    }
    0.5 * (a + b)
}

/// Returns `n + 1` evenly spaced values covering `[a, b]`.
pub fn linspace(a: f64, b: f64, n: usize) -> impl Iterator<Item = f64> {
    #[allow(clippy::cast_precision_loss)]
    let step = (b - a) / n as f64;
    #[allow(clippy::cast_precision_loss)]
    (0..=n).map(move |i| if i == n { b } else { a + step * i as f64 })
}
