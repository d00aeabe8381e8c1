//! Special functions needed to evaluate oscillator basis states.
//!
//! Normalization constants of the radial functions grow combinatorially with
//! the quantum numbers, so everything that can overflow is computed as a
//! logarithm with its sign carried separately.

use std::f64::consts::PI;

// Lanczos approximation, g = 7, n = 9
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEF: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

// rescaling threshold for the Laguerre recurrence
const BIG: f64 = 1e150;

/// Natural logarithm of the gamma function for `x > 0`.
///
/// Uses the reflection formula below `x = 1/2`; returns `+∞` at the poles.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let s = (PI * x).sin();
        if s == 0.0 { return f64::INFINITY; }
        return (PI / s.abs()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let a: f64
        = LANCZOS_COEF.iter().enumerate().skip(1)
        .fold(LANCZOS_COEF[0], |acc, (k, ck)| acc + ck / (x + k as f64));
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// Natural logarithm of `n!`.
pub fn ln_factorial(n: usize) -> f64 { ln_gamma(n as f64 + 1.0) }

/// Binomial coefficient `C(n, k)` for small arguments.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n { return 0.0; }
    (0..k.min(n - k))
        .fold(1.0, |acc, j| acc * (n - j) as f64 / (j + 1) as f64)
}

/// Generalized Laguerre polynomial `L_n^α(x)` as `(ln |L|, sign)`.
///
/// The three-term recurrence is rescaled whenever the running value grows
/// past `1e150`, so the result stays finite for any degree. A zero of the
/// polynomial is reported as `(-∞, 0.0)`.
pub fn laguerre_log(n: usize, alpha: f64, x: f64) -> (f64, f64) {
    if n == 0 { return (0.0, 1.0); }
    let mut lm1: f64 = 1.0;
    let mut l: f64 = 1.0 + alpha - x;
    let mut scale: f64 = 0.0;
    for k in 1..n {
        let kf = k as f64;
        let lp1 = ((2.0 * kf + 1.0 + alpha - x) * l - (kf + alpha) * lm1)
            / (kf + 1.0);
        lm1 = l;
        l = lp1;
        let mag = l.abs();
        if mag > BIG {
            lm1 /= mag;
            l /= mag;
            scale += mag.ln();
        }
    }
    if l == 0.0 {
        (f64::NEG_INFINITY, 0.0)
    } else {
        (scale + l.abs().ln(), l.signum())
    }
}

/// Generalized Laguerre polynomial `L_n^α(x)`, evaluated directly.
///
/// Only safe for moderate degrees; see [`laguerre_log`].
pub fn laguerre(n: usize, alpha: f64, x: f64) -> f64 {
    let (ln_mag, sign) = laguerre_log(n, alpha, x);
    sign * ln_mag.exp()
}

/// Legendre polynomial `P_n(x)` for `x ∈ [-1, 1]`.
pub fn legendre(n: usize, x: f64) -> f64 {
    if n == 0 { return 1.0; }
    let mut pm1: f64 = 1.0;
    let mut p: f64 = x;
    for k in 1..n {
        let kf = k as f64;
        let pp1 = ((2.0 * kf + 1.0) * x * p - kf * pm1) / (kf + 1.0);
        pm1 = p;
        p = pp1;
    }
    p
}

/// Logarithm of the squared normalization constant of an oscillator radial
/// function, `ln(2 n! / Γ(n + α + 1))`.
pub fn ln_radial_norm2(n: usize, alpha: f64) -> f64 {
    2.0_f64.ln() + ln_factorial(n) - ln_gamma(n as f64 + alpha + 1.0)
}

/// Normalized oscillator radial function
/// ```text
/// R(r) = N r^λ L_n^α(r²) exp(-r²/2),   N² = 2 n! / Γ(n + α + 1)
/// ```
/// assembled entirely in log domain.
pub fn radial(n: usize, alpha: f64, lambda: f64, r: f64) -> f64 {
    if r == 0.0 && lambda > 0.0 { return 0.0; }
    let r2 = r * r;
    let (ln_lag, sign) = laguerre_log(n, alpha, r2);
    if sign == 0.0 { return 0.0; }
    let ln_pow = if lambda > 0.0 { lambda * r.abs().ln() } else { 0.0 };
    let ln_val = 0.5 * ln_radial_norm2(n, alpha) + ln_pow + ln_lag - r2 / 2.0;
    sign * ln_val.exp()
}

/// Normalized one-dimensional oscillator function
/// ```text
/// φ_n(x) = (2^n n! √π)^(-1/2) H_n(x) exp(-x²/2)
/// ```
///
/// Runs the normalized three-term recurrence without the Gaussian, rescaling
/// like [`laguerre_log`], and applies `exp(-x²/2)` in log domain at the end.
pub fn hermite_function(n: usize, x: f64) -> f64 {
    let mut hm1: f64 = 0.0;
    let mut h: f64 = PI.powf(-0.25);
    let mut scale: f64 = 0.0;
    for k in 0..n {
        let kf = k as f64;
        let hp1 = (2.0 / (kf + 1.0)).sqrt() * x * h
            - (kf / (kf + 1.0)).sqrt() * hm1;
        hm1 = h;
        h = hp1;
        let mag = h.abs();
        if mag > BIG {
            hm1 /= mag;
            h /= mag;
            scale += mag.ln();
        }
    }
    if h == 0.0 { return 0.0; }
    h.signum() * (scale + h.abs().ln() - x * x / 2.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamma_values() {
        assert!(ln_gamma(1.0).abs() < 1e-13);
        assert!(ln_gamma(2.0).abs() < 1e-13);
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-13);
        assert!((ln_factorial(10) - 3_628_800.0_f64.ln()).abs() < 1e-11);
        // Γ(5/2) = 3√π/4
        assert!((ln_gamma(2.5) - (0.75 * PI.sqrt()).ln()).abs() < 1e-13);
        // large argument stays finite
        assert!(ln_gamma(500.0).is_finite());
    }

    #[test]
    fn binomials() {
        assert_eq!(binomial(3, 0), 1.0);
        assert_eq!(binomial(3, 1), 3.0);
        assert_eq!(binomial(3, 2), 3.0);
        assert_eq!(binomial(3, 3), 1.0);
        assert_eq!(binomial(3, 4), 0.0);
        assert_eq!(binomial(10, 4), 210.0);
    }

    #[test]
    fn laguerre_low_order() {
        let (a, x) = (1.5, 0.7);
        let l2 = ((a + 1.0) * (a + 2.0) / 2.0) - (a + 2.0) * x + x * x / 2.0;
        assert!((laguerre(2, a, x) - l2).abs() < 1e-13);
        assert!((laguerre(1, a, x) - (1.0 + a - x)).abs() < 1e-14);
        assert_eq!(laguerre(0, a, x), 1.0);
    }

    #[test]
    fn laguerre_large_degree_finite() {
        let (ln_mag, sign) = laguerre_log(400, 30.0, 2000.0);
        assert!(ln_mag.is_finite());
        assert!(ln_mag > BIG.ln());
        assert!(sign != 0.0);
        // L_n^α(0) = C(n + α, n)
        let (ln0, sign0) = laguerre_log(400, 30.0, 0.0);
        let expected = ln_gamma(431.0) - ln_factorial(400) - ln_gamma(31.0);
        assert_eq!(sign0, 1.0);
        assert!((ln0 - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn legendre_values() {
        let x = 0.3;
        assert!((legendre(2, x) - 0.5 * (3.0 * x * x - 1.0)).abs() < 1e-15);
        assert!(
            (legendre(3, x) - 0.5 * (5.0 * x.powi(3) - 3.0 * x)).abs() < 1e-15
        );
        assert_eq!(legendre(7, 1.0), 1.0);
    }

    #[test]
    fn radial_normalized() {
        // ∫ R² r dr = 1 for the two-dimensional measure (α = λ = |m|)
        let dr = 1e-3;
        for (n, m) in [(0, 0), (3, 0), (2, 3), (5, 6)] {
            let norm: f64
                = (0..12_000)
                .map(|k| {
                    let r = k as f64 * dr;
                    radial(n, m as f64, m as f64, r).powi(2) * r * dr
                })
                .sum();
            assert!((norm - 1.0).abs() < 1e-6, "n = {n}, m = {m}: {norm}");
        }
    }

    #[test]
    fn radial_high_quantum_numbers() {
        // direct multiplication of the normalization would overflow here
        let v = radial(150, 180.0, 180.0, 16.0);
        assert!(v.is_finite());
        assert!(radial(150, 180.0, 180.0, 0.0) == 0.0);
    }

    #[test]
    fn hermite_functions() {
        let x: f64 = 0.7;
        let g = (-x * x / 2.0).exp() * PI.powf(-0.25);
        assert!((hermite_function(0, x) - g).abs() < 1e-15);
        assert!((hermite_function(1, x) - 2.0_f64.sqrt() * x * g).abs() < 1e-15);
        // H_3 = 8x³ - 12x, 2^3 3! = 48
        let h3 = (8.0 * x.powi(3) - 12.0 * x) / 48.0_f64.sqrt() * g;
        assert!((hermite_function(3, x) - h3).abs() < 1e-14);
        assert!((hermite_function(4, -x) - hermite_function(4, x)).abs() < 1e-15);
        assert!((hermite_function(5, -x) + hermite_function(5, x)).abs() < 1e-15);
        assert!(hermite_function(400, 25.0).is_finite());
        // unit norm
        let dx = 1e-3;
        let norm: f64
            = (-12_000..=12_000)
            .map(|k| hermite_function(9, k as f64 * dx).powi(2) * dx)
            .sum();
        assert!((norm - 1.0).abs() < 1e-10);
    }
}
