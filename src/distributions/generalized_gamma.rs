use statrs::function::gamma::gamma;

use super::Diameters;

/// Moment order of the size bias induced by horizontal point sampling.
///
/// Trees are tallied with probability proportional to basal area, which
/// scales with the square of diameter.
pub const DEFAULT_SIZE_BIAS_ORDER: f64 = 2.0;

/// Scalar generalized gamma kernel scaled by amplitude `s`.
///
/// Non-finite results (overflow near `x = 0`, degenerate parameters) are
/// reported as zero density.
fn generalized_gamma_point(x: f64, a: f64, b: f64, p: f64, s: f64) -> f64 {
    let ap = a * p;
    let y = s * (a * x.powf(ap - 1.0) * (-(x / b).powf(a)).exp()) / (b.powf(ap) * gamma(p));
    if y.is_finite() {
        y
    } else {
        0.0
    }
}

/// Four-parameter generalized gamma density with amplitude `s`.
///
/// `f(x) = s · a · x^(a·p − 1) · exp(−(x/b)^a) / (b^(a·p) · Γ(p))`
///
/// # Arguments
/// * `a` - tail shape
/// * `b` - scale
/// * `p` - shape exponent
/// * `s` - amplitude (1.0 gives a proper density)
///
/// The Weibull and Gamma densities below are parameter substitutions into
/// this function, as are their size-biased forms.
pub fn generalized_gamma_density<X: Diameters>(x: X, a: f64, b: f64, p: f64, s: f64) -> X::Output {
    x.map_elementwise(|xi| generalized_gamma_point(xi, a, b, p, s))
}

/// Size-biased generalized gamma density of moment order `order`.
///
/// Weighting a generalized gamma density by `x^order` yields another
/// generalized gamma with `p` shifted by `order / a`, so no normalising
/// constant is recomputed here.
pub fn size_biased_density<X: Diameters>(
    x: X,
    a: f64,
    b: f64,
    p: f64,
    s: f64,
    order: f64,
) -> X::Output {
    generalized_gamma_density(x, a, b, p + order / a, s)
}

/// Weibull density with shape `a`, scale `b` and amplitude `s`.
pub fn weibull_density<X: Diameters>(x: X, a: f64, b: f64, s: f64) -> X::Output {
    generalized_gamma_density(x, a, b, 1.0, s)
}

/// Size-biased Weibull density.
pub fn weibull_size_biased_density<X: Diameters>(
    x: X,
    a: f64,
    b: f64,
    s: f64,
    order: f64,
) -> X::Output {
    size_biased_density(x, a, b, 1.0, s, order)
}

/// Gamma density with scale `beta`, shape `p` and amplitude `s`.
pub fn gamma_density<X: Diameters>(x: X, beta: f64, p: f64, s: f64) -> X::Output {
    generalized_gamma_density(x, 1.0, beta, p, s)
}

/// Size-biased Gamma density.
pub fn gamma_size_biased_density<X: Diameters>(
    x: X,
    beta: f64,
    p: f64,
    s: f64,
    order: f64,
) -> X::Output {
    size_biased_density(x, 1.0, beta, p, s, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn test_weibull_matches_closed_form() {
        // Weibull(k=2, λ=20): (k/λ)(x/λ)^(k-1) exp(-(x/λ)^k)
        let x = 15.0_f64;
        let expected = (2.0 / 20.0) * (x / 20.0) * (-(x / 20.0).powi(2)).exp();
        assert_approx_eq!(weibull_density(x, 2.0, 20.0, 1.0), expected, 1e-12);
    }

    #[test]
    fn test_gamma_matches_closed_form() {
        // Gamma(shape=3, scale=5): x^2 exp(-x/5) / (5^3 · 2)
        let x = 12.0_f64;
        let expected = x.powi(2) * (-x / 5.0).exp() / (125.0 * 2.0);
        assert_approx_eq!(gamma_density(x, 5.0, 3.0, 1.0), expected, 1e-12);
    }

    #[test]
    fn test_amplitude_scales_linearly() {
        let base = generalized_gamma_density(18.0, 1.5, 20.0, 2.0, 1.0);
        let scaled = generalized_gamma_density(18.0, 1.5, 20.0, 2.0, 250.0);
        assert_approx_eq!(scaled, 250.0 * base, 1e-10);
    }

    #[test]
    fn test_density_integrates_to_amplitude() {
        // Trapezoid rule over a wide support.
        let step = 0.01;
        let grid: Vec<f64> = (1..20_000).map(|i| i as f64 * step).collect();
        let values = generalized_gamma_density(&grid, 2.0, 20.0, 1.5, 3.0);
        let area: f64 = values.iter().sum::<f64>() * step;
        assert_approx_eq!(area, 3.0, 1e-3);
    }

    #[test]
    fn test_zero_diameter_with_singular_power_is_clamped() {
        // a·p − 1 < 0 makes x^(a·p − 1) infinite at zero.
        assert_eq!(generalized_gamma_density(0.0, 0.5, 10.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_overflowing_gamma_function_is_clamped() {
        let y = generalized_gamma_density(10.0, 1.0, 10.0, 500.0, 1.0);
        assert!(y.is_finite());
        assert!(y >= 0.0);
    }

    #[test]
    fn test_default_order_is_basal_area() {
        assert_eq!(DEFAULT_SIZE_BIAS_ORDER, 2.0);
    }

    #[test]
    fn test_size_biased_weibull_shifts_mass_right() {
        let x: Vec<f64> = (1..=60).map(f64::from).collect();
        let plain = weibull_density(&x, 2.0, 20.0, 1.0);
        let biased = weibull_size_biased_density(&x, 2.0, 20.0, 1.0, DEFAULT_SIZE_BIAS_ORDER);
        let mode = |v: &[f64]| {
            v.iter()
                .enumerate()
                .fold((0, f64::MIN), |acc, (i, &y)| if y > acc.1 { (i, y) } else { acc })
                .0
        };
        assert!(mode(&biased) > mode(&plain));
    }

    #[test]
    fn test_sequence_and_scalar_agree() {
        let x = [5.0_f64, 10.0, 25.0];
        let seq = gamma_size_biased_density(x, 15.0, 3.0, 40.0, 2.0);
        for (i, &xi) in x.iter().enumerate() {
            assert_eq!(seq[i], gamma_size_biased_density(xi, 15.0, 3.0, 40.0, 2.0));
        }
    }

    proptest! {
        #[test]
        fn prop_density_finite_and_nonnegative(
            x in 0.0f64..500.0,
            a in 0.05f64..20.0,
            b in 0.05f64..200.0,
            p in 0.05f64..50.0,
            s in 0.0f64..1e6,
        ) {
            let y = generalized_gamma_density(x, a, b, p, s);
            prop_assert!(y.is_finite());
            prop_assert!(y >= 0.0);
        }

        #[test]
        fn prop_weibull_is_gg_with_unit_p(
            x in 0.0f64..200.0,
            a in 0.1f64..10.0,
            b in 0.1f64..100.0,
            s in 0.0f64..1000.0,
        ) {
            prop_assert_eq!(
                weibull_density(x, a, b, s),
                generalized_gamma_density(x, a, b, 1.0, s)
            );
        }

        #[test]
        fn prop_gamma_is_gg_with_unit_a(
            x in 0.0f64..200.0,
            beta in 0.1f64..100.0,
            p in 0.1f64..30.0,
            s in 0.0f64..1000.0,
        ) {
            prop_assert_eq!(
                gamma_density(x, beta, p, s),
                generalized_gamma_density(x, 1.0, beta, p, s)
            );
        }

        #[test]
        fn prop_size_bias_shifts_p(
            x in 0.0f64..200.0,
            a in 0.1f64..10.0,
            b in 0.1f64..100.0,
            p in 0.1f64..10.0,
            s in 0.0f64..1000.0,
            order in 0.0f64..4.0,
        ) {
            prop_assert_eq!(
                size_biased_density(x, a, b, p, s, order),
                generalized_gamma_density(x, a, b, p + order / a, s)
            );
        }
    }
}
