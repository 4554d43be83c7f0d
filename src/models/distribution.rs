use serde::{Deserialize, Serialize};

use crate::distributions::{
    gamma_density, gamma_size_biased_density, weibull_density, weibull_size_biased_density,
    Diameters,
};
use crate::error::DistFitError;

/// Distribution family fitted to diameter data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Generalized gamma with `p = 1`; parameters `(shape, scale, amplitude)`.
    Weibull,
    /// Generalized gamma with `a = 1`; parameters `(scale, shape, amplitude)`.
    Gamma,
}

impl Distribution {
    /// Number of free parameters in a fit of this family.
    pub const NUM_PARAMS: usize = 3;

    /// Parameter names in the order used by fit results.
    pub fn parameter_names(&self) -> [&'static str; 3] {
        match self {
            Distribution::Weibull => ["shape", "scale", "amplitude"],
            Distribution::Gamma => ["scale", "shape", "amplitude"],
        }
    }

    /// Starting shape/scale pair used by the fitting engine.
    pub(crate) fn initial_guess(&self, amplitude: f64) -> [f64; 3] {
        match self {
            Distribution::Weibull => [2.0, 20.0, amplitude],
            Distribution::Gamma => [15.0, 3.0, amplitude],
        }
    }

    /// Borrow a parameter slice as the fixed triple every family takes.
    pub fn param_triple(params: &[f64]) -> Result<&[f64; 3], DistFitError> {
        <&[f64; 3]>::try_from(params).map_err(|_| {
            DistFitError::Domain(format!(
                "expected {} parameters, got {}",
                Self::NUM_PARAMS,
                params.len()
            ))
        })
    }

    /// True when shape and scale are positive and every parameter is finite.
    ///
    /// With a non-negative size-bias order this also keeps the shifted
    /// exponent `p + order / a` positive.
    pub fn admits(&self, params: &[f64; 3]) -> bool {
        params.iter().all(|v| v.is_finite()) && params[0] > 0.0 && params[1] > 0.0
    }

    /// Evaluate the unbiased density with `params` in [`parameter_names`](Self::parameter_names) order.
    pub fn density<X: Diameters>(&self, x: X, params: &[f64; 3]) -> X::Output {
        match self {
            Distribution::Weibull => weibull_density(x, params[0], params[1], params[2]),
            Distribution::Gamma => gamma_density(x, params[0], params[1], params[2]),
        }
    }

    /// Evaluate the size-biased density of moment `order`.
    pub fn size_biased_density<X: Diameters>(
        &self,
        x: X,
        params: &[f64; 3],
        order: f64,
    ) -> X::Output {
        match self {
            Distribution::Weibull => {
                weibull_size_biased_density(x, params[0], params[1], params[2], order)
            }
            Distribution::Gamma => {
                gamma_size_biased_density(x, params[0], params[1], params[2], order)
            }
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Weibull => write!(f, "weibull"),
            Distribution::Gamma => write!(f, "gamma"),
        }
    }
}

impl std::str::FromStr for Distribution {
    type Err = DistFitError;

    /// Case-insensitive prefix dispatch: `w…` is Weibull, `g…` is Gamma.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if lower.starts_with('w') {
            Ok(Distribution::Weibull)
        } else if lower.starts_with('g') {
            Ok(Distribution::Gamma)
        } else {
            Err(DistFitError::UnsupportedDistribution(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() {
        assert_eq!("weibull".parse::<Distribution>().unwrap(), Distribution::Weibull);
        assert_eq!("Weibull".parse::<Distribution>().unwrap(), Distribution::Weibull);
        assert_eq!("W".parse::<Distribution>().unwrap(), Distribution::Weibull);
        assert_eq!("gamma".parse::<Distribution>().unwrap(), Distribution::Gamma);
        assert_eq!("GAMMA".parse::<Distribution>().unwrap(), Distribution::Gamma);
        assert_eq!("generalized".parse::<Distribution>().unwrap(), Distribution::Gamma);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "lognormal".parse::<Distribution>().unwrap_err();
        assert!(matches!(err, DistFitError::UnsupportedDistribution(ref name) if name == "lognormal"));
        assert!("".parse::<Distribution>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for d in [Distribution::Weibull, Distribution::Gamma] {
            assert_eq!(d.to_string().parse::<Distribution>().unwrap(), d);
        }
    }

    #[test]
    fn test_parameter_names() {
        assert_eq!(Distribution::Weibull.parameter_names()[0], "shape");
        assert_eq!(Distribution::Gamma.parameter_names()[0], "scale");
    }

    #[test]
    fn test_initial_guess() {
        assert_eq!(Distribution::Weibull.initial_guess(7.0), [2.0, 20.0, 7.0]);
        assert_eq!(Distribution::Gamma.initial_guess(7.0), [15.0, 3.0, 7.0]);
    }

    #[test]
    fn test_density_dispatch_matches_library() {
        let p = [2.0, 20.0, 50.0];
        assert_eq!(
            Distribution::Weibull.density(12.0, &p),
            weibull_density(12.0, 2.0, 20.0, 50.0)
        );
        assert_eq!(
            Distribution::Gamma.size_biased_density(12.0, &p, 2.0),
            gamma_size_biased_density(12.0, 2.0, 20.0, 50.0, 2.0)
        );
    }

    #[test]
    fn test_param_triple_checks_length() {
        assert_eq!(Distribution::param_triple(&[1.0, 2.0, 3.0]).unwrap(), &[1.0, 2.0, 3.0]);
        assert!(matches!(
            Distribution::param_triple(&[1.0, 2.0]),
            Err(DistFitError::Domain(_))
        ));
    }

    #[test]
    fn test_admits_positive_shape_and_scale() {
        assert!(Distribution::Weibull.admits(&[2.0, 20.0, 100.0]));
        assert!(Distribution::Gamma.admits(&[15.0, 3.0, 0.0]));
        assert!(!Distribution::Weibull.admits(&[-2.0, 11.7, 5.9e7]));
        assert!(!Distribution::Gamma.admits(&[15.0, 0.0, 10.0]));
        assert!(!Distribution::Weibull.admits(&[2.0, f64::NAN, 10.0]));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Distribution::Gamma).unwrap();
        assert_eq!(json, "\"gamma\"");
    }
}
