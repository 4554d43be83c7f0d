mod diameters;
mod generalized_gamma;

pub use diameters::Diameters;
pub use generalized_gamma::{
    gamma_density, gamma_size_biased_density, generalized_gamma_density, size_biased_density,
    weibull_density, weibull_size_biased_density, DEFAULT_SIZE_BIAS_ORDER,
};
