/// Elementwise evaluation over a single diameter or a sequence of diameters.
///
/// Densities are written once against a scalar kernel; this trait lifts the
/// kernel over whatever container the caller holds and returns a result of
/// the same shape (`f64` for a scalar, `Vec<f64>` for slices and vectors,
/// `[f64; N]` for arrays).
pub trait Diameters {
    type Output;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Self::Output;
}

impl Diameters for f64 {
    type Output = f64;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> f64 {
        f(self)
    }
}

impl Diameters for &[f64] {
    type Output = Vec<f64>;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Vec<f64> {
        self.iter().map(|&x| f(x)).collect()
    }
}

impl Diameters for &Vec<f64> {
    type Output = Vec<f64>;

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> Vec<f64> {
        self.as_slice().map_elementwise(f)
    }
}

impl<const N: usize> Diameters for [f64; N] {
    type Output = [f64; N];

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> [f64; N] {
        self.map(f)
    }
}

impl<const N: usize> Diameters for &[f64; N] {
    type Output = [f64; N];

    fn map_elementwise<F: Fn(f64) -> f64>(self, f: F) -> [f64; N] {
        self.map(f)
    }
}
