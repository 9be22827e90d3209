/// Normalized one-dimensional Gaussian weights.
///
/// The same weights are used by horizontal and vertical passes
/// because the filter is separable and isotropic.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    radius: u32,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Builds a truncated discrete Gaussian with `sigma = radius / 2`.
    ///
    /// Weights of offsets `-radius..=radius` are normalized so that their sum
    /// is equal to 1.0. It compensates the tails cut off by truncation.
    /// Zero radius gives an identity kernel with a single weight.
    pub fn new(radius: u32) -> Self {
        if radius == 0 {
            return Self {
                radius,
                weights: vec![1.0],
            };
        }
        let sigma = radius as f64 / 2.0;
        let denominator = 2.0 * sigma * sigma;
        let r = radius as i64;
        let mut weights: Vec<f64> = (-r..=r)
            .map(|x| (-((x * x) as f64) / denominator).exp())
            .collect();

        let sum: f64 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);
        Self { radius, weights }
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Weights of offsets from `-radius` to `radius`.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Count of taps, always `2 * radius + 1`.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        for radius in [1, 2, 3, 5, 10, 50, 100] {
            let kernel = GaussianKernel::new(radius);
            assert_eq!(kernel.len(), 2 * radius as usize + 1);
            let sum: f64 = kernel.weights().iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "radius={radius} sum={sum}");
        }
    }

    #[test]
    fn weights_are_symmetric_and_peak_in_center() {
        let kernel = GaussianKernel::new(7);
        let weights = kernel.weights();
        let center = kernel.radius() as usize;
        for i in 0..center {
            assert_eq!(weights[i], weights[weights.len() - 1 - i]);
            assert!(weights[i] < weights[i + 1]);
        }
    }

    #[test]
    fn three_taps_kernel() {
        let kernel = GaussianKernel::new(1);
        // sigma = 0.5, so side weight is exp(-2) before normalization
        let side = (-2f64).exp();
        let sum = 1.0 + 2.0 * side;
        let expected = [side / sum, 1.0 / sum, side / sum];
        for (w, e) in kernel.weights().iter().zip(expected) {
            assert!((w - e).abs() < 1e-15);
        }
    }

    #[test]
    fn zero_radius_is_identity() {
        let kernel = GaussianKernel::new(0);
        assert_eq!(kernel.weights(), &[1.0]);
    }
}
