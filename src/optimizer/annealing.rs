//! Simulated-annealing acceptance.
//!
//! # Reference
//! Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

use rand::Rng;

/// Probability of replacing an incumbent with fitness `old` by a
/// challenger with fitness `new` (maximization).
///
/// 1 when `new >= old`, else `exp((new - old) / temperature)`. A
/// non-positive temperature accepts improvements only.
pub fn accept_probability(new: f64, old: f64, temperature: f64) -> f64 {
    if new >= old {
        1.0
    } else if temperature <= 0.0 {
        0.0
    } else {
        ((new - old) / temperature).exp()
    }
}

/// Draws the acceptance decision.
pub fn accept<R: Rng>(new: f64, old: f64, temperature: f64, rng: &mut R) -> bool {
    let p = accept_probability(new, old, temperature);
    p >= 1.0 || rng.random::<f64>() < p
}

/// Geometric cooling schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    current: f64,
    cooling_rate: f64,
}

impl Temperature {
    pub fn new(initial: f64, cooling_rate: f64) -> Self {
        Self {
            current: initial,
            cooling_rate,
        }
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Multiplies the temperature by the cooling rate.
    pub fn cool(&mut self) {
        self.current *= self.cooling_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_improvement_always_accepted() {
        assert_eq!(accept_probability(10.0, 5.0, 1.0), 1.0);
        assert_eq!(accept_probability(5.0, 5.0, 0.0), 1.0);
    }

    #[test]
    fn test_regression_probability() {
        let p = accept_probability(90.0, 100.0, 10.0);
        assert!((p - (-1.0f64).exp()).abs() < 1e-12);
        assert_eq!(accept_probability(90.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn test_colder_is_stricter() {
        let hot = accept_probability(90.0, 100.0, 100.0);
        let cold = accept_probability(90.0, 100.0, 1.0);
        assert!(hot > cold);
    }

    #[test]
    fn test_accept_rate_tracks_probability() {
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 10_000;
        let hits = (0..n).filter(|_| accept(95.0, 100.0, 5.0, &mut rng)).count();
        let rate = hits as f64 / n as f64;
        assert!((rate - (-1.0f64).exp()).abs() < 0.03, "rate = {rate}");
    }

    #[test]
    fn test_cooling() {
        let mut t = Temperature::new(100.0, 0.5);
        t.cool();
        t.cool();
        assert!((t.current() - 25.0).abs() < 1e-12);
    }
}
