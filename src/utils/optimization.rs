//! Bounded Nelder-Mead minimisation for smoothing-parameter estimation.

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// The objective value at `optimal_point`.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    pub max_iter: usize,
    /// Stop once both the objective values and the vertices agree within this.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Relative size of the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    value: f64,
}

struct Problem<'a, F> {
    objective: F,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<F: Fn(&[f64]) -> f64> Problem<'_, F> {
    /// Clamp into bounds and evaluate. NaN objectives rank last.
    fn vertex(&self, mut point: Vec<f64>) -> Vertex {
        if let Some(bounds) = self.bounds {
            for (x, &(lo, hi)) in point.iter_mut().zip(bounds) {
                *x = x.clamp(lo, hi);
            }
        }
        let value = (self.objective)(&point);
        Vertex {
            point,
            value: if value.is_nan() { f64::INFINITY } else { value },
        }
    }
}

/// Move from `from` through `through` by `coef`: `from + coef * (through - from)`.
fn towards(from: &[f64], through: &[f64], coef: f64) -> Vec<f64> {
    from.iter()
        .zip(through)
        .map(|(a, b)| a + coef * (b - a))
        .collect()
}

/// Minimise `objective` starting from `initial`.
///
/// `bounds` holds one `(min, max)` pair per dimension; points are clamped
/// into the box before every evaluation.
///
/// # Example
/// ```
/// use epicast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 0.01);
/// assert!((result.optimal_point[1] - 3.0).abs() < 0.01);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let problem = Problem { objective, bounds };

    let mut simplex: Vec<Vertex> = Vec::with_capacity(n + 1);
    simplex.push(problem.vertex(initial.to_vec()));
    for i in 0..n {
        let mut point = initial.to_vec();
        let step = if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        point[i] += step;
        // A step that lands outside the box is mirrored back in.
        if let Some(&(lo, hi)) = bounds.and_then(|b| b.get(i)) {
            if point[i] > hi {
                point[i] = initial[i] - step;
            }
            point[i] = point[i].clamp(lo, hi);
        }
        simplex.push(problem.vertex(point));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        simplex.sort_by(|a, b| a.value.total_cmp(&b.value));

        let best = simplex[0].value;
        let worst = simplex[n].value;

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|v| v.point[j]).sum::<f64>() / n as f64)
            .collect();

        let spread = simplex
            .iter()
            .flat_map(|v| v.point.iter().zip(&centroid).map(|(a, c)| (a - c).abs()))
            .fold(0.0, f64::max);
        // Equal values alone can mean the simplex straddles the minimum.
        if (worst - best).abs() < config.tolerance && spread < config.tolerance {
            converged = true;
            break;
        }

        let reflected = problem.vertex(towards(&centroid, &simplex[n].point, -config.alpha));

        if reflected.value < best {
            let expanded = problem.vertex(towards(&centroid, &reflected.point, config.gamma));
            simplex[n] = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
            continue;
        }

        if reflected.value < simplex[n - 1].value {
            simplex[n] = reflected;
            continue;
        }

        let contracted = if reflected.value < worst {
            problem.vertex(towards(&centroid, &reflected.point, config.rho))
        } else {
            problem.vertex(towards(&centroid, &simplex[n].point, config.rho))
        };
        if contracted.value < reflected.value.min(worst) {
            simplex[n] = contracted;
            continue;
        }

        let anchor = simplex[0].point.clone();
        for vertex in simplex.iter_mut().skip(1) {
            *vertex = problem.vertex(towards(&anchor, &vertex.point, config.sigma));
        }
    }

    simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
    let best = simplex.swap_remove(0);

    NelderMeadResult {
        optimal_point: best.point,
        optimal_value: best.value,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_quadratic_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 1.5).powi(2) + 2.0 * (x[1] + 0.5).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.5, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], -0.5, epsilon = 1e-3);
        assert!(result.optimal_value < 1e-6);
    }

    #[test]
    fn respects_bounds() {
        // Unconstrained minimum at x = 2 lies outside [0, 1].
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2),
            &[0.5],
            Some(&[(0.0, 1.0)]),
            NelderMeadConfig::default(),
        );

        assert!(result.optimal_point[0] <= 1.0);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn initial_step_at_upper_bound_stays_feasible() {
        let result = nelder_mead(
            |x| (x[0] - 0.5).powi(2),
            &[1.0],
            Some(&[(0.0, 1.0)]),
            NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn symmetric_simplex_keeps_searching() {
        // Starting points 0.4 and 0.6 tie on the objective.
        let config = NelderMeadConfig {
            initial_step: 0.5,
            ..Default::default()
        };
        let result = nelder_mead(|x| (x[0] - 0.5).powi(2), &[0.4], None, config);
        assert!(result.converged);
        assert!(result.iterations > 1);
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn nan_objective_is_avoided() {
        let result = nelder_mead(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 0.2).powi(2) },
            &[0.5],
            None,
            NelderMeadConfig::default(),
        );
        assert_relative_eq!(result.optimal_point[0], 0.2, epsilon = 1e-3);
    }

    #[test]
    fn empty_problem_returns_nan() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());
        assert!(result.optimal_point.is_empty());
        assert!(result.optimal_value.is_nan());
        assert!(!result.converged);
    }
}
