//! Dimensionality Reducer: two-component PCA fitted per batch.
//!
//! Embeddings are wide (hundreds to thousands of columns) while a batch is
//! short, so the fit works on the n×n Gram matrix of the centered data
//! instead of the d×d covariance. Its eigenvectors are the left singular
//! vectors of the data, and scaling them by the square root of their
//! eigenvalue gives the projected coordinates directly.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::ReduceError;

/// Number of output dimensions.
pub const COMPONENTS: usize = 2;

const MAX_SWEEPS: usize = 64;
/// Stop once the off-diagonal mass is this small relative to the whole
/// matrix; eigenvalue error is quadratic in it.
const CONVERGENCE_TOL: f64 = 1e-22;
/// Components whose variance is below this fraction of the largest one are
/// treated as absent.
const ZERO_VARIANCE_TOL: f64 = 1e-10;

/// Projects every vector onto the two principal axes of the batch.
///
/// Output is index-aligned with `vectors`. Coordinates are centered on the
/// batch mean and only comparable within one call.
pub fn project(vectors: &[Vec<f32>]) -> Result<Vec<[f64; COMPONENTS]>, ReduceError> {
    let data = to_matrix(vectors)?;
    let n = data.nrows();

    let mean = data
        .mean_axis(Axis(0))
        .ok_or(ReduceError::TooFewVectors(n))?;
    let centered = data - &mean;

    let gram = centered.dot(&centered.t());
    let (eigenvalues, eigenvectors, _) = symmetric_eigen(gram);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

    let largest = eigenvalues[order[0]].max(0.0);
    let mut points = vec![[0.0; COMPONENTS]; n];

    for (component, &k) in order.iter().take(COMPONENTS).enumerate() {
        let lambda = eigenvalues[k];
        if largest <= f64::MIN_POSITIVE || lambda <= largest * ZERO_VARIANCE_TOL {
            continue;
        }

        let u = eigenvectors.column(k);
        let scale = lambda.sqrt() * loading_sign(&centered, u);
        for (point, &weight) in points.iter_mut().zip(u.iter()) {
            point[component] = weight * scale;
        }
    }

    Ok(points)
}

fn to_matrix(vectors: &[Vec<f32>]) -> Result<Array2<f64>, ReduceError> {
    if vectors.len() < 2 {
        return Err(ReduceError::TooFewVectors(vectors.len()));
    }

    let dim = vectors[0].len();
    if dim == 0 {
        return Err(ReduceError::EmptyVectors);
    }

    for (index, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(ReduceError::DimensionMismatch {
                index,
                expected: dim,
                found: v.len(),
            });
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(ReduceError::NonFinite(index));
        }
    }

    Ok(Array2::from_shape_fn((vectors.len(), dim), |(i, j)| {
        f64::from(vectors[i][j])
    }))
}

/// +1 or -1 so that the component's largest-magnitude loading is positive.
fn loading_sign(centered: &Array2<f64>, u: ArrayView1<f64>) -> f64 {
    let loadings = centered.t().dot(&u);
    let dominant = loadings
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if dominant < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Cyclic Jacobi diagonalization of a symmetric matrix.
///
/// Returns the eigenvalues, a matrix whose columns are the matching unit
/// eigenvectors (both in no particular order) and the number of sweeps run.
fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>, usize) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);
    let total: f64 = a.iter().map(|x| x * x).sum();
    // entries this small cannot move any eigenvalue in f64
    let negligible = total.sqrt() * f64::EPSILON * 1e-2;
    let mut sweeps = 0;

    while sweeps < MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (0..n).filter(move |&q| q != p).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum();
        if off <= total * CONVERGENCE_TOL {
            break;
        }
        sweeps += 1;

        let mut rotations = 0;
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() <= negligible {
                    continue;
                }
                rotations += 1;

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }

        if rotations == 0 {
            break;
        }
    }

    (a.diag().to_owned(), v, sweeps)
}
