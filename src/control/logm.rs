//! Principal matrix logarithm and eigenvalues for real square matrices.
//!
//! The logarithm uses inverse scaling and squaring: Denman-Beavers square
//! roots bring the matrix close to the identity, the `atanh` series
//! `log X = 2 (Z + Z^3/3 + Z^5/5 + ...)` with `Z = (X - I)(X + I)^-1` is
//! summed there, and the result is scaled back by the number of roots taken.
//! Everything stays in real arithmetic, which is valid as long as no
//! eigenvalue sits on the closed negative real axis.

use nalgebra as na;

use crate::error::{TunerError, TunerResult};

/// Square roots are taken until `||X - I||_F` drops below this.
const SQRT_TARGET: f64 = 0.25;
const MAX_SQUARE_ROOTS: usize = 64;
const MAX_SQRT_ITERATIONS: usize = 100;
const SQRT_TOLERANCE: f64 = 1e-12;
const MAX_SERIES_TERMS: usize = 200;
/// Singularity is judged against the spectral radius, the branch cut
/// against each eigenvalue's own modulus.
const BRANCH_TOLERANCE: f64 = 1e-8;
const SCHUR_MAX_ITERATIONS: usize = 10_000;

/// Eigenvalues of a real square matrix, in the order the Schur form yields them.
pub fn eigenvalues(mat: &na::DMatrix<f64>) -> TunerResult<Vec<na::Complex<f64>>> {
    if !mat.is_square() {
        return Err(TunerError::DimensionMismatch {
            what: "eigenvalue input",
            expected: (mat.nrows(), mat.nrows()),
            found: mat.shape(),
        });
    }
    if mat.nrows() == 0 {
        return Ok(Vec::new());
    }
    if mat.iter().any(|v| !v.is_finite()) {
        return Err(TunerError::SingularTransform(
            "matrix has non-finite entries".to_string(),
        ));
    }

    let schur = na::linalg::Schur::try_new(mat.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS)
        .ok_or_else(|| {
            TunerError::SingularTransform("Schur decomposition did not converge".to_string())
        })?;

    Ok(schur.complex_eigenvalues().iter().cloned().collect())
}

/// Fails if the principal logarithm of `mat` is undefined: a (numerically)
/// zero eigenvalue, or a real eigenvalue on the negative axis.
pub fn check_principal_branch(mat: &na::DMatrix<f64>) -> TunerResult<()> {
    let spectrum = eigenvalues(mat)?;
    let radius = spectrum.iter().map(|lambda| lambda.norm()).fold(0.0, f64::max);

    for lambda in spectrum {
        if lambda.norm() <= BRANCH_TOLERANCE * radius {
            return Err(TunerError::SingularTransform(format!(
                "matrix is singular (eigenvalue {lambda})"
            )));
        }
        if lambda.re < 0.0 && lambda.im.abs() <= BRANCH_TOLERANCE * lambda.norm() {
            return Err(TunerError::SingularTransform(format!(
                "eigenvalue {lambda} lies on the branch cut of the logarithm"
            )));
        }
    }

    Ok(())
}

/// Principal square root by the Denman-Beavers iteration.
pub fn sqrtm(mat: &na::DMatrix<f64>) -> TunerResult<na::DMatrix<f64>> {
    let n = mat.nrows();
    let mut mat_y = mat.clone();
    let mut mat_z = na::DMatrix::<f64>::identity(n, n);

    for _ in 0..MAX_SQRT_ITERATIONS {
        let y_inv = mat_y.clone().try_inverse().ok_or_else(|| {
            TunerError::SingularTransform("square root iterate is singular".to_string())
        })?;
        let z_inv = mat_z.clone().try_inverse().ok_or_else(|| {
            TunerError::SingularTransform("square root iterate is singular".to_string())
        })?;

        let y_next = (&mat_y + z_inv).scale(0.5);
        let z_next = (&mat_z + y_inv).scale(0.5);
        let step = (&y_next - &mat_y).norm();

        mat_y = y_next;
        mat_z = z_next;

        if !step.is_finite() {
            break;
        }
        if step <= SQRT_TOLERANCE * mat_y.norm() {
            return Ok(mat_y);
        }
    }

    Err(TunerError::SingularTransform(
        "square root iteration did not converge".to_string(),
    ))
}

/// Principal logarithm of a real square matrix.
pub fn logm(mat: &na::DMatrix<f64>) -> TunerResult<na::DMatrix<f64>> {
    if !mat.is_square() {
        return Err(TunerError::DimensionMismatch {
            what: "logarithm input",
            expected: (mat.nrows(), mat.nrows()),
            found: mat.shape(),
        });
    }
    let n = mat.nrows();
    if n == 0 {
        return Ok(mat.clone());
    }

    check_principal_branch(mat)?;

    let mat_i = na::DMatrix::<f64>::identity(n, n);

    // Inverse scaling: X^(1/2^s) close to I
    let mut mat_x = mat.clone();
    let mut roots = 0usize;
    while (&mat_x - &mat_i).norm() > SQRT_TARGET {
        if roots == MAX_SQUARE_ROOTS {
            return Err(TunerError::SingularTransform(
                "too many square roots needed".to_string(),
            ));
        }
        mat_x = sqrtm(&mat_x)?;
        roots += 1;
    }

    let denominator = (&mat_x + &mat_i).try_inverse().ok_or_else(|| {
        TunerError::SingularTransform("X + I is singular".to_string())
    })?;
    let mat_z = (&mat_x - &mat_i) * denominator;
    let mat_z2 = &mat_z * &mat_z;

    let mut term = mat_z.clone();
    let mut sum = mat_z;
    let mut converged = false;
    for k in 1..MAX_SERIES_TERMS {
        term = &term * &mat_z2;
        let contribution = term.unscale((2 * k + 1) as f64);
        sum += &contribution;
        if contribution.norm() <= f64::EPSILON * sum.norm() {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(TunerError::SingularTransform(
            "logarithm series did not converge".to_string(),
        ));
    }

    // Squaring phase
    let log = sum.scale(2f64.powi(roots as i32 + 1));

    if log.iter().any(|v| !v.is_finite()) {
        return Err(TunerError::SingularTransform(
            "logarithm has non-finite entries".to_string(),
        ));
    }

    Ok(log)
}
