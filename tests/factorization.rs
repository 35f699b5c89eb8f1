#![allow(non_snake_case)]

use krylov::{algebra::*, solver::*};
use std::rc::Rc;

fn test_matrix(n: usize) -> Matrix<f64> {
    // nonsymmetric with a dominant diagonal, so that the Krylov spaces used
    // here have full dimension
    let mut A = Matrix::zeros((n, n));
    for j in 0..n {
        for i in 0..n {
            A[(i, j)] = ((7 * i + 13 * j) % 11) as f64 / 11.0 - 0.5;
        }
        A[(j, j)] += (j + 1) as f64;
    }
    A
}

fn start_basis(n: usize, capacity: usize, B: Option<OperatorHandle<f64>>) -> (Basis<f64>, Orthogonalizer<f64>) {
    let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
    let mut basis = Basis::new(n, capacity, B, 42);
    assert!(basis.set_random_column(0, &orth).unwrap());
    (basis, orth)
}

// ‖OP*V - V*H - f*e_m'‖ over the first m columns
fn arnoldi_relation_error(
    op: &dyn Fn(&[f64], &mut [f64]),
    basis: &Basis<f64>,
    H: &Matrix<f64>,
    f: &[f64],
    m: usize,
) -> f64 {
    let n = basis.n();
    let mut err = 0.0f64;
    for j in 0..m {
        let mut r = vec![0.; n];
        op(basis.column(j), &mut r);
        for i in 0..m {
            r.axpby(-H[(i, j)], basis.column(i), 1.0);
        }
        if j == m - 1 {
            r.axpby(-1.0, f, 1.0);
        }
        err = err.max(r.norm());
    }
    err
}

#[test]
fn test_arnoldi_relation() {
    let (n, m) = (12, 7);
    let A = test_matrix(n);
    let (mut basis, orth) = start_basis(n, m, None);
    let mut H = Matrix::zeros((m, m));
    let mut f = vec![0.; n];

    let out = extend_factorization(
        &A,
        FactorizationMode::Direct,
        &orth,
        &mut basis,
        Projection::Hessenberg(&mut H),
        &mut f,
        0,
        m,
    )
    .unwrap();

    assert_eq!(out.m, m);
    assert!(!out.breakdown);
    assert!((out.beta - f.norm()).abs() < 1e-12);
    assert!(basis.orthonormality_error(m).unwrap() < 1e-12);
    for j in 0..m {
        assert!(basis.column(j).dot(&f).abs() < 1e-12);
        for i in (j + 2)..m {
            assert_eq!(H[(i, j)], 0.);
        }
    }
    let apply = |x: &[f64], y: &mut [f64]| A.gemv(y, x, 1.0, 0.0);
    assert!(arnoldi_relation_error(&apply, &basis, &H, &f, m) < 1e-11);
}

#[test]
fn test_transpose_mode() {
    let (n, m) = (10, 6);
    let A = test_matrix(n);
    let (mut basis, orth) = start_basis(n, m, None);
    let mut H = Matrix::zeros((m, m));
    let mut f = vec![0.; n];

    extend_factorization(
        &A,
        FactorizationMode::Transpose,
        &orth,
        &mut basis,
        Projection::Hessenberg(&mut H),
        &mut f,
        0,
        m,
    )
    .unwrap();

    let At = explicit_transpose(&A);
    let apply = |x: &[f64], y: &mut [f64]| At.gemv(y, x, 1.0, 0.0);
    assert!(arnoldi_relation_error(&apply, &basis, &H, &f, m) < 1e-11);
}

fn explicit_transpose(A: &Matrix<f64>) -> Matrix<f64> {
    let mut At = Matrix::zeros((A.n, A.m));
    for j in 0..A.n {
        for i in 0..A.m {
            At[(j, i)] = A[(i, j)];
        }
    }
    At
}

#[test]
fn test_extension_in_two_steps() {
    let (n, m) = (12, 8);
    let A = test_matrix(n);

    // reference in one call
    let (mut basis1, orth) = start_basis(n, m, None);
    let mut H1 = Matrix::zeros((m, m));
    let mut f1 = vec![0.; n];
    extend_factorization(
        &A,
        FactorizationMode::Direct,
        &orth,
        &mut basis1,
        Projection::Hessenberg(&mut H1),
        &mut f1,
        0,
        m,
    )
    .unwrap();

    // first 4 columns, then continue from the normalized residual
    let (mut basis2, _) = start_basis(n, m, None);
    let mut H2 = Matrix::zeros((m, m));
    let mut f2 = vec![0.; n];
    let out = extend_factorization(
        &A,
        FactorizationMode::Direct,
        &orth,
        &mut basis2,
        Projection::Hessenberg(&mut H2),
        &mut f2,
        0,
        4,
    )
    .unwrap();
    H2[(4, 3)] = out.beta;
    f2.scale(out.beta.recip());
    basis2.column_mut(4).copy_from(&f2);
    extend_factorization(
        &A,
        FactorizationMode::Direct,
        &orth,
        &mut basis2,
        Projection::Hessenberg(&mut H2),
        &mut f2,
        4,
        m,
    )
    .unwrap();

    assert!(H1.data.norm_inf_diff(&H2.data) < 1e-10);
    assert!(f1.dist(&f2) < 1e-10);
}

// start vector in the span of e₀ and e₁, an invariant subspace of A
fn breakdown_start(n: usize, capacity: usize) -> Basis<f64> {
    let mut basis = Basis::new(n, capacity, None, 0);
    let v0 = basis.column_mut(0);
    v0[0] = std::f64::consts::FRAC_1_SQRT_2;
    v0[1] = std::f64::consts::FRAC_1_SQRT_2;
    basis
}

fn breakdown_factorization(m: usize) -> (FactorizationOutcome<f64>, Basis<f64>, Matrix<f64>, Vec<f64>) {
    let n = 6;
    let A = Matrix::<f64>::diagonal(&[1., 2., 3., 4., 5., 6.]);
    let orth = Orthogonalizer::from(&EigenSettings::<f64>::default());
    let mut basis = breakdown_start(n, 5);
    let mut H = Matrix::zeros((5, 5));
    let mut f = vec![0.; n];
    let out = extend_factorization(
        &A,
        FactorizationMode::Direct,
        &orth,
        &mut basis,
        Projection::Hessenberg(&mut H),
        &mut f,
        0,
        m,
    )
    .unwrap();
    (out, basis, H, f)
}

#[test]
fn test_invariant_subspace_breakdown() {
    let (out, basis, H, _) = breakdown_factorization(5);

    assert!(out.breakdown);
    assert_eq!(out.m, 2);
    assert!(out.beta < 1e-12);
    assert_eq!(basis.active(), (0, 2));

    // the projection holds the spectrum of the subspace
    let mut eng = SymEigenEngine::new(2);
    eng.eigen(&H.submatrix(0..2, 0..2)).unwrap();
    assert!(eng.λ.dist(&[1., 2.]) < 1e-12);
}

#[test]
fn test_breakdown_is_reproducible() {
    let (out, basis, H, f) = breakdown_factorization(5);
    let (again, basis_again, H_again, f_again) = breakdown_factorization(5);
    assert_eq!(out, again);
    assert_eq!(H, H_again);
    assert_eq!(f, f_again);
    assert_eq!(basis.column(1), basis_again.column(1));

    // asking for the truncated size directly gives the same factorization,
    // now ending in a regular last column
    let (short, _, H_short, f_short) = breakdown_factorization(out.m);
    assert!(!short.breakdown);
    assert_eq!(short.m, out.m);
    assert_eq!(short.beta.to_bits(), out.beta.to_bits());
    assert_eq!(H_short.submatrix(0..2, 0..2), H.submatrix(0..2, 0..2));
    assert_eq!(f_short, f);
}

#[test]
fn test_b_orthonormal_basis() {
    let n = 10;
    let A = Matrix::<f64>::tridiagonal(&vec![2.; n], &vec![-1.; n - 1]);
    let Bd: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 / n as f64).collect();
    let B: OperatorHandle<f64> = Rc::new(Matrix::diagonal(&Bd));

    let (mut basis, orth) = start_basis(n, 6, Some(B));
    let mut alpha = vec![0.; 6];
    let mut beta = vec![0.; 6];
    let mut f = vec![0.; n];

    // Lanczos on B⁻¹A, which is self-adjoint in the B inner product
    let op = FnOperator::new(n, n, move |x: &[f64], y: &mut [f64]| {
        A.gemv(y, x, 1.0, 0.0);
        for i in 0..y.len() {
            y[i] /= Bd[i];
        }
    });
    extend_factorization(
        &op,
        FactorizationMode::Direct,
        &orth,
        &mut basis,
        Projection::Tridiagonal {
            alpha: &mut alpha,
            beta: &mut beta,
        },
        &mut f,
        0,
        6,
    )
    .unwrap();

    assert!(basis.orthonormality_error(6).unwrap() < 1e-12);
    assert!(alpha.iter().all(|a| a.is_finite()));
    assert!(beta[0..5].iter().all(|&b| b > 0.));
}
