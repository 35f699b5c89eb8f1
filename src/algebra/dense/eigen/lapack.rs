#![allow(non_snake_case)]

use crate::algebra::*;

// LAPACK backed dense eigenvalue problems.  Work vectors are sized by
// a workspace query on first use and kept for subsequent calls.

#[derive(Debug, Clone)]
pub(crate) struct SchurBlasWorkVectors<T> {
    tau: Vec<T>,
    work: Vec<T>,
}

impl<T> SchurBlasWorkVectors<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        // at least 1 element since the required
        // work size is written into the first one
        let tau = vec![T::zero(); usize::max(n, 2) - 1];
        let work = vec![T::one()];
        Self { tau, work }
    }

    fn ensure_work(&mut self, lwork: T) {
        let lwork = lwork.to_usize().unwrap_or(1).max(1);
        if self.work.len() < lwork {
            self.work.resize(lwork, T::zero());
        }
    }
}

/// `A = U*S*U'` via ?gehrd / ?orghr / ?hseqr
pub(crate) fn lapack_schur<T: FloatT>(
    A: &Matrix<T>,
    S: &mut Matrix<T>,
    U: &mut Matrix<T>,
    wr: &mut [T],
    wi: &mut [T],
    blas: &mut SchurBlasWorkVectors<T>,
) -> Result<(), DenseFactorizationError> {
    let nn = A.nrows();
    if nn == 0 {
        return Ok(());
    }
    if blas.tau.len() + 1 < nn {
        blas.tau.resize(nn - 1, T::zero());
    }
    let n: i32 = nn
        .try_into()
        .map_err(|_| DenseFactorizationError::IncompatibleDimension)?;
    let (ilo, ihi) = (1_i32, n);
    let info = &mut 0_i32;

    S.data.copy_from(&A.data);

    // Hessenberg reduction, with a workspace query first
    let mut lwork = -1_i32;
    for i in 0..2 {
        T::xgehrd(n, ilo, ihi, S.data_mut(), n, &mut blas.tau, &mut blas.work, lwork, info);
        if *info != 0 {
            return Err(DenseFactorizationError::Hessenberg(*info));
        }
        if i == 0 {
            blas.ensure_work(blas.work[0]);
            lwork = blas.work.len() as i32;
        }
    }

    // explicit orthogonal factor from the reflectors left in S
    U.data.copy_from(&S.data);
    let mut lwork = -1_i32;
    for i in 0..2 {
        T::xorghr(n, ilo, ihi, U.data_mut(), n, &mut blas.tau, &mut blas.work, lwork, info);
        if *info != 0 {
            return Err(DenseFactorizationError::Hessenberg(*info));
        }
        if i == 0 {
            blas.ensure_work(blas.work[0]);
            lwork = blas.work.len() as i32;
        }
    }

    for j in 0..nn {
        for i in (j + 2)..nn {
            S[(i, j)] = T::zero();
        }
    }

    // Schur form of the Hessenberg matrix, accumulating into U
    let (job, compz) = (b'S', b'V');
    let mut lwork = -1_i32;
    for i in 0..2 {
        T::xhseqr(
            job, compz, n, ilo, ihi, S.data_mut(), n, wr, wi, U.data_mut(), n,
            &mut blas.work, lwork, info,
        );
        if *info != 0 {
            return Err(DenseFactorizationError::Schur(*info));
        }
        if i == 0 {
            blas.ensure_work(blas.work[0]);
            lwork = blas.work.len() as i32;
        }
    }

    super::schur::clean_quasi_triangular(S, wi);
    Ok(())
}

#[derive(Debug, Clone)]
pub(crate) struct EigBlasWorkVectors<T> {
    isuppz: Vec<i32>,
    work: Vec<T>,
    iwork: Vec<i32>,
    A: Matrix<T>,
}

impl<T> EigBlasWorkVectors<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let isuppz = vec![0; 2 * n];
        let work = vec![T::one()];
        let iwork = vec![1];
        let A = Matrix::zeros((n, n));
        Self {
            isuppz,
            work,
            iwork,
            A,
        }
    }
}

/// Symmetric eigendecomposition via ?syevr.  On entry `V` holds the
/// matrix, on exit its eigenvectors with `d` in ascending order.
pub(crate) fn lapack_symeigen<T: FloatT>(
    V: &mut Matrix<T>,
    d: &mut [T],
    blas: &mut EigBlasWorkVectors<T>,
) -> Result<(), DenseFactorizationError> {
    let nn = V.nrows();
    if nn == 0 {
        return Ok(());
    }
    if blas.A.nrows() != nn {
        *blas = EigBlasWorkVectors::new(nn);
    }
    blas.A.data.copy_from(&V.data);

    // standard ?syevr arguments for computing a full set of eigenpairs
    let jobz = b'V';
    let range = b'A';
    let uplo = b'U';
    let n: i32 = nn
        .try_into()
        .map_err(|_| DenseFactorizationError::IncompatibleDimension)?;
    let (vl, vu) = (T::zero(), T::zero());
    let (il, iu) = (0_i32, 0_i32);
    let abstol = -T::one(); // forces default tolerance
    let m = &mut 0_i32;
    let mut lwork = -1_i32;
    let mut liwork = -1_i32;
    let info = &mut 0_i32;

    for i in 0..2 {
        T::xsyevr(
            jobz, range, uplo, n, blas.A.data_mut(), n, vl, vu, il, iu, abstol, m, d,
            V.data_mut(), n, &mut blas.isuppz, &mut blas.work, lwork, &mut blas.iwork, liwork,
            info,
        );
        if *info != 0 {
            return Err(DenseFactorizationError::SymEigen(*info));
        }
        if i == 0 {
            lwork = blas.work[0].to_i32().unwrap_or(1).max(1);
            liwork = blas.iwork[0].max(1);
            blas.work.resize(lwork as usize, T::zero());
            blas.iwork.resize(liwork as usize, 0);
        }
    }
    Ok(())
}
