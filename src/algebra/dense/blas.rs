#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(clippy::too_many_arguments)]

// standard imports via blas-lapack-rs crates
extern crate blas_src;
extern crate lapack_src;
use lapack::*;


pub trait BlasFloatT:
    private::BlasFloatSealed
    + XsyevrScalar
    + XgehrdScalar
    + XorghrScalar
    + XhseqrScalar
{}

impl BlasFloatT for f32 {}
impl BlasFloatT for f64 {}

mod private {
    pub trait BlasFloatSealed {}
    impl BlasFloatSealed for f32 {}
    impl BlasFloatSealed for f64 {}
}


// --------------------------------------
// ?syevr : Symmetric eigen decomposition
// --------------------------------------

pub trait XsyevrScalar: Sized {
    fn xsyevr(
        jobz: u8, range: u8, uplo: u8, n: i32, a: &mut [Self], lda: i32, vl: Self, vu: Self, il: i32, iu: i32,
        abstol: Self, m: &mut i32, w: &mut [Self], z: &mut [Self], ldz: i32, isuppz: &mut [i32],
        work: &mut [Self], lwork: i32, iwork: &mut [i32], liwork: i32, info: &mut i32,
    );
}

macro_rules! impl_blas_xsyevr {
    ($T:ty, $XSYEVR:path) => {
        impl XsyevrScalar for $T {
            fn xsyevr(
                jobz: u8, range: u8, uplo: u8, n: i32, a: &mut [Self], lda: i32, vl: Self, vu: Self, il: i32, iu: i32,
                abstol: Self, m: &mut i32, w: &mut [Self], z: &mut [Self], ldz: i32, isuppz: &mut [i32],
                work: &mut [$T], lwork: i32, iwork: &mut [i32], liwork: i32, info: &mut i32,
            ) {
                unsafe{
                    $XSYEVR(
                        jobz, range, uplo, n, a, lda, vl, vu, il, iu, abstol, m,
                        w, z, ldz, isuppz, work, lwork, iwork, liwork, info,
                    );
                }
            }
        }
    };
}
impl_blas_xsyevr!(f32, ssyevr);
impl_blas_xsyevr!(f64, dsyevr);


// --------------------------------------
// ?gehrd : reduction to upper Hessenberg form
// --------------------------------------

pub trait XgehrdScalar: Sized {
    fn xgehrd(
        n: i32, ilo: i32, ihi: i32, a: &mut [Self], lda: i32, tau: &mut [Self],
        work: &mut [Self], lwork: i32, info: &mut i32,
    );
}

macro_rules! impl_blas_xgehrd {
    ($T:ty, $XGEHRD:path) => {
        impl XgehrdScalar for $T {
            fn xgehrd(
                n: i32, ilo: i32, ihi: i32, a: &mut [Self], lda: i32, tau: &mut [Self],
                work: &mut [Self], lwork: i32, info: &mut i32,
            ) {
                unsafe{
                    $XGEHRD(
                        n, ilo, ihi, a, lda, tau, work, lwork, info
                    );
                }
            }
        }
    };
}
impl_blas_xgehrd!(f32, sgehrd);
impl_blas_xgehrd!(f64, dgehrd);


// --------------------------------------
// ?orghr : orthogonal factor of ?gehrd
// --------------------------------------

pub trait XorghrScalar: Sized {
    fn xorghr(
        n: i32, ilo: i32, ihi: i32, a: &mut [Self], lda: i32, tau: &mut [Self],
        work: &mut [Self], lwork: i32, info: &mut i32,
    );
}

macro_rules! impl_blas_xorghr {
    ($T:ty, $XORGHR:path) => {
        impl XorghrScalar for $T {
            fn xorghr(
                n: i32, ilo: i32, ihi: i32, a: &mut [Self], lda: i32, tau: &mut [Self],
                work: &mut [Self], lwork: i32, info: &mut i32,
            ) {
                unsafe{
                    $XORGHR(
                        n, ilo, ihi, a, lda, tau, work, lwork, info
                    );
                }
            }
        }
    };
}
impl_blas_xorghr!(f32, sorghr);
impl_blas_xorghr!(f64, dorghr);


// --------------------------------------
// ?hseqr : Schur factorization of a Hessenberg matrix
// --------------------------------------

pub trait XhseqrScalar: Sized {
    fn xhseqr(
        job: u8, compz: u8, n: i32, ilo: i32, ihi: i32, h: &mut [Self], ldh: i32,
        wr: &mut [Self], wi: &mut [Self], z: &mut [Self], ldz: i32,
        work: &mut [Self], lwork: i32, info: &mut i32,
    );
}

macro_rules! impl_blas_xhseqr {
    ($T:ty, $XHSEQR:path) => {
        impl XhseqrScalar for $T {
            fn xhseqr(
                job: u8, compz: u8, n: i32, ilo: i32, ihi: i32, h: &mut [Self], ldh: i32,
                wr: &mut [Self], wi: &mut [Self], z: &mut [Self], ldz: i32,
                work: &mut [Self], lwork: i32, info: &mut i32,
            ) {
                unsafe{
                    $XHSEQR(
                        job, compz, n, ilo, ihi, h, ldh, wr, wi, z, ldz, work, lwork, info
                    );
                }
            }
        }
    };
}
impl_blas_xhseqr!(f32, shseqr);
impl_blas_xhseqr!(f64, dhseqr);
