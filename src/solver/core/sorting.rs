use crate::algebra::*;
use crate::solver::core::Which;
use std::cmp::Ordering;

// order on keys with NaN last in either direction
fn cmp_keys<T: FloatT>(a: T, b: T, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => {
            let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Ordering of two eigenvalues `(re, im)` under `which`.  `Less` means
/// that `a` is preferred.
pub fn compare_eigenvalues<T: FloatT>(which: Which, target: T, a: (T, T), b: (T, T)) -> Ordering {
    let (ar, ai) = a;
    let (br, bi) = b;
    match which {
        Which::LargestMagnitude => cmp_keys(T::hypot(ar, ai), T::hypot(br, bi), true),
        Which::SmallestMagnitude => cmp_keys(T::hypot(ar, ai), T::hypot(br, bi), false),
        Which::LargestReal => cmp_keys(ar, br, true),
        Which::SmallestReal => cmp_keys(ar, br, false),
        Which::LargestImaginary => cmp_keys(T::abs(ai), T::abs(bi), true),
        Which::SmallestImaginary => cmp_keys(T::abs(ai), T::abs(bi), false),
        Which::TargetMagnitude => {
            cmp_keys(T::hypot(ar - target, ai), T::hypot(br - target, bi), false)
        }
        Which::TargetReal => cmp_keys(T::abs(ar - target), T::abs(br - target), false),
    }
}

/// Permutation that sorts the eigenvalues `(eigr, eigi)` by `which`.
///
/// Entries with non-zero imaginary part are taken to be members of a
/// conjugate pair stored in adjacent positions.  A pair moves as one unit,
/// ordered with the positive imaginary part first.  The sort is stable.
pub fn sort_eigenvalues<T: FloatT>(which: Which, target: T, eigr: &[T], eigi: &[T]) -> Vec<usize> {
    assert_eq!(eigr.len(), eigi.len());
    let n = eigr.len();

    // (representative index, members)
    let mut groups: Vec<(usize, [usize; 2], usize)> = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        if eigi[i] != T::zero() && i + 1 < n {
            if eigi[i] > T::zero() {
                groups.push((i, [i, i + 1], 2));
            } else {
                groups.push((i + 1, [i + 1, i], 2));
            }
            i += 2;
        } else {
            groups.push((i, [i, i], 1));
            i += 1;
        }
    }

    groups.sort_by(|a, b| {
        compare_eigenvalues(
            which,
            target,
            (eigr[a.0], eigi[a.0]),
            (eigr[b.0], eigi[b.0]),
        )
    });

    groups
        .iter()
        .flat_map(|(_, members, len)| members[0..*len].iter().copied())
        .collect()
}

#[test]
fn test_sort_eigenvalues() {
    // 3, 1 ± 2i, -4, 0.5
    let eigr = [3., 1., 1., -4., 0.5];
    let eigi = [0., -2., 2., 0., 0.];

    let perm = sort_eigenvalues(Which::LargestMagnitude, 0., &eigr, &eigi);
    assert_eq!(perm, [3, 0, 2, 1, 4]);

    let perm = sort_eigenvalues(Which::SmallestReal, 0., &eigr, &eigi);
    assert_eq!(perm, [3, 4, 2, 1, 0]);

    let perm = sort_eigenvalues(Which::LargestImaginary, 0., &eigr, &eigi);
    assert_eq!(perm, [2, 1, 0, 3, 4]);

    let perm = sort_eigenvalues(Which::TargetReal, 2.9, &eigr, &eigi);
    assert_eq!(perm, [0, 2, 1, 4, 3]);

    let perm = sort_eigenvalues(Which::TargetMagnitude, 1.2, &eigr, &eigi);
    assert_eq!(perm, [4, 0, 2, 1, 3]);
}

#[test]
fn test_compare_nan_last() {
    let nan = f64::NAN;
    assert_eq!(
        compare_eigenvalues(Which::SmallestReal, 0., (nan, 0.), (1., 0.)),
        Ordering::Greater
    );
    assert_eq!(
        compare_eigenvalues(Which::LargestReal, 0., (1., 0.), (nan, 0.)),
        Ordering::Less
    );
}
