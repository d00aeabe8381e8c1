//! Miscellaneous tools.

use std::ops::Add;
use ndarray::{ self as nd, Ix1 };
use ndarray_linalg::Scalar;
use num_traits::Zero;
use crate::Arr2;

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
pub fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    (dx / two) * (y[0] + two * y.slice(nd::s![1..n - 1]).sum() + y[n - 1])
}

/// Integrate a function sampled on a rectangular grid using the trapezoidal
/// rule along both axes.
///
/// *Panics if either axis has length less than 2*.
pub fn trapz2<S, A>(z: &Arr2<S>, dx: A, dy: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let rows: nd::Array1<A>
        = z.outer_iter()
        .map(|row| trapz(&row, dy))
        .collect();
    trapz(&rows, dx)
}

/// Euclidean norm of a coefficient vector.
pub fn norm<S, A>(c: &nd::ArrayBase<S, Ix1>) -> A::Real
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    c.iter().map(|ck| ck.square())
        .fold(<A as Scalar>::Real::zero(), <A as Scalar>::Real::add)
        .sqrt()
}

/// Renormalize a coefficient vector in place; the zero vector is left as is.
pub fn normalize<S, A>(c: &mut nd::ArrayBase<S, Ix1>)
where
    S: nd::DataMut<Elem = A>,
    A: Scalar,
{
    let nrm = norm(c);
    if nrm > <A as Scalar>::Real::zero() {
        let nrm = A::from_real(nrm);
        c.iter_mut().for_each(|ck| { *ck /= nrm; });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapz_quadratic() {
        let x = nd::Array1::linspace(0.0, 1.0, 1001);
        let y = x.mapv(|xk: f64| xk * xk);
        assert!((trapz(&y, 1e-3) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn trapz2_product() {
        let x = nd::Array1::linspace(0.0, 2.0, 201);
        let y = nd::Array1::linspace(0.0, 1.0, 101);
        let z = nd::Array2::from_shape_fn((201, 101), |(i, j)| x[i] * y[j]);
        assert!((trapz2(&z, 0.01, 0.01) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_vector() {
        let mut c = nd::array![3.0, 0.0, -4.0];
        assert_eq!(norm(&c), 5.0);
        normalize(&mut c);
        assert!((norm(&c) - 1.0).abs() < 1e-15);
        let mut z: nd::Array1<f64> = nd::Array1::zeros(3);
        normalize(&mut z);
        assert_eq!(z, nd::Array1::<f64>::zeros(3));
    }
}
