//! Dense row-major 2D matrix used for fields, kernels and spectra.
//!
//! Operators are functional: every elementwise operation allocates a fresh
//! result, so callers never alias each other's data. Shape mismatches and
//! out-of-range subscripts are programmer errors and panic at the call site.

use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use num_complex::Complex;

/// Real-valued field matrix.
pub type RealMatrix = Matrix<f32>;

/// Complex-valued spectrum matrix.
pub type ComplexMatrix = Matrix<Complex<f32>>;

/// Dense row-major matrix. Element (r, c) lives at `data[r * width + c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Create a matrix from a flat row-major buffer.
    ///
    /// Panics if `data.len() != height * width`.
    pub fn from_flat(height: usize, width: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            height * width,
            "flat buffer does not correspond with shape {}x{}",
            height,
            width
        );
        Self {
            height,
            width,
            data,
        }
    }

    /// Shape as `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total element count.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat row-major view of the data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat row-major view of the data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply a pure transform elementwise, producing a matrix of a possibly
    /// different element type.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Matrix<U> {
        Matrix {
            height: self.height,
            width: self.width,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy + Default> Matrix<T> {
    /// Matrix filled with the element default (zero for numeric types).
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![T::default(); height * width],
        }
    }
}

impl<T: Copy> Matrix<T> {
    /// Circularly shift rows forward: row `r` of the input lands at row
    /// `(r + shift) mod height`. Negative shifts wrap, numpy.roll style.
    pub fn roll_rows(&self, shift: isize) -> Self {
        let h = self.height as isize;
        if h == 0 {
            return self.clone();
        }
        let shift = shift.rem_euclid(h) as usize;
        let mut data = Vec::with_capacity(self.data.len());
        for r in 0..self.height {
            let src = (r + self.height - shift) % self.height;
            data.extend_from_slice(&self.data[src * self.width..(src + 1) * self.width]);
        }
        Self {
            height: self.height,
            width: self.width,
            data,
        }
    }

    /// Circularly shift columns forward, with the same wrap semantics as
    /// [`roll_rows`](Self::roll_rows).
    pub fn roll_cols(&self, shift: isize) -> Self {
        let w = self.width as isize;
        if w == 0 {
            return self.clone();
        }
        let shift = shift.rem_euclid(w) as usize;
        let mut data = Vec::with_capacity(self.data.len());
        for r in 0..self.height {
            let row = &self.data[r * self.width..(r + 1) * self.width];
            data.extend_from_slice(&row[self.width - shift..]);
            data.extend_from_slice(&row[..self.width - shift]);
        }
        Self {
            height: self.height,
            width: self.width,
            data,
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.height, "row index {} out of range", row);
        assert!(col < self.width, "col index {} out of range", col);
        &self.data[row * self.width + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.height, "row index {} out of range", row);
        assert!(col < self.width, "col index {} out of range", col);
        &mut self.data[row * self.width + col]
    }
}

macro_rules! impl_elementwise {
    ($trait:ident, $method:ident) => {
        impl<T: Copy + $trait<Output = T>> $trait for Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: Matrix<T>) -> Matrix<T> {
                assert_eq!(self.shape(), rhs.shape(), "shape mismatch in elementwise op");
                Matrix {
                    height: self.height,
                    width: self.width,
                    data: self
                        .data
                        .iter()
                        .zip(rhs.data.iter())
                        .map(|(&a, &b)| a.$method(b))
                        .collect(),
                }
            }
        }

        impl<T: Copy + $trait<Output = T>> $trait<T> for Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: T) -> Matrix<T> {
                self.map(|&a| a.$method(rhs))
            }
        }
    };
}

impl_elementwise!(Add, add);
impl_elementwise!(Sub, sub);
impl_elementwise!(Mul, mul);
impl_elementwise!(Div, div);

impl Add<Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn add(self, rhs: Matrix<f32>) -> Matrix<f32> {
        rhs.map(|&v| self + v)
    }
}

impl Sub<Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn sub(self, rhs: Matrix<f32>) -> Matrix<f32> {
        rhs.map(|&v| self - v)
    }
}

impl Mul<Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn mul(self, rhs: Matrix<f32>) -> Matrix<f32> {
        rhs.map(|&v| self * v)
    }
}

impl Div<Matrix<f32>> for f32 {
    type Output = Matrix<f32>;

    fn div(self, rhs: Matrix<f32>) -> Matrix<f32> {
        rhs.map(|&v| self / v)
    }
}

impl RealMatrix {
    /// Scalar sum over all elements.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Threshold function: 1.0 where `value >= boundary`, else 0.0.
    ///
    /// `>=` makes interval masks built from two hard steps half-open
    /// `[low, high)`, symmetrically for birth and death intervals.
    pub fn hard_step(&self, boundary: f32) -> RealMatrix {
        self.map(|&v| if v >= boundary { 1.0 } else { 0.0 })
    }

    /// Clamp every element into `[low, high]`.
    pub fn clamp(&self, low: f32, high: f32) -> RealMatrix {
        self.map(|&v| v.clamp(low, high))
    }

    /// Lift into a complex matrix with zero imaginary parts.
    pub fn to_complex(&self) -> ComplexMatrix {
        self.map(|&v| Complex::new(v, 0.0))
    }

    /// Row-index and column-index grids:
    ///
    /// ```text
    /// rows = [[0,0,0],    cols = [[0,1,2],
    ///         [1,1,1],            [0,1,2],
    ///         [2,2,2]]            [0,1,2]]
    /// ```
    pub fn mesh_grid(height: usize, width: usize) -> (RealMatrix, RealMatrix) {
        let n = height * width;
        let mut rows = Vec::with_capacity(n);
        let mut cols = Vec::with_capacity(n);
        for i in 0..n {
            rows.push((i / width) as f32);
            cols.push((i % width) as f32);
        }
        (
            Matrix::from_flat(height, width, rows),
            Matrix::from_flat(height, width, cols),
        )
    }
}

impl ComplexMatrix {
    /// Real parts of every element.
    pub fn real(&self) -> RealMatrix {
        self.map(|c| c.re)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RealMatrix {
        Matrix::from_flat(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    #[test]
    fn test_indexing() {
        let mut m = sample();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(1, 2)], 6.0);
        m[(1, 0)] = 9.0;
        assert_eq!(m[(1, 0)], 9.0);
    }

    #[test]
    #[should_panic(expected = "row index")]
    fn test_row_out_of_range() {
        let m = sample();
        let _ = m[(2, 0)];
    }

    #[test]
    #[should_panic(expected = "col index")]
    fn test_col_out_of_range() {
        let m = sample();
        let _ = m[(0, 3)];
    }

    #[test]
    #[should_panic(expected = "does not correspond with shape")]
    fn test_bad_flat_length() {
        let _ = Matrix::from_flat(2, 2, vec![1.0f32, 2.0, 3.0]);
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn test_shape_mismatch() {
        let _ = sample() + RealMatrix::zeros(3, 2);
    }

    #[test]
    fn test_elementwise_ops() {
        let a = sample();
        let b = sample();
        let sum = a.clone() + b.clone();
        assert_eq!(sum[(1, 1)], 10.0);

        let prod = a.clone() * b;
        assert_eq!(prod[(1, 2)], 36.0);

        let scaled = a.clone() * 2.0;
        assert_eq!(scaled[(0, 1)], 4.0);

        let flipped = 10.0 - a;
        assert_eq!(flipped[(0, 0)], 9.0);
    }

    #[test]
    fn test_roll_rows() {
        let m = sample();
        let rolled = m.roll_rows(1);
        // Row 0 of the input lands on row 1.
        assert_eq!(rolled[(1, 0)], 1.0);
        assert_eq!(rolled[(0, 0)], 4.0);

        // Negative shift is the inverse.
        assert_eq!(rolled.roll_rows(-1), m);
        // Shift by the full height is the identity.
        assert_eq!(m.roll_rows(2), m);
        // Modulo wrap.
        assert_eq!(m.roll_rows(3), m.roll_rows(1));
    }

    #[test]
    fn test_roll_cols() {
        let m = sample();
        let rolled = m.roll_cols(1);
        assert_eq!(rolled[(0, 0)], 3.0);
        assert_eq!(rolled[(0, 1)], 1.0);
        assert_eq!(rolled.roll_cols(2), m);
        assert_eq!(m.roll_cols(-1), m.roll_cols(2));
    }

    #[test]
    fn test_roll_applied_full_cycle() {
        let m = sample();
        let mut r = m.clone();
        for _ in 0..2 {
            r = r.roll_rows(1);
        }
        assert_eq!(r, m);

        let mut c = m.clone();
        for _ in 0..3 {
            c = c.roll_cols(1);
        }
        assert_eq!(c, m);
    }

    #[test]
    fn test_mesh_grid() {
        let (rows, cols) = RealMatrix::mesh_grid(3, 2);
        assert_eq!(rows[(0, 0)], 0.0);
        assert_eq!(rows[(2, 1)], 2.0);
        assert_eq!(cols[(0, 1)], 1.0);
        assert_eq!(cols[(2, 0)], 0.0);
    }

    #[test]
    fn test_hard_step_boundary() {
        let m = Matrix::from_flat(1, 3, vec![0.4, 0.5, 0.6]);
        let stepped = m.hard_step(0.5);
        assert_eq!(stepped.as_slice(), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_clamp() {
        let m = Matrix::from_flat(1, 3, vec![-0.5, 0.5, 1.5]);
        let clamped = m.clamp(0.0, 1.0);
        assert_eq!(clamped.as_slice(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_map_changes_type() {
        let m = sample();
        let c = m.to_complex();
        assert_eq!(c[(1, 2)], num_complex::Complex::new(6.0, 0.0));
        assert_eq!(c.real(), m);
    }

    #[test]
    fn test_sum() {
        assert_eq!(sample().sum(), 21.0);
    }
}
