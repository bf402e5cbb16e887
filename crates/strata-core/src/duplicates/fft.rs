use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    pub fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, o: Complex) -> Complex {
        Complex::new(self.re + o.re, self.im + o.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, o: Complex) -> Complex {
        Complex::new(self.re - o.re, self.im - o.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, o: Complex) -> Complex {
        Complex::new(
            self.re * o.re - self.im * o.im,
            self.re * o.im + self.im * o.re,
        )
    }
}

/// In-place iterative radix-2 FFT. `buf.len()` must be a power of two.
/// The inverse transform is scaled by `1/n`.
pub(crate) fn fft(buf: &mut [Complex], inverse: bool) {
    let n = buf.len();
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }

    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            buf.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * 2.0 * PI / len as f64;
        let twiddles: Vec<Complex> = (0..half)
            .map(|k| {
                let angle = step * k as f64;
                Complex::new(angle.cos(), angle.sin())
            })
            .collect();
        for chunk in buf.chunks_mut(len) {
            let (lo, hi) = chunk.split_at_mut(half);
            for ((u, v), w) in lo.iter_mut().zip(hi.iter_mut()).zip(&twiddles) {
                let t = *v * *w;
                *v = *u - t;
                *u = *u + t;
            }
        }
        len <<= 1;
    }

    if inverse {
        let scale = 1.0 / n as f64;
        for x in buf.iter_mut() {
            x.re *= scale;
            x.im *= scale;
        }
    }
}

/// Row-major 2D transform of a `rows x cols` grid (both powers of two).
pub(crate) fn fft2d(data: &mut [Complex], rows: usize, cols: usize, inverse: bool) {
    for row in data.chunks_mut(cols) {
        fft(row, inverse);
    }
    let mut column = vec![Complex::default(); rows];
    for c in 0..cols {
        for (r, slot) in column.iter_mut().enumerate() {
            *slot = data[r * cols + c];
        }
        fft(&mut column, inverse);
        for (r, value) in column.iter().enumerate() {
            data[r * cols + c] = *value;
        }
    }
}
