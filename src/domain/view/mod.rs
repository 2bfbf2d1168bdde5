mod chunk;
mod owned;

pub use chunk::*;
pub use owned::*;

use crate::par_slice;
use crate::util::*;
use rayon::prelude::*;

pub trait DomainView<const GRID_DIMENSION: usize>: Sync {
    fn aabb(&self) -> &AABB<GRID_DIMENSION>;

    fn buffer(&self) -> &[f64];

    fn buffer_mut(&mut self) -> &mut [f64];

    fn aabb_buffer_mut(&mut self) -> (&AABB<GRID_DIMENSION>, &mut [f64]);

    fn view(&self, world_coord: &Coord<GRID_DIMENSION>) -> f64;

    fn set_coord(&mut self, world_coord: &Coord<GRID_DIMENSION>, value: f64);

    fn par_modify_access<'a>(
        &'a mut self,
        chunk_size: usize,
    ) -> impl ParallelIterator<Item = DomainChunk<'a, GRID_DIMENSION>> {
        let (aabb, buffer) = self.aabb_buffer_mut();
        par_modify_access_impl(buffer, aabb, chunk_size)
    }

    fn par_set_values<
        F: FnOnce(Coord<GRID_DIMENSION>) -> f64 + Send + Sync + Copy,
    >(
        &mut self,
        f: F,
        chunk_size: usize,
    ) {
        self.par_modify_access(chunk_size).for_each(
            |mut d: DomainChunk<'_, GRID_DIMENSION>| {
                d.coord_iter_mut().for_each(|(world_coord, value_mut)| {
                    *value_mut = f(world_coord);
                })
            },
        );
    }

    /// Set every value to `value`.
    fn par_fill(&mut self, value: f64, chunk_size: usize) {
        par_slice::set_value(self.buffer_mut(), value, chunk_size);
    }

    /// Largest absolute value, NaN if any value is NaN.
    fn par_max_abs(&self, chunk_size: usize) -> f64 {
        self.buffer()
            .par_chunks(chunk_size)
            .map(|chunk| {
                chunk.iter().fold(0.0f64, |acc, v| {
                    if v.is_nan() || acc.is_nan() {
                        f64::NAN
                    } else {
                        acc.max(v.abs())
                    }
                })
            })
            .reduce(
                || 0.0,
                |a, b| {
                    if a.is_nan() || b.is_nan() {
                        f64::NAN
                    } else {
                        a.max(b)
                    }
                },
            )
    }

    /// Whether every value is finite.
    fn par_all_finite(&self, chunk_size: usize) -> bool {
        self.buffer()
            .par_chunks(chunk_size)
            .all(|chunk| chunk.iter().all(|v| v.is_finite()))
    }
}

/// Why not just put this into Domain::par_modify_access?
/// Rust compiler can't figure out how to borrow aabb and buffer
/// at the same time in this way.
/// By putting their borrows into one function call first we work around it.
fn par_modify_access_impl<'a, const GRID_DIMENSION: usize>(
    buffer: &'a mut [f64],
    aabb: &'a AABB<GRID_DIMENSION>,
    chunk_size: usize,
) -> impl ParallelIterator<Item = DomainChunk<'a, GRID_DIMENSION>> + 'a {
    buffer[0..aabb.buffer_size()]
        .par_chunks_mut(chunk_size)
        .enumerate()
        .map(move |(i, buffer_chunk): (usize, &mut [f64])| {
            let offset = i * chunk_size;
            DomainChunk::new(offset, aabb, buffer_chunk)
        })
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn par_set_values_test() {
        let chunk_size = 7;
        let bounds = AABB::new(matrix![0, 9; 0, 9]);
        let mut domain = OwnedDomain::new(bounds);
        domain.par_set_values(|c| (c[0] * 10 + c[1]) as f64, chunk_size);
        for c in domain.aabb().coord_iter() {
            assert_eq!(domain.view(&c), (c[0] * 10 + c[1]) as f64);
        }
        assert_eq!(domain.par_max_abs(chunk_size), 99.0);
    }

    #[test]
    fn finite_checks() {
        let chunk_size = 3;
        let mut domain = OwnedDomain::new(AABB::new(matrix![0, 9]));
        domain.par_fill(-2.0, chunk_size);
        assert!(domain.par_all_finite(chunk_size));
        assert_eq!(domain.par_max_abs(chunk_size), 2.0);

        domain.set_coord(&vector![4], f64::INFINITY);
        assert!(!domain.par_all_finite(chunk_size));

        domain.set_coord(&vector![5], f64::NAN);
        assert!(domain.par_max_abs(chunk_size).is_nan());
    }
}
