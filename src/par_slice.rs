use num_traits::Num;
use rayon::prelude::*;

/// Sets each element to the same value.
/// `chunk_size` is break the work into tasks for multi-threading.
pub fn set_value<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    value: NumType,
    chunk_size: usize,
) {
    a_slice
        .par_chunks_mut(chunk_size)
        .for_each(|a_chunk: &mut [NumType]| {
            for a in a_chunk {
                *a = value;
            }
        });
}

/// Element wise `a += b`.
pub fn add_assign<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    b_slice: &[NumType],
    chunk_size: usize,
) {
    debug_assert_eq!(a_slice.len(), b_slice.len());
    a_slice
        .par_chunks_mut(chunk_size)
        .zip(b_slice.par_chunks(chunk_size))
        .for_each(|(a_chunk, b_chunk)| {
            for (a, b) in a_chunk.iter_mut().zip(b_chunk) {
                *a = *a + *b;
            }
        });
}

/// Element wise `a *= factor`.
pub fn scale<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    factor: NumType,
    chunk_size: usize,
) {
    a_slice
        .par_chunks_mut(chunk_size)
        .for_each(|a_chunk: &mut [NumType]| {
            for a in a_chunk {
                *a = *a * factor;
            }
        });
}
