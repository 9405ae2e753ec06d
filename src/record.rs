//! Fixed-size little-endian values stored inline in the package.
//!
//! [`FixedRecord`] is the compile-time-sized encoding used both for per-entry
//! metadata (stored at the tail of every [`FileHeader`](crate::FileHeader))
//! and for the element type of [`PackageReader::read_array`](crate::PackageReader::read_array).

use serde::{Deserialize, Serialize};

/// A trivially copyable value with a fixed on-disk size
///
/// `encode` receives a slice of exactly `SIZE` bytes; `decode` is handed the
/// same. Implementations must be little-endian with no padding.
pub trait FixedRecord: Copy + Default {
    const SIZE: usize;

    fn encode(&self, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Self;
}

impl FixedRecord for () {
    const SIZE: usize = 0;

    fn encode(&self, _out: &mut [u8]) {}

    fn decode(_bytes: &[u8]) -> Self {}
}

macro_rules! impl_fixed_record_for_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedRecord for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn encode(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                fn decode(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_fixed_record_for_primitive!(u8, u16, u32, u64, i16, i32, i64, f32, f64);

impl<const N: usize> FixedRecord for [u8; N]
where
    [u8; N]: Default,
{
    const SIZE: usize = N;

    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(self);
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut buf = [0u8; N];
        buf.copy_from_slice(bytes);
        buf
    }
}

/// Width/height pair carried by texture and sprite packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl FixedRecord for Dimensions {
    const SIZE: usize = 8;

    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.width.to_le_bytes());
        out[4..8].copy_from_slice(&self.height.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            width: i32::decode(&bytes[0..4]),
            height: i32::decode(&bytes[4..8]),
        }
    }
}

/// Decode a packed run of records; `None` if the length is not a multiple of `T::SIZE`
pub(crate) fn decode_slice<T: FixedRecord>(bytes: &[u8]) -> Option<Vec<T>> {
    if T::SIZE == 0 {
        return bytes.is_empty().then(Vec::new);
    }
    if bytes.len() % T::SIZE != 0 {
        return None;
    }
    Some(bytes.chunks_exact(T::SIZE).map(T::decode).collect())
}

/// Encode a slice of records back-to-back
pub fn encode_slice<T: FixedRecord>(records: &[T]) -> Vec<u8> {
    let mut out = vec![0u8; records.len() * T::SIZE];
    if T::SIZE > 0 {
        for (record, slot) in records.iter().zip(out.chunks_exact_mut(T::SIZE)) {
            record.encode(slot);
        }
    }
    out
}
