//! Bounds-checked big-endian reading.
//!
//! Every multi-byte value in a TrueType file is stored big-endian. Nothing in here
//! panics on short input: reads return `None` and the table parsers turn that into
//! [`Error::TruncatedInput`].

use crate::{Error, Result};
use std::marker::PhantomData;

#[derive(Clone, Debug)]
/// A readable stream of binary data.
pub struct Reader<'a> {
    /// The underlying data of the reader.
    data: &'a [u8],
    /// The current offset in bytes. Is not guaranteed to be in range.
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Create a new readable stream of binary data.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a new readable stream of binary data at a specific position.
    #[inline]
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    /// Returns the current offset.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Try to read `T` from the data.
    #[inline]
    pub fn read<T: Readable<'a>>(&mut self) -> Option<T> {
        T::read(self)
    }

    /// Read a certain number of bytes.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let v = self.data.get(self.offset..end)?;
        self.offset = end;
        Some(v)
    }

    /// Reads the next `count` records as a lazily decoded array.
    #[inline]
    pub fn read_array<T: Readable<'a>>(&mut self, count: usize) -> Option<LazyArray<'a, T>> {
        let len = count.checked_mul(T::SIZE)?;
        self.read_bytes(len).map(LazyArray::new)
    }

    /// Advances by `Readable::SIZE`.
    #[inline]
    pub fn skip<T: Readable<'a>>(&mut self) -> Option<()> {
        self.skip_bytes(T::SIZE)
    }

    /// Skip the next `n` bytes from the stream.
    #[inline]
    pub fn skip_bytes(&mut self, n: usize) -> Option<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Check whether the reader is at the end of the buffer.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }
}

/// Trait for an object that can be read from a byte stream with a fixed size.
pub trait Readable<'a>: Sized {
    const SIZE: usize;

    fn read(r: &mut Reader<'a>) -> Option<Self>;

    /// Read a value at an absolute offset.
    #[inline]
    fn read_at(data: &'a [u8], offset: usize) -> Option<Self> {
        Self::read(&mut Reader::new_at(data, offset))
    }
}

/// Read a `T` at `offset`, failing with [`Error::TruncatedInput`].
#[inline]
pub fn read_at<'a, T: Readable<'a>>(data: &'a [u8], offset: usize) -> Result<T> {
    T::read_at(data, offset).ok_or(Error::TruncatedInput)
}

/// A view of `count` consecutive records starting at `offset`.
#[inline]
pub fn read_array_at<'a, T: Readable<'a>>(
    data: &'a [u8],
    offset: usize,
    count: usize,
) -> Result<LazyArray<'a, T>> {
    Reader::new_at(data, offset).read_array(count).ok_or(Error::TruncatedInput)
}

/// The bytes `offset..offset + length`, failing on overflow.
#[inline]
pub fn subspan(data: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    let end = offset.checked_add(length).ok_or(Error::TruncatedInput)?;
    data.get(offset..end).ok_or(Error::TruncatedInput)
}

impl<const N: usize> Readable<'_> for [u8; N] {
    const SIZE: usize = u8::SIZE * N;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read_bytes(N)?.try_into().ok()
    }
}

macro_rules! impl_readable_int {
    ($($ty:ty),*) => {
        $(
            impl Readable<'_> for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn read(r: &mut Reader) -> Option<Self> {
                    r.read::<[u8; std::mem::size_of::<$ty>()]>().map(Self::from_be_bytes)
                }
            }
        )*
    };
}

impl_readable_int!(u8, i8, u16, i16, u32, i32, u64);

/// A signed distance in font design units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FWord(pub i16);

/// An unsigned distance in font design units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UFWord(pub u16);

/// A signed byte-sized distance in font design units, used by composite glyphs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FByte(pub i8);

impl FWord {
    /// Convert to em units.
    #[inline]
    pub fn scale(self, em_scale: f32) -> f32 {
        f32::from(self.0) * em_scale
    }
}

impl UFWord {
    /// Convert to em units.
    #[inline]
    pub fn scale(self, em_scale: f32) -> f32 {
        f32::from(self.0) * em_scale
    }
}

impl FByte {
    /// Convert to em units.
    #[inline]
    pub fn scale(self, em_scale: f32) -> f32 {
        f32::from(self.0) * em_scale
    }
}

impl Readable<'_> for FWord {
    const SIZE: usize = 2;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<i16>().map(Self)
    }
}

impl Readable<'_> for UFWord {
    const SIZE: usize = 2;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<u16>().map(Self)
    }
}

impl Readable<'_> for FByte {
    const SIZE: usize = 1;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<i8>().map(Self)
    }
}

/// A signed 16-bit fixed-point number (2.14).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct F2Dot14(pub i16);

impl F2Dot14 {
    #[inline]
    pub fn to_f32(self) -> f32 {
        f32::from(self.0) / 16384.0
    }
}

impl Readable<'_> for F2Dot14 {
    const SIZE: usize = 2;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<i16>().map(Self)
    }
}

/// A 32-bit signed fixed-point number (16.16).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Fixed(pub i32);

impl Fixed {
    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 65536.0
    }
}

impl Readable<'_> for Fixed {
    const SIZE: usize = 4;

    #[inline]
    fn read(r: &mut Reader<'_>) -> Option<Self> {
        r.read::<i32>().map(Self)
    }
}

/// A slice-like container that converts internal binary data only on access.
///
/// Array values are stored in a continuous data chunk whose length is always a
/// multiple of `T::SIZE`.
pub struct LazyArray<'a, T> {
    data: &'a [u8],
    data_type: PhantomData<T>,
}

// Not derived: a derive would require `T: Copy`.
impl<T> Clone for LazyArray<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LazyArray<'_, T> {}

impl<T> Default for LazyArray<'_, T> {
    #[inline]
    fn default() -> Self {
        LazyArray { data: &[], data_type: PhantomData }
    }
}

impl<'a, T: Readable<'a>> LazyArray<'a, T> {
    /// Creates a new `LazyArray`. Trailing bytes that do not form a whole
    /// record are ignored.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        let len = data.len() - data.len() % T::SIZE;
        LazyArray { data: &data[..len], data_type: PhantomData }
    }

    /// Returns a value at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::SIZE)?;
        let end = start.checked_add(T::SIZE)?;
        self.data.get(start..end).map(Reader::new).and_then(|mut r| T::read(&mut r))
    }

    /// Returns the last value.
    #[inline]
    pub fn last(&self) -> Option<T> {
        self.get(self.len().checked_sub(1)?)
    }

    /// Returns array's length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / T::SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Finds the record whose leading bytes equal `key`.
    ///
    /// The records must be sorted by their leading `key.len()` bytes, which are a
    /// big-endian unsigned number. Big-endian byte order makes lexicographic slice
    /// comparison agree with numeric comparison, so no value is decoded inside the
    /// loop. The loop only branches on its termination test.
    pub fn binary_search_be(&self, key: &[u8]) -> Option<usize> {
        let width = key.len();
        if width > T::SIZE || self.is_empty() {
            return None;
        }

        let record_key = |i: usize| {
            let start = i * T::SIZE;
            &self.data[start..start + width]
        };

        let mut base = 0;
        let mut size = self.len();
        while size > 1 {
            let half = size / 2;
            let mid = base + half;
            base = if record_key(mid) <= key { mid } else { base };
            size -= half;
        }

        (record_key(base) == key).then_some(base)
    }
}

impl<'a, T: Readable<'a> + std::fmt::Debug> std::fmt::Debug for LazyArray<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list().entries(*self).finish()
    }
}

impl<'a, T: Readable<'a>> IntoIterator for LazyArray<'a, T> {
    type Item = T;
    type IntoIter = LazyArrayIter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        LazyArrayIter { data: self, index: 0 }
    }
}

/// An iterator over `LazyArray`.
#[derive(Clone, Copy)]
#[allow(missing_debug_implementations)]
pub struct LazyArrayIter<'a, T> {
    data: LazyArray<'a, T>,
    index: usize,
}

impl<'a, T: Readable<'a>> Iterator for LazyArrayIter<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.data.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// A writable stream of binary data, used to assemble fonts in tests.
#[cfg(test)]
pub struct Writer(Vec<u8>);

#[cfg(test)]
impl Writer {
    /// Create a new writable stream of binary data.
    pub fn new() -> Self {
        Self(Vec::with_capacity(1024))
    }

    /// Write `T` into the data.
    pub fn write<T: Writeable>(&mut self, data: T) -> &mut Self {
        data.write(self);
        self
    }

    /// Give bytes into the writer.
    pub fn extend(&mut self, bytes: &[u8]) -> &mut Self {
        self.0.extend(bytes);
        self
    }

    /// Align the contents to a byte boundary.
    pub fn align(&mut self, to: usize) {
        while self.0.len() % to != 0 {
            self.0.push(0);
        }
    }

    /// The number of written bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return the written bytes.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.0)
    }
}

#[cfg(test)]
pub trait Writeable: Sized {
    fn write(&self, w: &mut Writer);
}

#[cfg(test)]
macro_rules! impl_writeable_int {
    ($($ty:ty),*) => {
        $(
            impl Writeable for $ty {
                fn write(&self, w: &mut Writer) {
                    w.extend(&self.to_be_bytes());
                }
            }
        )*
    };
}

#[cfg(test)]
impl_writeable_int!(u8, i8, u16, i16, u32, i32, u64);

#[cfg(test)]
impl<const N: usize> Writeable for [u8; N] {
    fn write(&self, w: &mut Writer) {
        w.extend(self);
    }
}
