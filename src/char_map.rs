//! A compact map from code points to glyphs.
//!
//! Each entry is packed into a single `u64`:
//!
//! ```text
//!  63        43 42     32 31                0
//! +------------+---------+-------------------+
//! | start cp   | count-1 | start glyph       |
//! +------------+---------+-------------------+
//! ```
//!
//! Comparing two packed words compares their start code points first, so a sorted
//! `Vec<u64>` is also sorted by code point and lookup is a single binary search over
//! plain integers.

use crate::GlyphId;

const START_SHIFT: u32 = 43;
const COUNT_SHIFT: u32 = 32;
const COUNT_MASK: u64 = 0x7FF;
const GLYPH_MASK: u64 = 0xFFFF_FFFF;

/// The most code points a single entry can cover.
pub(crate) const MAX_COUNT: u32 = 2048;
/// The highest Unicode scalar value.
const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Maps code points to glyph ids.
///
/// A map is filled with [`insert`](Self::insert) and then sealed with
/// [`finalize`](Self::finalize). Lookups are only meaningful after finalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMap {
    /// Ascending while inserting, descending once finalized.
    entries: Vec<u64>,
}

#[inline]
fn pack(start: u32, count: u32, glyph: u32) -> u64 {
    debug_assert!((1..=MAX_COUNT).contains(&count));
    (u64::from(start) << START_SHIFT)
        | (u64::from(count - 1) << COUNT_SHIFT)
        | u64::from(glyph)
}

#[inline]
fn unpack(entry: u64) -> (u32, u32, u32) {
    let start = (entry >> START_SHIFT) as u32;
    let count = ((entry >> COUNT_SHIFT) & COUNT_MASK) as u32 + 1;
    let glyph = (entry & GLYPH_MASK) as u32;
    (start, count, glyph)
}

impl CharacterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `count` consecutive code points starting at `start` to consecutive
    /// glyphs starting at `glyph`.
    ///
    /// Ranges longer than one entry can hold are split. Code points past the
    /// Unicode range are ignored.
    pub fn insert(&mut self, start: u32, count: u32, glyph: GlyphId) {
        let end = start.saturating_add(count).min(MAX_CODE_POINT + 1);
        let mut code_point = start;
        let mut glyph = u32::from(glyph.0);
        while code_point < end {
            let chunk = (end - code_point).min(MAX_COUNT);
            self.entries.push(pack(code_point, chunk, glyph));
            code_point += chunk;
            glyph += chunk;
        }
    }

    /// Sort and merge the entries, then store them in lookup order.
    ///
    /// Where inserted ranges overlap, the range with the lower start keeps the
    /// shared code points.
    pub fn finalize(&mut self) {
        self.entries.sort_unstable();

        let mut merged: Vec<u64> = Vec::with_capacity(self.entries.len());
        let mut next_free = 0;
        for &entry in &self.entries {
            let (mut start, mut count, mut glyph) = unpack(entry);
            if start + count <= next_free {
                continue;
            }
            if start < next_free {
                let overlap = next_free - start;
                start += overlap;
                count -= overlap;
                glyph += overlap;
            }
            next_free = start + count;

            if let Some(last) = merged.last_mut() {
                let (last_start, last_count, last_glyph) = unpack(*last);
                if last_start + last_count == start
                    && last_glyph + last_count == glyph
                    && last_count + count <= MAX_COUNT
                {
                    *last = pack(last_start, last_count + count, last_glyph);
                    continue;
                }
            }
            merged.push(pack(start, count, glyph));
        }

        merged.reverse();
        merged.shrink_to_fit();
        self.entries = merged;
    }

    /// The glyph for a code point, or [`GlyphId::NOT_FOUND`].
    pub fn find(&self, code_point: u32) -> GlyphId {
        let entries = self.entries.as_slice();
        if code_point > MAX_CODE_POINT || entries.is_empty() {
            return GlyphId::NOT_FOUND;
        }

        // The largest word any entry starting at `code_point` can have.
        let probe = (u64::from(code_point) << START_SHIFT) | (COUNT_MASK << COUNT_SHIFT) | GLYPH_MASK;

        // Entries are descending, so the ones above the probe form a prefix. Find
        // the last of them; the candidate follows it.
        let mut base = 0;
        let mut size = entries.len();
        while size > 1 {
            let half = size / 2;
            let mid = base + half;
            base = if entries[mid] > probe { mid } else { base };
            size -= half;
        }
        let index = base + usize::from(entries[base] > probe);

        let Some(&entry) = entries.get(index) else {
            return GlyphId::NOT_FOUND;
        };
        let (start, count, glyph) = unpack(entry);
        let delta = code_point - start;
        if delta < count {
            u16::try_from(glyph + delta).map(GlyphId).unwrap_or(GlyphId::NOT_FOUND)
        } else {
            GlyphId::NOT_FOUND
        }
    }

    /// Whether the code point maps to a glyph.
    pub fn contains(&self, code_point: u32) -> bool {
        self.find(code_point).is_found()
    }

    /// The number of packed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The finalized entries as `(start code point, count, start glyph)`, in
    /// ascending code point order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32, GlyphId)> + '_ {
        self.entries.iter().rev().map(|&entry| {
            let (start, count, glyph) = unpack(entry);
            (start, count, GlyphId(glyph as u16))
        })
    }
}
