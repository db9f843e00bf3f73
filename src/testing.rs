//! Builders for synthetic fonts used by the unit tests.

use crate::stream::Writer;
use crate::Tag;

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}

pub fn head(units_per_em: u16, index_to_loc_format: i16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(1u16).write(0u16); // version
    w.write(0x0001_0000u32); // font revision
    w.write(0u32); // checksum adjustment
    w.write(0x5F0F_3CF5u32);
    w.write(0u16); // flags
    w.write(units_per_em);
    w.write(0u64).write(0u64); // created, modified
    w.write(0i16).write(0i16).write(0i16).write(0i16); // bounding box
    w.write(0u16).write(8u16).write(2i16); // mac style, lowest ppem, direction hint
    w.write(index_to_loc_format);
    w.write(0i16);
    w.finish()
}

pub fn hhea(ascender: i16, descender: i16, line_gap: i16, number_of_h_metrics: u16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(0x0001_0000u32);
    w.write(ascender).write(descender).write(line_gap);
    w.write(0u16); // advance width max
    w.write(0i16).write(0i16).write(0i16); // min lsb, min rsb, x max extent
    w.write(1i16).write(0i16).write(0i16); // caret slope rise, run, offset
    w.extend(&[0; 8]);
    w.write(0i16); // metric data format
    w.write(number_of_h_metrics);
    w.finish()
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(0x0001_0000u32).write(num_glyphs).extend(&[0; 26]);
    w.finish()
}

pub fn hmtx(metrics: &[(u16, i16)], tail: &[i16]) -> Vec<u8> {
    let mut w = Writer::new();
    for &(advance, lsb) in metrics {
        w.write(advance).write(lsb);
    }
    for &lsb in tail {
        w.write(lsb);
    }
    w.finish()
}

/// A `cmap` table from `(platform, encoding, subtable)` triples.
pub fn cmap(subtables: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(0u16).write(subtables.len() as u16);
    let mut offset = 4 + 8 * subtables.len();
    for (platform, encoding, data) in subtables {
        w.write(*platform).write(*encoding).write(offset as u32);
        offset += data.len();
    }
    for (_, _, data) in subtables {
        w.extend(data);
    }
    w.finish()
}

/// A format 12 sub-table from `(start, end, start_glyph)` groups.
pub fn cmap12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(12u16).write(0u16);
    w.write((16 + 12 * groups.len()) as u32);
    w.write(0u32).write(groups.len() as u32);
    for &(start, end, glyph) in groups {
        w.write(start).write(end).write(glyph);
    }
    w.finish()
}

pub fn cmap6(first_code: u16, glyphs: &[u16]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(6u16).write((10 + 2 * glyphs.len()) as u16).write(0u16);
    w.write(first_code).write(glyphs.len() as u16);
    for &glyph in glyphs {
        w.write(glyph);
    }
    w.finish()
}

/// One segment of a format 4 sub-table.
pub struct Segment4 {
    pub start: u16,
    pub end: u16,
    pub delta: i16,
    /// Glyphs addressed through `idRangeOffset`, one per code point.
    pub glyphs: Option<Vec<u16>>,
}

/// A format 4 sub-table. The terminating `0xFFFF` segment is appended.
pub fn cmap4(segments: &[Segment4]) -> Vec<u8> {
    let seg_count = segments.len() + 1;
    let mut glyph_array: Vec<u16> = vec![];
    let mut range_offsets = vec![];
    for (i, segment) in segments.iter().enumerate() {
        match &segment.glyphs {
            Some(glyphs) => {
                let to_array = 2 * (seg_count - i);
                range_offsets.push((to_array + 2 * glyph_array.len()) as u16);
                glyph_array.extend(glyphs);
            }
            None => range_offsets.push(0),
        }
    }
    range_offsets.push(0);

    let length = 16 + 8 * seg_count + 2 * glyph_array.len();
    let mut w = Writer::new();
    w.write(4u16).write(length as u16).write(0u16);
    w.write((2 * seg_count) as u16);
    w.write(0u16).write(0u16).write(0u16); // search range, entry selector, range shift
    for segment in segments {
        w.write(segment.end);
    }
    w.write(0xFFFFu16);
    w.write(0u16); // reserved pad
    for segment in segments {
        w.write(segment.start);
    }
    w.write(0xFFFFu16);
    for segment in segments {
        w.write(segment.delta);
    }
    w.write(1i16);
    for offset in range_offsets {
        w.write(offset);
    }
    for glyph in glyph_array {
        w.write(glyph);
    }
    w.finish()
}

/// A simple glyph from contours of `(x, y, on_curve)` points, stored without
/// short coordinates or repeated flags.
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> Vec<u8> {
    let points: Vec<_> = contours.iter().flat_map(|c| c.iter().copied()).collect();
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(0);
    let y_max = points.iter().map(|p| p.1).max().unwrap_or(0);

    let mut w = Writer::new();
    w.write(contours.len() as i16).write(x_min).write(y_min).write(x_max).write(y_max);
    let mut end = 0;
    for contour in contours {
        end += contour.len();
        w.write((end - 1) as u16);
    }
    w.write(0u16); // instruction length

    let mut previous = (0, 0);
    let mut xs = vec![];
    let mut ys = vec![];
    for &(x, y, on_curve) in &points {
        let (dx, dy) = (x - previous.0, y - previous.1);
        let mut flag = u8::from(on_curve);
        if dx == 0 {
            flag |= 0x10;
        } else {
            xs.push(dx);
        }
        if dy == 0 {
            flag |= 0x20;
        } else {
            ys.push(dy);
        }
        w.write(flag);
        previous = (x, y);
    }
    for dx in xs {
        w.write(dx);
    }
    for dy in ys {
        w.write(dy);
    }
    w.finish()
}

/// Lay out glyph records into `(glyf, loca)`.
pub fn glyf_loca(glyphs: &[Vec<u8>], long: bool) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Writer::new();
    let mut loca = Writer::new();
    let mut write_offset = |loca: &mut Writer, offset: usize| {
        if long {
            loca.write(offset as u32);
        } else {
            loca.write((offset / 2) as u16);
        }
    };
    for glyph in glyphs {
        write_offset(&mut loca, glyf.len());
        glyf.extend(glyph);
        glyf.align(2);
    }
    write_offset(&mut loca, glyf.len());
    (glyf.finish(), loca.finish())
}

fn kern_format0(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by_key(|&(left, right, _)| (left, right));
    let mut w = Writer::new();
    w.write(sorted.len() as u16).write(0u16).write(0u16).write(0u16);
    for (left, right, value) in sorted {
        w.write(left).write(right).write(value);
    }
    w.finish()
}

/// A version 0 `kern` table from `(coverage, pairs)` sub-tables.
pub fn kern_v0(subtables: &[(u16, &[(u16, u16, i16)])]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(0u16).write(subtables.len() as u16);
    for (coverage, pairs) in subtables {
        let payload = kern_format0(pairs);
        w.write(0u16).write((6 + payload.len()) as u16).write(*coverage);
        w.extend(&payload);
    }
    w.finish()
}

/// A version 1 `kern` table from `(coverage, pairs)` sub-tables.
pub fn kern_v1(subtables: &[(u16, &[(u16, u16, i16)])]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(0x0001_0000u32).write(subtables.len() as u32);
    for (coverage, pairs) in subtables {
        let payload = kern_format0(pairs);
        w.write((8 + payload.len()) as u32).write(*coverage).write(0u16);
        w.extend(&payload);
    }
    w.finish()
}

/// A `name` table from `(platform, encoding, language, name_id, text)` records.
pub fn name(records: &[(u16, u16, u16, u16, &str)]) -> Vec<u8> {
    let mut storage = Writer::new();
    let mut w = Writer::new();
    w.write(0u16).write(records.len() as u16).write((6 + 12 * records.len()) as u16);
    for &(platform, encoding, language, name_id, text) in records {
        let offset = storage.len();
        if platform == 1 {
            storage.extend(text.as_bytes());
        } else {
            for unit in text.encode_utf16() {
                storage.write(unit);
            }
        }
        let length = storage.len() - offset;
        w.write(platform).write(encoding).write(language).write(name_id);
        w.write(length as u16).write(offset as u16);
    }
    w.extend(&storage.finish());
    w.finish()
}

/// Fields of an `OS/2` table that the font reads.
#[derive(Clone, Default)]
pub struct Os2 {
    pub weight_class: u16,
    pub width_class: u16,
    pub panose: [u8; 10],
    pub fs_selection: u16,
    pub x_height: i16,
    pub cap_height: i16,
}

pub fn os2(fields: &Os2) -> Vec<u8> {
    let mut w = Writer::new();
    w.write(4u16).write(500i16);
    w.write(fields.weight_class).write(fields.width_class);
    w.extend(&[0; 24]); // fs type .. family class
    w.write(fields.panose);
    w.extend(&[0; 20]); // unicode ranges, vendor id
    w.write(fields.fs_selection);
    w.extend(&[0; 22]); // char indices .. code page ranges
    w.write(fields.x_height).write(fields.cap_height);
    w.extend(&[0; 6]);
    w.finish()
}

/// Assemble tables into an sfnt file.
pub fn sfnt(tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut tables = tables.to_vec();
    tables.sort_by_key(|&(tag, _)| tag);

    let mut w = Writer::new();
    w.write(0x0001_0000u32).write(tables.len() as u16);
    w.write(0u16).write(0u16).write(0u16);
    let mut offset = 12 + 16 * tables.len();
    for (tag, data) in &tables {
        w.write(tag.0).write(0u32).write(offset as u32).write(data.len() as u32);
        offset += data.len().next_multiple_of(4);
    }
    for (_, data) in &tables {
        w.extend(data);
        w.align(4);
    }
    w.finish()
}

/// A glyph of a [`FontBuilder`].
pub struct TestGlyph {
    pub data: Vec<u8>,
    pub advance: u16,
    pub lsb: i16,
}

/// Builds complete fonts with a format 12 character map.
pub struct FontBuilder {
    pub units_per_em: u16,
    pub long_loca: bool,
    pub glyphs: Vec<TestGlyph>,
    pub cmap: Vec<(u32, u32, u32)>,
    pub number_of_h_metrics: Option<u16>,
    pub tables: Vec<(Tag, Vec<u8>)>,
}

impl FontBuilder {
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            long_loca: false,
            glyphs: vec![TestGlyph { data: vec![], advance: units_per_em / 2, lsb: 0 }],
            cmap: vec![],
            number_of_h_metrics: None,
            tables: vec![],
        }
    }

    /// Add a glyph and return its id.
    pub fn glyph(&mut self, data: Vec<u8>, advance: u16, lsb: i16) -> u16 {
        self.glyphs.push(TestGlyph { data, advance, lsb });
        (self.glyphs.len() - 1) as u16
    }

    /// Map one character to a glyph.
    pub fn map(&mut self, c: char, glyph: u16) -> &mut Self {
        self.cmap.push((c as u32, c as u32, u32::from(glyph)));
        self
    }

    pub fn table(&mut self, tag: Tag, data: Vec<u8>) -> &mut Self {
        self.tables.push((tag, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut groups = self.cmap.clone();
        groups.sort();

        let num_glyphs = self.glyphs.len() as u16;
        let h_metrics = self.number_of_h_metrics.unwrap_or(num_glyphs);
        let records: Vec<_> = self.glyphs[..usize::from(h_metrics)]
            .iter()
            .map(|g| (g.advance, g.lsb))
            .collect();
        let tail: Vec<_> = self.glyphs[usize::from(h_metrics)..].iter().map(|g| g.lsb).collect();
        let glyph_data: Vec<_> = self.glyphs.iter().map(|g| g.data.clone()).collect();
        let (glyf, loca) = glyf_loca(&glyph_data, self.long_loca);

        let mut tables = vec![
            (Tag::HEAD, head(self.units_per_em, i16::from(self.long_loca))),
            (Tag::HHEA, hhea(800, -200, 90, h_metrics)),
            (Tag::MAXP, maxp(num_glyphs)),
            (Tag::HMTX, hmtx(&records, &tail)),
            (Tag::CMAP, cmap(&[(3, 10, cmap12(&groups))])),
            (Tag::LOCA, loca),
            (Tag::GLYF, glyf),
        ];
        tables.extend(self.tables.iter().cloned());
        sfnt(&tables)
    }
}

/// A unit square contour scaled to `size`, starting at the origin.
pub fn square(size: i16) -> Vec<u8> {
    simple_glyph(&[&[(0, 0, true), (size, 0, true), (size, size, true), (0, size, true)]])
}
