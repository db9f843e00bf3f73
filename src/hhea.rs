use crate::stream::{read_at, FWord};
use crate::Result;

/// Vertical extents and the length of the `hmtx` record array.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct HheaInfo {
    pub ascender: f32,
    /// Negative below the baseline, as stored.
    pub descender: f32,
    pub line_gap: f32,
    pub number_of_h_metrics: u16,
}

pub(crate) fn parse(data: &[u8], em_scale: f32) -> Result<HheaInfo> {
    Ok(HheaInfo {
        ascender: read_at::<FWord>(data, 4)?.scale(em_scale),
        descender: read_at::<FWord>(data, 6)?.scale(em_scale),
        line_gap: read_at::<FWord>(data, 8)?.scale(em_scale),
        number_of_h_metrics: read_at::<u16>(data, 34)?,
    })
}
