use std::ops::Range;

/// Mean of `data[range]`, with the range clamped to the data.
///
/// Returns 0 for an empty selection.
pub fn band_mean(data: &[u8], range: Range<usize>) -> f32 {
    let end = range.end.min(data.len());
    let start = range.start.min(end);
    let band = &data[start..end];
    if band.is_empty() {
        return 0.0;
    }
    let sum: u32 = band.iter().map(|&v| u32::from(v)).sum();
    sum as f32 / band.len() as f32
}
