use super::same_offset;

/// Direct time-domain convolution.
///
/// Best for short IRs. O(input_length * ir_length).
pub fn convolve_same(input: &[f32], ir: &[f32]) -> Vec<f32> {
    let offset = same_offset(ir.len());
    let len = input.len();

    (0..len)
        .map(|k| {
            // Index of this output sample in the full convolution
            let n = k + offset;
            // Only taps that land inside the input contribute
            let first_tap = (n + 1).saturating_sub(len);
            let last_tap = n.min(ir.len() - 1);

            let mut acc = 0.0f32;
            for j in first_tap..=last_tap {
                acc = ir[j].mul_add(input[n - j], acc);
            }
            acc
        })
        .collect()
}
