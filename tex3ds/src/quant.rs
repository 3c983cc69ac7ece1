//! Quantization and colorimetry helpers shared by the pixel encoders.
//!
//! All color math operates on 8-bit quanta (Q = 255). Luminance follows the
//! sRGB transfer curve with BT.709 channel weights, which is what the PICA
//! 200's luminance formats expect from authoring tools.

/// Quantize an 8-bit quantum down to `bits` bits.
///
/// `to_bits(v, n) = ((1 << n) * v) / 256`
pub fn to_bits(v: u8, bits: u32) -> u8 {
    (((1u32 << bits) * v as u32) >> 8) as u8
}

/// Expand a `bits`-bit value back to an 8-bit quantum.
///
/// `from_bits(v, n) = v * 255 / ((1 << n) - 1)`
pub fn from_bits(v: u8, bits: u32) -> u8 {
    (v as u32 * 255 / ((1u32 << bits) - 1)) as u8
}

/// Round-trip a quantum through `bits` bits of precision.
///
/// This is the value a pixel takes in preview output: quantized, then
/// re-expanded to the full 8-bit range.
pub fn quantize(v: u8, bits: u32) -> u8 {
    from_bits(to_bits(v, bits), bits)
}

/// sRGB gamma expansion (encoded value to linear light).
fn gamma_inverse(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB gamma compression (linear light to encoded value).
fn gamma(v: f64) -> f64 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Perceptual luminance of an RGB triple.
///
/// Expands each channel out of sRGB gamma, mixes with the BT.709 weights,
/// and re-encodes. The result is an 8-bit quantum suitable for the L8/L4/LA
/// family of formats.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    const WR: f64 = 0.212655;
    const WG: f64 = 0.715158;
    const WB: f64 = 0.072187;

    let v = gamma(
        WR * gamma_inverse(r as f64 / 255.0)
            + WG * gamma_inverse(g as f64 / 255.0)
            + WB * gamma_inverse(b as f64 / 255.0),
    );

    (v.clamp(0.0, 1.0) * 255.0) as u8
}
