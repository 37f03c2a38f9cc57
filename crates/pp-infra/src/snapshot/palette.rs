use alloy_primitives::keccak256;
use image::Rgba;

/// Gradient stops: start, middle, end.
const COLORS: &[[&str; 3]] = &[
    ["#F5A4C7", "#F5A4C7", "#FF6483"],
    ["#A1A3A5", "#F5A4C7", "#636466"],
    ["#ABAAF9", "#ABAAF9", "#2A4EF5"],
    ["#EEB9C3", "#F5A4C7", "#EA3323"],
    ["#FBE890", "#F5A4C7", "#FBBE2B"],
    ["#E0CBF2", "#F5A4C7", "#A262F7"],
    ["#A5E2FC", "#F5A4C7", "#6AE0DE"],
    ["#E5B38B", "#F5A4C7", "#AC7240"],
    ["#F8D2A0", "#F9D1A1", "#EE8130"],
    ["#A2CFB3", "#F5A4C7", "#509B7D"],
];

fn parse_hex_color(hex: &str) -> Rgba<u8> {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .unwrap_or(0)
    };
    Rgba([channel(0), channel(2), channel(4), 255])
}

/// Palette picked deterministically from `seed`.
pub(super) fn palette_for(seed: &str) -> [Rgba<u8>; 3] {
    let hash = keccak256(seed.as_bytes());
    let stops = COLORS[hash[0] as usize % COLORS.len()];
    stops.map(parse_hex_color)
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

/// Colour at `t` in `[0, 1]` along the three-stop gradient.
pub(super) fn gradient_at(stops: &[Rgba<u8>; 3], t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let (from, to, local) = if t < 0.5 {
        (stops[0], stops[1], t * 2.0)
    } else {
        (stops[1], stops[2], (t - 0.5) * 2.0)
    };
    Rgba([
        lerp(from[0], to[0], local),
        lerp(from[1], to[1], local),
        lerp(from[2], to[2], local),
        255,
    ])
}
