//! Bicubic (Catmull-Rom) point sampling over normalized coordinates.

use crate::raster::RgbSource;

const A: f32 = -0.5;

#[inline]
fn cubic_weight(t: f32) -> f32 {
    let t = t.abs();
    if t <= 1.0 {
        (A + 2.0) * t * t * t - (A + 3.0) * t * t + 1.0
    } else if t < 2.0 {
        A * t * t * t - 5.0 * A * t * t + 8.0 * A * t - 4.0 * A
    } else {
        0.0
    }
}

/// Sample `img` at `(u, v)` in `[0, 1] x [0, 1]`, `u` horizontal and `v` vertical.
///
/// `u = 0` maps to the first column and `u = 1` to the last; taps falling outside the
/// image are clamped to the border. Pure function of its inputs.
pub fn sample<S: RgbSource + ?Sized>(img: &S, u: f32, v: f32) -> [u8; 3] {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return [0, 0, 0];
    }
    let fx = u.clamp(0.0, 1.0) * (w - 1) as f32;
    let fy = v.clamp(0.0, 1.0) * (h - 1) as f32;
    let x0 = fx.floor() as isize;
    let y0 = fy.floor() as isize;
    let dx = fx - x0 as f32;
    let dy = fy - y0 as f32;

    let wx = [cubic_weight(1.0 + dx), cubic_weight(dx), cubic_weight(1.0 - dx), cubic_weight(2.0 - dx)];
    let wy = [cubic_weight(1.0 + dy), cubic_weight(dy), cubic_weight(1.0 - dy), cubic_weight(2.0 - dy)];

    let mut acc = [0.0f32; 3];
    for (m, wym) in wy.iter().enumerate() {
        let sy = (y0 + m as isize - 1).clamp(0, h as isize - 1) as usize;
        for (n, wxn) in wx.iter().enumerate() {
            let sx = (x0 + n as isize - 1).clamp(0, w as isize - 1) as usize;
            let p = img.rgb(sx, sy);
            let weight = wym * wxn;
            acc[0] += p[0] as f32 * weight;
            acc[1] += p[1] as f32 * weight;
            acc[2] += p[2] as f32 * weight;
        }
    }
    [
        acc[0].round().clamp(0.0, 255.0) as u8,
        acc[1].round().clamp(0.0, 255.0) as u8,
        acc[2].round().clamp(0.0, 255.0) as u8,
    ]
}
