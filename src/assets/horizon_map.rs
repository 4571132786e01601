use std::f32::consts::{FRAC_PI_4, TAU};

use crate::assets::image::Image;
use crate::errors::{Result, UmbraError};

/// Number of direction buckets around a texel. Power of two, at least 16.
pub const HORIZON_ANGLE_COUNT: usize = 32;

/// Search radius in texels.
pub const HORIZON_RADIUS: i32 = 16;

/// Edge length of each horizon cube face.
pub const HORIZON_CUBE_SIZE: usize = 16;

/// Builds a two-layer, eight-channel horizon map from the red channel of a
/// height map.
///
/// For every texel the neighbourhood within [`HORIZON_RADIUS`] is searched
/// for higher ground, and the largest squared horizon tangent is kept per
/// direction bucket. Heights are `red / 255 * scale` in texel units, and the
/// search wraps at the edges, so both dimensions must be powers of two.
///
/// The result holds `2 * width * height` texels: layer 0 (directions 0,
/// π/4, π/2, 3π/4 in rgba) followed by layer 1 (π, 5π/4, 3π/2, 7π/4). Each
/// channel is the sine of the horizon angle averaged over the bucket fan
/// around its direction.
pub fn construct_horizon_map(height_map: &Image, scale: f32) -> Result<Vec<[u8; 4]>> {
    let width = height_map.width;
    let height = height_map.height;
    if !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(UmbraError::ImageDecodeError(format!(
            "height map must have power-of-two dimensions, got {width}x{height}"
        )));
    }

    let x_mask = width as i32 - 1;
    let y_mask = height as i32 - 1;
    let k = scale / 255.0;
    let sample = |x: i32, y: i32| f32::from(height_map.texel((x & x_mask) as u32, (y & y_mask) as u32)[0]) * k;
    let bucket_scale = HORIZON_ANGLE_COUNT as f32 / TAU;
    let bucket_mask = HORIZON_ANGLE_COUNT as i32 - 1;

    let layer_len = width as usize * height as usize;
    let mut horizon = vec![[0u8; 4]; layer_len * 2];

    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let h0 = sample(x, y);
            let mut max_tan2 = [0.0f32; HORIZON_ANGLE_COUNT];

            for j in (1 - HORIZON_RADIUS)..HORIZON_RADIUS {
                for i in (1 - HORIZON_RADIUS)..HORIZON_RADIUS {
                    let r2 = i * i + j * j;
                    if r2 == 0 || r2 >= HORIZON_RADIUS * HORIZON_RADIUS {
                        continue;
                    }
                    let dh = sample(x + i, y + j) - h0;
                    if dh <= 0.0 {
                        continue;
                    }

                    // The texel covers an angular span of about half a diagonal
                    let r2 = r2 as f32;
                    let direction = (j as f32).atan2(i as f32);
                    let delta = (std::f32::consts::FRAC_1_SQRT_2 / r2.sqrt()).atan();
                    let min_index = ((direction - delta) * bucket_scale).floor() as i32;
                    let max_index = ((direction + delta) * bucket_scale).ceil() as i32;
                    let tan2 = dh * dh / r2;
                    for n in min_index..=max_index {
                        let m = (n & bucket_mask) as usize;
                        max_tan2[m] = max_tan2[m].max(tan2);
                    }
                }
            }

            let offset = y as usize * width as usize + x as usize;
            for layer in 0..2 {
                horizon[layer * layer_len + offset] = horizon_texel(&max_tan2, layer);
            }
        }
    }
    Ok(horizon)
}

/// Averages `sin(atan(sqrt(t)))` over the fan of buckets around each of the
/// layer's four channel directions.
fn horizon_texel(max_tan2: &[f32; HORIZON_ANGLE_COUNT], layer: usize) -> [u8; 4] {
    const EIGHTH: usize = HORIZON_ANGLE_COUNT / 8;
    let sine = |t: f32| (t / (t + 1.0)).sqrt();
    let bucket = |i: usize| max_tan2[i % HORIZON_ANGLE_COUNT];

    let first = HORIZON_ANGLE_COUNT / 16 + layer * (HORIZON_ANGLE_COUNT / 2);
    let mut sum = [0.0f32; 4];
    for index in first..=first + EIGHTH {
        let index = index + HORIZON_ANGLE_COUNT;
        sum[0] += sine(bucket(index - EIGHTH));
        sum[1] += sine(bucket(index));
        sum[2] += sine(bucket(index + EIGHTH));
        sum[3] += sine(bucket(index + 2 * EIGHTH));
    }

    let count = (EIGHTH + 1) as f32;
    sum.map(|s| ((s / count).clamp(0.0, 1.0) * 255.0) as u8)
}

/// Generates the six faces of the horizon direction cube.
///
/// Each texel holds the weights that blend the eight horizon map channels
/// for the tangent-space direction through that texel. Positive weights
/// select layer 0 channels and negative weights layer 1, so a direction
/// between two adjacent channels splits linearly between them. Faces follow
/// the usual +x, -x, +y, -y, +z, -z order, each [`HORIZON_CUBE_SIZE`]
/// squared texels, scaled by 127.
pub fn generate_horizon_cube() -> Vec<[i8; 4]> {
    let mut texels = Vec::with_capacity(6 * HORIZON_CUBE_SIZE * HORIZON_CUBE_SIZE);
    let step = 2.0 / HORIZON_CUBE_SIZE as f32;

    for face in 0..6 {
        for row in 0..HORIZON_CUBE_SIZE {
            let y = -1.0 + (row as f32 + 0.5) * step;
            for column in 0..HORIZON_CUBE_SIZE {
                let x = -1.0 + (column as f32 + 0.5) * step;
                let r = 1.0 / (1.0 + x * x + y * y).sqrt();
                let (vx, vy) = match face {
                    0 => (r, -y * r),
                    1 => (-r, -y * r),
                    2 => (x * r, r),
                    3 => (x * r, -r),
                    4 => (x * r, -y * r),
                    _ => (-x * r, -y * r),
                };
                let weights = direction_weights(vy.atan2(vx) / FRAC_PI_4);
                texels.push(weights.map(|w| (w * 127.0) as i8));
            }
        }
    }
    texels
}

/// Channel weights for an angle `t` measured in units of π/4, `t` in [-4, 4].
fn direction_weights(t: f32) -> [f32; 4] {
    let mut w = [0.0f32; 4];
    if t < -3.0 {
        w[0] = t + 3.0;
        w[1] = -4.0 - t;
    } else if t < -2.0 {
        w[1] = t + 2.0;
        w[2] = -3.0 - t;
    } else if t < -1.0 {
        w[2] = t + 1.0;
        w[3] = -2.0 - t;
    } else if t < 0.0 {
        w[3] = t;
        w[0] = t + 1.0;
    } else if t < 1.0 {
        w[0] = 1.0 - t;
        w[1] = t;
    } else if t < 2.0 {
        w[1] = 2.0 - t;
        w[2] = t - 1.0;
    } else if t < 3.0 {
        w[2] = 3.0 - t;
        w[3] = t - 2.0;
    } else {
        w[3] = 4.0 - t;
        w[0] = 3.0 - t;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_split_between_neighbouring_channels() {
        assert_eq!(direction_weights(0.0), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(direction_weights(0.5), [0.5, 0.5, 0.0, 0.0]);
        // Straight back selects the layer 1 red channel
        assert_eq!(direction_weights(4.0), [-1.0, 0.0, 0.0, 0.0]);
        assert_eq!(direction_weights(-0.5), [0.5, 0.0, 0.0, -0.5]);
    }

    #[test]
    fn weights_sum_to_one_in_magnitude() {
        for step in 0..=64 {
            let t = -4.0 + step as f32 * 0.125;
            let total: f32 = direction_weights(t).iter().map(|w| w.abs()).sum();
            assert!((total - 1.0).abs() < 1e-5, "t = {t}: {total}");
        }
    }
}
