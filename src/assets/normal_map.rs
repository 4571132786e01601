use crate::assets::image::Image;
use crate::errors::{Result, UmbraError};

/// Builds a signed two-channel normal map from the red channel of a height map.
///
/// Slopes come from central differences that wrap at the edges, so both
/// dimensions must be powers of two. `scale` multiplies the height range
/// (one texel step of 255 maps to a slope of `scale`). Each output texel is
/// the x and y of the unit normal times 127; z is reconstructed in the shader.
pub fn construct_normal_map(height_map: &Image, scale: f32) -> Result<Vec<[i8; 2]>> {
    let width = height_map.width;
    let height = height_map.height;
    if !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(UmbraError::ImageDecodeError(format!(
            "height map must have power-of-two dimensions, got {width}x{height}"
        )));
    }

    let x_mask = width - 1;
    let y_mask = height - 1;
    let red = |x: u32, y: u32| f32::from(height_map.texel(x & x_mask, y & y_mask)[0]);
    let k = 0.5 / 255.0 * scale;

    let mut normals = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let dx = (red(x.wrapping_add(1), y) - red(x.wrapping_sub(1), y)) * k;
            let dy = (red(x, y.wrapping_add(1)) - red(x, y.wrapping_sub(1))) * k;
            let nz = 1.0 / (dx * dx + dy * dy + 1.0).sqrt();
            let nx = (-dx * nz).clamp(-1.0, 1.0);
            let ny = (-dy * nz).clamp(-1.0, 1.0);
            normals.push([(nx * 127.0) as i8, (ny * 127.0) as i8]);
        }
    }
    Ok(normals)
}
