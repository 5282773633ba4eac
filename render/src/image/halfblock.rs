//! In-process unicode half-block rendering: the floor of the fallback
//! chain, needing nothing beyond 24-bit color support.
//!
//! The image is Lanczos-fitted to `cols x (rows * 2)` pixels; every text
//! row then shows two pixel rows through `▀` with the foreground carrying
//! the top pixel and the background the bottom one.

use image::DynamicImage;
use image::GenericImageView;
use image::imageops::FilterType;

pub fn render(image: &DynamicImage, cols: u16, rows: u16) -> String {
    let width = u32::from(cols.max(1));
    let height = u32::from(rows.max(1)) * 2;
    let resized = image.resize_exact(width, height, FilterType::Lanczos3);

    let mut out = String::with_capacity((width as usize + 16) * rows as usize);
    for row in 0..u32::from(rows.max(1)) {
        for col in 0..width {
            let top = resized.get_pixel(col, row * 2).0;
            let bottom = resized.get_pixel(col, row * 2 + 1).0;
            out.push_str(&format!(
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2580}\x1b[0m",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            ));
        }
        out.push('\n');
    }
    out
}
