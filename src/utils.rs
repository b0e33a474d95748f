//! Utility functions

use std::path::PathBuf;

// Clipboard-with-check mark, used for the sidebar logo and window icon.
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 96 96"><rect x="16" y="12" width="64" height="76" rx="10" fill="#818cf8"/><rect x="34" y="4" width="28" height="16" rx="5" fill="#eef2ff"/><path d="M32 50l12 12 22-26" fill="none" stroke="#eef2ff" stroke-width="8" stroke-linecap="round" stroke-linejoin="round"/></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> (Vec<u8>, u32, u32) {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).unwrap();
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).unwrap();
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    (premul_to_straight(&pixmap), width, height)
}

/// Rasterize the logo to a square image (for the window/taskbar icon).
pub fn rasterize_logo_square(size: u32) -> (Vec<u8>, u32, u32) {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).unwrap();
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size).unwrap();
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    (premul_to_straight(&pixmap), size, size)
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// App data directory (settings + logs live here).
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Activity Roster")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_icon_has_expected_dimensions() {
        let (pixels, w, h) = rasterize_logo_square(32);
        assert_eq!((w, h), (32, 32));
        assert_eq!(pixels.len(), 32 * 32 * 4);
    }
}
