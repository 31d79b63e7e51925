use glam::Vec4;

// --- Helper Functions ---

/// Rendering color for a species: evenly spaced hues, shifted by `color_offset`.
pub fn species_color(species: usize, species_count: usize, color_offset: f32) -> Vec4 {
    let denom = species_count as f32 + color_offset;
    let hue = if denom > 0.0 {
        species as f32 / denom
    } else {
        0.0
    };
    hsv_to_rgba(hue, 1.0, 1.0)
}

// hsv_to_rgba, hue in turns (1.0 = 360°)
pub fn hsv_to_rgba(h: f32, s: f32, v: f32) -> Vec4 {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Vec4::new(r, g, b, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgba(0.0, 1.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        let green = hsv_to_rgba(1.0 / 3.0, 1.0, 1.0);
        assert!((green - Vec4::new(0.0, 1.0, 0.0, 1.0)).abs().max_element() < 1e-5);
        let blue = hsv_to_rgba(2.0 / 3.0, 1.0, 1.0);
        assert!((blue - Vec4::new(0.0, 0.0, 1.0, 1.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn species_get_distinct_colors() {
        let colors: Vec<Vec4> = (0..5).map(|s| species_color(s, 5, 0.0)).collect();
        for i in 0..5 {
            for j in (i + 1)..5 {
                assert_ne!(colors[i], colors[j]);
            }
        }
        assert_eq!(species_color(0, 5, 3.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }
}
