/// Fill for countries without a value.
pub const NO_DATA_FILL: &str = "#F0F0F0";
pub const LABEL_LIGHT: &str = "#fff";
pub const LABEL_DARK: &str = "#000";

/// Nine-class sequential orange-red scheme, lightest first.
const OR_RD: [&str; 9] = [
    "fff7ec", "fee8c8", "fdd49e", "fdbb84", "fc8d59", "ef6548", "d7301f", "b30000", "7f0000",
];

/// Parse a six-digit hex color with optional `#`.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Format RGB as a CSS color string.
pub fn rgb_css((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r}, {g}, {b})")
}

/// Uniform cubic B-spline segment through four control values.
fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// B-spline interpolation over `values` for `t` in `[0, 1]`; out-of-range `t` is clamped.
fn basis_spline(values: &[f64], t: f64) -> f64 {
    let n = values.len() - 1;
    let (i, t) = if t <= 0.0 {
        (0, 0.0)
    } else if t >= 1.0 {
        (n - 1, 1.0)
    } else {
        ((t * n as f64).floor() as usize, t)
    };
    let v1 = values[i];
    let v2 = values[i + 1];
    let v0 = if i > 0 { values[i - 1] } else { 2.0 * v1 - v2 };
    let v3 = if i < n - 1 {
        values[i + 2]
    } else {
        2.0 * v2 - v1
    };
    basis((t - i as f64 / n as f64) * n as f64, v0, v1, v2, v3)
}

/// Sample the orange-red ramp at `t` in `[0, 1]`.
pub fn interpolate_or_rd(t: f64) -> (u8, u8, u8) {
    let mut channels: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for hex in OR_RD {
        if let Some((r, g, b)) = parse_hex_color(hex) {
            channels[0].push(f64::from(r));
            channels[1].push(f64::from(g));
            channels[2].push(f64::from(b));
        }
    }
    let channel = |values: &[f64]| basis_spline(values, t).round().clamp(0.0, 255.0) as u8;
    (
        channel(&channels[0]),
        channel(&channels[1]),
        channel(&channels[2]),
    )
}

/// Continuous value -> color mapping over a `(min, max)` domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialScale {
    pub domain: (f64, f64),
}

impl SequentialScale {
    pub fn new(domain: (f64, f64)) -> Self {
        Self { domain }
    }

    /// Position of `value` in the domain; a zero-width domain maps everything to 0.5.
    pub fn normalize(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        if d1 == d0 {
            0.5
        } else {
            (value - d0) / (d1 - d0)
        }
    }

    pub fn color(&self, value: f64) -> (u8, u8, u8) {
        interpolate_or_rd(self.normalize(value))
    }

    pub fn css(&self, value: f64) -> String {
        rgb_css(self.color(value))
    }
}

/// `(min, max)` of the finite values, `None` when there are none.
pub fn value_domain(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn midpoint((lo, hi): (f64, f64)) -> f64 {
    lo + (hi - lo) / 2.0
}

/// Label text color contrasting with the fill of a country holding `value`.
pub fn label_fill(value: Option<f64>, midpoint: f64) -> &'static str {
    match value {
        Some(v) if v >= midpoint => LABEL_LIGHT,
        _ => LABEL_DARK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints_hit_scheme_extremes() {
        assert_eq!(interpolate_or_rd(0.0), (255, 247, 236));
        assert_eq!(interpolate_or_rd(1.0), (127, 0, 0));
    }

    #[test]
    fn ramp_is_clamped_outside_unit_interval() {
        assert_eq!(interpolate_or_rd(-3.0), interpolate_or_rd(0.0));
        assert_eq!(interpolate_or_rd(7.0), interpolate_or_rd(1.0));
    }

    #[test]
    fn ramp_darkens_monotonically_in_green() {
        let greens: Vec<u8> = (0..=10).map(|i| interpolate_or_rd(i as f64 / 10.0).1).collect();
        assert!(greens.windows(2).all(|w| w[0] >= w[1]), "{greens:?}");
    }

    #[test]
    fn degenerate_domain_maps_to_middle() {
        let scale = SequentialScale::new((4.0, 4.0));
        assert_eq!(scale.normalize(4.0), 0.5);
        assert_eq!(scale.color(4.0), interpolate_or_rd(0.5));
    }

    #[test]
    fn css_output_matches_rgb_function_syntax() {
        assert_eq!(rgb_css((1, 22, 255)), "rgb(1, 22, 255)");
        assert_eq!(SequentialScale::new((0.0, 10.0)).css(10.0), "rgb(127, 0, 0)");
    }

    #[test]
    fn midpoint_selects_light_label_at_or_above() {
        let mid = midpoint((0.0, 100.0));
        assert_eq!(mid, 50.0);
        assert_eq!(label_fill(Some(50.0), mid), LABEL_LIGHT);
        assert_eq!(label_fill(Some(49.0), mid), LABEL_DARK);
        assert_eq!(label_fill(None, mid), LABEL_DARK);
    }

    #[test]
    fn value_domain_skips_non_finite() {
        assert_eq!(value_domain([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(value_domain(std::iter::empty()), None);
    }

    #[test]
    fn parse_hex_color_accepts_optional_hash() {
        assert_eq!(parse_hex_color("#F0F0F0"), Some((240, 240, 240)));
        assert_eq!(parse_hex_color("7f0000"), Some((127, 0, 0)));
        assert_eq!(parse_hex_color("fff"), None);
    }
}
