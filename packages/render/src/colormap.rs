//! Continuous colormaps for marker coloring.

/// Named colormaps used by the two map views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Blue to green; used for rank.
    Winter,
    /// Dark purple through orange to yellow; used for centrality.
    Plasma,
}

/// Plasma sampled at 0, 0.25, 0.5, 0.75, 1.
const PLASMA_STOPS: [[u8; 3]; 5] = [
    [0x0d, 0x08, 0x87],
    [0x7e, 0x03, 0xa8],
    [0xcc, 0x47, 0x78],
    [0xf8, 0x95, 0x40],
    [0xf0, 0xf9, 0x21],
];

impl Colormap {
    /// Color at position `t` in `[0, 1]` as `#rrggbb`. Out-of-range and
    /// non-finite positions are clamped.
    #[must_use]
    pub fn sample(self, t: f64) -> String {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let [r, g, b] = match self {
            Self::Winter => [0.0, t, 0.5f64.mul_add(-t, 1.0)].map(to_channel),
            Self::Plasma => interpolate(&PLASMA_STOPS, t),
        };
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Color for `value` scaled linearly between `min` and `max`.
    #[must_use]
    pub fn sample_range(self, value: f64, min: f64, max: f64) -> String {
        let span = max - min;
        if span <= 0.0 || !span.is_finite() {
            return self.sample(0.0);
        }
        self.sample((value - min) / span)
    }

    /// CSS `linear-gradient` for a legend bar.
    #[must_use]
    pub fn css_gradient(self) -> String {
        let stops: Vec<String> = (0..=4)
            .map(|i| {
                let t = f64::from(i) / 4.0;
                format!("{} {}%", self.sample(t), i * 25)
            })
            .collect();
        format!("linear-gradient(to right, {})", stops.join(", "))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn interpolate(stops: &[[u8; 3]], t: f64) -> [u8; 3] {
    let scaled = t * (stops.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - lower as f64;
    let (a, b) = (stops[lower], stops[lower + 1]);
    [0, 1, 2].map(|i| {
        let (from, to) = (f64::from(a[i]), f64::from(b[i]));
        (to - from).mul_add(frac, from).round() as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winter_endpoints() {
        assert_eq!(Colormap::Winter.sample(0.0), "#0000ff");
        assert_eq!(Colormap::Winter.sample(1.0), "#00ff80");
    }

    #[test]
    fn plasma_endpoints_and_midpoint() {
        assert_eq!(Colormap::Plasma.sample(0.0), "#0d0887");
        assert_eq!(Colormap::Plasma.sample(0.5), "#cc4778");
        assert_eq!(Colormap::Plasma.sample(1.0), "#f0f921");
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Colormap::Plasma.sample(-3.0), Colormap::Plasma.sample(0.0));
        assert_eq!(Colormap::Plasma.sample(7.0), Colormap::Plasma.sample(1.0));
        assert_eq!(Colormap::Winter.sample(f64::NAN), Colormap::Winter.sample(0.0));
    }

    #[test]
    fn degenerate_range_uses_low_end() {
        assert_eq!(
            Colormap::Plasma.sample_range(5.0, 5.0, 5.0),
            Colormap::Plasma.sample(0.0)
        );
    }
}
