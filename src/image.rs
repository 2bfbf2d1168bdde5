//! PNG output of fields and trace gathers.

use crate::domain::*;
use crate::error::*;
use crate::sparse::Traces;
use crate::util::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMap {
    /// Turbo over `[min, max]` of the data.
    Turbo,
    /// Red blue over `[-max_abs, max_abs]`, zero is white.
    RedBlue,
}

/// Value to `[0, 1]` mapping of a color map over some data.
#[derive(Copy, Clone, Debug)]
struct Normalizer {
    map: ColorMap,
    low: f64,
    high: f64,
}

impl Normalizer {
    fn new(map: ColorMap, values: &[f64]) -> Self {
        let (low, high) = match map {
            ColorMap::Turbo => values.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(*v), hi.max(*v)),
            ),
            ColorMap::RedBlue => {
                let m = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
                (-m, m)
            }
        };
        Normalizer { map, low, high }
    }

    fn with_range(map: ColorMap, low: f64, high: f64) -> Self {
        Normalizer { map, low, high }
    }

    fn color(&self, v: f64) -> image::Rgb<u8> {
        let span = self.high - self.low;
        let r = if span > 0.0 && span.is_finite() {
            ((v - self.low) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let c = match self.map {
            ColorMap::Turbo => colorous::TURBO.eval_continuous(r),
            // Red for positive values
            ColorMap::RedBlue => colorous::RED_BLUE.eval_continuous(1.0 - r),
        };
        image::Rgb(c.as_array())
    }
}

/// Space time image of a 1D run, one line per frame.
pub struct Image1D {
    img_buffer: image::RgbImage,
    normalizer: Normalizer,
}

impl Image1D {
    /// Lines are colored over the fixed range `[low, high]`.
    pub fn new(bound: AABB<1>, lines: u32, low: f64, high: f64) -> Self {
        let exclusive_bound = bound.exclusive_bounds();
        Image1D {
            img_buffer: image::RgbImage::new(exclusive_bound[0] as u32, lines),
            normalizer: Normalizer::with_range(ColorMap::Turbo, low, high),
        }
    }

    pub fn add_line(&mut self, l: u32, v: &[f64]) {
        debug_assert!(l < self.img_buffer.height());
        debug_assert_eq!(v.len(), self.img_buffer.width() as usize);
        for x in 0..self.img_buffer.width() {
            let c = self.normalizer.color(v[x as usize]);
            self.img_buffer.put_pixel(x, l, c);
        }
    }

    pub fn write<F: AsRef<std::path::Path>>(self, s: &F) -> Result<()> {
        log::info!("writing {:?}", s.as_ref());
        self.img_buffer.save(s)?;
        Ok(())
    }
}

/// Axis 0 runs down the image, axis 1 across.
pub fn image2d<F: AsRef<std::path::Path>, DomainType: DomainView<2>>(
    domain: &DomainType,
    map: ColorMap,
    s: &F,
) -> Result<()> {
    log::info!("writing {:?}", s.as_ref());
    let aabb = domain.aabb();
    let exclusive_bounds = aabb.exclusive_bounds();
    let normalizer = Normalizer::new(map, domain.buffer());
    let mut img = image::RgbImage::new(
        exclusive_bounds[1] as u32,
        exclusive_bounds[0] as u32,
    );
    for (l, value) in domain.buffer().iter().enumerate() {
        let local = aabb.linear_to_coord(l) - aabb.min();
        img.put_pixel(
            local[1] as u32,
            local[0] as u32,
            normalizer.color(*value),
        );
    }
    img.save(s)?;
    Ok(())
}

/// Shot gather, time down the image and receivers across.
pub fn gather_image<F: AsRef<std::path::Path>>(
    traces: &Traces,
    s: &F,
) -> Result<()> {
    log::info!("writing {:?}", s.as_ref());
    if traces.nt() == 0 || traces.npoint() == 0 {
        return Err(Error::Configuration(
            "cannot draw an empty gather".to_string(),
        ));
    }
    let normalizer = Normalizer::new(ColorMap::RedBlue, traces.data());
    let mut img =
        image::RgbImage::new(traces.npoint() as u32, traces.nt() as u32);
    for t in 0..traces.nt() {
        for (p, value) in traces.row(t).iter().enumerate() {
            img.put_pixel(p as u32, t as u32, normalizer.color(*value));
        }
    }
    img.save(s)?;
    Ok(())
}
