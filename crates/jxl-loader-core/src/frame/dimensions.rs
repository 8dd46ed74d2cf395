//! Output dimension negotiation.

/// Resolve the output size for a frame decoded at `width` x `height`.
///
/// A requested dimension of 0 leaves that axis unconstrained.
///
/// - Both unconstrained: the native size.
/// - `preserve_aspect_ratio` with one axis given: the other axis follows the
///   native aspect ratio.
/// - `preserve_aspect_ratio` with both axes given: the image is fitted into
///   the box using the smaller of the two scale factors.
/// - Otherwise the requested axes are used as-is, falling back to the native
///   size on an unconstrained axis.
///
/// Computed axes are rounded to the nearest pixel and never drop below 1.
pub fn compute_dimensions(
    width: u32,
    height: u32,
    requested_width: u32,
    requested_height: u32,
    preserve_aspect_ratio: bool,
) -> (u32, u32) {
    if requested_width == 0 && requested_height == 0 {
        return (width, height);
    }
    if requested_width == width && requested_height == height {
        return (width, height);
    }
    if width == 0 || height == 0 {
        // Nothing to take a ratio of.
        return (requested_width.max(1), requested_height.max(1));
    }

    let (src_w, src_h) = (width as f64, height as f64);
    let (out_w, out_h) = if preserve_aspect_ratio {
        if requested_width == 0 {
            let h = requested_height;
            (round(src_w * h as f64 / src_h), h)
        } else if requested_height == 0 {
            let w = requested_width;
            (w, round(src_h * w as f64 / src_w))
        } else {
            let scale = (requested_width as f64 / src_w).min(requested_height as f64 / src_h);
            (round(src_w * scale), round(src_h * scale))
        }
    } else {
        let w = if requested_width == 0 { width } else { requested_width };
        let h = if requested_height == 0 { height } else { requested_height };
        (w, h)
    };

    (out_w.max(1), out_h.max(1))
}

fn round(value: f64) -> u32 {
    value.round().min(u32::MAX as f64) as u32
}
