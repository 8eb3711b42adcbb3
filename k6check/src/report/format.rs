const MS_PER_SEC: f64 = 1_000.0;
const MS_PER_MIN: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Round to `places` decimals by decimal scaling: scale up, round to the
/// nearest integer (ties away from zero), scale back. Keeps x.xx5 boundaries
/// stable where rounding the binary float directly drifts.
pub(crate) fn round_decimals(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Render a duration given in fractional milliseconds as a single component
/// in the coarsest unit that fits (h, m, s, ms).
///
/// Only strictly-positive values use the standard renderer; zero goes through
/// the sub-millisecond path so very fast operations are not reported as 0ms.
pub(crate) fn format_duration_ms(ms: f64) -> String {
    if ms > 0.0 {
        format_standard(ms)
    } else {
        format_sub_millis(ms)
    }
}

fn format_standard(ms: f64) -> String {
    if ms >= MS_PER_HOUR {
        return format!("{}h", one_decimal(ms / MS_PER_HOUR));
    }
    if ms >= MS_PER_MIN {
        return format!("{}m", one_decimal(ms / MS_PER_MIN));
    }
    if ms >= MS_PER_SEC {
        return format!("{}s", one_decimal(ms / MS_PER_SEC));
    }
    if ms >= 1.0 {
        return format!("{}ms", one_decimal(ms));
    }

    // Rounds to zero at millisecond granularity.
    format_sub_millis(ms)
}

fn format_sub_millis(ms: f64) -> String {
    let us = ms * 1_000.0;
    if us >= 1.0 {
        return format!("{}µs", one_decimal(us));
    }

    let ns = us * 1_000.0;
    if ns >= 1.0 {
        return format!("{}ns", one_decimal(ns));
    }

    "0µs".to_string()
}

/// Render a byte count (or bytes/sec rate) with decimal unit prefixes and one
/// decimal place of precision.
pub(crate) fn format_bytes(bytes: f64) -> String {
    const KB: f64 = 1_000.0;
    const MB: f64 = 1_000_000.0;
    const GB: f64 = 1_000_000_000.0;
    const TB: f64 = 1_000_000_000_000.0;

    if bytes >= TB {
        return format!("{} TB", one_decimal(bytes / TB));
    }
    if bytes >= GB {
        return format!("{} GB", one_decimal(bytes / GB));
    }
    if bytes >= MB {
        return format!("{} MB", one_decimal(bytes / MB));
    }
    if bytes >= KB {
        return format!("{} kB", one_decimal(bytes / KB));
    }

    format!("{} B", one_decimal(bytes))
}

/// One decimal place, trailing `.0` trimmed ("1.5", "350", "2").
fn one_decimal(value: f64) -> String {
    let rounded = round_decimals(value, 1);
    if rounded == rounded.trunc() {
        format!("{}", rounded as u64)
    } else {
        format!("{rounded:.1}")
    }
}
