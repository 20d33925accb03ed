//! Structured diagnostics for the encoder pipeline.
//!
//! The `log_metric!` macro turns key/value pairs into one JSON-like line on the
//! `log` facade at debug level, so clustering and packing decisions can be
//! grepped out of a verbose run. Nothing is formatted unless debug logging is
//! enabled.

/// Logs a structured key-value metric string at debug level.
///
/// # Example
/// ```
/// use monovid::log_metric;
/// let cost = 412u64;
/// log_metric!("event"="kmodes_run", "init"=&0, "cost"=&cost);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if ::log::log_enabled!(::log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            ::log::debug!("MONOVID_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
