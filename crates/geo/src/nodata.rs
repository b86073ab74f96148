/// Centralizes the "is this cell missing data" check used throughout the sweep kernels.
///
/// The sweep algorithms use `f64::NAN` as the sentinel for "no value here" and need a
/// single place that decides that, so a future change of sentinel (or support for an
/// explicit nodata value distinct from NaN) only touches this function.
#[inline]
pub fn is_missing(v: f64) -> bool {
    v.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_missing() {
        assert!(is_missing(f64::NAN));
        assert!(!is_missing(0.0));
        assert!(!is_missing(f64::INFINITY));
    }
}
