use bson::Bson;

/// Coerce a numeric [`Bson`] value into an `i64` if it would be lossless to do so.
/// Returns `None` if the value isn't numeric or the conversion would be lossy (e.g.
/// `1.5 -> 1`).
pub(crate) fn get_int(val: &Bson) -> Option<i64> {
    match *val {
        Bson::Int32(i) => Some(i64::from(i)),
        Bson::Int64(i) => Some(i),
        Bson::Double(f) if f == f as i64 as f64 => Some(f as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    #[test]
    fn accepts_exact_integral_values() {
        assert_eq!(get_int(&bson!(1i32)), Some(1));
        assert_eq!(get_int(&bson!(1i64)), Some(1));
        assert_eq!(get_int(&bson!(1.0)), Some(1));
    }

    #[test]
    fn rejects_lossy_or_non_numeric_values() {
        assert_eq!(get_int(&bson!(1.5)), None);
        assert_eq!(get_int(&bson!("1")), None);
    }
}
