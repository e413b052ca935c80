/// Compares two secrets without short-circuiting on the first mismatch,
/// so the comparison time does not leak how much of the secret matched.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Logs a warning message with an 'ALERT:' prefix.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        warn!("ALERT: {}", format_args!($($arg)*));
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_secrets_match() {
        assert!(constant_time_eq("hunter2", "hunter2"));
    }

    #[test]
    fn different_secrets_do_not_match() {
        assert!(!constant_time_eq("hunter2", "hunter3"));
        assert!(!constant_time_eq("hunter2", "hunter"));
        assert!(!constant_time_eq("", "hunter2"));
    }

    #[test]
    fn empty_secrets_match() {
        assert!(constant_time_eq("", ""));
    }
}
