//! Unwrap helpers with good error messages.
//!
//! These replace `unwrap()` and `expect()` in test code; `#[track_caller]`
//! keeps the panic location at the call site.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error on failure.
///
/// ```rust
/// use hoverkart_test_helpers::must;
///
/// let value = must(Ok::<_, &str>(42));
/// assert_eq!(value, 42);
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`, with a message including the error value.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
///
/// ```rust
/// use hoverkart_test_helpers::must_some;
///
/// assert_eq!(must_some(Some(7), "expected a value"), 7);
/// ```
///
/// # Panics
///
/// Panics if the option is `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

/// Unwrap a `Result` with a context message.
///
/// # Panics
///
/// Panics if the result is `Err`, with the context and error value.
#[track_caller]
pub fn must_with<T, E: Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must_with: {context}: {e:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_ok() {
        assert_eq!(must(Ok::<i32, String>(42)), 42);
    }

    #[test]
    #[should_panic(expected = "must: unexpected Err")]
    fn test_must_err_panics() {
        let _ = must(Err::<i32, &str>("boom"));
    }

    #[test]
    #[should_panic(expected = "must_some: missing")]
    fn test_must_some_none_panics() {
        let _ = must_some(None::<i32>, "missing");
    }

    #[test]
    #[should_panic(expected = "must_with: loading config")]
    fn test_must_with_context() {
        let _ = must_with(Err::<i32, &str>("nope"), "loading config");
    }
}
