//! Internal helper macros.

/// Returns early with `Err($error)` unless `$predicate` holds.
///
/// `$error` is only evaluated on the failing path, so it may build the error
/// lazily.
///
/// ```ignore
/// ensure!(url.starts_with('/'), ParseError::malformed_request_line(line));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
