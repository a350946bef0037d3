#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Compile a pattern source, panicking on malformed input. Intended for
/// statically known patterns (registration tables, tests).
#[macro_export]
macro_rules! pattern {
    ($src:expr) => {
        $crate::compile($src).unwrap_or_else(|err| panic!("invalid pattern {:?}: {}", $src, err))
    };
}
