// Logging shims. With the `defmt` feature these forward to defmt, otherwise the arguments are
// borrowed and dropped so callers don't grow unused-variable warnings.
#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::defmt::debug!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($fmt:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($(&$x,)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)*) => {
        ::defmt::info!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($fmt:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($(&$x,)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)*) => {
        ::defmt::warn!($($arg)*)
    };
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($fmt:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($(&$x,)*);
    }};
}
