//! Logging macros
//!
//! On embedded targets with the `defmt` feature the macros forward to defmt;
//! in host unit tests they print to stdout; otherwise they compile to
//! nothing. Call sites are identical in every configuration.

/// Log at info level
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format_args!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log at warning level
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format_args!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log at error level
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(all(not(feature = "defmt"), test))]
        println!("[ERROR] {}", format_args!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

/// Log at debug level
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format_args!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}
