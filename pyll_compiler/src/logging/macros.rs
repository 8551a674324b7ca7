//! Logging macros. Context values accept anything implementing `Display`.
//!
//! ```ignore
//! log_error!(error.error_code(), "Lexical analysis failed",
//!     span = error.span(),
//!     "line" => error.line());
//! log_warning!(code = codes::grammar::UNDEFINED_NON_TERMINAL, "Undeclared symbol",
//!     "symbol" => symbol);
//! ```

/// Stringify `key => value` pairs and hand them to a context-taking backend
#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_context {
    ($backend:path, [$($lead:expr),*], $($key:expr => $value:expr),*) => {{
        let owned: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),*];
        let context: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        $backend($($lead,)* context)
    }};
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(
            $crate::logging::log_error_with_context,
            [$code, $message, Some($span)],
            $($key => $value),*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(
            $crate::logging::log_error_with_context,
            [$code, $message, None],
            $($key => $value),*
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(
            $crate::logging::log_success_with_context,
            [$code, $message],
            $($key => $value),*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_with_context!(
            $crate::logging::log_info_with_context,
            [$message],
            $($key => $value),*
        )
    };
}

/// Warning with a registered code, or with the generic `W000`
#[macro_export]
macro_rules! log_warning {
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut event = $crate::logging::LogEvent::warning_with_code($code, $message);
        $( event = event.with_context($key, &format!("{}", $value)); )*
        $crate::logging::dispatch_with_file_context(event);
    }};

    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        #[allow(unused_mut)]
        let mut event = $crate::logging::LogEvent::warning($message);
        $( event = event.with_context($key, &format!("{}", $value)); )*
        $crate::logging::dispatch_with_file_context(event);
    }};
}

/// Context values are only formatted when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            #[allow(unused_mut)]
            let mut event = $crate::logging::LogEvent::debug($message);
            $( event = event.with_context($key, &format!("{}", $value)); )*
            $crate::logging::dispatch_with_file_context(event);
        }
    }};
}

/// Success event with a `duration_ms` field
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
            $(, $key => $value)*
        )
    };
}
