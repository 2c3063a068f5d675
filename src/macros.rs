/// Prints a timestamped progress line, like `info!` in tracing.
/// Pass a starting time first to also print how long it took from then until now.
/// ```
/// use aduana::info_time;
/// use chrono::Local;
///
/// info_time!("str {}, {}", 1, 2);
/// let time = Local::now();
/// info_time!(time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {
        println!("{}", $crate::__stamp!(format!($strfm, $($arg),*)))
    };
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {
        println!("{}", $crate::__stamp!($time, format!($strfm, $($arg),*)))
    };
}

/// Same as [`info_time!`] but goes to stderr, for failures.
#[macro_export]
macro_rules! error_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {
        eprintln!("{}", $crate::__stamp!(format!("ERROR {}", format!($strfm, $($arg),*))))
    };
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {
        eprintln!("{}", $crate::__stamp!($time, format!("ERROR {}", format!($strfm, $($arg),*))))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __stamp {
    ($msg:expr) => {
        format!("{:<30} : {}", ::chrono::Local::now(), $msg)
    };
    ($time:expr, $msg:expr) => {{
        let local_now = ::chrono::Local::now();
        let run_time = (local_now - $time)
            .num_microseconds()
            .map(|n| n as f64 / 1_000_000.0)
            .unwrap_or(0.0);
        format!("{:<30} : {}\nRUNTIME: {} sec", local_now, $msg, run_time)
    }};
}
