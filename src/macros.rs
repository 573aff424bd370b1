use chrono::{DateTime, Local};

/// Similar to `info!` macro in tracing.
/// You can pass in the starting time and it will print how long it took from starting time to now.
/// ```
/// use chrono::Local;
/// use imdb_scrap::info_time;
///
/// info_time!("str {}, {}", 1, 2);
/// let time = Local::now();
/// info_time!(time, "str {}, {}", 1, 2);
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        let msg = format!($strfm, $($arg),*);
        println!("{}", $crate::log_line(::chrono::Local::now(), &msg, None));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        let msg = format!($strfm, $($arg),*);
        println!("{}", $crate::log_line(::chrono::Local::now(), &msg, Some($time)));
    }};
}

/// Same line format as `info_time!`, but goes to stderr.
#[macro_export]
macro_rules! warn_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        let msg = format!($strfm, $($arg),*);
        eprintln!("{}", $crate::log_line(::chrono::Local::now(), &msg, None));
    }};
}

/// `"<timestamp> : <msg>"`, plus a `RUNTIME` line when a start time is given.
#[doc(hidden)]
pub fn log_line(now: DateTime<Local>, msg: &str, since: Option<DateTime<Local>>) -> String {
    let line = format!("{:<30} : {}", now, msg);
    match since {
        Some(start) => {
            let run_time = (now - start)
                .num_microseconds()
                .map(|n| n as f64 / 1_000_000.0)
                .unwrap_or(0.0);
            format!("{line}\nRUNTIME: {run_time} sec")
        }
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2020, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn plain_line() {
        let line = log_line(noon(), "Started crawling", None);
        let (stamp, msg) = line.split_once(" : ").unwrap();
        assert!(stamp.starts_with("2020-07-15 12:00:00"));
        assert_eq!(msg, "Started crawling");
    }

    #[test]
    fn line_with_runtime() {
        let start = noon();
        let line = log_line(start + Duration::milliseconds(1_500), "done", Some(start));
        assert!(line.ends_with(" : done\nRUNTIME: 1.5 sec"), "{line}");
    }
}
