//! Frame timecode carried in the LiveLink header

use chrono::{Local, Timelike};

/// Sub-frame value sent by LiveLink face publishers.
///
/// Its derivation is unknown; consumers accept it as-is.
pub const DEFAULT_SUB_FRAME: u32 = 1_056_060_032;

/// Frame number + sub-frame pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub frame_number: u32,
    pub sub_frame: u32,
}

impl Timecode {
    pub fn new(frame_number: u32, sub_frame: u32) -> Self {
        Self {
            frame_number,
            sub_frame,
        }
    }

    /// Frames elapsed since midnight of `now` at `fps`.
    ///
    /// Saturates at `u32::MAX` for frame rates too high to count a whole day.
    pub fn frames_of_day<T: Timelike>(now: &T, fps: u32) -> u32 {
        let secs = u64::from(now.num_seconds_from_midnight());
        // Leap seconds report more than 999 ms
        let millis = u64::from((now.nanosecond() / 1_000_000).min(999));
        let fps = u64::from(fps);
        u32::try_from(secs * fps + millis * fps / 1000).unwrap_or(u32::MAX)
    }

    /// Timecode for `now` keeping the given sub-frame
    pub fn at<T: Timelike>(now: &T, fps: u32, sub_frame: u32) -> Self {
        Self::new(Self::frames_of_day(now, fps), sub_frame)
    }

    /// Timecode for the current local wall-clock time
    pub fn now(fps: u32, sub_frame: u32) -> Self {
        Self::at(&Local::now(), fps, sub_frame)
    }
}

impl Default for Timecode {
    fn default() -> Self {
        Self::new(0, DEFAULT_SUB_FRAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    #[test]
    fn test_frames_of_day() {
        let t = NaiveTime::from_hms_milli_opt(1, 0, 2, 500).unwrap();
        assert_eq!(Timecode::frames_of_day(&t, 30), 3_602 * 30 + 15);
        assert_eq!(Timecode::frames_of_day(&t, 60), 3_602 * 60 + 30);
    }

    #[test]
    fn test_counts_from_local_midnight() {
        let t = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(0, 0, 10)
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(Timecode::frames_of_day(&t, 30), 300);
    }

    #[test]
    fn test_leap_second_stays_in_range() {
        let t = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
        assert_eq!(Timecode::frames_of_day(&t, 1000), 86_399 * 1000 + 999);
    }

    #[test]
    fn test_huge_fps_saturates() {
        let t = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Timecode::frames_of_day(&t, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_now_keeps_sub_frame() {
        let timecode = Timecode::now(60, 7);
        assert_eq!(timecode.sub_frame, 7);
        assert!(timecode.frame_number < 86_400 * 60 + 60);
    }

    #[test]
    fn test_default_sub_frame() {
        assert_eq!(Timecode::default().sub_frame, DEFAULT_SUB_FRAME);
    }
}
