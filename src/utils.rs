/// Duration rounded to whole minutes, never less than one.
pub fn whole_minutes(duration_seconds: f64) -> i64 {
    if !duration_seconds.is_finite() {
        return 1;
    }
    ((duration_seconds / 60.0).round() as i64).max(1)
}

pub fn format_duration(duration: chrono::Duration) -> String {
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let seconds = duration.num_seconds() % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_round_and_floor_at_one() {
        assert_eq!(whole_minutes(0.0), 1);
        assert_eq!(whole_minutes(29.0), 1);
        assert_eq!(whole_minutes(89.0), 1);
        assert_eq!(whole_minutes(90.0), 2);
        assert_eq!(whole_minutes(1200.0), 20);
    }

    #[test]
    fn duration_is_clock_formatted() {
        let d = chrono::Duration::seconds(3 * 3600 + 7 * 60 + 5);
        assert_eq!(format_duration(d), "03:07:05");
    }
}
