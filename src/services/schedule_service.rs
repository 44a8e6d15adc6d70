use crate::models::attraction::ScheduleWindow;

// Activities are only ever scheduled on whole hours between 08:00 and 22:00.
const EARLIEST_HOUR: u32 = 8;
const LATEST_HOUR: u32 = 22;

const MINUTES_PER_DAY: u32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    /// Preferred whole hour for each slot.
    pub fn preferred_hour(&self) -> u32 {
        match self {
            MealSlot::Breakfast => 8,
            MealSlot::Lunch => 12,
            MealSlot::Dinner => 19,
        }
    }
}

pub fn is_valid_schedule_hour(hour: i64) -> bool {
    (EARLIEST_HOUR as i64..=LATEST_HOUR as i64).contains(&hour)
}

/// Parse "HH:MM" into minutes since midnight. Malformed input yields None.
fn parse_minutes(time: &str) -> Option<u32> {
    let (h, m) = time.split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Whole hours in [8, 22] at which the venue is open.
///
/// A closing time smaller than the opening time means the venue closes after
/// midnight, so the close gets pushed into the next day before comparing.
pub fn available_hours(window: &ScheduleWindow) -> Vec<u32> {
    let opens = match parse_minutes(&window.opens) {
        Some(m) => m,
        None => return Vec::new(),
    };
    let mut closes = match parse_minutes(&window.closes) {
        Some(m) => m,
        None => return Vec::new(),
    };
    if closes < opens {
        closes += MINUTES_PER_DAY;
    }

    (EARLIEST_HOUR..=LATEST_HOUR)
        .filter(|h| h * 60 >= opens && h * 60 < closes)
        .collect()
}

/// Pick the scheduling hour for a meal slot within the venue's window.
///
/// Returns the slot's preferred hour when the venue is open then, otherwise
/// the open hour closest to the preference (ascending scan, so the earlier
/// hour wins an equidistant tie). If the venue has no standing whole hour at
/// all, the raw preference comes back as a degraded fallback and the caller
/// must treat it as "no slot guaranteed".
pub fn select_meal_time(window: &ScheduleWindow, slot: MealSlot) -> u32 {
    let preferred = slot.preferred_hour();
    let hours = available_hours(window);

    if hours.contains(&preferred) {
        return preferred;
    }

    let mut best: Option<(u32, u32)> = None;
    for hour in hours {
        let distance = preferred.abs_diff(hour);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((hour, distance));
        }
    }

    match best {
        Some((hour, _)) => hour,
        None => preferred,
    }
}

/// Round "HH:MM" to the nearest whole hour: minutes < 30 round down, >= 30
/// round up, and 23:30+ rolls over to next-day "00:00". Input that does not
/// parse as a 24-hour time yields None so callers can reject it instead of
/// echoing a non-round string.
///
/// Every display time the system emits passes through here; nothing that is
/// not on a whole hour is ever shown to a user.
pub fn try_round_time_to_hour(time: &str) -> Option<String> {
    let minutes = parse_minutes(time)?;

    let mut hour = minutes / 60;
    if minutes % 60 >= 30 {
        hour += 1;
    }
    if hour > 23 {
        hour = 0;
    }
    Some(format!("{:02}:00", hour))
}
