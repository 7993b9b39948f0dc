/// Turns a cron expression into a sentence for display. Implementations must
/// be total: anything they cannot describe comes back in a fallback form.
pub trait CronHumanizer: Send + Sync {
    fn humanize(&self, expression: &str) -> String;
}

impl<F> CronHumanizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn humanize(&self, expression: &str) -> String {
        self(expression)
    }
}

/// Describes the five-field expressions the scheduler produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCronHumanizer;

impl CronHumanizer for StandardCronHumanizer {
    fn humanize(&self, expression: &str) -> String {
        humanize_cron_expression(expression)
    }
}

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn humanize_cron_expression(expression: &str) -> String {
    describe(expression).unwrap_or_else(|| format!("Cron: {}", expression.trim()))
}

fn describe(expression: &str) -> Option<String> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    let &[minute, hour, day, month, weekday] = fields.as_slice() else {
        return None;
    };

    let any = |field: &str| field == "*";

    if any(minute) && any(hour) && any(day) && any(month) && any(weekday) {
        return Some("Every minute".to_string());
    }

    if let Some(every) = step(minute) {
        if any(hour) && any(day) && any(month) && any(weekday) {
            return Some(plural(every, "minute"));
        }
        return None;
    }

    let minute = number(minute, 0, 59)?;

    if any(hour) {
        if any(day) && any(month) && any(weekday) {
            return Some(format!("Every hour at :{:02}", minute));
        }
        return None;
    }

    if let Some(every) = step(hour) {
        if any(day) && any(month) && any(weekday) {
            return Some(format!("{} at :{:02}", plural(every, "hour"), minute));
        }
        return None;
    }

    let hour = number(hour, 0, 23)?;
    let time = format!("{:02}:{:02}", hour, minute);

    match (any(day), any(month), any(weekday)) {
        (true, true, true) => Some(format!("Every day at {}", time)),
        (true, true, false) => {
            let days = weekdays(weekday)?;
            Some(format!("Every {} at {}", days, time))
        }
        (false, true, true) => {
            let day = number(day, 1, 31)?;
            Some(format!("Every month on day {} at {}", day, time))
        }
        (false, false, true) => {
            let day = number(day, 1, 31)?;
            let month = number(month, 1, 12)?;
            Some(format!(
                "Every year on {} {} at {}",
                MONTHS[month as usize - 1],
                day,
                time
            ))
        }
        _ => None,
    }
}

fn step(field: &str) -> Option<u32> {
    let rest = field.strip_prefix("*/")?;
    rest.parse().ok().filter(|n| *n > 0)
}

fn number(field: &str, min: u32, max: u32) -> Option<u32> {
    field.parse().ok().filter(|n| (min..=max).contains(n))
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("Every {}", unit)
    } else {
        format!("Every {} {}s", n, unit)
    }
}

fn weekdays(field: &str) -> Option<String> {
    let mut days = Vec::new();
    for part in field.split(',') {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = weekday_index(start)?;
                let end = weekday_index(end)?;
                if start > end {
                    return None;
                }
                days.extend(start..=end);
            }
            None => days.push(weekday_index(part)?),
        }
    }
    days.sort_unstable();
    days.dedup();

    match days.as_slice() {
        [1, 2, 3, 4, 5] => Some("weekday".to_string()),
        [0, 6] => Some("weekend day".to_string()),
        _ => Some(
            days.iter()
                .map(|d| WEEKDAYS[*d])
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}

// cron allows 7 as an alias for Sunday
fn weekday_index(field: &str) -> Option<usize> {
    let n: usize = field.parse().ok()?;
    match n {
        0..=6 => Some(n),
        7 => Some(0),
        _ => None,
    }
}
