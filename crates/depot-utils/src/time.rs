use std::time::Duration;

/// Parses a compact duration string such as `30s`, `2m` or `1h30m`.
///
/// Units are `s`, `m`, `h` and `d`. Every number must carry a unit, and the
/// input must not be empty.
///
/// Returns `None` for malformed input or when the total overflows.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use depot_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("90"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut number_str = String::new();
        while let Some(c) = chars.peek() {
            if c.is_ascii_digit() {
                number_str.push(chars.next()?);
            } else {
                break;
            }
        }

        if number_str.is_empty() {
            return None;
        }

        let number: u64 = number_str.parse().ok()?;
        let multiplier: u64 = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(Duration::from_secs(total))
}
