use crate::errors::DomainError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// サーバーとやり取りするローカル日時の書式
pub const ISO_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// 画面表示用の書式（de-DE）
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y, %H:%M";

static ISO_LOCAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-9]{2})?$").expect("valid regex")
});

static GERMAN_LOCALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{4}),\s*([0-9]{2}):([0-9]{2})$").expect("valid regex")
});

/// 表示用に日時を整形
pub fn format_display(value: &NaiveDateTime) -> String {
    value.format(DISPLAY_FORMAT).to_string()
}

/// 任意の入力を `YYYY-MM-DDTHH:MM:SS` に正規化する
///
/// * ISO 形式はそのまま（秒がなければ `:00` を補う）
/// * `dd.MM.yyyy, HH:mm` は ISO に並べ替える
/// * RFC 3339 はローカル時刻に変換する
/// * それ以外は前後の空白を除いてそのまま返す
///
/// 空白のみの入力は `None`
pub fn normalize_due_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if ISO_LOCAL.is_match(trimmed) {
        return Some(if trimmed.len() == 16 {
            format!("{trimmed}:00")
        } else {
            trimmed.to_string()
        });
    }

    if let Some(caps) = GERMAN_LOCALE.captures(trimmed) {
        return Some(format!(
            "{}-{}-{}T{}:{}:00",
            &caps[3], &caps[2], &caps[1], &caps[4], &caps[5]
        ));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(format_local(&parsed.with_timezone(&Local).naive_local()));
    }

    Some(trimmed.to_string())
}

/// 正規化した上で日時として解釈する
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDateTime>, DomainError> {
    match normalize_due_date(value) {
        None => Ok(None),
        Some(normalized) => NaiveDateTime::parse_from_str(&normalized, ISO_LOCAL_FORMAT)
            .map(Some)
            .map_err(|_| DomainError::InvalidDueDate(value.trim().to_string())),
    }
}

/// 日付と時刻の入力欄から期限日時を組み立てる
/// どちらか一方だけの入力はエラー
pub fn build_due_date(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
) -> Result<Option<NaiveDateTime>, DomainError> {
    match (date, time) {
        (None, None) => Ok(None),
        (Some(date), Some(time)) => {
            let time = time
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(time);
            Ok(Some(date.and_time(time)))
        }
        _ => Err(DomainError::IncompleteDueDate),
    }
}

fn format_local(value: &NaiveDateTime) -> String {
    value
        .with_second(0)
        .unwrap_or(*value)
        .format(ISO_LOCAL_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_passes_through() {
        assert_eq!(
            normalize_due_date("2026-11-01T18:00"),
            Some("2026-11-01T18:00:00".to_string())
        );
        assert_eq!(
            normalize_due_date(" 2026-11-01T18:00:30 "),
            Some("2026-11-01T18:00:30".to_string())
        );
    }

    #[test]
    fn test_german_locale_is_converted() {
        assert_eq!(
            normalize_due_date("01.11.2026, 18:05"),
            Some("2026-11-01T18:05:00".to_string())
        );
        assert_eq!(
            normalize_due_date("01.11.2026,18:05"),
            Some("2026-11-01T18:05:00".to_string())
        );
    }

    #[test]
    fn test_rfc3339_is_converted_to_local() {
        let normalized = normalize_due_date("2026-11-01T18:05:00Z").unwrap();
        assert!(ISO_LOCAL.is_match(&normalized));
        assert!(normalized.ends_with(":00"));
    }

    #[test]
    fn test_blank_and_unknown_input() {
        assert_eq!(normalize_due_date("   "), None);
        assert_eq!(normalize_due_date(" tomorrow "), Some("tomorrow".to_string()));
        assert!(parse_due_date("tomorrow").is_err());
        assert_eq!(parse_due_date("").unwrap(), None);
    }

    #[test]
    fn test_non_ascii_digits_are_not_dates() {
        let iso = "\u{0662}\u{0660}\u{0662}\u{0666}-01-31T14:05";
        assert_eq!(normalize_due_date(iso), Some(iso.to_string()));
        let german = "31.01.\u{0662}\u{0660}\u{0662}\u{0666}, 14:05";
        assert_eq!(normalize_due_date(german), Some(german.to_string()));
    }

    #[test]
    fn test_display_round_trip() {
        let parsed = parse_due_date("2026-11-01T18:05").unwrap().unwrap();
        let display = format_display(&parsed);
        assert_eq!(display, "01.11.2026, 18:05");
        assert_eq!(parse_due_date(&display).unwrap(), Some(parsed));
    }

    #[test]
    fn test_build_due_date_requires_both_parts() {
        let date = NaiveDate::from_ymd_opt(2026, 11, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 45).unwrap();

        let built = build_due_date(Some(date), Some(time)).unwrap().unwrap();
        assert_eq!(built.format(ISO_LOCAL_FORMAT).to_string(), "2026-11-01T09:30:00");
        assert_eq!(build_due_date(None, None).unwrap(), None);
        assert_eq!(
            build_due_date(Some(date), None),
            Err(DomainError::IncompleteDueDate)
        );
        assert_eq!(
            build_due_date(None, Some(time)),
            Err(DomainError::IncompleteDueDate)
        );
    }
}
