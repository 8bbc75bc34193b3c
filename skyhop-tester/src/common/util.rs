use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use skyhop_missions::ObjectiveType;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse `OBJECTIVE:N`, e.g. `play_games:3` or `ReachScore:120`.
pub fn parse_report(raw: &str) -> Result<(ObjectiveType, i64)> {
    let (kind, amount) = raw
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("expected OBJECTIVE:N, got `{raw}`"))?;
    let objective = kind.trim().parse::<ObjectiveType>()?;
    let amount = amount
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid amount in `{raw}`"))?;
    Ok((objective, amount))
}

/// Parse a local wall-clock time. Accepts `YYYY-MM-DDTHH:MM[:SS]`, the same with a
/// space, or a bare date meaning midnight.
pub fn parse_now(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .with_context(|| format!("unrecognised time `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" smoke, ,score-claim,  b ");
        assert_eq!(parts, vec!["smoke", "score-claim", "b"]);
    }

    #[test]
    fn parse_report_accepts_both_spellings() {
        assert_eq!(
            parse_report("play_games:3").unwrap(),
            (ObjectiveType::PlayGames, 3)
        );
        assert_eq!(
            parse_report(" ReachScore : 120 ").unwrap(),
            (ObjectiveType::ReachScore, 120)
        );
        assert!(parse_report("play_games").is_err());
        assert!(parse_report("flying:3").is_err());
        assert!(parse_report("play_games:lots").is_err());
    }

    #[test]
    fn parse_now_accepts_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_now("2024-05-15T09:30:00").unwrap(), expected);
        assert_eq!(parse_now("2024-05-15 09:30").unwrap(), expected);
        assert_eq!(
            parse_now("2024-05-15").unwrap(),
            expected.date().and_time(NaiveTime::MIN)
        );
        assert!(parse_now("tomorrow").is_err());
    }
}
