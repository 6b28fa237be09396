use crate::models::PeriodToken;

/// Every month from `start` to `end` inclusive, oldest first.
///
/// Day components are ignored; a `start` after `end` yields nothing.
pub fn months_in_range(start: PeriodToken, end: PeriodToken) -> Vec<PeriodToken> {
    let last = end.month_token();
    let mut cursor = start.month_token();
    let mut months = Vec::with_capacity(month_count(start, end));

    while cursor <= last {
        months.push(cursor);
        cursor = cursor.next_month();
    }

    months
}

/// Inclusive number of months between the two bounds, zero when reversed.
pub fn month_count(start: PeriodToken, end: PeriodToken) -> usize {
    let index = |p: PeriodToken| p.year() as i64 * 12 + p.month_number() as i64;
    let span = index(end) - index(start) + 1;
    span.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PeriodToken {
        s.parse().unwrap()
    }

    fn rendered(months: &[PeriodToken]) -> Vec<String> {
        months.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_month_range() {
        assert_eq!(rendered(&months_in_range(p("2024-01"), p("2024-01"))), ["2024-01"]);
    }

    #[test]
    fn crosses_year_boundary() {
        assert_eq!(
            rendered(&months_in_range(p("2023-11"), p("2024-02"))),
            ["2023-11", "2023-12", "2024-01", "2024-02"]
        );
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(months_in_range(p("2024-03"), p("2024-01")).is_empty());
        assert_eq!(month_count(p("2024-03"), p("2024-01")), 0);
    }

    #[test]
    fn day_tokens_enumerate_their_months() {
        assert_eq!(
            rendered(&months_in_range(p("2024-01-31"), p("2024-03-01"))),
            ["2024-01", "2024-02", "2024-03"]
        );
    }

    #[test]
    fn ranges_are_contiguous_and_bounded() {
        let bounds = [
            ("2020-01", "2020-12"),
            ("2019-07", "2024-06"),
            ("1999-12", "2000-01"),
            ("2024-05", "2024-05"),
        ];
        for (s, e) in bounds {
            let months = months_in_range(p(s), p(e));
            assert_eq!(months.len(), month_count(p(s), p(e)));
            assert_eq!(months.first().unwrap().to_string(), s);
            assert_eq!(months.last().unwrap().to_string(), e);
            for pair in months.windows(2) {
                assert!(pair[0] < pair[1]);
                assert_eq!(pair[0].next_month(), pair[1]);
            }
        }
        assert_eq!(month_count(p("2019-07"), p("2024-06")), 60);
    }
}
