//! Filter/sort pipeline for the visible concert list

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use gigwatch_common::time;

use crate::models::{Concert, ConcertFilter, StatusFilter};

/// Status predicate
///
/// Time-window statuses pass concerts starting within `[now, now + N days]`;
/// an unparseable date never passes them.
pub fn matches_status(concert: &Concert, status: StatusFilter, now: DateTime<Utc>) -> bool {
    match status {
        StatusFilter::All => true,
        StatusFilter::Favorites => concert.is_favorite,
        StatusFilter::Purchased => concert.ticket_purchased,
        StatusFilter::Next30Days | StatusFilter::Next90Days => {
            let Some(window) = status.window_days() else {
                return false;
            };
            concert
                .starts_at()
                .is_some_and(|start| start >= now && start <= now + time::days(window))
        }
    }
}

/// Country predicate: `None` passes everything, otherwise exact match
pub fn matches_country(concert: &Concert, country: Option<&str>) -> bool {
    country.map_or(true, |country| concert.country == country)
}

/// Visible concerts: conjunctive filter, then ascending by date
///
/// The sort is stable; concerts with unparseable dates go last. The input is
/// never modified.
pub fn filter_concerts<'a>(
    concerts: &'a [Concert],
    filter: &ConcertFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Concert> {
    let country = filter.country.as_deref().filter(|c| !c.is_empty());

    let mut visible: Vec<&Concert> = concerts
        .iter()
        .filter(|concert| matches_status(concert, filter.status, now))
        .filter(|concert| matches_country(concert, country))
        .collect();

    sort_by_date(&mut visible);
    visible
}

/// Stable ascending sort by parsed date, unparseable dates last
pub fn sort_by_date(concerts: &mut [&Concert]) {
    concerts.sort_by_cached_key(|concert| {
        let start = concert.starts_at();
        (start.is_none(), start)
    });
}

/// Distinct countries across the full collection, sorted
pub fn available_countries(concerts: &[Concert]) -> Vec<String> {
    concerts
        .iter()
        .map(|concert| concert.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn concert(id: &str, date: &str, country: &str) -> Concert {
        Concert {
            id: id.to_string(),
            band_name: "Low".to_string(),
            date: date.to_string(),
            city: "City".to_string(),
            country: country.to_string(),
            venue: "Venue".to_string(),
            ticket_url: "u".to_string(),
            is_favorite: false,
            reminder_days: None,
            ticket_purchased: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn ids(concerts: &[&Concert]) -> Vec<String> {
        concerts.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_all_sorts_without_dropping() {
        let concerts = vec![
            concert("c", "2025-03-01", "Norway"),
            concert("a", "2025-01-15", "Spain"),
            concert("b", "2025-02-01T10:00:00Z", "Norway"),
        ];
        let visible = filter_concerts(&concerts, &ConcertFilter::default(), now());
        assert_eq!(ids(&visible), vec!["a", "b", "c"]);
        // Input untouched
        assert_eq!(concerts[0].id, "c");
    }

    #[test]
    fn test_ties_keep_input_order_and_bad_dates_go_last() {
        let concerts = vec![
            concert("bad", "someday", "Norway"),
            concert("x", "2025-02-01", "Norway"),
            concert("y", "2025-02-01T00:00:00Z", "Norway"),
            concert("early", "2025-01-10", "Norway"),
        ];
        let visible = filter_concerts(&concerts, &ConcertFilter::default(), now());
        assert_eq!(ids(&visible), vec!["early", "x", "y", "bad"]);
    }

    #[test]
    fn test_status_and_country_are_conjunctive() {
        let mut fav_norway = concert("fav-no", "2025-02-01", "Norway");
        fav_norway.is_favorite = true;
        let mut fav_spain = concert("fav-es", "2025-02-02", "Spain");
        fav_spain.is_favorite = true;
        let plain_norway = concert("plain-no", "2025-02-03", "Norway");
        let concerts = vec![fav_norway, fav_spain, plain_norway];

        let filter = ConcertFilter::new(StatusFilter::Favorites).with_country("Norway");
        let visible = filter_concerts(&concerts, &filter, now());
        assert_eq!(ids(&visible), vec!["fav-no"]);
    }

    #[test]
    fn test_purchased_filter() {
        let mut bought = concert("bought", "2025-02-01", "Norway");
        bought.ticket_purchased = true;
        let concerts = vec![concert("not", "2025-01-05", "Norway"), bought];

        let visible = filter_concerts(&concerts, &ConcertFilter::new(StatusFilter::Purchased), now());
        assert_eq!(ids(&visible), vec!["bought"]);
    }

    #[test]
    fn test_unknown_country_is_empty_not_error() {
        let concerts = vec![concert("a", "2025-02-01", "Norway")];
        let filter = ConcertFilter::default().with_country("Atlantis");
        assert!(filter_concerts(&concerts, &filter, now()).is_empty());
    }

    #[test]
    fn test_country_is_case_sensitive() {
        let concerts = vec![concert("a", "2025-02-01", "Norway")];
        let filter = ConcertFilter::default().with_country("norway");
        assert!(filter_concerts(&concerts, &filter, now()).is_empty());
    }

    #[test]
    fn test_time_windows() {
        let concerts = vec![
            concert("past", "2024-12-31", "Norway"),
            concert("soon", "2025-01-20", "Norway"),
            concert("edge30", "2025-01-31T00:00:00Z", "Norway"),
            concert("later", "2025-03-15", "Norway"),
            concert("far", "2025-06-01", "Norway"),
            concert("bad", "tbd", "Norway"),
        ];

        let next30 = filter_concerts(&concerts, &ConcertFilter::new(StatusFilter::Next30Days), now());
        assert_eq!(ids(&next30), vec!["soon", "edge30"]);

        let next90 = filter_concerts(&concerts, &ConcertFilter::new(StatusFilter::Next90Days), now());
        assert_eq!(ids(&next90), vec!["soon", "edge30", "later"]);
    }

    #[test]
    fn test_available_countries_sorted_distinct_from_full_set() {
        let concerts = vec![
            concert("a", "2025-02-01", "Spain"),
            concert("b", "2025-02-01", "Norway"),
            concert("c", "2025-02-01", "Spain"),
            concert("d", "2025-02-01", "norway"),
        ];
        assert_eq!(available_countries(&concerts), vec!["Norway", "Spain", "norway"]);
        assert!(available_countries(&[]).is_empty());
    }

    #[test]
    fn test_each_listed_country_selects_only_its_concerts() {
        let concerts = vec![
            concert("no", "2025-02-01", "Norway "),
            concert("all", "2025-02-02", "All"),
            concert("es", "2025-02-03", "Spain"),
        ];

        for country in available_countries(&concerts) {
            let filter = ConcertFilter::default().with_country(country.clone());
            let visible = filter_concerts(&concerts, &filter, now());

            let expected: Vec<String> = concerts
                .iter()
                .filter(|c| c.country == country)
                .map(|c| c.id.clone())
                .collect();
            assert_eq!(ids(&visible), expected, "country {:?}", country);
            assert_eq!(visible.len(), 1);
        }
    }
}
