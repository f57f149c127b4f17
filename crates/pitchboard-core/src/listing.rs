use pitchboard_types::api::{ListingPage, PitchCard};

/// Merge persisted pitches with the static demo entries and slice out one
/// page. Demo entries carry the Unix-epoch sentinel timestamp, so any real
/// pitch always ranks ahead of them.
///
/// The sort must be stable: every demo entry shares the sentinel timestamp,
/// and deterministic pagination across calls depends on ties keeping their
/// input order.
pub fn compose_listing(
    persisted: Vec<PitchCard>,
    demos: Vec<PitchCard>,
    page: u32,
    page_size: u32,
) -> ListingPage {
    let page = page.max(1);
    let page_size = page_size.max(1);

    let mut all: Vec<PitchCard> = persisted;
    all.extend(demos);
    // Vec::sort_by is stable; ties break by input order.
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total_count = all.len();
    let total_pages = (total_count as u32).div_ceil(page_size);

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let items: Vec<PitchCard> = if start >= total_count {
        Vec::new()
    } else {
        all.into_iter().skip(start).take(page_size as usize).collect()
    };

    ListingPage {
        items,
        page,
        total_count,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn card(id: &str, ts: DateTime<Utc>) -> PitchCard {
        PitchCard {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            category: "Test".to_string(),
            image: String::new(),
            created_at: ts,
            author: None,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn demo(id: &str) -> PitchCard {
        card(id, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn newest_first_demos_last() {
        let persisted = vec![card("old", at(100)), card("new", at(200))];
        let demos = vec![demo("d0"), demo("d1")];

        let page = compose_listing(persisted, demos, 1, 10);
        let ids: Vec<&str> = page.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "d0", "d1"]);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn repeated_calls_return_identical_slices() {
        let persisted = vec![card("a", at(5)), card("b", at(5)), card("c", at(9))];
        let demos = vec![demo("d0"), demo("d1"), demo("d2")];

        let first = compose_listing(persisted.clone(), demos.clone(), 2, 2);
        let second = compose_listing(persisted, demos, 2, 2);
        let ids = |p: &ListingPage| p.items.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn pages_concatenate_to_full_ordering_exactly_once() {
        let persisted = vec![
            card("p1", at(30)),
            card("p2", at(20)),
            card("p3", at(20)),
            card("p4", at(10)),
        ];
        let demos = vec![demo("d0"), demo("d1"), demo("d2")];

        let mut seen = Vec::new();
        let mut page = 1;
        loop {
            let slice = compose_listing(persisted.clone(), demos.clone(), page, 3);
            if slice.items.is_empty() {
                break;
            }
            seen.extend(slice.items.iter().map(|c| c.id.clone()));
            page += 1;
        }

        assert_eq!(seen, vec!["p1", "p2", "p3", "p4", "d0", "d1", "d2"]);
    }

    #[test]
    fn out_of_range_page_is_empty_not_error() {
        let page = compose_listing(vec![card("a", at(1))], vec![], 7, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 1);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        let page = compose_listing(vec![card("a", at(1))], vec![], 0, 12);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page, 1);
    }
}
