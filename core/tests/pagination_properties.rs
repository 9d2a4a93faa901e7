//! Property tests for pagination normalization and page metadata

use mocks::{page_limit_strategy, sort_order_strategy, task_sort_field_strategy};
use proptest::prelude::*;
use tracker_core::{
    pagination::{total_pages, RawPagination},
    EntityType, PaginationSorter, SortOrder,
};

proptest! {
    #[test]
    fn prop_skip_is_page_offset((page, limit) in page_limit_strategy()) {
        let page_text = page.to_string();
        let limit_text = limit.to_string();
        let pagination = PaginationSorter::normalize(
            EntityType::Task,
            RawPagination {
                page: Some(page_text.as_str()),
                limit: Some(limit_text.as_str()),
                ..Default::default()
            },
        )
        .unwrap();
        prop_assert_eq!(pagination.skip(), u64::from(page - 1) * u64::from(limit));
    }

    #[test]
    fn prop_total_pages(total in 0u64..10_000, limit in 1u32..=100) {
        let pages = total_pages(total, limit);
        if total == 0 {
            prop_assert_eq!(pages, 1);
        } else {
            prop_assert!(pages * u64::from(limit) >= total);
            prop_assert!((pages - 1) * u64::from(limit) < total);
        }
    }

    #[test]
    fn prop_sortable_fields_are_accepted(
        field in task_sort_field_strategy(),
        order in sort_order_strategy(),
    ) {
        let pagination = PaginationSorter::normalize(
            EntityType::Task,
            RawPagination {
                sort_by: Some(field),
                sort_order: Some(order),
                ..Default::default()
            },
        )
        .unwrap();
        prop_assert_eq!(pagination.sort.field, field);
        let expected = if order == "asc" { SortOrder::Asc } else { SortOrder::Desc };
        prop_assert_eq!(pagination.sort.order, expected);
    }

    #[test]
    fn prop_out_of_range_limit_is_rejected(limit in 101u32..100_000) {
        let limit_text = limit.to_string();
        let result = PaginationSorter::normalize(
            EntityType::Project,
            RawPagination {
                limit: Some(limit_text.as_str()),
                ..Default::default()
            },
        );
        prop_assert!(result.unwrap_err().is_validation());
    }
}

#[tokio::test]
async fn test_pages_partition_the_result_set() {
    let tasks = mocks::generate_task_series("u1", 23);
    let (lifecycle, _, _) = mocks::create_lifecycle_with(Vec::new(), tasks);
    let owner = tracker_core::OwnerId::new("u1");

    let mut seen = Vec::new();
    for page in 1..=3u32 {
        let params = mocks::ListParamsBuilder::new()
            .page(page)
            .limit(10)
            .sort("createdAt", "asc")
            .build();
        let listed = lifecycle.list_tasks(&owner, &params).await.unwrap();
        assert!(listed.data.len() <= 10);
        assert_eq!(listed.meta.total_pages, 3);
        seen.extend(listed.data.into_iter().map(|t| t.title));
    }

    let expected: Vec<String> = (0..23).map(|i| format!("Task {i:03}")).collect();
    assert_eq!(seen, expected);
}
