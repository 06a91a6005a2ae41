mod common;

use anyhow::Result;
use common::{ages, names};

// Fixture: Anna/Madrid/18, Juan/Lima/25, Marco/Rome/15, Sofia/Madrid/30, Pedro/Porto/40

#[tokio::test]
async fn empty_query_lists_everything_in_creation_order() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan", "Marco", "Sofia", "Pedro"]);
    assert_eq!(data["total"], 5);
    assert_eq!(data["count"], 5);
    assert_eq!(data["limit"], 20);
    assert_eq!(data["skip"], 0);

    Ok(())
}

#[tokio::test]
async fn city_matches_exactly() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?city=Madrid").await?;
    assert_eq!(names(&data), vec!["Anna", "Sofia"]);

    let data = server.list("/api/students?city=madrid").await?;
    assert!(names(&data).is_empty(), "equality is case-sensitive: {}", data);

    Ok(())
}

#[tokio::test]
async fn age_range_is_inclusive_and_merged() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?minAge=18&maxAge=30").await?;
    assert_eq!(ages(&data), vec![18, 25, 30]);

    // Same range, bounds given the other way round
    let data = server.list("/api/students?maxAge=30&minAge=18").await?;
    assert_eq!(ages(&data), vec![18, 25, 30]);

    Ok(())
}

#[tokio::test]
async fn one_sided_range() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?minAge=25").await?;
    assert_eq!(ages(&data), vec![25, 30, 40]);

    let data = server.list("/api/students?youngerThan=25").await?;
    assert_eq!(ages(&data), vec![18, 15]);

    Ok(())
}

#[tokio::test]
async fn city_lists_include_and_exclude() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?cities=Madrid,%20Lima").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan", "Sofia"]);

    let data = server.list("/api/students?excludeCities=Madrid,Lima").await?;
    assert_eq!(names(&data), vec!["Marco", "Pedro"]);

    // Exclusions accumulate
    let data = server.list("/api/students?excludeCity=Rome&excludeCities=Madrid").await?;
    assert_eq!(names(&data), vec!["Juan", "Pedro"]);

    Ok(())
}

#[tokio::test]
async fn name_contains_is_case_insensitive() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?nameContains=an").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan"]);

    let data = server.list("/api/students?nameContains=AN").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan"]);

    Ok(())
}

#[tokio::test]
async fn unrecognized_params_have_no_effect() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?foo=bar").await?;
    assert_eq!(data["total"], 5);

    Ok(())
}

#[tokio::test]
async fn range_sort_and_page_together() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?minAge=18&maxAge=30&sortBy=age&order=asc&limit=2&skip=0").await?;
    assert_eq!(ages(&data), vec![18, 25]);
    assert_eq!(data["count"], 2);
    assert_eq!(data["total"], 3);

    let data = server.list("/api/students?minAge=18&maxAge=30&sortBy=age&order=asc&limit=2&skip=2").await?;
    assert_eq!(ages(&data), vec![30]);

    Ok(())
}

#[tokio::test]
async fn sort_descending_and_case_insensitive_order() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?sortBy=age&order=DESC").await?;
    assert_eq!(ages(&data), vec![40, 30, 25, 18, 15]);

    let data = server.list("/api/students?sortBy=name&order=sideways").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan", "Marco", "Pedro", "Sofia"]);

    Ok(())
}

#[tokio::test]
async fn unsupported_sort_field_falls_back_to_default() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?sortBy=password").await?;
    assert_eq!(names(&data), vec!["Anna", "Juan", "Marco", "Sofia", "Pedro"]);

    Ok(())
}

#[tokio::test]
async fn non_positive_limit_uses_default() -> Result<()> {
    let server = common::students_server().await?;

    for limit in ["0", "-5", "abc"] {
        let data = server.list(&format!("/api/students?limit={}", limit)).await?;
        assert_eq!(data["limit"], 20, "limit={}", limit);
        assert_eq!(data["count"], 5, "limit={}", limit);
    }

    Ok(())
}

#[tokio::test]
async fn oversized_limit_is_capped() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?limit=1000").await?;
    assert_eq!(data["limit"], 100);

    Ok(())
}

#[tokio::test]
async fn negative_skip_starts_at_zero_and_offset_is_an_alias() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?skip=-3&limit=1").await?;
    assert_eq!(data["skip"], 0);
    assert_eq!(names(&data), vec!["Anna"]);

    let data = server.list("/api/students?offset=1&limit=1").await?;
    assert_eq!(names(&data), vec!["Juan"]);

    Ok(())
}

#[tokio::test]
async fn malformed_values_are_ignored_by_default() -> Result<()> {
    let server = common::students_server().await?;

    let data = server.list("/api/students?minAge=abc&maxAge=20").await?;
    assert_eq!(ages(&data), vec![18, 15]);

    Ok(())
}
