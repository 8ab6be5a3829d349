use chrono::{DateTime, Local, NaiveTime, TimeZone};
use daily_price_watch::scheduler::DailyTrigger;
use daily_price_watch::{CycleStatus, ProductScheduler};
use std::time::Duration;
use tempfile::TempDir;

use super::*;

fn june(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2026, 6, day, hour, minute, 0)
        .single()
        .expect("unambiguous local time")
}

#[tokio::test]
async fn test_three_days_of_polling() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let fetcher = MapFetcher::default();
    fetcher.set_page(URL_A, product_page("Gs. 3.500.000", "En stock"));
    let notifier = RecordingNotifier::default();
    let manager = create_test_manager(&[URL_A], &fetcher, &dir.path().join("productos.json"), &notifier);

    let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("valid time");
    let trigger = DailyTrigger::new(noon, june(15, 9, 0));
    let mut scheduler = ProductScheduler::with_trigger(manager, trigger, Duration::from_secs(60));

    // Poll every half hour for three days; the price drops on the third morning
    let mut now = june(15, 9, 0);
    let mut statuses = Vec::new();
    while now < june(18, 0, 0) {
        if now == june(17, 8, 0) {
            fetcher.set_page(URL_A, product_page("Gs. 3.290.000", "En stock"));
        }
        if let Some(status) = scheduler.tick(now).await {
            statuses.push((now, status));
        }
        now += chrono::Duration::minutes(30);
    }

    assert_eq!(
        statuses,
        vec![
            (june(15, 12, 0), CycleStatus::Completed),
            (june(16, 12, 0), CycleStatus::Completed),
            (june(17, 12, 0), CycleStatus::Completed),
        ]
    );

    let subjects: Vec<String> = notifier.reports().into_iter().map(|r| r.subject).collect();
    assert_eq!(
        subjects,
        vec![
            "Cambios detectados en productos",
            "Estado diario de productos",
            "Cambios detectados en productos",
        ]
    );

    let stats = scheduler.get_stats();
    assert_eq!(stats.completed_runs, 3);
    assert_eq!(stats.failed_runs, 0);
    assert_eq!(stats.next_run, june(18, 12, 0));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_state_fails_cycle_but_not_scheduler() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("productos.json");
    std::fs::write(&path, "[1, 2")?;

    let fetcher = MapFetcher::default();
    fetcher.set_page(URL_A, product_page("Gs. 3.500.000", "En stock"));
    let notifier = RecordingNotifier::default();
    let manager = create_test_manager(&[URL_A], &fetcher, &path, &notifier);

    let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("valid time");
    let mut scheduler =
        ProductScheduler::with_trigger(manager, DailyTrigger::new(noon, june(15, 9, 0)), Duration::from_secs(60));

    let status = scheduler.tick(june(15, 12, 0)).await;
    assert!(matches!(status, Some(CycleStatus::Failed(_))));

    // Once the file is repaired the next day runs normally
    std::fs::remove_file(&path)?;
    let status = scheduler.tick(june(16, 12, 0)).await;
    assert_eq!(status, Some(CycleStatus::Completed));
    assert_eq!(notifier.reports().len(), 1);

    Ok(())
}
