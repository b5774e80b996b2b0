use super::*;
use crate::test_support::{at, notifier_config, seed_account, seed_property, RecordingMailer};

const NOW: &str = "2026-03-10T08:00:00Z";

#[sqlx::test(migrations = "../../migrations")]
async fn selects_only_properties_inside_target_day(pool: sqlx::PgPool) {
    let renter = seed_account(&pool, Some("renter@stayease.test"), Some("Jo")).await;

    let inside = seed_property(&pool, "Inside", Some(at("2026-03-13T12:00:00Z"))).await;
    let last_second = seed_property(&pool, "Last Second", Some(at("2026-03-13T23:59:59Z"))).await;
    let next_day = seed_property(&pool, "Next Day", Some(at("2026-03-14T00:00:00Z"))).await;
    let day_before = seed_property(&pool, "Day Before", Some(at("2026-03-12T23:59:59Z"))).await;

    for property in [inside, last_second, next_day, day_before] {
        stayease_db::add_interest(&pool, renter, property)
            .await
            .expect("interest");
    }

    let mailer = RecordingMailer::default();
    let report = run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
        .await
        .expect("sweep");

    assert_eq!(report.properties_matched, 2);
    assert_eq!(report.emails_sent, 2);
    assert_eq!(report.window_start, Some(at("2026-03-13T00:00:00Z")));

    let subjects: Vec<String> = mailer
        .sent
        .lock()
        .expect("lock")
        .iter()
        .map(|m| m.subject.clone())
        .collect();
    assert_eq!(
        subjects,
        vec![
            "Inside is available soon".to_string(),
            "Last Second is available soon".to_string(),
        ]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn skips_properties_without_interested_applicants(pool: sqlx::PgPool) {
    seed_property(&pool, "Lonely Loft", Some(at("2026-03-13T10:00:00Z"))).await;

    let mailer = RecordingMailer::default();
    let report = run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
        .await
        .expect("sweep");

    assert_eq!(report.properties_matched, 1);
    assert_eq!(report.properties_skipped, 1);
    assert_eq!(report.emails_sent, 0);
    assert!(mailer.recipients().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn recipients_without_email_are_counted_not_sent(pool: sqlx::PgPool) {
    let with_email = seed_account(&pool, Some("renter@stayease.test"), None).await;
    let without_email = seed_account(&pool, None, None).await;
    let property = seed_property(&pool, "Maple Dorm", Some(at("2026-03-13T10:00:00Z"))).await;

    stayease_db::add_interest(&pool, with_email, property)
        .await
        .expect("interest");
    stayease_db::add_interest(&pool, without_email, property)
        .await
        .expect("interest");

    let mailer = RecordingMailer::default();
    let report = run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
        .await
        .expect("sweep");

    assert_eq!(report.emails_sent, 1);
    assert_eq!(report.recipients_without_email, 1);
    assert_eq!(mailer.recipients(), vec!["renter@stayease.test".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn send_failure_does_not_stop_remaining_recipients(pool: sqlx::PgPool) {
    let bad = seed_account(&pool, Some("bounce@stayease.test"), None).await;
    let good = seed_account(&pool, Some("renter@stayease.test"), None).await;
    let property = seed_property(&pool, "Maple Dorm", Some(at("2026-03-13T10:00:00Z"))).await;

    stayease_db::add_interest(&pool, bad, property)
        .await
        .expect("interest");
    stayease_db::add_interest(&pool, good, property)
        .await
        .expect("interest");

    let mailer = RecordingMailer::failing_for(&["bounce@stayease.test"]);
    let report = run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
        .await
        .expect("sweep");

    assert_eq!(report.failures, 1);
    assert_eq!(report.emails_sent, 1);
    assert_eq!(mailer.recipients(), vec!["renter@stayease.test".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn rerun_on_same_day_sends_again(pool: sqlx::PgPool) {
    let renter = seed_account(&pool, Some("renter@stayease.test"), None).await;
    let property = seed_property(&pool, "Maple Dorm", Some(at("2026-03-13T10:00:00Z"))).await;
    stayease_db::add_interest(&pool, renter, property)
        .await
        .expect("interest");

    let mailer = RecordingMailer::default();
    for _ in 0..2 {
        run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
            .await
            .expect("sweep");
    }
    assert_eq!(mailer.recipients().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn notice_links_to_listing(pool: sqlx::PgPool) {
    let renter = seed_account(&pool, Some("renter@stayease.test"), Some("Jo")).await;
    let property = seed_property(&pool, "Maple Dorm", Some(at("2026-03-13T10:00:00Z"))).await;
    stayease_db::add_interest(&pool, renter, property)
        .await
        .expect("interest");

    let mailer = RecordingMailer::default();
    run_availability_sweep(&pool, &mailer, &notifier_config(), at(NOW))
        .await
        .expect("sweep");

    let sent = mailer.sent.lock().expect("lock");
    assert!(sent[0].text.starts_with("Hi Jo,"));
    assert!(sent[0]
        .text
        .contains(&format!("https://stayease.test/properties/{property}")));
}
