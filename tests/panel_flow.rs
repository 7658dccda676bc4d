//! End-to-end panel and shell behaviour against the in-process store

use chrono::NaiveDate;
use daily_tasks::{
    AppShell, Category, EntryDraft, EntryStore, Field, FormPanel, MemoryStore, SubmitOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn draft(category: Category, day: u32, comment: &str) -> EntryDraft {
    EntryDraft {
        category,
        date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
        referral_link: format!("https://github.com/example/{}", comment),
        comment: comment.to_string(),
    }
}

fn comments(panel: &FormPanel) -> Vec<String> {
    panel.entries().iter().map(|e| e.comment.clone()).collect()
}

/// Wait for one delivered event and apply it
async fn next_change(panel: &mut FormPanel) {
    timeout(Duration::from_secs(1), panel.recv_change())
        .await
        .expect("change event within a second");
}

#[tokio::test]
async fn invalid_drafts_never_insert() {
    let store = Arc::new(MemoryStore::new());
    let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;

    // Missing date
    panel.set_field(Field::ReferralLink, "https://youtube.com/watch?v=1");
    panel.set_field(Field::Comment, "talk");
    assert_eq!(panel.submit().await, SubmitOutcome::Invalid);
    assert!(!panel.field_errors().get(Field::Date).unwrap().is_empty());

    // Malformed link
    panel.set_field(Field::Date, "2024-07-01");
    panel.set_field(Field::ReferralLink, "youtube dot com");
    assert_eq!(panel.submit().await, SubmitOutcome::Invalid);
    assert!(!panel.field_errors().get(Field::ReferralLink).unwrap().is_empty());

    // Blank comment
    panel.set_field(Field::ReferralLink, "https://youtube.com/watch?v=1");
    panel.set_field(Field::Comment, "   ");
    assert_eq!(panel.submit().await, SubmitOutcome::Invalid);
    assert!(!panel.field_errors().get(Field::Comment).unwrap().is_empty());

    assert_eq!(store.insert_calls(), 0);
    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn valid_draft_inserts_once_with_panel_category() {
    let store = Arc::new(MemoryStore::new());
    let mut panel = FormPanel::mount(store.clone(), Category::Krishna, "Krishna").await;

    panel.set_field(Field::Date, "2024-07-02");
    panel.set_field(Field::ReferralLink, "https://github.com/rust-lang/rust");
    panel.set_field(Field::Comment, "Read the release notes");
    assert_eq!(panel.submit().await, SubmitOutcome::Submitted);

    assert_eq!(store.insert_calls(), 1);
    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, Category::Krishna);
    assert_eq!(rows[0].comment, "Read the release notes");
}

#[tokio::test]
async fn insert_event_prepends_only_in_its_category() {
    let store = Arc::new(MemoryStore::seeded(vec![draft(Category::Vishnu, 1, "old")]));
    let mut vishnu = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;
    let mut krishna = FormPanel::mount(store.clone(), Category::Krishna, "Krishna").await;
    assert_eq!(comments(&vishnu), vec!["old"]);

    store
        .insert_entry(draft(Category::Vishnu, 3, "new"))
        .await
        .unwrap();
    next_change(&mut vishnu).await;

    assert_eq!(comments(&vishnu), vec!["new", "old"]);
    assert_eq!(krishna.drain_changes(), 0);
    assert!(krishna.entries().is_empty());
}

#[tokio::test]
async fn delete_removes_only_that_entry() {
    let store = Arc::new(MemoryStore::seeded(vec![
        draft(Category::Vishnu, 1, "a"),
        draft(Category::Vishnu, 2, "b"),
        draft(Category::Vishnu, 3, "c"),
    ]));
    let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;
    assert_eq!(panel.entries().len(), 3);

    let target = store.rows()[1].id.unwrap();
    assert!(store.delete_entry(target));
    next_change(&mut panel).await;

    assert_eq!(panel.entries().len(), 2);
    assert!(panel.entries().get(&target).is_none());
    assert!(comments(&panel).contains(&"a".to_string()));
    assert!(comments(&panel).contains(&"c".to_string()));
}

#[tokio::test]
async fn update_replaces_in_place() {
    let store = Arc::new(MemoryStore::seeded(vec![
        draft(Category::Krishna, 1, "a"),
        draft(Category::Krishna, 2, "b"),
        draft(Category::Krishna, 3, "c"),
    ]));
    let mut panel = FormPanel::mount(store.clone(), Category::Krishna, "Krishna").await;
    let before = comments(&panel);
    let position = before.iter().position(|c| c == "b").unwrap();

    let target = store.rows()[1].id.unwrap();
    assert!(store.update_entry(target, "https://youtube.com/watch?v=b", "b, revised"));
    next_change(&mut panel).await;

    let mut expected = before.clone();
    expected[position] = "b, revised".to_string();
    assert_eq!(comments(&panel), expected);
    assert_eq!(
        panel.entries().get(&target).unwrap().referral_link,
        "https://youtube.com/watch?v=b"
    );
}

#[tokio::test]
async fn tab_switch_moves_the_feed() {
    let store = Arc::new(MemoryStore::new());
    let mut shell = AppShell::start(store.clone()).await;
    shell.panel_mut().set_field(Field::Comment, "unsent");

    assert!(shell.switch_to(Category::Krishna).await);
    assert_eq!(store.subscriber_count(Category::Vishnu), 0);
    assert_eq!(store.subscriber_count(Category::Krishna), 1);
    assert_eq!(shell.panel().fields().comment, "");

    // A Vishnu insert must not reach the Krishna panel
    store
        .insert_entry(draft(Category::Vishnu, 4, "elsewhere"))
        .await
        .unwrap();
    assert_eq!(shell.panel_mut().drain_changes(), 0);
    assert!(shell.panel().entries().is_empty());

    store
        .insert_entry(draft(Category::Krishna, 4, "here"))
        .await
        .unwrap();
    assert_eq!(shell.panel_mut().drain_changes(), 1);
    assert_eq!(comments(shell.panel()), vec!["here"]);

    // Switching back reloads Vishnu from the store
    assert!(shell.switch_to(Category::Vishnu).await);
    assert_eq!(comments(shell.panel()), vec!["elsewhere"]);
    assert_eq!(store.subscriber_count(Category::Krishna), 0);

    shell.shutdown();
    assert_eq!(store.subscriber_count(Category::Vishnu), 0);
}

#[tokio::test]
async fn failed_insert_shows_banner_and_keeps_list() {
    let store = Arc::new(MemoryStore::seeded(vec![draft(Category::Vishnu, 5, "kept")]));
    store.fail_inserts(Some("new row violates row-level security policy"));
    let mut panel = FormPanel::mount(store.clone(), Category::Vishnu, "Vishnu").await;

    panel.set_field(Field::Date, "2024-07-06");
    panel.set_field(Field::ReferralLink, "https://github.com");
    panel.set_field(Field::Comment, "rejected");
    assert_eq!(panel.submit().await, SubmitOutcome::Failed);

    assert_eq!(
        panel.error(),
        Some("new row violates row-level security policy")
    );
    assert_eq!(comments(&panel), vec!["kept"]);
}
