//! List screen behavior: activation, flows, row controls, cancellation.

mod common;

use std::time::Duration;

use animal_core::screen::EMPTY_NAME;
use animal_core::{Animal, ErrorPolicy, FlowOutcome, HttpMethod, HttpResponse, IdRange, ListScreen, RowControl};
use common::{cat_and_dog, ScriptedPrompt, ScriptedTransport};

#[tokio::test]
async fn activation_loads_and_renders_list() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());

    screen.activate();
    assert_eq!(screen.settle().await, 0);

    let view = screen.view();
    let names: Vec<_> = view.rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["Cat", "Dog"]);
}

#[tokio::test]
async fn add_submits_trimmed_name_with_id_from_range() {
    let transport = ScriptedTransport::new();
    transport.reply(201, "");
    let ids = IdRange { min: 100, max: 100 };
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), ids);
    let mut prompt = ScriptedPrompt::answering(&[Some("  Fox  ")]);

    let outcome = screen.add(&mut prompt);
    assert_eq!(outcome, FlowOutcome::Submitted(Animal::new(100, "Fox")));
    assert_eq!(screen.settle().await, 0);

    assert_eq!(screen.view().rows[0].name, "Fox");
    assert_eq!(screen.store().snapshot().animals, vec![Animal::new(100, "Fox")]);
}

#[tokio::test]
async fn blank_add_never_reaches_the_store() {
    let transport = ScriptedTransport::new();
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    let mut prompt = ScriptedPrompt::answering(&[Some("   ")]);

    assert_eq!(screen.add(&mut prompt), FlowOutcome::Rejected);
    assert_eq!(screen.in_flight(), 0);
    assert!(transport.requests().is_empty());
    assert_eq!(prompt.notices, vec![EMPTY_NAME.to_string()]);
}

#[tokio::test]
async fn edit_row_renames_then_reloads() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    transport.reply(200, "");
    transport.reply_list(&[Animal::new(1, "Lynx"), Animal::new(2, "Dog")]);
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    screen.activate();
    screen.settle().await;

    let mut prompt = ScriptedPrompt::answering(&[Some("Lynx")]);
    assert!(screen.select(1, RowControl::Edit, &mut prompt));
    assert_eq!(screen.settle().await, 0);

    assert_eq!(transport.requests()[1].path, "http://animals.test/api/animal/1");
    assert_eq!(screen.view().rows[0].name, "Lynx");
}

#[tokio::test]
async fn blank_edit_is_rejected() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    screen.activate();
    screen.settle().await;

    let mut prompt = ScriptedPrompt::answering(&[Some("")]);
    assert!(screen.select(2, RowControl::Edit, &mut prompt));

    assert_eq!(screen.in_flight(), 0);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(prompt.notices, vec![EMPTY_NAME.to_string()]);
}

#[tokio::test]
async fn delete_row_removes_record() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    transport.reply(204, "");
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    screen.activate();
    screen.settle().await;

    let mut prompt = ScriptedPrompt::default();
    assert!(screen.select(2, RowControl::Delete, &mut prompt));
    assert_eq!(screen.settle().await, 0);

    assert_eq!(transport.requests()[1].method, HttpMethod::Delete);
    assert_eq!(screen.store().snapshot().animals, vec![Animal::new(1, "Cat")]);
}

#[tokio::test]
async fn unknown_row_is_reported() {
    let transport = ScriptedTransport::new();
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    let mut prompt = ScriptedPrompt::default();

    assert!(!screen.select(3, RowControl::Delete, &mut prompt));
    assert_eq!(prompt.notices, vec!["No row 3".to_string()]);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn failed_operations_are_counted() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    transport.reply(500, "");
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    screen.activate();
    screen.settle().await;

    screen.select(1, RowControl::Delete, &mut ScriptedPrompt::default());
    assert_eq!(screen.settle().await, 1);
    assert_eq!(screen.view().status.as_deref(), Some("Failed to delete animal."));
}

#[tokio::test]
async fn deactivation_drops_in_flight_results() {
    let transport = ScriptedTransport::new();
    let gate = transport.gate();
    let store = transport.store(ErrorPolicy::Unified);
    let mut screen = ListScreen::new(store.clone(), IdRange::default());
    let mut prompt = ScriptedPrompt::answering(&[Some("Fox")]);

    screen.add(&mut prompt);
    transport.wait_for_requests(1).await;
    screen.deactivate();
    assert_eq!(screen.settle().await, 0);

    let _ = gate.send(HttpResponse::new(201, ""));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(store.snapshot().animals.is_empty());
}

#[tokio::test]
async fn changed_wakes_on_store_updates() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    let store = transport.store(ErrorPolicy::Unified);
    let mut screen = ListScreen::new(store.clone(), IdRange::default());
    screen.view();

    let refresh = tokio::spawn(async move { store.refresh().await });
    assert!(screen.changed().await);
    refresh.await.unwrap().unwrap();

    assert_eq!(screen.view().rows.len(), 2);
}

#[tokio::test]
async fn finished_operations_leave_in_flight_without_settle() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    transport.reply(204, "");
    transport.reply(500, "");
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());

    screen.activate();
    wait_until_idle(&mut screen).await;
    screen.select(2, RowControl::Delete, &mut ScriptedPrompt::default());
    screen.select(1, RowControl::Delete, &mut ScriptedPrompt::default());
    wait_until_idle(&mut screen).await;

    assert_eq!(screen.in_flight(), 0);
    assert_eq!(transport.requests().len(), 3);
    assert_eq!(screen.settle().await, 1);
    assert_eq!(screen.settle().await, 0);
}

#[tokio::test]
async fn unchanged_edit_sends_nothing() {
    let transport = ScriptedTransport::new();
    transport.reply_list(&cat_and_dog());
    let mut screen = ListScreen::new(transport.store(ErrorPolicy::Unified), IdRange::default());
    screen.activate();
    screen.settle().await;

    let mut prompt = ScriptedPrompt::answering(&[Some("Dog")]);
    assert!(screen.select(2, RowControl::Edit, &mut prompt));

    assert_eq!(screen.in_flight(), 0);
    assert_eq!(transport.requests().len(), 1);
    assert!(prompt.notices.is_empty());
}

async fn wait_until_idle(screen: &mut ListScreen) {
    for _ in 0..400 {
        if screen.in_flight() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("screen operations did not finish");
}
