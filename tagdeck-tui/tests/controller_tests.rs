//! Optimistic write protocol of the tag controller against an in-memory
//! transport.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tagdeck_core::{Tag, TagId};
use tagdeck_query::{QueryConfig, QueryStatus};
use tagdeck_test_utils::{numbered_tags, tag};
use tagdeck_tui::api_client::{TagTransport, TransportError};
use tagdeck_tui::controller::{MutationKind, TagController};
use tokio::sync::Semaphore;

/// In-memory tag server. Normalizes colors to lowercase so committed
/// records are distinguishable from optimistic ones.
struct MockTransport {
    tags: Mutex<Vec<Tag>>,
    next_id: AtomicU64,
    fail_next: Mutex<Option<u16>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    reply_gate: Mutex<Option<Arc<Semaphore>>>,
    entered: AtomicUsize,
    stored_writes: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MockTransport {
    fn with_tags(tags: Vec<Tag>) -> Arc<Self> {
        Arc::new(Self {
            tags: Mutex::new(tags),
            next_id: AtomicU64::new(5),
            fail_next: Mutex::new(None),
            gate: Mutex::new(None),
            reply_gate: Mutex::new(None),
            entered: AtomicUsize::new(0),
            stored_writes: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        })
    }

    /// Hold every following call until a permit is released.
    fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Apply writes immediately but hold their replies until a permit is
    /// released. Reads are not held.
    fn delay_replies(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.reply_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn stored_writes(&self) -> usize {
        self.stored_writes.load(Ordering::SeqCst)
    }

    fn fail_next(&self, status: u16) {
        *self.fail_next.lock().unwrap() = Some(status);
    }

    fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn stored(&self) -> Vec<Tag> {
        self.tags.lock().unwrap().clone()
    }

    async fn enter(&self) -> Result<(), TransportError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.fail_next.lock().unwrap().take() {
            Some(status) => Err(TransportError::Status {
                status,
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn reply(&self, result: Result<Tag, TransportError>) -> Result<Tag, TransportError> {
        self.stored_writes.fetch_add(1, Ordering::SeqCst);
        let gate = self.reply_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        result
    }

    fn not_found(id: &TagId) -> TransportError {
        TransportError::Status {
            status: 404,
            body: format!("tag {id} not found"),
        }
    }
}

#[async_trait]
impl TagTransport for MockTransport {
    async fn list_tags(&self) -> Result<Vec<Tag>, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        Ok(self.stored())
    }

    async fn get_tag(&self, id: &TagId) -> Result<Tag, TransportError> {
        self.enter().await?;
        self.stored()
            .into_iter()
            .find(|t| t.has_id(id))
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        if let Some(id) = &tag.id {
            return Err(TransportError::UnexpectedId(id.clone()));
        }
        self.enter().await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Tag::draft(tag.name.clone(), tag.color.to_lowercase()).with_id(id.to_string());
        self.tags.lock().unwrap().push(created.clone());
        self.reply(Ok(created)).await
    }

    async fn update_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        let id = tag.id.clone().ok_or(TransportError::MissingId("update"))?;
        self.enter().await?;
        let result = {
            let mut stored = self.tags.lock().unwrap();
            stored
                .iter_mut()
                .find(|t| t.has_id(&id))
                .map(|slot| {
                    *slot = Tag::draft(tag.name.clone(), tag.color.to_lowercase()).with_id(id.clone());
                    slot.clone()
                })
                .ok_or_else(|| Self::not_found(&id))
        };
        self.reply(result).await
    }

    async fn delete_tag(&self, tag: &Tag) -> Result<Tag, TransportError> {
        let id = tag.id.clone().ok_or(TransportError::MissingId("delete"))?;
        self.enter().await?;
        let result = {
            let mut stored = self.tags.lock().unwrap();
            stored
                .iter()
                .position(|t| t.has_id(&id))
                .map(|index| stored.remove(index))
                .ok_or_else(|| Self::not_found(&id))
        };
        self.reply(result).await
    }
}

fn controller(mock: &Arc<MockTransport>) -> TagController {
    let config = QueryConfig::default().with_stale_time(Duration::from_secs(60));
    TagController::with_configs(mock.clone(), config.clone(), config)
}

async fn wait_entered(mock: &MockTransport, count: usize) {
    while mock.entered() < count {
        tokio::task::yield_now().await;
    }
}

fn list(controller: &TagController) -> Vec<Tag> {
    controller.tags_snapshot().data.unwrap_or_default()
}

async fn wait_stored(mock: &MockTransport, count: usize) {
    while mock.stored_writes() < count {
        tokio::task::yield_now().await;
    }
}

/// Run `kind` on `tag`, refetching the list after the server applied the
/// write but before its reply arrives.
async fn write_with_refetch_in_flight(
    mock: &Arc<MockTransport>,
    controller: &TagController,
    kind: MutationKind,
    tag: Tag,
) -> Tag {
    let replies = mock.delay_replies();
    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.run(kind, tag).await }
    });
    wait_stored(mock, 1).await;

    controller.refresh_tags().await.unwrap();
    assert!(controller.tags_snapshot().optimistic);

    replies.add_permits(1);
    task.await.unwrap().unwrap()
}

#[tokio::test]
async fn update_is_visible_before_the_server_answers() {
    let mock = MockTransport::with_tags(vec![tag("1", "old", "red")]);
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let gate = mock.hold();
    let edited = tag("1", "x", "red");
    let task = tokio::spawn({
        let controller = controller.clone();
        let edited = edited.clone();
        async move { controller.update(edited).await }
    });
    wait_entered(&mock, 2).await;

    let optimistic = controller.tags_snapshot();
    assert_eq!(optimistic.data, Some(vec![edited.clone()]));
    assert!(optimistic.optimistic);
    assert_eq!(optimistic.status, QueryStatus::Loading);

    gate.add_permits(1);
    let updated = task.await.unwrap().unwrap();
    assert_eq!(updated, edited);

    let settled = controller.tags_snapshot();
    assert_eq!(settled.data, Some(vec![edited]));
    assert_eq!(settled.status, QueryStatus::Fresh);
}

#[tokio::test]
async fn create_commits_the_server_record() {
    let mock = MockTransport::with_tags(Vec::new());
    let controller = controller(&mock);
    assert!(controller.tags().await.unwrap().is_empty());

    let gate = mock.hold();
    let draft = Tag::draft("a", "red");
    let task = tokio::spawn({
        let controller = controller.clone();
        let draft = draft.clone();
        async move { controller.create(draft).await }
    });
    wait_entered(&mock, 2).await;
    assert_eq!(list(&controller), vec![draft]);

    gate.add_permits(1);
    let created = task.await.unwrap().unwrap();
    assert_eq!(created, tag("5", "a", "red"));
    assert_eq!(list(&controller), vec![created]);
}

#[tokio::test]
async fn update_replaces_the_first_tag_with_the_server_record() {
    let tags = numbered_tags(3);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let mut edited = tags[0].clone();
    edited.color = "RED".to_string();
    let updated = controller.update(edited).await.unwrap();
    assert_eq!(updated.color, "red");

    let visible = list(&controller);
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[0], updated);
    assert_eq!(&visible[1..], &tags[1..]);
    assert_eq!(controller.tags_snapshot().status, QueryStatus::Fresh);
}

#[tokio::test]
async fn failed_delete_puts_the_tag_back_and_reports_error() {
    let tags = numbered_tags(3);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let gate = mock.hold();
    mock.fail_next(500);
    let doomed = tags[1].clone();
    let task = tokio::spawn({
        let controller = controller.clone();
        let doomed = doomed.clone();
        async move { controller.delete(doomed).await }
    });
    wait_entered(&mock, 2).await;
    assert!(!list(&controller).contains(&doomed));

    gate.add_permits(1);
    let err = task.await.unwrap().unwrap_err();
    assert_eq!(err.transport().and_then(TransportError::status), Some(500));

    let snapshot = controller.tags_snapshot();
    assert_eq!(snapshot.data, Some(tags.clone()));
    assert_eq!(snapshot.status, QueryStatus::Error);
    assert!(snapshot.error_message().unwrap().contains("500"));
    assert_eq!(mock.stored(), tags);
}

#[tokio::test]
async fn successful_delete_removes_by_server_id() {
    let tags = numbered_tags(3);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let deleted = controller.delete(tags[2].clone()).await.unwrap();
    assert_eq!(deleted, tags[2]);
    assert_eq!(list(&controller), tags[..2].to_vec());
}

#[tokio::test]
async fn applying_the_same_update_twice_is_stable() {
    let tags = numbered_tags(2);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let mut edited = tags[1].clone();
    edited.name = "renamed".to_string();
    controller.update(edited.clone()).await.unwrap();
    let once = list(&controller);
    controller.update(edited).await.unwrap();
    assert_eq!(list(&controller), once);
}

#[tokio::test]
async fn later_create_survives_an_earlier_commit() {
    let mock = MockTransport::with_tags(numbered_tags(1));
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let gate = mock.hold();
    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.create(Tag::draft("first", "red")).await }
    });
    wait_entered(&mock, 2).await;
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.create(Tag::draft("second", "blue")).await }
    });
    wait_entered(&mock, 3).await;

    gate.add_permits(1);
    let created = first.await.unwrap().unwrap();

    let snapshot = controller.tags_snapshot();
    assert!(snapshot.optimistic);
    let names: Vec<_> = list(&controller).into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["second", "first", "tag-1"]);
    assert_eq!(list(&controller)[1], created);

    gate.add_permits(1);
    second.await.unwrap().unwrap();
    let visible = list(&controller);
    assert!(visible.iter().all(Tag::is_persisted));
    assert_eq!(visible.len(), 3);
}

#[tokio::test]
async fn create_rejects_a_tag_that_already_has_an_id() {
    let mock = MockTransport::with_tags(Vec::new());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let err = controller.create(tag("9", "dup", "red")).await.unwrap_err();
    assert!(matches!(
        err.transport(),
        Some(TransportError::UnexpectedId(id)) if id.as_str() == "9"
    ));
    let snapshot = controller.tags_snapshot();
    assert!(snapshot.data.unwrap().is_empty());
    assert_eq!(snapshot.status, QueryStatus::Error);
}

#[tokio::test]
async fn current_tag_follows_selection_and_keeps_previous_data() {
    let tags = numbered_tags(2);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);

    assert_eq!(controller.current_tag().await.unwrap(), None);

    assert!(controller.select(tags[0].id.clone()));
    assert_eq!(controller.current_tag().await.unwrap(), Some(tags[0].clone()));

    let gate = mock.hold();
    let before = mock.entered();
    controller.select(tags[1].id.clone());
    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.current_tag().await }
    });
    wait_entered(&mock, before + 1).await;

    let loading = controller.current_snapshot();
    assert_eq!(loading.data, Some(tags[0].clone()));
    assert!(loading.fetching);

    gate.add_permits(1);
    assert_eq!(task.await.unwrap().unwrap(), Some(tags[1].clone()));

    assert!(!controller.select(None));
    assert_eq!(controller.selection().current(), tags[1].id);
    assert_eq!(controller.current_tag().await.unwrap(), Some(tags[1].clone()));
}

#[tokio::test]
async fn failed_update_rolls_back_the_detail_entry() {
    let tags = numbered_tags(2);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();
    controller.select(tags[0].id.clone());
    controller.current_tag().await.unwrap();

    mock.fail_next(503);
    let mut edited = tags[0].clone();
    edited.name = "never".to_string();
    assert!(controller.update(edited).await.is_err());

    let detail = controller.current_snapshot();
    assert_eq!(detail.data, Some(tags[0].clone()));
    assert_eq!(detail.status, QueryStatus::Error);
    assert_eq!(list(&controller), tags);
}

#[tokio::test]
async fn successful_update_refreshes_the_detail_entry() {
    let tags = numbered_tags(2);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();
    controller.select(tags[1].id.clone());
    controller.current_tag().await.unwrap();

    let mut edited = tags[1].clone();
    edited.color = "Blue".to_string();
    let updated = controller.run(MutationKind::Update, edited).await.unwrap();

    assert_eq!(controller.current_snapshot().data, Some(updated));
}

#[tokio::test]
async fn list_failure_exposes_transport_status() {
    let mock = MockTransport::with_tags(numbered_tags(1));
    let controller = controller(&mock);

    mock.fail_next(502);
    let err = controller.tags().await.unwrap_err();
    assert_eq!(err.transport().and_then(TransportError::status), Some(502));
    assert_eq!(controller.tags_snapshot().status, QueryStatus::Error);

    assert_eq!(controller.tags().await.unwrap(), numbered_tags(1));
}

#[tokio::test]
async fn fresh_list_is_served_from_cache_until_refreshed() {
    let mock = MockTransport::with_tags(numbered_tags(2));
    let controller = controller(&mock);

    controller.tags().await.unwrap();
    controller.tags().await.unwrap();
    assert_eq!(mock.list_calls(), 1);

    controller.refresh_tags().await.unwrap();
    assert_eq!(mock.list_calls(), 2);
}

#[tokio::test]
async fn create_commit_after_refetch_keeps_one_server_record() {
    let mock = MockTransport::with_tags(Vec::new());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let created =
        write_with_refetch_in_flight(&mock, &controller, MutationKind::Create, Tag::draft("a", "red")).await;

    assert_eq!(created, tag("5", "a", "red"));
    assert_eq!(list(&controller), vec![created]);
    assert_eq!(list(&controller), mock.stored());
    assert_eq!(controller.tags_snapshot().status, QueryStatus::Fresh);
}

#[tokio::test]
async fn create_commit_after_refetch_keeps_server_order() {
    let tags = numbered_tags(2);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let created =
        write_with_refetch_in_flight(&mock, &controller, MutationKind::Create, Tag::draft("c", "Blue")).await;

    let visible = list(&controller);
    assert_eq!(visible.iter().filter(|t| t.same_identity(&created)).count(), 1);
    assert_eq!(visible, mock.stored());
}

#[tokio::test]
async fn update_commit_after_refetch_matches_server() {
    let tags = numbered_tags(3);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let mut edited = tags[0].clone();
    edited.color = "GREEN".to_string();
    let updated = write_with_refetch_in_flight(&mock, &controller, MutationKind::Update, edited).await;

    assert_eq!(updated.color, "green");
    assert_eq!(list(&controller), mock.stored());
    assert_eq!(list(&controller).len(), 3);
}

#[tokio::test]
async fn delete_commit_after_refetch_does_not_resurrect() {
    let tags = numbered_tags(3);
    let mock = MockTransport::with_tags(tags.clone());
    let controller = controller(&mock);
    controller.tags().await.unwrap();

    let deleted =
        write_with_refetch_in_flight(&mock, &controller, MutationKind::Delete, tags[1].clone()).await;

    assert_eq!(deleted, tags[1]);
    assert!(!list(&controller).contains(&deleted));
    assert_eq!(list(&controller), mock.stored());
}
