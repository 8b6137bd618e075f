//! Integration tests for `SqliteStore` and the repository façade against an
//! in-memory database.

use std::{any::Any, collections::HashSet, sync::Arc};

use casefile_core::{
  CancellationToken, Error as CoreError, Repository, RepositoryBuilder,
  document::{DocumentBody, LifeSituationDocument, NewInquiry},
  inquiry::{InquiryChannel, InquirySource},
  mapper::StandardMapper,
  record::{
    BaseRecord, ChildrenRecord, CitizenshipRecord, DomicileRecord,
    EducationLevel, EducationLevelRecord, PlaceKind, Record, RecordKind,
    SpecialityRecord,
  },
  store::{
    Backend, DocumentRow, DocumentStore, RecordRow, RecordStore, RowCursor,
    StorageError, StorageFailure, SurvivorStore,
  },
  survivor::{NewSurvivor, Survivor},
};
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{SqliteStore, StoreOptions};

type Repo = Repository<SqliteStore>;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn repo_with(options: StoreOptions) -> Repo {
  let store = SqliteStore::open_in_memory_with(options)
    .await
    .expect("in-memory store");
  Repository::with_standard_mapper(Arc::new(store))
}

async fn repo() -> Repo { repo_with(StoreOptions::default()).await }

async fn survivor(repo: &Repo, name: &str) -> Survivor {
  repo
    .store()
    .add_survivor(NewSurvivor::new(name))
    .await
    .unwrap()
}

async fn inquiry(repo: &Repo, survivor_id: Uuid) -> LifeSituationDocument {
  repo
    .create_inquiry(NewInquiry::new(survivor_id), &CancellationToken::new())
    .await
    .unwrap()
}

fn live() -> CancellationToken { CancellationToken::new() }

fn cancelled() -> CancellationToken {
  let token = CancellationToken::new();
  token.cancel();
  token
}

/// Satisfies the capability trait without being a registered kind.
struct StrayRecord {
  id: Uuid,
}

impl BaseRecord for StrayRecord {
  fn record_id(&self) -> Uuid { self.id }

  fn as_any(&self) -> &dyn Any { self }
}

/// Delegates to a `SqliteStore`, tripping `token` as soon as a document row
/// has been fetched.
struct CancelOnFetch {
  inner: SqliteStore,
  token: CancellationToken,
}

impl Backend for CancelOnFetch {
  type Error = crate::Error;
}

impl SurvivorStore for CancelOnFetch {
  async fn add_survivor(&self, input: NewSurvivor) -> crate::Result<Survivor> {
    self.inner.add_survivor(input).await
  }

  async fn get_survivor(&self, id: Uuid) -> crate::Result<Option<Survivor>> {
    self.inner.get_survivor(id).await
  }
}

impl DocumentStore for CancelOnFetch {
  type DocumentCursor = crate::cursor::DocumentCursor;

  async fn insert_document(&self, row: DocumentRow) -> crate::Result<()> {
    self.inner.insert_document(row).await
  }

  async fn fetch_document(&self, id: Uuid) -> crate::Result<Option<DocumentRow>> {
    let row = self.inner.fetch_document(id).await;
    self.token.cancel();
    row
  }

  fn documents_by_survivor(&self, survivor_id: Uuid) -> Self::DocumentCursor {
    self.inner.documents_by_survivor(survivor_id)
  }

  async fn update_document<F>(&self, id: Uuid, mutate: F) -> crate::Result<DocumentRow>
  where
    F: FnOnce(&mut DocumentRow) + Send + 'static,
  {
    self.inner.update_document(id, mutate).await
  }
}

impl RecordStore for CancelOnFetch {
  type RecordCursor = crate::cursor::RecordCursor;

  async fn insert_record(&self, row: RecordRow) -> crate::Result<()> {
    self.inner.insert_record(row).await
  }

  fn records_by_kind(&self, kind: RecordKind) -> Self::RecordCursor {
    self.inner.records_by_kind(kind)
  }

  async fn records_by_document(&self, document_id: Uuid) -> crate::Result<Vec<RecordRow>> {
    self.inner.records_by_document(document_id).await
  }
}

// ─── Survivors ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_survivor() {
  let s = store().await;

  let first = s.add_survivor(NewSurvivor::new("Iryna")).await.unwrap();
  let second = s.add_survivor(NewSurvivor::new("Taras")).await.unwrap();
  assert_eq!(first.number, 1);
  assert_eq!(second.number, 2);

  let fetched = s.get_survivor(second.survivor_id).await.unwrap().unwrap();
  assert_eq!(fetched, second);
}

#[tokio::test]
async fn get_survivor_missing_returns_none() {
  let s = store().await;
  assert!(s.get_survivor(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Construction ────────────────────────────────────────────────────────────

#[tokio::test]
async fn builder_requires_store() {
  let err = RepositoryBuilder::<SqliteStore, StandardMapper>::new()
    .mapper(Arc::new(StandardMapper))
    .build()
    .err()
    .unwrap();
  assert!(matches!(err, CoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn builder_requires_mapper() {
  let err = RepositoryBuilder::<SqliteStore, StandardMapper>::new()
    .store(Arc::new(store().await))
    .build()
    .err()
    .unwrap();
  assert!(matches!(err, CoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn builder_with_both_dependencies_works() {
  let repo = Repository::<SqliteStore, StandardMapper>::builder()
    .store(Arc::new(store().await))
    .mapper(Arc::new(StandardMapper))
    .build()
    .unwrap();
  let owner = repo
    .store()
    .add_survivor(NewSurvivor::new("Mykola"))
    .await
    .unwrap();
  let document = repo
    .create_inquiry(NewInquiry::new(owner.survivor_id), &live())
    .await
    .unwrap();
  assert!(repo.get_single(document.document_id, &live()).await.is_ok());
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_inquiry_folds_every_source() {
  let repo = repo().await;
  let owner = survivor(&repo, "Oksana").await;

  let input = NewInquiry::new(owner.survivor_id)
    .with_source(InquirySource::self_inquiry([
      InquiryChannel::Email,
      InquiryChannel::Phone,
    ]))
    .with_source(InquirySource::ForwardedByOrganization { name: "org".into() })
    .with_source(InquirySource::ForwardedByPerson { name: "person".into() })
    .with_source(InquirySource::ForwardedBySurvivor { name: "survivor".into() });
  let id = input.document_id;
  repo.create_inquiry(input, &live()).await.unwrap();

  let document = repo.get_single(id, &live()).await.unwrap();
  let DocumentBody::Inquiry(inquiry) = &document.body;
  let sources = &inquiry.sources;

  assert!(sources.is_self_inquiry);
  assert!(sources.forwarded_by_organization);
  assert!(sources.forwarded_by_person);
  assert!(sources.forwarded_by_survivor);
  assert_eq!(sources.forwarded_by_organization_name.as_deref(), Some("org"));
  assert_eq!(sources.forwarded_by_person_name.as_deref(), Some("person"));
  assert_eq!(sources.forwarded_by_survivor_name.as_deref(), Some("survivor"));
  assert_eq!(
    sources.self_inquiry_channels.bits(),
    InquiryChannel::Email.flag() | InquiryChannel::Phone.flag()
  );
  assert_ne!(sources.self_inquiry_channels.bits(), 0);
}

#[tokio::test]
async fn get_single_round_trips_every_field() {
  let repo = repo().await;
  let owner = survivor(&repo, "Halyna").await;

  let mut input = NewInquiry::new(owner.survivor_id);
  input.created_at = Utc.with_ymd_and_hms(2023, 3, 1, 9, 30, 0).unwrap();
  input.last_edit_at = Utc.with_ymd_and_hms(2023, 4, 2, 17, 0, 5).unwrap();
  input.working_experience = Some("seamstress".into());
  let created = repo.create_inquiry(input, &live()).await.unwrap();

  let fetched = repo.get_single(created.document_id, &live()).await.unwrap();
  assert_eq!(fetched, created);
  assert_eq!(fetched.survivor, owner);
}

#[tokio::test]
async fn get_single_missing_is_not_found() {
  let repo = repo().await;
  let id = Uuid::new_v4();
  let err = repo.get_single(id, &live()).await.unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(missing) if missing == id));
}

#[tokio::test]
async fn get_single_deleted_is_indistinguishable_from_missing() {
  let repo = repo().await;
  let owner = survivor(&repo, "Petro").await;

  let mut input = NewInquiry::new(owner.survivor_id);
  input.is_deleted = true;
  let id = input.document_id;
  repo.create_inquiry(input, &live()).await.unwrap();

  let deleted = repo.get_single(id, &live()).await.unwrap_err();
  let missing = repo.get_single(Uuid::new_v4(), &live()).await.unwrap_err();
  assert!(matches!(deleted, CoreError::DocumentNotFound(_)));
  assert!(matches!(missing, CoreError::DocumentNotFound(_)));
}

#[tokio::test]
async fn cancellation_wins_over_not_found() {
  let repo = repo().await;
  let err = repo
    .get_single(Uuid::new_v4(), &cancelled())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));
}

#[tokio::test]
async fn cancellation_during_fetch_wins_over_the_fetched_row() {
  let token = CancellationToken::new();
  let repo = Repository::with_standard_mapper(Arc::new(CancelOnFetch {
    inner: store().await,
    token: token.clone(),
  }));
  let owner = repo
    .store()
    .add_survivor(NewSurvivor::new("Daryna"))
    .await
    .unwrap();
  let document = repo
    .create_inquiry(NewInquiry::new(owner.survivor_id), &live())
    .await
    .unwrap();
  assert!(!token.is_cancelled());

  let err = repo
    .get_single(document.document_id, &token)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));
  assert!(token.is_cancelled());
}

#[tokio::test]
async fn create_inquiry_duplicate_id_is_constraint_violation() {
  let repo = repo().await;
  let owner = survivor(&repo, "Roman").await;

  let input = NewInquiry::new(owner.survivor_id);
  repo.create_inquiry(input.clone(), &live()).await.unwrap();

  let err = repo.create_inquiry(input, &live()).await.unwrap_err();
  assert!(matches!(err, CoreError::ConstraintViolation(_)));
}

#[tokio::test]
async fn create_inquiry_unknown_survivor_is_constraint_violation() {
  let repo = repo().await;
  let err = repo
    .create_inquiry(NewInquiry::new(Uuid::new_v4()), &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::ConstraintViolation(_)));
}

#[tokio::test]
async fn document_insert_without_survivor_violates_foreign_key() {
  let repo = repo().await;
  let owner = survivor(&repo, "Lesia").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let mut row = repo
    .store()
    .fetch_document(document.document_id)
    .await
    .unwrap()
    .unwrap();
  row.document_id = Uuid::new_v4();
  row.survivor_id = Uuid::new_v4();

  let err = repo.store().insert_document(row).await.unwrap_err();
  assert_eq!(err.failure(), StorageFailure::Constraint);
}

#[tokio::test]
async fn precancelled_create_writes_nothing() {
  let repo = repo().await;
  let owner = survivor(&repo, "Vira").await;

  let input = NewInquiry::new(owner.survivor_id);
  let id = input.document_id;
  let err = repo.create_inquiry(input, &cancelled()).await.unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));

  assert!(repo.store().fetch_document(id).await.unwrap().is_none());
}

// ─── Records ─────────────────────────────────────────────────────────────────

fn one_of_each() -> Vec<Record> {
  vec![
    Record::Children(ChildrenRecord {
      id:             Uuid::new_v4(),
      has_children:   Some(true),
      children_count: Some(3),
      details:        Some("two at school".into()),
    }),
    Record::Citizenship(CitizenshipRecord::new("Ukraine")),
    Record::Domicile(DomicileRecord {
      id:         Uuid::new_v4(),
      details:    None,
      place_kind: PlaceKind::Temporary,
      country:    Some("Germany".into()),
      settlement: Some("Leipzig".into()),
      date_from:  NaiveDate::from_ymd_opt(2022, 3, 14),
      date_to:    None,
      is_current: true,
    }),
    Record::EducationLevel(EducationLevelRecord {
      id:              Uuid::new_v4(),
      education_level: EducationLevel::Master,
      details:         None,
    }),
    Record::Speciality(SpecialityRecord {
      id:         Uuid::new_v4(),
      speciality: "accountant".into(),
      details:    None,
    }),
  ]
}

#[tokio::test]
async fn add_record_stores_every_registered_kind() {
  let repo = repo().await;
  let owner = survivor(&repo, "Dmytro").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let records = one_of_each();
  for record in &records {
    repo
      .add_record(document.document_id, record.as_base(), &live())
      .await
      .unwrap();
  }

  let rows = repo
    .store()
    .records_by_document(document.document_id)
    .await
    .unwrap();
  assert_eq!(rows.len(), records.len());
  for (row, record) in rows.iter().zip(&records) {
    assert_eq!(row.kind, record.kind());
    assert_eq!(row.document_id, document.document_id);
    assert_eq!(row.record_id, record.record_id());
  }

  let decoded = repo.get_records(document.document_id, &live()).await.unwrap();
  assert_eq!(decoded, records);
}

#[tokio::test]
async fn add_record_rejects_unregistered_type_without_writing() {
  let repo = repo().await;
  let owner = survivor(&repo, "Nadia").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let stray = StrayRecord { id: Uuid::new_v4() };
  let err = repo
    .add_record(document.document_id, &stray, &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::UnsupportedRecordKind(_)));
  assert!(err.is_invalid_argument());

  let rows = repo
    .store()
    .records_by_document(document.document_id)
    .await
    .unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn add_record_to_missing_or_deleted_document_is_not_found() {
  let repo = repo().await;
  let owner = survivor(&repo, "Bohdan").await;
  let document = inquiry(&repo, owner.survivor_id).await;
  repo.soft_delete(document.document_id, &live()).await.unwrap();

  let record = CitizenshipRecord::new("Ukraine");
  let err = repo
    .add_record(document.document_id, &record, &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(_)));

  let err = repo
    .add_record(Uuid::new_v4(), &record, &live())
    .await
    .unwrap_err();
  assert!(err.is_not_found());
}

#[tokio::test]
async fn add_record_duplicate_id_is_constraint_violation() {
  let repo = repo().await;
  let owner = survivor(&repo, "Marta").await;
  let first = inquiry(&repo, owner.survivor_id).await;
  let second = inquiry(&repo, owner.survivor_id).await;

  let record = CitizenshipRecord::new("Poland");
  repo.add_record(first.document_id, &record, &live()).await.unwrap();

  let err = repo
    .add_record(second.document_id, &record, &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::ConstraintViolation(_)));
}

#[tokio::test]
async fn precancelled_add_record_writes_nothing() {
  let repo = repo().await;
  let owner = survivor(&repo, "Yurii").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let record = CitizenshipRecord::new("Latvia");
  let err = repo
    .add_record(document.document_id, &record, &cancelled())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));

  let rows = repo
    .store()
    .records_by_document(document.document_id)
    .await
    .unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn record_cursor_pages_through_one_kind() {
  let repo = repo_with(StoreOptions { page_size: 2 }).await;
  let owner = survivor(&repo, "Zoriana").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let mut expected = Vec::new();
  for label in ["a", "b", "c", "d", "e"] {
    let record = CitizenshipRecord::new(label);
    expected.push(record.id);
    repo.add_record(document.document_id, &record, &live()).await.unwrap();
  }
  let speciality = SpecialityRecord {
    id:         Uuid::new_v4(),
    speciality: "driver".into(),
    details:    None,
  };
  repo
    .add_record(document.document_id, &speciality, &live())
    .await
    .unwrap();

  let mut cursor = repo.store().records_by_kind(RecordKind::Citizenship);
  let mut seen = Vec::new();
  while let Some(row) = cursor.next_row().await.unwrap() {
    assert_eq!(row.kind, RecordKind::Citizenship);
    seen.push(row.record_id);
  }
  assert_eq!(seen, expected);
}

// ─── Listing by survivor ─────────────────────────────────────────────────────

#[tokio::test]
async fn oversized_page_size_still_lists_everything() {
  let repo = repo_with(StoreOptions { page_size: usize::MAX }).await;
  let owner = survivor(&repo, "Liubov").await;

  let mut created = Vec::new();
  for _ in 0..3 {
    created.push(inquiry(&repo, owner.survivor_id).await.document_id);
  }

  let ids: Vec<Uuid> = repo
    .get_all_by_survivor(owner.survivor_id, &live())
    .try_collect()
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.document_id)
    .collect();
  assert_eq!(ids, created);
}

#[tokio::test]
async fn get_all_by_survivor_partitions_live_documents() {
  let repo = repo_with(StoreOptions { page_size: 3 }).await;
  let owners = [
    survivor(&repo, "Anna").await,
    survivor(&repo, "Borys").await,
    survivor(&repo, "Kateryna").await,
  ];

  let mut expected: Vec<HashSet<Uuid>> = vec![HashSet::new(); owners.len()];
  for i in 0..10 {
    let owner = i % owners.len();
    let document = inquiry(&repo, owners[owner].survivor_id).await;
    if i % 4 == 3 {
      repo.soft_delete(document.document_id, &live()).await.unwrap();
    } else {
      expected[owner].insert(document.document_id);
    }
  }

  for (owner, want) in owners.iter().zip(&expected) {
    let documents = repo
      .get_all_by_survivor(owner.survivor_id, &live())
      .try_collect()
      .await
      .unwrap();
    assert!(documents.iter().all(|d| d.survivor == *owner && !d.is_deleted));

    let got: HashSet<Uuid> = documents.iter().map(|d| d.document_id).collect();
    assert_eq!(got.len(), documents.len());
    assert_eq!(&got, want);
  }
}

#[tokio::test]
async fn get_all_by_survivor_order_is_stable() {
  let repo = repo_with(StoreOptions { page_size: 2 }).await;
  let owner = survivor(&repo, "Ivan").await;

  let mut created = Vec::new();
  for _ in 0..5 {
    created.push(inquiry(&repo, owner.survivor_id).await.document_id);
  }

  for _ in 0..2 {
    let ids: Vec<Uuid> = repo
      .get_all_by_survivor(owner.survivor_id, &live())
      .try_collect()
      .await
      .unwrap()
      .into_iter()
      .map(|d| d.document_id)
      .collect();
    assert_eq!(ids, created);
  }
}

#[tokio::test]
async fn get_all_by_survivor_unknown_survivor_is_empty() {
  let repo = repo().await;
  let documents = repo
    .get_all_by_survivor(Uuid::new_v4(), &live())
    .try_collect()
    .await
    .unwrap();
  assert!(documents.is_empty());
}

#[tokio::test]
async fn get_all_by_survivor_fails_mid_stream_when_cancelled() {
  let repo = repo_with(StoreOptions { page_size: 1 }).await;
  let owner = survivor(&repo, "Sofia").await;
  for _ in 0..3 {
    inquiry(&repo, owner.survivor_id).await;
  }

  let token = CancellationToken::new();
  let mut stream = repo.get_all_by_survivor(owner.survivor_id, &token);
  assert!(stream.next().await.unwrap().is_some());

  token.cancel();
  let err = stream.next().await.unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));
}

// ─── Citizenship completions ─────────────────────────────────────────────────

#[tokio::test]
async fn citizenship_completions_are_distinct_and_sorted() {
  let repo = repo_with(StoreOptions { page_size: 2 }).await;
  let owner = survivor(&repo, "Olha").await;
  let other = survivor(&repo, "Serhii").await;
  let documents = [
    inquiry(&repo, owner.survivor_id).await,
    inquiry(&repo, other.survivor_id).await,
    inquiry(&repo, other.survivor_id).await,
  ];

  for (i, label) in ["c2", "c1", "c1", "c1", "c2"].into_iter().enumerate() {
    let document = &documents[i % documents.len()];
    repo
      .add_record(document.document_id, &CitizenshipRecord::new(label), &live())
      .await
      .unwrap();
  }

  let labels: Vec<String> = repo
    .citizenship_completions(&live())
    .await
    .unwrap()
    .collect();
  assert_eq!(labels, ["c1", "c2"]);
}

#[tokio::test]
async fn citizenship_completions_include_deleted_documents() {
  let repo = repo().await;
  let owner = survivor(&repo, "Liudmyla").await;
  let live_doc = inquiry(&repo, owner.survivor_id).await;
  let gone_doc = inquiry(&repo, owner.survivor_id).await;

  repo
    .add_record(live_doc.document_id, &CitizenshipRecord::new("Moldova"), &live())
    .await
    .unwrap();
  repo
    .add_record(gone_doc.document_id, &CitizenshipRecord::new("Georgia"), &live())
    .await
    .unwrap();
  repo.soft_delete(gone_doc.document_id, &live()).await.unwrap();

  let labels: Vec<String> = repo
    .citizenship_completions(&live())
    .await
    .unwrap()
    .collect();
  assert_eq!(labels, ["Georgia", "Moldova"]);
}

#[tokio::test]
async fn citizenship_completions_ignore_other_kinds() {
  let repo = repo().await;
  let owner = survivor(&repo, "Andrii").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  for record in one_of_each() {
    repo
      .add_record(document.document_id, record.as_base(), &live())
      .await
      .unwrap();
  }

  let labels: Vec<String> = repo
    .citizenship_completions(&live())
    .await
    .unwrap()
    .collect();
  assert_eq!(labels, ["Ukraine"]);
}

#[tokio::test]
async fn citizenship_completions_on_empty_store() {
  let repo = repo().await;
  let completions = repo.citizenship_completions(&live()).await.unwrap();
  assert_eq!(completions.len(), 0);
}

#[tokio::test]
async fn citizenship_completions_honour_cancellation() {
  let repo = repo().await;
  let err = repo.citizenship_completions(&cancelled()).await.unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));
}

// ─── Mutation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_working_experience_touches_only_that_field() {
  let repo = repo().await;
  let owner = survivor(&repo, "Yevhen").await;

  let mut input = NewInquiry::new(owner.survivor_id)
    .with_source(InquirySource::self_inquiry([InquiryChannel::Visit]))
    .with_source(InquirySource::ForwardedByPerson { name: "neighbour".into() });
  input.working_experience = Some("farmer".into());
  input.created_at = Utc.with_ymd_and_hms(2022, 5, 10, 8, 0, 0).unwrap();
  input.last_edit_at = Utc.with_ymd_and_hms(2022, 6, 11, 8, 0, 0).unwrap();
  let before = repo.create_inquiry(input, &live()).await.unwrap();

  repo
    .set_working_experience(before.document_id, "tractor driver", &live())
    .await
    .unwrap();
  let after = repo.get_single(before.document_id, &live()).await.unwrap();

  let DocumentBody::Inquiry(inquiry) = &after.body;
  assert_eq!(inquiry.working_experience.as_deref(), Some("tractor driver"));

  let mut expected = before.clone();
  let DocumentBody::Inquiry(expected_inquiry) = &mut expected.body;
  expected_inquiry.working_experience = Some("tractor driver".into());
  assert_eq!(after, expected);
}

#[tokio::test]
async fn set_working_experience_on_missing_or_deleted_is_not_found() {
  let repo = repo().await;
  let owner = survivor(&repo, "Khrystyna").await;
  let document = inquiry(&repo, owner.survivor_id).await;
  repo.soft_delete(document.document_id, &live()).await.unwrap();

  let err = repo
    .set_working_experience(document.document_id, "anything", &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(_)));

  let err = repo
    .set_working_experience(Uuid::new_v4(), "anything", &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(_)));
}

#[tokio::test]
async fn precancelled_set_working_experience_writes_nothing() {
  let repo = repo().await;
  let owner = survivor(&repo, "Leonid").await;

  let mut input = NewInquiry::new(owner.survivor_id);
  input.working_experience = Some("baker".into());
  let document = repo.create_inquiry(input, &live()).await.unwrap();

  let err = repo
    .set_working_experience(document.document_id, "pastry chef", &cancelled())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));

  let row = repo
    .store()
    .fetch_document(document.document_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(row.working_experience.as_deref(), Some("baker"));
}

#[tokio::test]
async fn precancelled_soft_delete_leaves_document_live() {
  let repo = repo().await;
  let owner = survivor(&repo, "Solomiia").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  let err = repo
    .soft_delete(document.document_id, &cancelled())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OperationCancelled));

  let row = repo
    .store()
    .fetch_document(document.document_id)
    .await
    .unwrap()
    .unwrap();
  assert!(!row.is_deleted);
  assert!(repo.get_single(document.document_id, &live()).await.is_ok());
}

#[tokio::test]
async fn soft_delete_twice_is_not_found() {
  let repo = repo().await;
  let owner = survivor(&repo, "Valentyn").await;
  let document = inquiry(&repo, owner.survivor_id).await;

  repo.soft_delete(document.document_id, &live()).await.unwrap();
  let err = repo
    .soft_delete(document.document_id, &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(_)));

  let row = repo
    .store()
    .fetch_document(document.document_id)
    .await
    .unwrap()
    .unwrap();
  assert!(row.is_deleted);
  assert_eq!(row.last_edit_at, document.last_edit_at);
}

#[tokio::test]
async fn update_document_skips_deleted_rows() {
  let repo = repo().await;
  let owner = survivor(&repo, "Ruslana").await;
  let document = inquiry(&repo, owner.survivor_id).await;
  repo.soft_delete(document.document_id, &live()).await.unwrap();

  let err = repo
    .store()
    .update_document(document.document_id, |row| row.is_deleted = false)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::DocumentNotFound(_)));
  assert_eq!(err.failure(), StorageFailure::Missing);
}

#[tokio::test]
async fn get_records_of_deleted_document_is_not_found() {
  let repo = repo().await;
  let owner = survivor(&repo, "Ostap").await;
  let document = inquiry(&repo, owner.survivor_id).await;
  repo
    .add_record(document.document_id, &CitizenshipRecord::new("Ukraine"), &live())
    .await
    .unwrap();
  repo.soft_delete(document.document_id, &live()).await.unwrap();

  let err = repo
    .get_records(document.document_id, &live())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DocumentNotFound(_)));
}
