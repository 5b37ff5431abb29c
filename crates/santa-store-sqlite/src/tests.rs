//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use santa_core::{
  allocator::{Draw, UniformDraw},
  assignment::{NewAssignment, Registrant},
  person::{EligiblePerson, NewPerson},
  store::{AllocationOutcome, SantaStore, StoreError as _},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_person(name: &str) -> NewPerson {
  NewPerson {
    name:        name.into(),
    email:       format!("{}@x.com", name.to_lowercase()),
    description: format!("{name} wants a scarf"),
    drive_link:  format!("https://drive.example/{}", name.to_lowercase()),
  }
}

async fn seeded(names: &[&str]) -> SqliteStore {
  let s = store().await;
  s.seed_people(names.iter().copied().map(new_person).collect())
    .await
    .unwrap();
  s
}

fn request_for(person: &EligiblePerson) -> NewAssignment {
  NewAssignment {
    registrant_id: person.person_id,
    registrant:    Registrant { name: person.name.clone(), email: person.email.clone() },
    password_hash: "$argon2id$stub".into(),
  }
}

async fn person(s: &SqliteStore, name: &str) -> EligiblePerson {
  s.find_person_by_name(name).await.unwrap().expect("seeded person")
}

struct Fixed(usize);

impl Draw for Fixed {
  fn index(&mut self, _: usize) -> usize { self.0 }
}

fn assigned(outcome: AllocationOutcome) -> santa_core::assignment::Assignment {
  match outcome {
    AllocationOutcome::Assigned(a) => a,
    other => panic!("expected an assignment, got {other:?}"),
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_and_list_people() {
  let s = store().await;
  let mut shouty = new_person("Dana");
  shouty.email = "DANA@X.COM".into();

  let n = s
    .seed_people(vec![new_person("Alice"), new_person("Bob"), shouty])
    .await
    .unwrap();
  assert_eq!(n, 3);

  let people = s.list_people().await.unwrap();
  let names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Alice", "Bob", "Dana"]);
  assert_eq!(people[2].email, "dana@x.com");
}

#[tokio::test]
async fn seed_conflict_inserts_nothing() {
  let s = seeded(&["Alice"]).await;

  let mut dup = new_person("ALICE");
  dup.email = "other@x.com".into();
  let result = s.seed_people(vec![new_person("Bob"), dup]).await;

  assert!(matches!(result, Err(Error::Database(_))));
  assert_eq!(s.list_people().await.unwrap().len(), 1);
}

#[tokio::test]
async fn blank_person_is_refused() {
  let s = store().await;
  let blank = NewPerson {
    name:        "   ".into(),
    email:       String::new(),
    description: String::new(),
    drive_link:  String::new(),
  };

  let result = s.seed_people(vec![new_person("Alice"), blank]).await;
  assert!(matches!(result, Err(Error::Database(_))));
  assert!(s.list_people().await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_name_is_case_insensitive() {
  let s = seeded(&["Alice", "Bob"]).await;

  let found = s.find_person_by_name("  aLiCe ").await.unwrap().unwrap();
  assert_eq!(found.name, "Alice");
  assert!(s.find_person_by_name("Ali").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_email_lowercases() {
  let s = seeded(&["Alice"]).await;
  let found = s.find_person_by_email("Alice@X.com").await.unwrap();
  assert_eq!(found.map(|p| p.name).as_deref(), Some("Alice"));
}

#[tokio::test]
async fn find_by_name_and_email_requires_both() {
  let s = seeded(&["Alice", "Bob"]).await;

  assert!(s.find_person_by_name_and_email("alice", "alice@x.com").await.unwrap().is_some());
  assert!(s.find_person_by_name_and_email("alice", "bob@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn remove_person_deletes_row() {
  let s = seeded(&["Alice", "Bob"]).await;
  let bob = person(&s, "Bob").await;

  assert!(s.remove_person(bob.person_id).await.unwrap());
  assert!(!s.remove_person(bob.person_id).await.unwrap());
  assert!(!s.remove_person(Uuid::new_v4()).await.unwrap());
  assert_eq!(s.list_people().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_available_excludes_names() {
  let s = seeded(&["Alice", "Bob", "Carol"]).await;
  let exclude = HashSet::from(["bob".to_owned()]);

  let available = s.list_available(&exclude).await.unwrap();
  let names: Vec<_> = available.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Alice", "Carol"]);
}

// ─── Allocation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn allocate_records_snapshot() {
  let s = seeded(&["Alice", "Bob", "Carol"]).await;
  let alice = person(&s, "Alice").await;

  let a = assigned(s.allocate(request_for(&alice), Fixed(1)).await.unwrap());
  assert_eq!(a.assigned_person.name, "Carol");
  assert_eq!(a.assigned_person.description, "Carol wants a scarf");
  assert_eq!(a.registrant.name, "Alice");

  let stored = s.find_assignment("ALICE@x.com").await.unwrap().unwrap();
  assert_eq!(stored.assignment, a);
  assert_eq!(stored.password_hash, "$argon2id$stub");
  assert_eq!(s.assigned_names().await.unwrap(), HashSet::from(["Carol".to_owned()]));
}

#[tokio::test]
async fn allocate_never_picks_self_or_taken() {
  let s = seeded(&["Alice", "Bob", "Carol"]).await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  // Alice takes Bob (pool [Bob, Carol]).
  let first = assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());
  assert_eq!(first.assigned_person.name, "Bob");

  // Bob's pool is [Alice, Carol]; index 0 must be Alice, not Bob.
  let second = assigned(s.allocate(request_for(&bob), Fixed(0)).await.unwrap());
  assert_eq!(second.assigned_person.name, "Alice");
}

#[tokio::test]
async fn allocate_twice_is_already_assigned() {
  let s = seeded(&["Alice", "Bob", "Carol"]).await;
  let alice = person(&s, "Alice").await;

  assigned(s.allocate(request_for(&alice), UniformDraw::default()).await.unwrap());
  let again = s.allocate(request_for(&alice), UniformDraw::default()).await.unwrap();

  assert_eq!(again, AllocationOutcome::AlreadyAssigned);
  assert_eq!(s.assigned_names().await.unwrap().len(), 1);
}

#[tokio::test]
async fn exhausted_pool_mutates_nothing() {
  let s = seeded(&["Alice", "Bob"]).await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;

  assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());
  // Bob's only candidate is Alice.
  assigned(s.allocate(request_for(&bob), Fixed(0)).await.unwrap());

  let carol = {
    s.seed_people(vec![new_person("Carol")]).await.unwrap();
    person(&s, "Carol").await
  };
  // Everyone but Carol is taken, and Carol cannot draw herself.
  let outcome = s.allocate(request_for(&carol), Fixed(0)).await.unwrap();

  assert_eq!(outcome, AllocationOutcome::ExhaustedPool);
  assert!(s.find_assignment(&carol.email).await.unwrap().is_none());
  assert_eq!(s.list_people().await.unwrap().len(), 3);
}

#[tokio::test]
async fn registry_rows_survive_allocation() {
  let s = seeded(&["Alice", "Bob"]).await;
  let alice = person(&s, "Alice").await;

  assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());

  assert_eq!(s.list_people().await.unwrap().len(), 2);
  let available = s
    .list_available(&s.assigned_names().await.unwrap())
    .await
    .unwrap();
  assert_eq!(available.len(), 1);
  assert_eq!(available[0].name, "Alice");
}

#[tokio::test]
async fn concurrent_allocations_draw_distinct_people() {
  let names = ["Ann", "Ben", "Cat", "Dan", "Eve", "Fay", "Gus", "Hal", "Ivy", "Jon"];
  let s = seeded(&names).await;

  let mut handles = Vec::new();
  for name in names {
    let s = s.clone();
    let registrant = person(&s, name).await;
    handles.push(tokio::spawn(async move {
      s.allocate(request_for(&registrant), UniformDraw::default()).await
    }));
  }

  let mut drawn = HashSet::new();
  for (handle, name) in handles.into_iter().zip(names) {
    match handle.await.unwrap().unwrap() {
      AllocationOutcome::Assigned(a) => {
        assert_ne!(a.assigned_person.name, name);
        assert!(drawn.insert(a.assigned_person.name), "person drawn twice");
      }
      AllocationOutcome::ExhaustedPool => {}
      AllocationOutcome::AlreadyAssigned => panic!("{name} was not assigned before"),
    }
  }
  assert!(drawn.len() >= names.len() - 1);
}

#[tokio::test]
async fn failed_insert_is_rolled_back() {
  let s = seeded(&["Alice", "Bob"]).await;
  let alice = person(&s, "Alice").await;

  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER refuse_assignments BEFORE INSERT ON assignments
         BEGIN SELECT RAISE(ABORT, 'refused'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s.allocate(request_for(&alice), Fixed(0)).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
  assert!(!err.is_inconsistent());

  let in_tx = s.conn.call(|conn| Ok(!conn.is_autocommit())).await.unwrap();
  assert!(!in_tx, "transaction left open");
  assert!(s.find_assignment(&alice.email).await.unwrap().is_none());

  s.conn
    .call(|conn| {
      conn.execute_batch("DROP TRIGGER refuse_assignments")?;
      Ok(())
    })
    .await
    .unwrap();
  assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());
}

#[tokio::test]
async fn stranded_transaction_is_discarded() {
  let s = seeded(&["Alice", "Bob"]).await;
  let alice = person(&s, "Alice").await;
  let bob = person(&s, "Bob").await;
  let (alice_id, bob_id) = (alice.person_id.to_string(), bob.person_id.to_string());

  // A write whose rollback never happened: the transaction is still open.
  s.conn
    .call(move |conn| {
      conn.execute_batch("BEGIN IMMEDIATE")?;
      conn.execute(
        "INSERT INTO assignments (
           assignment_id, registrant_id, registrant_name, registrant_email,
           password_hash, assigned_id, assigned_name, assigned_name_key,
           assigned_email, assigned_description, assigned_drive_link, created_at
         ) VALUES (?1, ?2, 'Alice', 'alice@x.com', 'h', ?3, 'Bob', 'bob',
                   'bob@x.com', '', '', '2024-12-01T00:00:00Z')",
        rusqlite::params![Uuid::new_v4().to_string(), alice_id, bob_id],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(s.find_assignment("alice@x.com").await.unwrap().is_none());
  assert!(s.assigned_names().await.unwrap().is_empty());

  let a = assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());
  assert_eq!(a.assigned_person.name, "Bob");
  let in_tx = s.conn.call(|conn| Ok(!conn.is_autocommit())).await.unwrap();
  assert!(!in_tx);
}

#[tokio::test]
async fn assignments_persist_across_reopen() {
  let path = std::env::temp_dir().join(format!("santa-{}.db", Uuid::new_v4()));

  let s = SqliteStore::open(&path).await.unwrap();
  s.seed_people(vec![new_person("Alice"), new_person("Bob")]).await.unwrap();
  let alice = person(&s, "Alice").await;
  let a = assigned(s.allocate(request_for(&alice), Fixed(0)).await.unwrap());
  s.close().await.unwrap();

  let reopened = SqliteStore::open(&path).await.unwrap();
  let stored = reopened.find_assignment("alice@x.com").await.unwrap().unwrap();
  assert_eq!(stored.assignment, a);
  reopened.close().await.unwrap();

  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
