use taskreel_model::{Task, TaskStatus, User, UserId, Video, VideoId};
use taskreel_store::Store;

fn user(email: &str) -> User {
    User::new("alice".into(), email.into(), "hash".into(), "tok".into())
}

#[test]
fn user_roundtrip_by_id_email_and_token() {
    let store = Store::open_in_memory().expect("store");
    let u = user("alice@example.com");
    store.insert_user(&u).expect("insert");

    let by_id = store.find_user(&u.id).expect("query").expect("row");
    assert_eq!(by_id, u);
    let by_email = store
        .find_user_by_email("alice@example.com")
        .expect("query")
        .expect("row");
    assert_eq!(by_email.id, u.id);
    let by_token = store.find_user_by_token("tok").expect("query").expect("row");
    assert_eq!(by_token.id, u.id);
    assert!(store
        .find_user_by_token("")
        .expect("query")
        .is_none());
}

#[test]
fn duplicate_email_insert_fails() {
    let store = Store::open_in_memory().expect("store");
    store.insert_user(&user("dup@example.com")).expect("first");
    assert!(store.insert_user(&user("dup@example.com")).is_err());
}

#[test]
fn update_user_clears_token_and_flips_verified() {
    let store = Store::open_in_memory().expect("store");
    let mut u = user("v@example.com");
    store.insert_user(&u).expect("insert");
    u.verified = true;
    u.verification_token = String::new();
    assert!(store.update_user(&u).expect("update"));

    let reloaded = store.find_user(&u.id).expect("query").expect("row");
    assert!(reloaded.verified);
    assert!(reloaded.verification_token.is_empty());
    assert!(store.find_user_by_token("tok").expect("query").is_none());
}

#[test]
fn delete_user_cascades_to_tasks_and_videos() {
    let store = Store::open_in_memory().expect("store");
    let u = user("c@example.com");
    store.insert_user(&u).expect("insert user");
    let v = Video::new(u.id.clone(), "a.mp4".into(), "media/a.mp4".into(), "t.png".into());
    store.insert_video(&v).expect("insert video");
    let t = Task::new(u.id.clone(), "Edit".into(), vec![v.id.clone()]);
    store.insert_task(&t).expect("insert task");

    assert!(store.delete_user(&u.id).expect("delete"));
    assert!(store.find_user(&u.id).expect("query").is_none());
    assert!(store.find_task(&t.id).expect("query").is_none());
    assert!(store.find_video(&v.id).expect("query").is_none());
    assert!(!store.delete_user(&u.id).expect("second delete"));
}

#[test]
fn task_status_filter_scopes_to_owner() {
    let store = Store::open_in_memory().expect("store");
    let alice = UserId::generate();
    let bob = UserId::generate();
    let mut done = Task::new(alice.clone(), "done".into(), Vec::new());
    done.status = TaskStatus::Completed;
    store.insert_task(&done).expect("insert");
    store
        .insert_task(&Task::new(alice.clone(), "open".into(), Vec::new()))
        .expect("insert");
    store
        .insert_task(&Task::new(bob.clone(), "other".into(), Vec::new()))
        .expect("insert");

    let all = store.tasks_for_user(&alice, None).expect("query");
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|t| t.user_id == alice));

    let completed = store
        .tasks_for_user(&alice, Some(TaskStatus::Completed))
        .expect("query");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].title, "done");

    // Idempotent read: same result without intervening mutation.
    assert_eq!(store.tasks_for_user(&alice, None).expect("query"), all);
}

#[test]
fn task_update_overwrites_and_delete_reports_absence() {
    let store = Store::open_in_memory().expect("store");
    let mut t = Task::new(UserId::generate(), "Buy milk".into(), Vec::new());
    store.insert_task(&t).expect("insert");

    t.title = "Buy oat milk".into();
    t.status = TaskStatus::Completed;
    assert!(store.update_task(&t).expect("update"));
    let reloaded = store.find_task(&t.id).expect("query").expect("row");
    assert_eq!(reloaded.title, "Buy oat milk");
    assert_eq!(reloaded.status, TaskStatus::Completed);

    assert!(store.delete_task(&t.id).expect("delete"));
    assert!(!store.delete_task(&t.id).expect("second delete"));
}

#[test]
fn detach_video_rewrites_only_referencing_tasks() {
    let store = Store::open_in_memory().expect("store");
    let owner = UserId::generate();
    let kept = VideoId::generate();
    let removed = VideoId::generate();
    let with_both = Task::new(owner.clone(), "both".into(), vec![kept.clone(), removed.clone()]);
    let without = Task::new(owner.clone(), "none".into(), vec![kept.clone()]);
    store.insert_task(&with_both).expect("insert");
    store.insert_task(&without).expect("insert");

    let rewritten = store.detach_video_from_tasks(&removed).expect("detach");
    assert_eq!(rewritten, 1);
    let reloaded = store.find_task(&with_both.id).expect("query").expect("row");
    assert_eq!(reloaded.videos, vec![kept.clone()]);
    let untouched = store.find_task(&without.id).expect("query").expect("row");
    assert_eq!(untouched.videos, vec![kept]);
}

#[test]
fn store_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("taskreel.sqlite");
    let u = user("persist@example.com");
    {
        let store = Store::open(&path).expect("open");
        store.insert_user(&u).expect("insert");
    }
    let store = Store::open(&path).expect("reopen");
    assert_eq!(store.find_user(&u.id).expect("query").expect("row"), u);
}
