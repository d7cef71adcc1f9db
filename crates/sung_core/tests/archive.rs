use chrono::NaiveDate;
use rusqlite::Connection;
use sung_core::db::open_db_in_memory;
use sung_core::{
    ArchiveError, ArchiveRepository, ArchiveService, Priority, SettingsRepository,
    SqliteArchiveRepository, SqliteSettingsRepository, SqliteTaskRepository,
    SqliteUserRepository, SungRegion, TaskDraft, TaskId, TaskListQuery, TaskService,
    TaskStatus, User, UserId, UserRepository,
};

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn create_user(conn: &Connection, username: &str) -> UserId {
    SqliteUserRepository::new(conn)
        .create_user(&User::new(username, "secret1").unwrap())
        .unwrap()
}

fn tasks(
    conn: &Connection,
) -> TaskService<SqliteTaskRepository<'_>, SqliteSettingsRepository<'_>> {
    TaskService::new(
        SqliteTaskRepository::new(conn),
        SqliteSettingsRepository::new(conn),
    )
}

fn archive(
    conn: &Connection,
) -> ArchiveService<SqliteTaskRepository<'_>, SqliteArchiveRepository<'_>, SqliteSettingsRepository<'_>>
{
    ArchiveService::new(
        SqliteTaskRepository::new(conn),
        SqliteArchiveRepository::new(conn),
        SqliteSettingsRepository::new(conn),
    )
}

fn completed_task(conn: &Connection, user: UserId, title: &str, on: NaiveDate) -> TaskId {
    let service = tasks(conn);
    let mut draft = TaskDraft::new(title);
    draft.priorities = Some(SungRegion::ImportantFit.flags());
    let task = service.add_task(user, draft).unwrap();
    service.complete_task(user, task.id, on).unwrap();
    task.id
}

fn configure(conn: &Connection, user: UserId, change: impl FnOnce(&mut sung_core::Settings)) {
    let repo = SqliteSettingsRepository::new(conn);
    let mut settings = repo.get_settings(user).unwrap();
    change(&mut settings);
    repo.save_settings(user, &settings).unwrap();
}

#[test]
fn archive_moves_completed_task_out_of_active_list() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let id = completed_task(&conn, user, "Ship v1", day(2, 1));

    let archived = archive(&conn).archive_task(user, id, day(2, 3)).unwrap();
    assert_eq!(archived.source_task_id, id);
    assert_eq!(archived.archived_date, day(2, 3));
    assert_eq!(archived.completed_date, Some(day(2, 1)));
    assert_eq!(archived.region(), SungRegion::ImportantFit);

    assert!(tasks(&conn)
        .list_tasks(user, &TaskListQuery::default())
        .unwrap()
        .is_empty());
    let stored = archive(&conn).get_archived(user, archived.id).unwrap();
    assert_eq!(stored, archived);
}

#[test]
fn archive_rejects_open_tasks_and_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let open = tasks(&conn).add_task(user, TaskDraft::new("still open")).unwrap();

    let err = archive(&conn).archive_task(user, open.id, day(1, 1)).unwrap_err();
    assert!(matches!(
        err,
        ArchiveError::NotCompleted {
            status: TaskStatus::Open,
            ..
        }
    ));
    assert!(tasks(&conn).get_task(user, open.id).is_ok());

    assert!(matches!(
        archive(&conn).archive_task(user, 999, day(1, 1)).unwrap_err(),
        ArchiveError::TaskNotFound(999)
    ));
}

#[test]
fn repository_refuses_to_archive_incomplete_task() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let open = tasks(&conn).add_task(user, TaskDraft::new("open")).unwrap();

    let err = SqliteArchiveRepository::new(&conn)
        .archive_task(&open, day(1, 1))
        .unwrap_err();
    assert!(matches!(err, sung_core::RepoError::Conflict(_)));
}

#[test]
fn list_archived_filters_and_orders_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let first = completed_task(&conn, user, "Old report", day(1, 1));
    let second = completed_task(&conn, user, "New report", day(1, 2));
    let other = completed_task(&conn, user, "Groceries", day(1, 2));

    let service = archive(&conn);
    service.archive_task(user, first, day(1, 5)).unwrap();
    service.archive_task(user, second, day(1, 9)).unwrap();
    let groceries = service.archive_task(user, other, day(1, 9)).unwrap();
    // Make the groceries entry low priority for the filter check.
    conn.execute(
        "UPDATE archived_tasks SET importance = 'Low', fitness = 'Low' WHERE id = ?1;",
        [groceries.id],
    )
    .unwrap();

    let titles = |query: TaskListQuery| -> Vec<String> {
        service
            .list_archived(user, &query)
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect()
    };

    assert_eq!(
        titles(TaskListQuery::default()),
        vec!["Groceries", "New report", "Old report"]
    );
    assert_eq!(
        titles(TaskListQuery {
            search: Some("REPORT".to_string()),
            ..TaskListQuery::default()
        }),
        vec!["New report", "Old report"]
    );
    assert_eq!(
        titles(TaskListQuery {
            importance: Some(Priority::Low),
            ..TaskListQuery::default()
        }),
        vec!["Groceries"]
    );
}

#[test]
fn delete_archived_is_scoped_to_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = create_user(&conn, "alice");
    let bob = create_user(&conn, "bob");
    let id = completed_task(&conn, alice, "done", day(3, 1));
    let archived = archive(&conn).archive_task(alice, id, day(3, 2)).unwrap();

    assert!(matches!(
        archive(&conn).delete_archived(bob, archived.id).unwrap_err(),
        ArchiveError::ArchivedNotFound(_)
    ));
    archive(&conn).delete_archived(alice, archived.id).unwrap();
    assert!(archive(&conn).get_archived(alice, archived.id).is_err());
}

#[test]
fn maintenance_auto_archives_after_configured_days() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    configure(&conn, user, |settings| settings.archive_after_days = 3);

    let old = completed_task(&conn, user, "old", day(5, 1));
    let recent = completed_task(&conn, user, "recent", day(5, 9));
    let open = tasks(&conn).add_task(user, TaskDraft::new("open")).unwrap();

    let report = archive(&conn).run_maintenance(user, day(5, 10)).unwrap();
    assert_eq!(report.archived, vec![old]);
    assert_eq!(report.purged, 0);

    let remaining: Vec<_> = tasks(&conn)
        .list_tasks(user, &TaskListQuery::default())
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(remaining, vec![recent, open.id]);
}

#[test]
fn maintenance_respects_disabled_switches() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    configure(&conn, user, |settings| settings.auto_archive = false);
    completed_task(&conn, user, "kept", day(1, 1));

    let report = archive(&conn).run_maintenance(user, day(12, 31)).unwrap();
    assert!(report.archived.is_empty());
    assert_eq!(report.purged, 0);
}

#[test]
fn maintenance_purges_by_archived_date() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    configure(&conn, user, |settings| {
        settings.auto_archive = false;
        settings.auto_delete = true;
        settings.delete_after_days = 30;
    });

    let stale = completed_task(&conn, user, "stale", day(1, 1));
    let fresh = completed_task(&conn, user, "fresh", day(1, 1));
    let service = archive(&conn);
    service.archive_task(user, stale, day(1, 1)).unwrap();
    let kept = service.archive_task(user, fresh, day(2, 15)).unwrap();

    let report = service.run_maintenance(user, day(2, 20)).unwrap();
    assert_eq!(report.purged, 1);

    let left = service
        .list_archived(user, &TaskListQuery::default())
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, kept.id);
}

#[test]
fn purge_only_touches_current_user() {
    let conn = open_db_in_memory().unwrap();
    let alice = create_user(&conn, "alice");
    let bob = create_user(&conn, "bob");
    configure(&conn, alice, |settings| {
        settings.auto_delete = true;
        settings.delete_after_days = 0;
    });

    let a = completed_task(&conn, alice, "a", day(1, 1));
    let b = completed_task(&conn, bob, "b", day(1, 1));
    archive(&conn).archive_task(alice, a, day(1, 1)).unwrap();
    archive(&conn).archive_task(bob, b, day(1, 1)).unwrap();

    let report = archive(&conn).run_maintenance(alice, day(1, 2)).unwrap();
    assert_eq!(report.purged, 1);
    assert_eq!(
        SqliteArchiveRepository::new(&conn)
            .list_archived(bob, &TaskListQuery::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn completing_archives_immediately_when_threshold_is_met() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let id = completed_task(&conn, user, "Ship v1", day(4, 2));

    let archived = archive(&conn)
        .archive_if_due(user, id, day(4, 2))
        .unwrap()
        .unwrap();
    assert_eq!(archived.source_task_id, id);
    assert_eq!(archived.archived_date, day(4, 2));
    assert!(tasks(&conn)
        .list_tasks(user, &TaskListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn completed_task_stays_active_until_archive_threshold() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    configure(&conn, user, |settings| settings.archive_after_days = 2);
    let waiting = completed_task(&conn, user, "waiting", day(4, 2));
    assert!(archive(&conn)
        .archive_if_due(user, waiting, day(4, 2))
        .unwrap()
        .is_none());

    configure(&conn, user, |settings| {
        settings.archive_after_days = 0;
        settings.auto_archive = false;
    });
    let manual = completed_task(&conn, user, "manual", day(4, 2));
    assert!(archive(&conn)
        .archive_if_due(user, manual, day(4, 2))
        .unwrap()
        .is_none());

    let open = tasks(&conn).add_task(user, TaskDraft::new("open")).unwrap();
    configure(&conn, user, |settings| settings.auto_archive = true);
    assert!(archive(&conn)
        .archive_if_due(user, open.id, day(4, 2))
        .unwrap()
        .is_none());
    assert_eq!(
        tasks(&conn)
            .list_tasks(user, &TaskListQuery::default())
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn interrupted_maintenance_reports_tasks_already_archived() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let shipped = completed_task(&conn, user, "Ship v1", day(3, 1));
    let blocked = completed_task(&conn, user, "Blocked", day(3, 1));
    conn.execute_batch(
        "CREATE TEMP TRIGGER block_archive BEFORE INSERT ON archived_tasks
         WHEN NEW.title = 'Blocked'
         BEGIN
             SELECT RAISE(ABORT, 'archive blocked');
         END;",
    )
    .unwrap();

    let err = archive(&conn).run_maintenance(user, day(3, 2)).unwrap_err();
    match err {
        ArchiveError::MaintenanceInterrupted { report, source } => {
            assert_eq!(report.archived, vec![shipped]);
            assert_eq!(report.purged, 0);
            assert!(matches!(*source, ArchiveError::Repo(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let remaining: Vec<_> = tasks(&conn)
        .list_tasks(user, &TaskListQuery::default())
        .unwrap()
        .into_iter()
        .map(|task| task.id)
        .collect();
    assert_eq!(remaining, vec![blocked]);
}
