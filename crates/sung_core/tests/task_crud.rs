use chrono::NaiveDate;
use rusqlite::Connection;
use sung_core::db::open_db_in_memory;
use sung_core::{
    Priority, PriorityFlags, RepoError, SettingsRepository, SqliteSettingsRepository,
    SqliteTaskRepository, SqliteUserRepository, SungRegion, Task, TaskDraft, TaskEdit,
    TaskListQuery, TaskRepository, TaskService, TaskServiceError, TaskStatus, User, UserId,
    UserRepository, ValidationError,
};

type Service<'conn> = TaskService<SqliteTaskRepository<'conn>, SqliteSettingsRepository<'conn>>;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn create_user(conn: &Connection, username: &str) -> UserId {
    let repo = SqliteUserRepository::new(conn);
    repo.create_user(&User::new(username, "secret1").unwrap())
        .unwrap()
}

fn service(conn: &Connection) -> Service<'_> {
    TaskService::new(
        SqliteTaskRepository::new(conn),
        SqliteSettingsRepository::new(conn),
    )
}

fn draft(title: &str, region: SungRegion, due: Option<NaiveDate>) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: String::new(),
        due_date: due,
        priorities: Some(region.flags()),
    }
}

#[test]
fn add_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);

    let mut input = draft("Write report", SungRegion::ImportantUrgent, Some(day(6, 1)));
    input.description = "quarterly numbers".to_string();
    let created = tasks.add_task(user, input).unwrap();
    assert!(created.id > 0);

    let loaded = tasks.get_task(user, created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.status, TaskStatus::Open);
    assert_eq!(loaded.region(), SungRegion::ImportantUrgent);
    assert_eq!(loaded.description, "quarterly numbers");
    assert_eq!(loaded.due_date, Some(day(6, 1)));
}

#[test]
fn add_without_priorities_uses_settings_defaults() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);

    let plain = tasks.add_task(user, TaskDraft::new("plain")).unwrap();
    assert_eq!(plain.region(), SungRegion::LowPriority);

    let settings_repo = SqliteSettingsRepository::new(&conn);
    let mut settings = settings_repo.get_settings(user).unwrap();
    settings.default_priorities = SungRegion::Fit.flags();
    settings_repo.save_settings(user, &settings).unwrap();

    let defaulted = tasks.add_task(user, TaskDraft::new("defaulted")).unwrap();
    assert_eq!(defaulted.region(), SungRegion::Fit);

    let explicit = tasks
        .add_task(user, draft("explicit", SungRegion::Urgent, None))
        .unwrap();
    assert_eq!(explicit.region(), SungRegion::Urgent);
}

#[test]
fn add_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");

    let err = service(&conn)
        .add_task(user, TaskDraft::new("   "))
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::Validation(ValidationError::EmptyTitle)
    ));
}

#[test]
fn edit_changes_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);
    let task = tasks
        .add_task(user, draft("Draft", SungRegion::Important, Some(day(3, 3))))
        .unwrap();

    let edited = tasks
        .edit_task(
            user,
            task.id,
            TaskEdit {
                title: Some("Final".to_string()),
                fitness: Some(Priority::High),
                ..TaskEdit::default()
            },
        )
        .unwrap();
    assert_eq!(edited.title, "Final");
    assert_eq!(edited.due_date, Some(day(3, 3)));
    assert_eq!(edited.region(), SungRegion::ImportantFit);
    assert_eq!(tasks.get_task(user, task.id).unwrap(), edited);

    let cleared = tasks
        .edit_task(
            user,
            task.id,
            TaskEdit {
                due_date: Some(None),
                ..TaskEdit::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.due_date, None);

    let err = tasks
        .edit_task(user, task.id, TaskEdit::default())
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::NothingToUpdate));

    let err = tasks
        .edit_task(
            user,
            task.id,
            TaskEdit {
                title: Some(" ".to_string()),
                ..TaskEdit::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::Validation(_)));
}

#[test]
fn status_transitions_follow_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);
    let task = tasks.add_task(user, TaskDraft::new("Lifecycle")).unwrap();

    let started = tasks.start_task(user, task.id).unwrap();
    assert_eq!(started.status, TaskStatus::InProgress);
    assert!(matches!(
        tasks.start_task(user, task.id).unwrap_err(),
        TaskServiceError::InvalidTransition { action: "start", .. }
    ));

    let err = tasks.reopen_task(user, task.id).unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidTransition {
            from: TaskStatus::InProgress,
            ..
        }
    ));

    let completed = tasks.complete_task(user, task.id, day(5, 5)).unwrap();
    assert_eq!(completed.status, TaskStatus::Completed);
    assert_eq!(completed.completed_date, Some(day(5, 5)));
    assert!(tasks.complete_task(user, task.id, day(5, 6)).is_err());

    let reopened = tasks.reopen_task(user, task.id).unwrap();
    assert_eq!(reopened.status, TaskStatus::Open);
    assert_eq!(reopened.completed_date, None);
    assert_eq!(tasks.get_task(user, task.id).unwrap(), reopened);
}

#[test]
fn tasks_are_scoped_to_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = create_user(&conn, "alice");
    let bob = create_user(&conn, "bob");
    let tasks = service(&conn);
    let task = tasks.add_task(alice, TaskDraft::new("private")).unwrap();

    assert!(matches!(
        tasks.get_task(bob, task.id).unwrap_err(),
        TaskServiceError::NotFound(id) if id == task.id
    ));
    assert!(tasks.delete_task(bob, task.id).is_err());
    assert!(tasks
        .list_tasks(bob, &TaskListQuery::default())
        .unwrap()
        .is_empty());

    tasks.delete_task(alice, task.id).unwrap();
    assert!(matches!(
        tasks.delete_task(alice, task.id).unwrap_err(),
        TaskServiceError::NotFound(_)
    ));
}

#[test]
fn list_filters_combine() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);

    let report = tasks
        .add_task(user, draft("Quarterly Report", SungRegion::DoNow, Some(day(4, 10))))
        .unwrap();
    let gym = tasks
        .add_task(user, draft("Gym", SungRegion::Fit, Some(day(4, 20))))
        .unwrap();
    let taxes = tasks
        .add_task(user, draft("Taxes 100%", SungRegion::Important, None))
        .unwrap();
    tasks.start_task(user, gym.id).unwrap();

    let ids = |query: TaskListQuery| -> Vec<i64> {
        tasks
            .list_tasks(user, &query)
            .unwrap()
            .iter()
            .map(|task| task.id)
            .collect()
    };

    assert_eq!(
        ids(TaskListQuery::default()),
        vec![report.id, gym.id, taxes.id]
    );
    assert_eq!(
        ids(TaskListQuery {
            importance: Some(Priority::High),
            ..TaskListQuery::default()
        }),
        vec![report.id, taxes.id]
    );
    assert_eq!(
        ids(TaskListQuery {
            search: Some("report".to_string()),
            ..TaskListQuery::default()
        }),
        vec![report.id]
    );
    assert_eq!(
        ids(TaskListQuery {
            search: Some("0%".to_string()),
            ..TaskListQuery::default()
        }),
        vec![taxes.id]
    );
    assert_eq!(
        ids(TaskListQuery {
            status: Some(TaskStatus::InProgress),
            ..TaskListQuery::default()
        }),
        vec![gym.id]
    );
    assert_eq!(
        ids(TaskListQuery {
            due_on_or_before: Some(day(4, 15)),
            ..TaskListQuery::default()
        }),
        vec![report.id]
    );
    assert_eq!(
        ids(TaskListQuery::default().with_region(SungRegion::Fit)),
        vec![gym.id]
    );
    assert!(ids(TaskListQuery {
        urgency: Some(Priority::High),
        fitness: Some(Priority::Low),
        ..TaskListQuery::default()
    })
    .is_empty());
}

#[test]
fn group_by_region_buckets_matching_tasks() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);
    for (title, region) in [
        ("a", SungRegion::DoNow),
        ("b", SungRegion::LowPriority),
        ("c", SungRegion::DoNow),
        ("d", SungRegion::UrgentFit),
    ] {
        tasks.add_task(user, draft(title, region, None)).unwrap();
    }

    let groups = tasks
        .group_by_region(user, &TaskListQuery::default())
        .unwrap();
    assert_eq!(groups.total(), 4);
    let center: Vec<_> = groups
        .get(SungRegion::DoNow)
        .iter()
        .map(|task| task.title.as_str())
        .collect();
    assert_eq!(center, vec!["a", "c"]);
    assert_eq!(groups.get(SungRegion::UrgentFit).len(), 1);
    assert_eq!(groups.get(SungRegion::LowPriority).len(), 1);
    assert!(groups.get(SungRegion::Important).is_empty());
}

#[test]
fn repository_rejects_inconsistent_completion() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::from_draft(user, TaskDraft::new("broken"), PriorityFlags::default());
    task.status = TaskStatus::Completed;
    let err = repo.create_task(&task).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::CompletionMismatch)
    ));
}

#[test]
fn update_missing_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::from_draft(user, TaskDraft::new("ghost"), PriorityFlags::default());
    task.id = 404;
    assert!(matches!(
        repo.update_task(&task).unwrap_err(),
        RepoError::NotFound {
            entity: "task",
            id: 404
        }
    ));
}

#[test]
fn title_search_folds_ascii_case_only() {
    let conn = open_db_in_memory().unwrap();
    let user = create_user(&conn, "alice");
    let tasks = service(&conn);
    let task = tasks
        .add_task(user, draft("Ärger klären", SungRegion::LowPriority, None))
        .unwrap();

    let search = |text: &str| {
        tasks
            .list_tasks(
                user,
                &TaskListQuery {
                    search: Some(text.to_string()),
                    ..TaskListQuery::default()
                },
            )
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect::<Vec<_>>()
    };

    assert_eq!(search("KLäREN"), vec![task.id]);
    assert!(search("KLÄREN").is_empty());
}
