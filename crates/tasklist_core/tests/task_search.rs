use tasklist_core::db::open_db_in_memory;
use tasklist_core::{SqliteTaskRepository, Task, TaskRepository};

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

fn seeded<'conn>(conn: &'conn rusqlite::Connection, items: &[&str]) -> SqliteTaskRepository<'conn> {
    let repo = SqliteTaskRepository::new(conn);
    for title in items {
        repo.create(title).unwrap();
    }
    repo
}

#[test]
fn filter_matches_case_insensitive_substring() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded(&conn, &["Buy milk", "Walk dog"]);

    assert_eq!(titles(&repo.fetch_filtered("walk").unwrap()), vec!["Walk dog"]);
    assert_eq!(titles(&repo.fetch_filtered("MILK").unwrap()), vec!["Buy milk"]);
    assert!(repo.fetch_filtered("cat").unwrap().is_empty());
}

#[test]
fn filter_result_equals_predicate_subset_sorted_by_title() {
    let conn = open_db_in_memory().unwrap();
    let items = [
        "water plants",
        "Wash car",
        "call mom",
        "walk dog",
        "Answer email",
        "wax board",
    ];
    let repo = seeded(&conn, &items);

    for term in ["wa", "A", "o", "ll", "zzz", " "] {
        let mut expected = items
            .iter()
            .copied()
            .filter(|title| title.to_lowercase().contains(&term.to_lowercase()))
            .collect::<Vec<_>>();
        expected.sort();

        assert_eq!(
            titles(&repo.fetch_filtered(term).unwrap()),
            expected,
            "term `{term}`"
        );
    }
}

#[test]
fn filter_sorts_ascending_by_title_with_stable_ties() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let first_b = repo.create("b task").unwrap();
    repo.create("a task").unwrap();
    let second_b = repo.create("b task").unwrap();

    let filtered = repo.fetch_filtered("task").unwrap();
    assert_eq!(titles(&filtered), vec!["a task", "b task", "b task"]);
    assert!(filtered[1].same_task(&first_b));
    assert!(filtered[2].same_task(&second_b));
}

#[test]
fn empty_term_returns_all_tasks_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded(&conn, &["pear", "apple", "fig"]);

    assert_eq!(
        titles(&repo.fetch_filtered("").unwrap()),
        vec!["apple", "fig", "pear"]
    );
}

#[test]
fn filter_does_not_change_fetch_all_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded(&conn, &["pear", "apple"]);

    repo.fetch_filtered("p").unwrap();
    assert_eq!(titles(&repo.fetch_all().unwrap()), vec!["pear", "apple"]);
}

#[test]
fn filter_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = seeded(&conn, &["Купить МОЛОКО", "Walk dog"]);

    assert_eq!(
        titles(&repo.fetch_filtered("молоко").unwrap()),
        vec!["Купить МОЛОКО"]
    );
}
