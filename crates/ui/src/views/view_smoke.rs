use super::quiz::QuizIntent;
use super::test_harness::{Fixture, ViewHandles, ViewKind};

#[tokio::test(flavor = "current_thread")]
async fn login_view_smoke_renders_form() {
    let fixture = Fixture::new();
    let mut harness = fixture.harness(ViewKind::Login, false);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("MCQ Generator"), "missing title in {html}");
    assert!(html.contains("Sign in"), "missing submit in {html}");
    assert!(html.contains("type=\"password\""), "missing password in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_lists_subjects_by_name() {
    let fixture = Fixture::new();
    fixture.subject("physics").await;
    fixture.subject("Algebra").await;

    let mut harness = fixture.harness(ViewKind::Dashboard, true);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Select a Subject"), "missing heading in {html}");
    assert!(html.contains("ada@example.com"), "missing email in {html}");
    assert!(html.contains("Click to start practice"), "missing cta in {html}");
    let algebra = html.find("Algebra").expect("algebra card");
    let physics = html.find("physics").expect("physics card");
    assert!(algebra < physics, "subjects out of order in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_smoke_renders_empty_state() {
    let fixture = Fixture::new();
    let mut harness = fixture.harness(ViewKind::Dashboard, true);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("No subjects yet"), "missing empty state in {html}");
    assert!(html.contains("Add Subject"), "missing add button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_creates_one_subject_for_a_double_submit() {
    let fixture = Fixture::new();
    let handles = ViewHandles::default();
    let mut harness = fixture.harness_with_handles(ViewKind::Dashboard, true, handles.clone());
    harness.settle().await;

    let create = handles.dashboard.create();
    let creating = handles.dashboard.creating();
    harness.dom.in_runtime(|| {
        create.call("Algebra".to_owned());
        assert!(*creating.peek(), "creating not set before the task ran");
        create.call("Algebra".to_owned());
    });
    for _ in 0..3 {
        harness.drive_async().await;
    }

    let subjects = fixture
        .storage
        .subjects
        .list_subjects(fixture.session.user_id())
        .await
        .expect("subjects");
    assert_eq!(subjects.len(), 1, "double submit created duplicates");
    harness.dom.in_runtime(|| assert!(!*creating.peek()));
    let html = harness.render();
    assert_eq!(html.matches("subject-card__name").count(), 1, "cards in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_first_question() {
    let fixture = Fixture::new();
    let subject = fixture.subject("Algebra").await;
    fixture
        .questions(&subject, &["What is x if x + 1 = 2?", "What is 2x if x = 3?"])
        .await;

    let mut harness = fixture.harness(ViewKind::Quiz(subject.id().value()), true);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1 of 2"), "missing progress in {html}");
    assert!(html.contains("What is x if x + 1 = 2?"), "missing text in {html}");
    assert!(html.contains("Back to Dashboard"), "missing back link in {html}");
    assert!(!html.contains("Explanation"), "explanation shown early in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_no_questions_state() {
    let fixture = Fixture::new();
    let subject = fixture.subject("History").await;

    let mut harness = fixture.harness(ViewKind::Quiz(subject.id().value()), true);
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("No questions available for this subject."),
        "missing empty state in {html}"
    );
    assert!(
        html.contains("AI generation is not configured."),
        "missing generation notice in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_smoke_renders_unknown_subject() {
    let fixture = Fixture::new();
    let mut harness = fixture.harness(ViewKind::Quiz(404), true);
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("This subject does not exist."),
        "missing not found in {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn quiz_view_ignores_second_select_while_first_is_pending() {
    let fixture = Fixture::new();
    let subject = fixture.subject("Algebra").await;
    fixture.questions(&subject, &["Q1", "Q2"]).await;

    let handles = ViewHandles::default();
    let mut harness =
        fixture.harness_with_handles(ViewKind::Quiz(subject.id().value()), true, handles.clone());
    harness.settle().await;
    let handles = handles.quiz;

    let dispatch = handles.dispatch();
    let pending = handles.pending();
    let vm = handles.vm();
    harness.dom.in_runtime(|| {
        dispatch.call(QuizIntent::Select("b".into()));
        assert!(*pending.peek(), "pending not set before the task ran");
        dispatch.call(QuizIntent::Select("a".into()));
        assert!(vm.peek().is_some(), "run hidden while the answer is pending");
    });
    let html = harness.render();
    assert!(!html.contains("Loading questions..."), "card flashed in {html}");
    assert!(html.contains("Question 1 of 2"), "card hidden while pending in {html}");

    for _ in 0..3 {
        harness.drive_async().await;
    }

    let answers = fixture
        .storage
        .answers
        .answers_for_subject(fixture.session.user_id(), subject.id())
        .await
        .expect("answers");
    assert_eq!(answers.len(), 1, "second select was not ignored");
    assert_eq!(answers[0].selected_answer, "b");
    harness.dom.in_runtime(|| {
        assert!(!*pending.peek());
        assert!(handles.error().peek().is_none());
        let guard = vm.peek();
        let run = guard.as_ref().expect("run restored");
        assert_eq!(run.score_label(), "Score: 1 / 1");
    });
    let html = harness.render();
    assert!(html.contains("Because b."), "missing explanation in {html}");
}
