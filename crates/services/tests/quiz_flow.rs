use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_core::model::AnswerTally;
use quiz_core::time::fixed_now;
use services::{
    AppServices, Clock, CompletionClient, Credentials, GenerationError, LocalAuthProvider,
    QUESTION_COUNT_CHOICES, QuestionGenerator, QuizError, QuizPhase,
};
use storage::repository::Storage;

/// Replies with a fixed text and counts calls.
struct ScriptedModel {
    reply: String,
    calls: Mutex<usize>,
}

impl ScriptedModel {
    fn new(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.reply.clone())
    }
}

fn algebra_reply(count: usize) -> String {
    let items: Vec<String> = (1..=count)
        .map(|n| {
            format!(
                r#"{{"question_text":"What is {n} * 2?","options":["{a}","{b}","{c}","{d}"],"correct_answer":"{a}","explanation":"{n} doubled is {a}."}}"#,
                a = n * 2,
                b = n * 2 + 1,
                c = n * 2 + 2,
                d = n * 2 + 3,
            )
        })
        .collect();
    format!("Sure! Here you go: [{}] Hope that helps!", items.join(","))
}

async fn sqlite_services(name: &str, model: Arc<ScriptedModel>) -> AppServices {
    let storage = Storage::sqlite(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect sqlite");
    let clock = Clock::fixed(fixed_now());
    let auth = Arc::new(LocalAuthProvider::new(clock, Arc::clone(&storage.users)));
    AppServices::from_parts(storage, clock, auth, QuestionGenerator::new(model), false)
}

#[tokio::test]
async fn algebra_run_end_to_end() {
    let model = ScriptedModel::new(algebra_reply(5));
    let services = sqlite_services("memdb_quiz_flow", Arc::clone(&model)).await;

    let gate = services.gate();
    assert!(gate.resolve().await.session().is_none());
    let session = gate
        .sign_in(Credentials::new("learner@example.com", ""))
        .await
        .expect("sign in");
    assert_eq!(gate.current_user_id().await, Some(session.user_id()));

    let catalog = services.catalog();
    let subject = catalog
        .create_subject(&session, "Algebra")
        .await
        .expect("create subject");
    assert_eq!(catalog.list_subjects(&session).await, vec![subject.clone()]);

    let quiz = services.quiz();
    let mut run = quiz.open(&session, subject.id()).await.expect("open");
    assert_eq!(run.phase(), QuizPhase::NoQuestions);

    quiz.generate(&session, &mut run, 5).await.expect("generate");
    assert_eq!(*model.calls.lock().unwrap(), 1);
    assert_eq!(run.questions().len(), 5);
    for question in run.questions() {
        assert_eq!(question.options().len(), 4);
        assert!(question.has_option(question.correct_answer()));
    }

    // Three right, two wrong.
    for index in 0..5 {
        let question = run.current_question().expect("question").clone();
        let choice = if index < 3 {
            question.correct_answer().to_owned()
        } else {
            question
                .options()
                .iter()
                .find(|o| !question.is_correct(o))
                .expect("wrong option")
                .clone()
        };
        let outcome = quiz
            .select_answer(&session, &mut run, &choice)
            .await
            .expect("answer");
        assert_eq!(outcome.is_correct, index < 3);

        let again = quiz.select_answer(&session, &mut run, &choice).await;
        assert!(matches!(again, Err(QuizError::AlreadyAnswered)));

        run.advance().expect("advance");
    }

    assert_eq!(run.phase(), QuizPhase::Completed);
    assert_eq!(run.score(), 3);
    assert!(matches!(run.advance(), Err(QuizError::Completed)));

    let history = quiz.answer_history(&session, subject.id()).await;
    assert_eq!(history.len(), 5);
    let flags: Vec<bool> = history.iter().map(|r| r.is_correct).collect();
    assert_eq!(flags, vec![true, true, true, false, false]);
    assert_eq!(
        AnswerTally::from_records(&history).accuracy_percent(),
        Some(60)
    );

    gate.sign_out().await.expect("sign out");
    assert!(gate.current_user_id().await.is_none());
}

#[tokio::test]
async fn every_offered_count_generates_a_full_batch() {
    for count in QUESTION_COUNT_CHOICES {
        let model = ScriptedModel::new(algebra_reply(count));
        let services = sqlite_services(&format!("memdb_count_{count}"), model).await;
        let session = services
            .gate()
            .sign_in(Credentials::new("learner@example.com", ""))
            .await
            .expect("sign in");
        let subject = services
            .catalog()
            .create_subject(&session, "Algebra")
            .await
            .expect("create subject");

        let quiz = services.quiz();
        let mut run = quiz.open(&session, subject.id()).await.expect("open");
        let added = quiz
            .generate(&session, &mut run, count)
            .await
            .unwrap_or_else(|err| panic!("generate {count}: {err}"));
        assert_eq!(added, count);
        assert_eq!(run.questions().len(), count);
        for question in run.questions() {
            assert_eq!(question.options().len(), 4, "count {count}");
            assert!(question.has_option(question.correct_answer()), "count {count}");
        }

        let reopened = quiz.open(&session, subject.id()).await.expect("reopen");
        assert_eq!(reopened.questions().len(), count);
    }
}

#[tokio::test]
async fn unusable_reply_persists_nothing() {
    let model = ScriptedModel::new("not json at all");
    let services = sqlite_services("memdb_quiz_garbage", model).await;
    let session = services
        .gate()
        .sign_in(Credentials::new("learner@example.com", ""))
        .await
        .expect("sign in");
    let subject = services
        .catalog()
        .create_subject(&session, "History")
        .await
        .expect("create subject");

    let quiz = services.quiz();
    let mut run = quiz.open(&session, subject.id()).await.expect("open");
    let err = quiz.generate(&session, &mut run, 5).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Generation(GenerationError::MalformedResponse)
    ));
    assert!(!err.user_message().is_empty());
    assert_eq!(run.phase(), QuizPhase::NoQuestions);

    let reopened = quiz.open(&session, subject.id()).await.expect("reopen");
    assert!(reopened.questions().is_empty());
}

#[tokio::test]
async fn short_batch_is_rejected_whole() {
    let model = ScriptedModel::new(algebra_reply(3));
    let services = sqlite_services("memdb_quiz_short", model).await;
    let session = services
        .gate()
        .sign_in(Credentials::new("learner@example.com", ""))
        .await
        .expect("sign in");
    let subject = services
        .catalog()
        .create_subject(&session, "Algebra")
        .await
        .expect("create subject");

    let quiz = services.quiz();
    let mut run = quiz.open(&session, subject.id()).await.expect("open");
    let err = quiz.generate(&session, &mut run, 5).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::Generation(GenerationError::CountMismatch {
            expected: 5,
            found: 3
        })
    ));
    assert!(
        quiz.open(&session, subject.id())
            .await
            .expect("reopen")
            .questions()
            .is_empty()
    );
}

#[tokio::test]
async fn in_memory_services_without_model_report_disabled() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()), QuestionGenerator::disabled());
    assert!(!services.quiz().generation_enabled());

    let session = services
        .gate()
        .sign_in(Credentials::new("learner@example.com", ""))
        .await
        .expect("sign in");
    let subject = services
        .catalog()
        .create_subject(&session, "Biology")
        .await
        .expect("create subject");
    let quiz = services.quiz();
    let mut run = quiz.open(&session, subject.id()).await.expect("open");
    let err = quiz.generate(&session, &mut run, 10).await.unwrap_err();
    assert!(matches!(err, QuizError::Generation(GenerationError::Disabled)));
}
