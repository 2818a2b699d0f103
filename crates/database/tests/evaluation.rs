mod common;

use common::{FixedClock, answers, at, count, feedback_draft, seed, setup};
use database::{
    entities::{evaluation_sections, evaluations, questions, templates},
    services::{
        evaluation::{EvaluationError, EvaluationService},
        results::ResultsService,
        submission::SubmissionService,
        template::{TemplateError, TemplateService, TemplateWithQuestions},
    },
};
use models::question::{DraftError, QuestionType};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, SqlErr};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_template_keeps_question_order() {
    let db = setup().await;

    let created = TemplateService::create_template(&db, feedback_draft("  Course feedback "))
        .await
        .unwrap();
    assert_eq!(created.template.title, "Course feedback");

    let loaded = TemplateService::find_with_questions(&db, created.template.id)
        .await
        .unwrap();
    assert_eq!(loaded.template.id, created.template.id);
    let ids = |t: &TemplateWithQuestions| -> Vec<Uuid> {
        t.questions.iter().map(|q| q.id).collect()
    };
    assert_eq!(ids(&loaded), ids(&created));

    let types: Vec<&QuestionType> = loaded.questions.iter().map(|q| &q.question_type).collect();
    assert_eq!(
        types,
        [&QuestionType::Scale, &QuestionType::Checkbox, &QuestionType::Text]
    );
    assert_eq!(loaded.questions[0].options.len(), 5);
    assert!(loaded.questions[2].options.is_empty());
}

#[tokio::test]
async fn test_template_titles_are_unique() {
    let db = setup().await;

    TemplateService::create_template(&db, feedback_draft("Course feedback"))
        .await
        .unwrap();

    let duplicate =
        TemplateService::create_template(&db, feedback_draft("Course feedback ")).await;
    assert!(matches!(duplicate, Err(TemplateError::DuplicateTitle(title)) if title == "Course feedback"));

    assert_eq!(count::<templates::Entity>(&db).await, 1);
    assert_eq!(count::<questions::Entity>(&db).await, 3);
}

#[tokio::test]
async fn test_invalid_template_is_not_saved() {
    let db = setup().await;

    let mut draft = feedback_draft("Course feedback");
    draft.questions[0].options.clear();

    let result = TemplateService::create_template(&db, draft).await;
    assert!(matches!(
        result,
        Err(TemplateError::Invalid(DraftError::MissingOptions(0)))
    ));

    let missing = TemplateService::find_with_questions(&db, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(TemplateError::NotFound(_))));
    assert_eq!(count::<templates::Entity>(&db).await, 0);
}

#[tokio::test]
async fn test_section_cannot_receive_a_template_twice() {
    let db = setup().await;
    let fixture = seed(&db, None).await;

    let again = EvaluationService::create_evaluation(
        &db,
        fixture.template.template.id,
        &[fixture.other_section.id, fixture.section.id],
        None,
    )
    .await;
    assert!(matches!(
        again,
        Err(EvaluationError::AlreadyEvaluated { section_id, evaluation_id })
            if section_id == fixture.section.id && evaluation_id == fixture.evaluation.id
    ));
    assert_eq!(count::<evaluations::Entity>(&db).await, 1);

    // The untouched section and a different template are fine
    EvaluationService::create_evaluation(
        &db,
        fixture.template.template.id,
        &[fixture.other_section.id],
        None,
    )
    .await
    .unwrap();

    let midterm = TemplateService::create_template(&db, feedback_draft("Midterm check-in"))
        .await
        .unwrap();
    EvaluationService::create_evaluation(&db, midterm.template.id, &[fixture.section.id], None)
        .await
        .unwrap();

    assert_eq!(count::<evaluations::Entity>(&db).await, 3);
}

#[tokio::test]
async fn test_store_refuses_second_link_of_template_to_section() {
    let db = setup().await;
    let fixture = seed(&db, None).await;
    let template_id = fixture.template.template.id;

    let other =
        EvaluationService::create_evaluation(&db, template_id, &[fixture.other_section.id], None)
            .await
            .unwrap();

    // Writing the link directly bypasses the service but not the index
    let link = evaluation_sections::ActiveModel {
        id: Set(Uuid::new_v4()),
        evaluation_id: Set(other.id),
        template_id: Set(template_id),
        section_id: Set(fixture.section.id),
    }
    .insert(&db)
    .await;

    let err = link.unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));
    assert_eq!(count::<evaluation_sections::Entity>(&db).await, 2);
}

#[tokio::test]
async fn test_create_evaluation_checks_references() {
    let db = setup().await;
    let fixture = seed(&db, None).await;
    let template_id = fixture.template.template.id;

    let no_sections = EvaluationService::create_evaluation(&db, template_id, &[], None).await;
    assert!(matches!(no_sections, Err(EvaluationError::NoSections)));

    let ghost = Uuid::new_v4();
    let missing_section =
        EvaluationService::create_evaluation(&db, template_id, &[fixture.other_section.id, ghost], None)
            .await;
    assert!(matches!(missing_section, Err(EvaluationError::SectionNotFound(id)) if id == ghost));

    let missing_template =
        EvaluationService::create_evaluation(&db, Uuid::new_v4(), &[fixture.section.id], None).await;
    assert!(matches!(missing_template, Err(EvaluationError::TemplateNotFound(_))));
}

#[tokio::test]
async fn test_pending_evaluations() {
    let db = setup().await;
    let fixture = seed(&db, Some(at(15))).await;
    let before_deadline = FixedClock(at(10));
    let [ana, bruno] = [&fixture.students[0], &fixture.students[1]];

    let pending = EvaluationService::pending_for(&db, &before_deadline, ana.id)
        .await
        .unwrap();
    let pending_ids: Vec<Uuid> = pending.iter().map(|e| e.id).collect();
    assert_eq!(pending_ids, vec![fixture.evaluation.id]);

    let outsider = EvaluationService::pending_for(&db, &before_deadline, fixture.outsider.id)
        .await
        .unwrap();
    assert!(outsider.is_empty());

    SubmissionService::submit(
        &db,
        &before_deadline,
        fixture.evaluation.id,
        ana.id,
        &answers(&[(fixture.scale(), json!(0))]),
    )
    .await
    .unwrap();

    let answered = EvaluationService::pending_for(&db, &before_deadline, ana.id)
        .await
        .unwrap();
    assert!(answered.is_empty());

    let closed = EvaluationService::pending_for(&db, &FixedClock(at(16)), bruno.id)
        .await
        .unwrap();
    assert!(closed.is_empty());
}

#[tokio::test]
async fn test_results_summary() {
    let db = setup().await;
    let fixture = seed(&db, None).await;
    let clock = FixedClock(at(10));

    for (student, scale, checkbox, text) in [
        (&fixture.students[0], 0, json!([0, 1]), json!("More labs")),
        (&fixture.students[1], 0, json!([1]), json!("")),
    ] {
        SubmissionService::submit(
            &db,
            &clock,
            fixture.evaluation.id,
            student.id,
            &answers(&[
                (fixture.scale(), json!(scale)),
                (fixture.checkbox(), checkbox),
                (fixture.text(), text),
            ]),
        )
        .await
        .unwrap();
    }

    let summary = ResultsService::summarize(&db, fixture.evaluation.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(summary.template_title, "Course feedback");
    assert_eq!(summary.respondents, 2);

    let counts = |index: usize| -> Vec<usize> {
        summary.questions[index]
            .tallies
            .iter()
            .map(|tally| tally.count)
            .collect()
    };
    assert_eq!(counts(0), vec![2, 0, 0, 0, 0]);
    assert_eq!(counts(1), vec![1, 2, 0]);
    assert_eq!(summary.questions[2].responses, vec!["More labs".to_string()]);

    assert!(
        ResultsService::summarize(&db, Uuid::new_v4())
            .await
            .unwrap()
            .is_none()
    );
}
