use super::common::*;
use crate::recruiting::domain::{
    Application, ApplicationDetail, ApplicationId, Candidate, CandidateId, Interview,
    InterviewId, InterviewStep, InterviewStepId, PositionId,
};
use crate::recruiting::scoring::{average_points, PositionCandidateView};

fn interviews(scores: &[Option<i32>]) -> Vec<Interview> {
    scores
        .iter()
        .enumerate()
        .map(|(index, score)| Interview {
            id: InterviewId(index as i64 + 1),
            application_id: ApplicationId(1),
            interview_date: date(2024, 4, 1 + index as u32),
            score: *score,
            notes: None,
        })
        .collect()
}

#[test]
fn average_is_absent_without_graded_interviews() {
    assert_eq!(average_points(&[]), None);
    assert_eq!(average_points(&interviews(&[None, None])), None);
}

#[test]
fn average_is_exact_mean_of_scores() {
    assert_eq!(
        average_points(&interviews(&[Some(80), Some(90), Some(100)])),
        Some(90.0)
    );
    assert_eq!(average_points(&interviews(&[Some(3), Some(5)])), Some(4.0));
}

#[test]
fn ungraded_interviews_are_excluded_from_sum_and_count() {
    assert_eq!(average_points(&interviews(&[None, Some(70)])), Some(70.0));
}

#[test]
fn average_is_not_rounded() {
    let average = average_points(&interviews(&[Some(4), Some(4), Some(5)])).expect("graded");
    assert!((average - 13.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn candidate_view_joins_names_and_current_step() {
    let detail = ApplicationDetail {
        application: Application {
            id: ApplicationId(1),
            candidate_id: CandidateId(2),
            position_id: PositionId(3),
            interview_step_id: InterviewStepId(4),
            application_date: date(2024, 3, 1),
            notes: None,
        },
        candidate: Candidate {
            id: CandidateId(2),
            first_name: "Carlos".to_string(),
            last_name: "García".to_string(),
            email: "carlos.garcia@example.com".to_string(),
            phone: None,
            address: None,
        },
        interview_step: InterviewStep {
            id: InterviewStepId(4),
            position_id: PositionId(3),
            name: "Technical Interview".to_string(),
            order_index: 2,
        },
        interviews: interviews(&[Some(6), None]),
    };

    let view = PositionCandidateView::from_detail(PositionId(3), &detail);
    assert_eq!(view.complete_name, "Carlos García");
    assert_eq!(view.current_interview_step, "Technical Interview");
    assert_eq!(view.average_points, Some(6.0));
    assert_eq!(view.position_id, PositionId(3));

    let payload = serde_json::to_value(&view).expect("serializes");
    assert_eq!(payload["completeName"], "Carlos García");
    assert_eq!(payload["positionId"], 3);
}

#[test]
fn missing_average_serializes_as_null() {
    let view = PositionCandidateView {
        complete_name: "Ana López".to_string(),
        current_interview_step: "Initial Screening".to_string(),
        average_points: None,
        position_id: PositionId(1),
    };
    let payload = serde_json::to_value(&view).expect("serializes");
    assert!(payload
        .get("averagePoints")
        .is_some_and(serde_json::Value::is_null));
}
