use serde::Serialize;

use super::domain::{ApplicationDetail, Interview, PositionId};

/// Mean of the graded interviews; ungraded ones count toward neither sum nor total.
pub fn average_points(interviews: &[Interview]) -> Option<f64> {
    let mut total = 0.0_f64;
    let mut graded = 0_u32;
    for score in interviews.iter().filter_map(|interview| interview.score) {
        total += f64::from(score);
        graded += 1;
    }

    if graded == 0 {
        None
    } else {
        Some(total / f64::from(graded))
    }
}

/// Row of the per-position candidate listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCandidateView {
    pub complete_name: String,
    pub current_interview_step: String,
    pub average_points: Option<f64>,
    pub position_id: PositionId,
}

impl PositionCandidateView {
    pub fn from_detail(position_id: PositionId, detail: &ApplicationDetail) -> Self {
        Self {
            complete_name: detail.candidate.complete_name(),
            current_interview_step: detail.interview_step.name.clone(),
            average_points: average_points(&detail.interviews),
            position_id,
        }
    }
}
