use std::sync::OnceLock;

use regex::Regex;

use super::domain::NewCandidate;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const ADDRESS_MAX_CHARS: usize = 100;

/// Validation errors raised while accepting a new candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("Invalid {field}")]
    InvalidName { field: &'static str },
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Invalid phone")]
    InvalidPhone,
    #[error("Invalid address")]
    InvalidAddress,
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-ZñÑáéíóúÁÉÍÓÚüÜ ]+$").expect("name pattern compiles")
    })
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[679]\d{8}$").expect("phone pattern compiles"))
}

/// Normalizes candidate payloads and rejects malformed fields before anything is stored.
#[derive(Debug, Clone, Default)]
pub struct CandidateIntake;

impl CandidateIntake {
    pub fn accept(&self, submission: NewCandidate) -> Result<NewCandidate, IntakeViolation> {
        let first_name = validate_name(&submission.first_name, "first name")?;
        let last_name = validate_name(&submission.last_name, "last name")?;

        let email = submission.email.trim().to_string();
        if !email_pattern().is_match(&email) {
            return Err(IntakeViolation::InvalidEmail);
        }

        let phone = non_blank(submission.phone);
        if let Some(phone) = &phone {
            if !phone_pattern().is_match(phone) {
                return Err(IntakeViolation::InvalidPhone);
            }
        }

        let address = non_blank(submission.address);
        if let Some(address) = &address {
            if address.chars().count() > ADDRESS_MAX_CHARS {
                return Err(IntakeViolation::InvalidAddress);
            }
        }

        Ok(NewCandidate {
            first_name,
            last_name,
            email,
            phone,
            address,
        })
    }
}

fn validate_name(raw: &str, field: &'static str) -> Result<String, IntakeViolation> {
    let name = raw.trim();
    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) || !name_pattern().is_match(name) {
        return Err(IntakeViolation::InvalidName { field });
    }
    Ok(name.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
