use super::{Lesson, LessonError};

/// How lessons owned by someone else are reported to a requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    /// Existing lessons of other owners yield `Forbidden`.
    #[default]
    RevealForeign,
    /// Existing lessons of other owners are indistinguishable from absent ones.
    HideForeign,
}

impl AccessPolicy {
    pub fn from_hide_foreign(hide: bool) -> Self {
        if hide {
            AccessPolicy::HideForeign
        } else {
            AccessPolicy::RevealForeign
        }
    }
}

/// Outcome of looking up a lesson on behalf of a requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Lesson),
    NotFound,
    Forbidden,
}

impl Lookup {
    /// Existence is decided before ownership.
    pub fn resolve(lesson: Option<Lesson>, requester: &str, policy: AccessPolicy) -> Self {
        match lesson {
            None => Lookup::NotFound,
            Some(lesson) if lesson.is_owned_by(requester) => Lookup::Found(lesson),
            Some(_) => match policy {
                AccessPolicy::RevealForeign => Lookup::Forbidden,
                AccessPolicy::HideForeign => Lookup::NotFound,
            },
        }
    }

    pub fn into_result(self) -> Result<Lesson, LessonError> {
        match self {
            Lookup::Found(lesson) => Ok(lesson),
            Lookup::NotFound => Err(LessonError::NotFound),
            Lookup::Forbidden => Err(LessonError::Forbidden),
        }
    }
}
