//! Artifact file names.
//!
//! Downstream consumers parse these names, so the layouts are fixed:
//!   ContentUserCompletion_V2_YYYY_MM_DD_1_HHMMSS.csv   (zero-padded)
//!   Non_Completed_Assignments_V2_YYYY_M_D_1_HHMMSS.csv (unpadded)
//!   UserCompletion_v2_YYYY_M_D_1_HHMMSS.csv            (unpadded)
//! All components come from the display-zone run snapshot.

use crate::schedule::RunStamp;
use chrono::Datelike;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Completions,
    OpenAssignments,
    UserCompletion,
}

impl ArtifactKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Completions => "completions",
            Self::OpenAssignments => "open_assignments",
            Self::UserCompletion => "user_completion",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Completions => "ContentUserCompletion_V2",
            Self::OpenAssignments => "Non_Completed_Assignments_V2",
            Self::UserCompletion => "UserCompletion_v2",
        }
    }

    fn zero_padded(&self) -> bool {
        matches!(self, Self::Completions)
    }

    /// `tag` is appended to the time segment; pass "" for legacy names.
    pub fn file_name(&self, stamp: &RunStamp, tag: &str) -> String {
        let date = stamp.local_date();
        let (month, day) = if self.zero_padded() {
            (format!("{:02}", date.month()), format!("{:02}", date.day()))
        } else {
            (date.month().to_string(), date.day().to_string())
        };
        format!(
            "{}_{}_{month}_{day}_1_{}{tag}.csv",
            self.prefix(),
            date.year(),
            stamp.local_hms()
        )
    }
}
