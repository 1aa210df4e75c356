use std::path::{Path, PathBuf};

use crate::errors::{Result, SkinGenError};
use crate::profile::{Goal, RoutineResult};

/// Routine text exactly as the backend returned it.
pub fn render_routine(result: &RoutineResult) -> &str {
    &result.text
}

/// One tutorial link per goal.
pub fn video_for(goal: Goal) -> &'static str {
    match goal {
        Goal::Glow => "https://www.youtube.com/results?search_query=glowing+skin+diy+routine",
        Goal::AcneControl => "https://www.youtube.com/results?search_query=acne+control+skincare+routine",
        Goal::AntiAging => "https://www.youtube.com/results?search_query=anti+aging+skincare+routine",
        Goal::Hydration => "https://www.youtube.com/results?search_query=hydrating+skincare+routine",
        Goal::EvenTone => "https://www.youtube.com/results?search_query=even+skin+tone+routine",
    }
}

pub fn video_for_optional(goal: Option<Goal>) -> Option<&'static str> {
    goal.map(video_for)
}

/// Static images shown next to the result.
#[derive(Debug, Clone)]
pub struct Assets {
    pub logo: PathBuf,
    pub illustration: PathBuf,
}

impl Assets {
    pub fn new(logo: impl Into<PathBuf>, illustration: impl Into<PathBuf>) -> Self {
        Self { logo: logo.into(), illustration: illustration.into() }
    }

    pub fn logo(&self) -> Result<&Path> {
        Self::check(&self.logo)
    }

    pub fn illustration(&self) -> Result<&Path> {
        Self::check(&self.illustration)
    }

    pub fn check(path: &Path) -> Result<&Path> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(SkinGenError::AssetMissing(path.to_path_buf()))
        }
    }
}
