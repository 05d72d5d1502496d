use crate::models::{Finding, Outcome};
use crate::raw::BadgeData;

pub const HAS_OPENSSF_BADGE: &str = "hasOpenSSFBadge";

/// Badge levels the best-practices API reports, lowest first
pub const BADGE_LEVELS: &[&str] = &["in_progress", "passing", "silver", "gold"];

/// `True` with a `level` value for a recognised badge, `False` for none and
/// `Error` for a level this build does not know.
pub fn run(data: &BadgeData) -> Vec<Finding> {
    let finding = match data.level.as_deref() {
        None | Some("none") => {
            Finding::new(HAS_OPENSSF_BADGE, Outcome::False, "project has no OpenSSF best practices badge")
                .with_value("level", "none")
        }
        Some(level) if BADGE_LEVELS.contains(&level) => Finding::new(
            HAS_OPENSSF_BADGE,
            Outcome::True,
            format!("project has an OpenSSF best practices badge at level '{level}'"),
        )
        .with_value("level", level),
        Some(level) => Finding::new(
            HAS_OPENSSF_BADGE,
            Outcome::Error,
            format!("unsupported badge level '{level}'"),
        )
        .with_value("level", level),
    };
    vec![finding]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(s: Option<&str>) -> Vec<Finding> {
        run(&BadgeData {
            level: s.map(String::from),
        })
    }

    #[test]
    fn test_badge_outcomes() {
        assert_eq!(level(None)[0].outcome, Outcome::False);
        assert_eq!(level(Some("silver"))[0].outcome, Outcome::True);
        assert_eq!(level(Some("silver"))[0].value("level"), Some("silver"));
        assert_eq!(level(Some("platinum"))[0].outcome, Outcome::Error);
    }
}
