use crate::models::{Finding, Location, Outcome};
use crate::raw::BinaryArtifactData;

pub const HAS_BINARY_ARTIFACTS: &str = "hasBinaryArtifacts";

/// One `True` finding per checked-in binary, or a single `False`
pub fn run(data: &BinaryArtifactData) -> Vec<Finding> {
    if data.files.is_empty() {
        return vec![Finding::new(
            HAS_BINARY_ARTIFACTS,
            Outcome::False,
            "no binaries found in the repository",
        )];
    }
    data.files
        .iter()
        .map(|path| {
            Finding::new(HAS_BINARY_ARTIFACTS, Outcome::True, "binary detected")
                .with_location(Location::file(path.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_finding_per_binary() {
        let data = BinaryArtifactData {
            files: vec!["bin/tool.exe".to_string(), "lib/x.jar".to_string()],
        };
        let findings = run(&data);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.outcome == Outcome::True));
        assert_eq!(
            findings[1].location.as_ref().map(|l| l.path.as_str()),
            Some("lib/x.jar")
        );
    }

    #[test]
    fn test_clean_repository() {
        let findings = run(&BinaryArtifactData::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].outcome, Outcome::False);
    }
}
