use crate::models::{Finding, Outcome};
use crate::raw::VulnerabilitiesData;

pub const HAS_OSV_VULNERABILITIES: &str = "hasOSVVulnerabilities";

/// One `True` finding per known vulnerability, or a single `False`
pub fn run(data: &VulnerabilitiesData) -> Vec<Finding> {
    if data.ids.is_empty() {
        return vec![Finding::new(
            HAS_OSV_VULNERABILITIES,
            Outcome::False,
            format!("no known vulnerabilities affect commit {}", data.commit),
        )];
    }
    data.ids
        .iter()
        .map(|id| {
            Finding::new(
                HAS_OSV_VULNERABILITIES,
                Outcome::True,
                format!("known vulnerability {id} affects the repository"),
            )
            .with_value("id", id.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_finding_per_id() {
        let data = VulnerabilitiesData {
            commit: "abc".to_string(),
            ids: vec!["GHSA-xxxx".to_string(), "OSV-2024-1".to_string()],
        };
        let ids: Vec<_> = run(&data).iter().filter_map(|f| f.value("id").map(String::from)).collect();
        assert_eq!(ids, vec!["GHSA-xxxx", "OSV-2024-1"]);
    }
}
