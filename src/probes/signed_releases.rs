use crate::clients::Release;
use crate::models::{Finding, Outcome};
use crate::raw::SignedReleaseData;

pub const RELEASES_ARE_SIGNED: &str = "releasesAreSigned";
pub const RELEASES_HAVE_PROVENANCE: &str = "releasesHaveProvenance";

pub const SIGNATURE_EXTENSIONS: &[&str] = &[
    ".asc",
    ".sig",
    ".sign",
    ".minisig",
    ".sigstore",
    ".sigstore.json",
];

pub const PROVENANCE_EXTENSIONS: &[&str] = &[".intoto.jsonl"];

fn find_asset<'a>(release: &'a Release, extensions: &[&str]) -> Option<&'a str> {
    release
        .assets
        .iter()
        .map(|a| a.name.as_str())
        .find(|name| {
            let lower = name.to_ascii_lowercase();
            extensions.iter().any(|ext| lower.ends_with(ext))
        })
}

fn release_finding(probe: &str, release: &Release, extensions: &[&str], what: &str) -> Finding {
    let tag = release.tag_name.as_str();
    let finding = if release.assets.is_empty() {
        Finding::new(probe, Outcome::NotApplicable, format!("release '{tag}' has no assets"))
    } else {
        match find_asset(release, extensions) {
            Some(asset) => Finding::new(
                probe,
                Outcome::True,
                format!("{what} artifact found on release '{tag}': {asset}"),
            )
            .with_value("asset", asset),
            None => Finding::new(
                probe,
                Outcome::False,
                format!("no {what} artifact found on release '{tag}'"),
            ),
        }
    };
    finding.with_value("release", tag)
}

/// One finding per release and probe, in release order
pub fn run(data: &SignedReleaseData) -> Vec<Finding> {
    if data.releases.is_empty() {
        return [RELEASES_ARE_SIGNED, RELEASES_HAVE_PROVENANCE]
            .into_iter()
            .map(|probe| Finding::new(probe, Outcome::NotApplicable, "no releases found"))
            .collect();
    }
    let mut findings = Vec::new();
    for release in &data.releases {
        findings.push(release_finding(RELEASES_ARE_SIGNED, release, SIGNATURE_EXTENSIONS, "signed"));
        findings.push(release_finding(
            RELEASES_HAVE_PROVENANCE,
            release,
            PROVENANCE_EXTENSIONS,
            "provenance",
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ReleaseAsset;

    fn release(tag: &str, assets: &[&str]) -> Release {
        Release {
            tag_name: tag.to_string(),
            target_commitish: "main".to_string(),
            url: String::new(),
            assets: assets
                .iter()
                .map(|name| ReleaseAsset {
                    name: name.to_string(),
                    url: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_signature_and_provenance() {
        let data = SignedReleaseData {
            releases: vec![
                release("v2", &["tool.tar.gz", "tool.tar.gz.asc"]),
                release("v1", &["tool.tar.gz", "multiple.intoto.jsonl"]),
                release("v0", &[]),
            ],
        };
        let findings = run(&data);
        let get = |probe: &str, tag: &str| {
            findings
                .iter()
                .find(|f| f.probe == probe && f.value("release") == Some(tag))
                .map(|f| f.outcome)
        };
        assert_eq!(get(RELEASES_ARE_SIGNED, "v2"), Some(Outcome::True));
        assert_eq!(get(RELEASES_HAVE_PROVENANCE, "v2"), Some(Outcome::False));
        assert_eq!(get(RELEASES_ARE_SIGNED, "v1"), Some(Outcome::False));
        assert_eq!(get(RELEASES_HAVE_PROVENANCE, "v1"), Some(Outcome::True));
        assert_eq!(get(RELEASES_ARE_SIGNED, "v0"), Some(Outcome::NotApplicable));
    }
}
